//! On-disk layout of one store instance.
//!
//! An instance with id `<id>` in directory `<dir>` owns the files
//! `<dir>/kvs_<id>_<gen>.json` plus a `.hash` companion per generation,
//! where `<gen>` is `0` (live), `1..=max` (snapshots) or `default`.
//! A `.json`/`.hash` pair is valid only when the hash file holds the
//! big-endian Adler-32 of the exact `.json` bytes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kestrel_common::error::{ErrorCode, KvsResult};
use kestrel_common::types::{InstanceId, OpenNeedFile};
use kestrel_common::value::KvsValue;

use crate::checksum;
use crate::codec::DocumentCodec;
use crate::tagged;
use crate::vfs::Filesystem;

/// Generation name of the live working files.
pub const GEN_LIVE: &str = "0";

/// Generation name of the read-only defaults pair.
pub const GEN_DEFAULT: &str = "default";

/// Path derivation plus verified read/write of generation file pairs.
/// Owns the injected filesystem and codec on behalf of the instance.
pub struct StorageLayout {
    prefix: PathBuf,
    fs: Arc<dyn Filesystem>,
    codec: Arc<dyn DocumentCodec>,
}

impl StorageLayout {
    pub fn new(
        dir: &Path,
        instance_id: InstanceId,
        fs: Arc<dyn Filesystem>,
        codec: Arc<dyn DocumentCodec>,
    ) -> Self {
        Self {
            prefix: dir.join(format!("kvs_{instance_id}")),
            fs,
            codec,
        }
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn codec(&self) -> &dyn DocumentCodec {
        self.codec.as_ref()
    }

    /// `<prefix>_<gen>.<ext>`, appended to the file name rather than
    /// replacing an extension.
    fn file(&self, gen: &str, ext: &str) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(format!("_{gen}.{ext}"));
        PathBuf::from(name)
    }

    pub fn json_file(&self, gen: &str) -> PathBuf {
        self.file(gen, "json")
    }

    pub fn hash_file(&self, gen: &str) -> PathBuf {
        self.file(gen, "hash")
    }

    /// Load and verify one generation.
    ///
    /// Absence of the `.json` is only an error under `Required`; every
    /// present `.json` must come with a matching hash. The parsed document
    /// root must be an object of tagged values.
    pub fn open_json(
        &self,
        gen: &str,
        need_file: OpenNeedFile,
    ) -> KvsResult<HashMap<String, KvsValue>> {
        let json_path = self.json_file(gen);
        let hash_path = self.hash_file(gen);

        match self.fs.exists(&json_path) {
            Ok(true) => {}
            Ok(false) => {
                return if need_file == OpenNeedFile::Required {
                    tracing::error!("required file {} not found", json_path.display());
                    Err(ErrorCode::KvsFileReadError)
                } else {
                    tracing::debug!(
                        "file {} not found, using empty data",
                        json_path.display()
                    );
                    Ok(HashMap::new())
                };
            }
            Err(e) => {
                tracing::error!("probing {} failed: {e}", json_path.display());
                return Err(ErrorCode::PhysicalStorageFailure);
            }
        }

        let data = self
            .fs
            .read(&json_path)
            .map_err(|_| ErrorCode::KvsFileReadError)?;
        let stored = self
            .fs
            .read(&hash_path)
            .map_err(|_| ErrorCode::KvsHashFileReadError)?;
        if stored.len() != checksum::HASH_LEN {
            return Err(ErrorCode::KvsHashFileReadError);
        }
        if !checksum::verify(&data, &stored) {
            tracing::warn!(
                "data corrupted ({}, {})",
                json_path.display(),
                hash_path.display()
            );
            return Err(ErrorCode::ValidationFailed);
        }

        let doc = self.codec.parse(&data)?;
        tagged::decode_root(&doc)
    }

    /// Persist the live generation: write the `.json` through a temporary
    /// name and rename it into place, then write the digest. The hash is
    /// written strictly after the data so a torn write can never leave a
    /// valid-looking pair behind.
    pub fn write_json_data(&self, bytes: &[u8]) -> KvsResult<()> {
        let json_path = self.json_file(GEN_LIVE);
        if let Some(parent) = json_path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs
                    .create_dir_all(parent)
                    .map_err(|_| ErrorCode::PhysicalStorageFailure)?;
            }
        }

        let tmp_path = self.file(GEN_LIVE, "json.tmp");
        self.fs
            .write(&tmp_path, bytes)
            .map_err(|_| ErrorCode::PhysicalStorageFailure)?;
        self.fs
            .rename(&tmp_path, &json_path)
            .map_err(|_| ErrorCode::PhysicalStorageFailure)?;

        let digest = checksum::encode(checksum::hash(bytes));
        self.fs
            .write(&self.hash_file(GEN_LIVE), &digest)
            .map_err(|_| ErrorCode::PhysicalStorageFailure)?;
        Ok(())
    }
}
