//! The instance engine.
//!
//! A [`Kvs`] owns an in-memory map of written keys, a read-only default
//! layer loaded once at open, and the on-disk layout for its instance id.
//! All observable operations serialize through one instance lock; the lock
//! is taken with `try_lock`, so a contended instance fails fast with
//! `MutexLockFailed` instead of blocking (accidental self-reentry shows up
//! as an error, not a deadlock).
//!
//! Reads fall back to the default layer when the live map has no entry;
//! writes never touch the defaults. `flush` persists the live map as the
//! new generation 0, rotating the previous one into the snapshot ring.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use kestrel_common::error::{ErrorCode, KvsResult};
use kestrel_common::types::{InstanceId, OpenNeedDefaults, OpenNeedFile, OpenNeedKvs, SnapshotId};
use kestrel_common::value::KvsValue;

use crate::codec::{DocumentCodec, JsonCodec};
use crate::layout::{StorageLayout, GEN_DEFAULT, GEN_LIVE};
use crate::snapshot::{self, KVS_MAX_SNAPSHOTS};
use crate::tagged;
use crate::vfs::{Filesystem, OsFilesystem};

pub struct Kvs {
    /// Written keys. The mutex is the instance lock.
    live: Mutex<HashMap<String, KvsValue>>,

    /// Default layer, immutable after open.
    defaults: HashMap<String, KvsValue>,

    layout: StorageLayout,

    /// Whether teardown performs a best-effort flush.
    flush_on_exit: AtomicBool,
}

impl std::fmt::Debug for Kvs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kvs").finish_non_exhaustive()
    }
}

impl Kvs {
    /// Open or initialize the store for `instance_id` in `dir`.
    ///
    /// An empty directory resolves to the current working directory. With
    /// both flags `Optional` the open succeeds even on a completely empty
    /// directory, starting from empty maps. Flush-on-exit starts enabled;
    /// see [`set_flush_on_exit`](Self::set_flush_on_exit).
    pub fn open(
        instance_id: InstanceId,
        need_defaults: OpenNeedDefaults,
        need_kvs: OpenNeedKvs,
        dir: impl Into<PathBuf>,
    ) -> KvsResult<Kvs> {
        Self::open_with(
            instance_id,
            need_defaults,
            need_kvs,
            dir,
            Arc::new(OsFilesystem),
            Arc::new(JsonCodec),
        )
    }

    /// [`open`](Self::open) with an injected filesystem and codec.
    pub fn open_with(
        instance_id: InstanceId,
        need_defaults: OpenNeedDefaults,
        need_kvs: OpenNeedKvs,
        dir: impl Into<PathBuf>,
        fs: Arc<dyn Filesystem>,
        codec: Arc<dyn DocumentCodec>,
    ) -> KvsResult<Kvs> {
        let mut dir = dir.into();
        if dir.as_os_str().is_empty() {
            dir = PathBuf::from("./");
        }
        let layout = StorageLayout::new(&dir, instance_id, fs, codec);

        let defaults = layout.open_json(GEN_DEFAULT, need_defaults.into())?;
        let live = layout.open_json(GEN_LIVE, need_kvs.into())?;

        tracing::debug!("opened KVS instance '{instance_id}'");
        tracing::debug!("max snapshot count: {KVS_MAX_SNAPSHOTS}");

        Ok(Self {
            live: Mutex::new(live),
            defaults,
            layout,
            flush_on_exit: AtomicBool::new(true),
        })
    }

    /// Take the instance lock, failing fast when it is already held.
    fn lock(&self) -> KvsResult<MutexGuard<'_, HashMap<String, KvsValue>>> {
        self.live.try_lock().ok_or(ErrorCode::MutexLockFailed)
    }

    /// Control whether teardown flushes the store.
    pub fn set_flush_on_exit(&self, flush: bool) {
        self.flush_on_exit.store(flush, Ordering::Relaxed);
    }

    /// Clear all written keys. Defaults are untouched, so keys with a
    /// default value revert to it.
    pub fn reset(&self) -> KvsResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    /// All written keys, in no particular order. Default-only keys are not
    /// listed.
    pub fn get_all_keys(&self) -> KvsResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    /// Whether `key` was written. A key that only has a default is not
    /// considered existing.
    pub fn key_exists(&self, key: &str) -> KvsResult<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// The value of `key`: the written value if present, otherwise the
    /// default value if present, otherwise `KeyNotFound`.
    pub fn get_value(&self, key: &str) -> KvsResult<KvsValue> {
        let live = self.lock()?;
        if let Some(value) = live.get(key) {
            return Ok(value.clone());
        }
        self.defaults.get(key).cloned().ok_or(ErrorCode::KeyNotFound)
    }

    /// The default value of `key`, ignoring any written value.
    pub fn get_default_value(&self, key: &str) -> KvsResult<KvsValue> {
        let _live = self.lock()?;
        self.defaults.get(key).cloned().ok_or(ErrorCode::KeyNotFound)
    }

    /// Whether `key` has a default value.
    pub fn has_default_value(&self, key: &str) -> KvsResult<bool> {
        let _live = self.lock()?;
        Ok(self.defaults.contains_key(key))
    }

    /// Insert or overwrite the value of `key`.
    pub fn set_value(&self, key: impl Into<String>, value: impl Into<KvsValue>) -> KvsResult<()> {
        self.lock()?.insert(key.into(), value.into());
        Ok(())
    }

    /// Remove a written key. `KeyNotFound` if it was never written, even
    /// when a default exists.
    pub fn remove_key(&self, key: &str) -> KvsResult<()> {
        if self.lock()?.remove(key).is_some() {
            Ok(())
        } else {
            Err(ErrorCode::KeyNotFound)
        }
    }

    /// Drop the written value of `key` so reads see its default again.
    /// Fails with `KeyDefaultNotFound` when no default exists; succeeds
    /// whether or not the key was written.
    pub fn reset_key(&self, key: &str) -> KvsResult<()> {
        let mut live = self.lock()?;
        if !self.defaults.contains_key(key) {
            return Err(ErrorCode::KeyDefaultNotFound);
        }
        live.remove(key);
        Ok(())
    }

    /// Persist the live map as generation 0.
    ///
    /// When a previous generation 0 exists it is rotated into the snapshot
    /// ring first. The `.json`/`.hash` pair is not written atomically; a
    /// failure in between is caught by the checksum at the next open.
    pub fn flush(&self) -> KvsResult<()> {
        let live = self.lock()?;
        self.flush_locked(&live)
    }

    fn flush_locked(&self, live: &HashMap<String, KvsValue>) -> KvsResult<()> {
        let doc = tagged::encode_root(live)?;

        match self.layout.fs().exists(&self.layout.json_file(GEN_LIVE)) {
            Ok(true) => snapshot::rotate(&self.layout)?,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("probing live generation failed: {e}");
                return Err(ErrorCode::PhysicalStorageFailure);
            }
        }

        let bytes = self.layout.codec().serialize(&doc)?;
        self.layout.write_json_data(&bytes)
    }

    /// Number of snapshots currently on disk.
    pub fn snapshot_count(&self) -> KvsResult<usize> {
        let _live = self.lock()?;
        snapshot::count(&self.layout)
    }

    /// Capacity of the snapshot ring.
    pub fn snapshot_max_count(&self) -> usize {
        KVS_MAX_SNAPSHOTS
    }

    /// Replace the live map with the contents of snapshot `snapshot_id`.
    ///
    /// Generation 0 is not a snapshot, and a snapshot beyond the current
    /// count does not exist; both are `InvalidSnapshotId`. Restoring leaves
    /// the ring itself untouched.
    pub fn snapshot_restore(&self, snapshot_id: SnapshotId) -> KvsResult<()> {
        let mut live = self.lock()?;
        if snapshot_id.0 == 0 {
            tracing::warn!("tried to restore the live generation as a snapshot");
            return Err(ErrorCode::InvalidSnapshotId);
        }
        if snapshot::count(&self.layout)? < snapshot_id.0 {
            tracing::warn!("tried to restore missing snapshot {snapshot_id}");
            return Err(ErrorCode::InvalidSnapshotId);
        }

        let restored = self
            .layout
            .open_json(&snapshot_id.0.to_string(), OpenNeedFile::Required)?;
        *live = restored;
        Ok(())
    }

    /// Path of the `.json` file of a generation; `FileNotFound` when the
    /// file does not currently exist.
    pub fn get_kvs_filename(&self, snapshot_id: SnapshotId) -> KvsResult<PathBuf> {
        let _live = self.lock()?;
        self.existing(self.layout.json_file(&snapshot_id.0.to_string()))
    }

    /// Path of the `.hash` file of a generation; `FileNotFound` when the
    /// file does not currently exist.
    pub fn get_hash_filename(&self, snapshot_id: SnapshotId) -> KvsResult<PathBuf> {
        let _live = self.lock()?;
        self.existing(self.layout.hash_file(&snapshot_id.0.to_string()))
    }

    fn existing(&self, path: PathBuf) -> KvsResult<PathBuf> {
        match self.layout.fs().exists(&path) {
            Ok(true) => Ok(path),
            Ok(false) => Err(ErrorCode::FileNotFound),
            Err(e) => {
                tracing::error!("probing {} failed: {e}", path.display());
                Err(ErrorCode::PhysicalStorageFailure)
            }
        }
    }
}

impl Drop for Kvs {
    fn drop(&mut self) {
        if self.flush_on_exit.load(Ordering::Relaxed) {
            tracing::debug!("flushing on teardown");
            // Teardown must not fail; a lost flush is caught by the caller's
            // next open at the previous generation.
            if let Err(code) = self.flush() {
                tracing::warn!("teardown flush failed: {code}");
            }
        }
    }
}
