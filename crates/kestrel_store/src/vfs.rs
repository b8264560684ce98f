//! Filesystem facade.
//!
//! All disk access of the store goes through this trait so tests can
//! substitute failing or recording filesystems. Methods speak
//! `std::io::Result`; callers translate into the error taxonomy at their
//! own boundary (`PhysicalStorageFailure` for probe/write failures,
//! requiredness policy for absence).

use std::fs;
use std::io;
use std::path::Path;

pub trait Filesystem: Send + Sync {
    /// Whether a regular file exists at `path`.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Production filesystem, delegating to `std::fs`.
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}
