//! Identifier newtypes and open-mode flags.

use std::fmt;

/// Identifies a store instance within a directory. Part of every file name
/// the instance owns (`kvs_<id>_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub usize);

/// Identifies a generation on disk: 0 is the live working generation,
/// 1..=max are rotated snapshots with 1 the newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotId(pub usize);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the defaults file must exist at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenNeedDefaults {
    /// Missing defaults file yields an empty defaults layer.
    Optional,
    /// Missing defaults file fails the open.
    Required,
}

/// Whether the live store file must exist at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenNeedKvs {
    /// Missing store file yields an empty store.
    Optional,
    /// Missing store file fails the open.
    Required,
}

/// Requiredness of a single file pair, used by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenNeedFile {
    Optional,
    Required,
}

impl From<OpenNeedDefaults> for OpenNeedFile {
    fn from(need: OpenNeedDefaults) -> Self {
        match need {
            OpenNeedDefaults::Optional => OpenNeedFile::Optional,
            OpenNeedDefaults::Required => OpenNeedFile::Required,
        }
    }
}

impl From<OpenNeedKvs> for OpenNeedFile {
    fn from(need: OpenNeedKvs) -> Self {
        match need {
            OpenNeedKvs::Optional => OpenNeedFile::Optional,
            OpenNeedKvs::Required => OpenNeedFile::Required,
        }
    }
}
