//! Instance construction and sharing.
//!
//! [`KvsBuilder`] is the recommended way to open an instance; it owns the
//! open-time knobs and yields an owned [`Kvs`]. [`KvsRegistry`] caches live
//! instances per id behind a lock, for callers that want to share one
//! instance across components instead of owning it. The registry is an
//! explicit object; there is no process-global cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use kestrel_common::error::KvsResult;
use kestrel_common::types::{InstanceId, OpenNeedDefaults, OpenNeedKvs};

use crate::kvs::Kvs;

/// Fluent configuration for opening one instance.
#[derive(Debug, Clone)]
pub struct KvsBuilder {
    instance_id: InstanceId,
    need_defaults: bool,
    need_kvs: bool,
    dir: PathBuf,
}

impl KvsBuilder {
    /// Start a builder for `instance_id` with optional defaults, optional
    /// store file and the current working directory.
    pub fn new(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            need_defaults: false,
            need_kvs: false,
            dir: PathBuf::new(),
        }
    }

    /// Fail the open when no defaults file exists.
    pub fn need_defaults(mut self, flag: bool) -> Self {
        self.need_defaults = flag;
        self
    }

    /// Fail the open when no store file exists.
    pub fn need_kvs(mut self, flag: bool) -> Self {
        self.need_kvs = flag;
        self
    }

    /// Directory holding the instance files. An empty path means the
    /// current working directory.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Open the instance.
    pub fn build(self) -> KvsResult<Kvs> {
        Kvs::open(
            self.instance_id,
            if self.need_defaults {
                OpenNeedDefaults::Required
            } else {
                OpenNeedDefaults::Optional
            },
            if self.need_kvs {
                OpenNeedKvs::Required
            } else {
                OpenNeedKvs::Optional
            },
            self.dir,
        )
    }
}

/// Cache of live instances keyed by id.
///
/// `open` returns the cached instance when one exists, regardless of the
/// builder's other settings; drop an instance first to reopen it with
/// different flags. The registry lock is a plain blocking lock; the
/// fail-fast try-lock discipline belongs to each instance, not to the
/// cache in front of them.
pub struct KvsRegistry {
    instances: Mutex<HashMap<InstanceId, Arc<Kvs>>>,
}

impl KvsRegistry {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the cached instance for the builder's id, opening and caching
    /// it when absent.
    pub fn open(&self, builder: KvsBuilder) -> KvsResult<Arc<Kvs>> {
        let mut instances = self.instances.lock();
        if let Some(kvs) = instances.get(&builder.instance_id) {
            return Ok(Arc::clone(kvs));
        }
        let id = builder.instance_id;
        let kvs = Arc::new(builder.build()?);
        instances.insert(id, Arc::clone(&kvs));
        Ok(kvs)
    }

    /// Remove an instance from the cache. Outstanding handles keep it
    /// alive; the teardown flush runs when the last handle drops.
    pub fn drop_instance(&self, instance_id: InstanceId) -> Option<Arc<Kvs>> {
        self.instances.lock().remove(&instance_id)
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

impl Default for KvsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
