//! Snapshot ring scenarios: rotation under repeated flushes, the capacity
//! bound, and restore semantics.

use std::collections::HashMap;
use std::path::Path;

use kestrel_common::error::ErrorCode;
use kestrel_common::types::{InstanceId, OpenNeedDefaults, OpenNeedKvs, SnapshotId};
use kestrel_common::value::KvsValue;
use kestrel_store::checksum;
use kestrel_store::codec::{DocumentCodec, JsonCodec};
use kestrel_store::kvs::Kvs;
use kestrel_store::snapshot::KVS_MAX_SNAPSHOTS;
use kestrel_store::tagged;

fn open(dir: &Path, id: usize) -> Kvs {
    let kvs = Kvs::open(
        InstanceId(id),
        OpenNeedDefaults::Optional,
        OpenNeedKvs::Optional,
        dir,
    )
    .unwrap();
    kvs.set_flush_on_exit(false);
    kvs
}

#[test]
fn test_rotation_keeps_at_most_max_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let kvs = open(dir.path(), 6);
    assert_eq!(kvs.snapshot_max_count(), KVS_MAX_SNAPSHOTS);

    // Five flushes, each preceded by one unique write.
    for i in 1..=5 {
        kvs.set_value(format!("k{i}"), i as i32).unwrap();
        kvs.flush().unwrap();
    }

    for gen in 0..=KVS_MAX_SNAPSHOTS {
        assert!(
            dir.path().join(format!("kvs_6_{gen}.json")).exists(),
            "generation {gen} must exist"
        );
        assert!(
            dir.path().join(format!("kvs_6_{gen}.hash")).exists(),
            "hash of generation {gen} must exist"
        );
    }
    assert!(!dir
        .path()
        .join(format!("kvs_6_{}.json", KVS_MAX_SNAPSHOTS + 1))
        .exists());
    assert_eq!(kvs.snapshot_count().unwrap(), KVS_MAX_SNAPSHOTS);

    // The oldest surviving generation holds the state of the second flush.
    let bytes = std::fs::read(dir.path().join(format!("kvs_6_{KVS_MAX_SNAPSHOTS}.json"))).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let oldest = tagged::decode_root(&doc).unwrap();
    assert_eq!(
        oldest,
        HashMap::from([
            ("k1".to_string(), KvsValue::I32(1)),
            ("k2".to_string(), KvsValue::I32(2)),
        ])
    );
}

#[test]
fn test_snapshot_count_grows_with_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let kvs = open(dir.path(), 1);

    assert_eq!(kvs.snapshot_count().unwrap(), 0);
    kvs.set_value("a", 1i32).unwrap();
    kvs.flush().unwrap();
    // First flush creates only the live generation.
    assert_eq!(kvs.snapshot_count().unwrap(), 0);

    kvs.set_value("b", 2i32).unwrap();
    kvs.flush().unwrap();
    assert_eq!(kvs.snapshot_count().unwrap(), 1);

    kvs.set_value("c", 3i32).unwrap();
    kvs.flush().unwrap();
    assert_eq!(kvs.snapshot_count().unwrap(), 2);
}

#[test]
fn test_restore_returns_to_an_older_state() {
    let dir = tempfile::tempdir().unwrap();
    let kvs = open(dir.path(), 2);

    kvs.set_value("counter", 1i32).unwrap();
    kvs.flush().unwrap();
    kvs.set_value("counter", 2i32).unwrap();
    kvs.flush().unwrap();

    // Snapshot 1 is the newest rotated generation: the state of the first
    // flush.
    kvs.snapshot_restore(SnapshotId(1)).unwrap();
    assert_eq!(kvs.get_value("counter").unwrap(), KvsValue::I32(1));

    // Restoring only replaces the in-memory state; the ring is untouched.
    assert_eq!(kvs.snapshot_count().unwrap(), 1);
    assert!(dir.path().join("kvs_2_1.json").exists());
}

#[test]
fn test_restore_rejects_invalid_ids() {
    let dir = tempfile::tempdir().unwrap();
    let kvs = open(dir.path(), 3);

    kvs.set_value("a", 1i32).unwrap();
    kvs.flush().unwrap();
    kvs.set_value("b", 2i32).unwrap();
    kvs.flush().unwrap();

    // Generation 0 is the live store, not a snapshot.
    assert_eq!(
        kvs.snapshot_restore(SnapshotId(0)).unwrap_err(),
        ErrorCode::InvalidSnapshotId
    );
    // Beyond the ring capacity.
    assert_eq!(
        kvs.snapshot_restore(SnapshotId(KVS_MAX_SNAPSHOTS + 1))
            .unwrap_err(),
        ErrorCode::InvalidSnapshotId
    );
    // Within capacity but not yet populated.
    assert_eq!(
        kvs.snapshot_restore(SnapshotId(2)).unwrap_err(),
        ErrorCode::InvalidSnapshotId
    );
}

#[test]
fn test_restore_keeps_the_default_layer() {
    let dir = tempfile::tempdir().unwrap();

    // Defaults pair written by hand.
    let defaults = HashMap::from([("d".to_string(), KvsValue::String("default".into()))]);
    let doc = tagged::encode_root(&defaults).unwrap();
    let bytes = JsonCodec.serialize(&doc).unwrap();
    std::fs::write(dir.path().join("kvs_4_default.json"), &bytes).unwrap();
    std::fs::write(
        dir.path().join("kvs_4_default.hash"),
        checksum::encode(checksum::hash(&bytes)),
    )
    .unwrap();

    let kvs = Kvs::open(
        InstanceId(4),
        OpenNeedDefaults::Required,
        OpenNeedKvs::Optional,
        dir.path(),
    )
    .unwrap();
    kvs.set_flush_on_exit(false);

    kvs.set_value("a", 1i32).unwrap();
    kvs.flush().unwrap();
    kvs.set_value("a", 2i32).unwrap();
    kvs.flush().unwrap();

    kvs.snapshot_restore(SnapshotId(1)).unwrap();
    assert_eq!(kvs.get_value("a").unwrap(), KvsValue::I32(1));
    assert_eq!(
        kvs.get_value("d").unwrap(),
        KvsValue::String("default".into())
    );
}

#[test]
fn test_filename_accessors_follow_the_ring() {
    let dir = tempfile::tempdir().unwrap();
    let kvs = open(dir.path(), 5);

    kvs.set_value("a", 1i32).unwrap();
    kvs.flush().unwrap();
    kvs.set_value("b", 2i32).unwrap();
    kvs.flush().unwrap();

    assert_eq!(
        kvs.get_kvs_filename(SnapshotId(1)).unwrap(),
        dir.path().join("kvs_5_1.json")
    );
    assert_eq!(
        kvs.get_hash_filename(SnapshotId(1)).unwrap(),
        dir.path().join("kvs_5_1.hash")
    );
    assert_eq!(
        kvs.get_kvs_filename(SnapshotId(2)).unwrap_err(),
        ErrorCode::FileNotFound
    );
}
