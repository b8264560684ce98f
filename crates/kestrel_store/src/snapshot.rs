//! Bounded snapshot ring.
//!
//! Snapshots are older generations of the live file pair, rotated by
//! rename: before a new live generation is written, generation `i` becomes
//! generation `i + 1` for `i` descending from the ring top, dropping the
//! oldest once the ring is full. Indices therefore always form a prefix of
//! the naturals: if `_<k>.json` exists, so does every `_<j>.json` below it.
//!
//! Rotation is not atomic across a `.json`/`.hash` pair. A crash between
//! the two renames leaves a mismatched pair that open-time verification
//! reports as `ValidationFailed`; the next successful flush heals the ring.

use std::io;

use kestrel_common::error::{ErrorCode, KvsResult};

use crate::layout::StorageLayout;

/// Ring capacity: at most this many snapshots exist besides the live
/// generation.
pub const KVS_MAX_SNAPSHOTS: usize = 3;

/// Count the existing snapshots: the largest `n` such that generations
/// `1..=n` all exist. Probe failures surface as storage failures.
pub fn count(layout: &StorageLayout) -> KvsResult<usize> {
    let mut count = 0;
    for idx in 1..=KVS_MAX_SNAPSHOTS {
        match layout.fs().exists(&layout.json_file(&idx.to_string())) {
            Ok(true) => count = idx,
            Ok(false) => break,
            Err(e) => {
                tracing::error!("snapshot probe failed at generation {idx}: {e}");
                return Err(ErrorCode::PhysicalStorageFailure);
            }
        }
    }
    Ok(count)
}

/// Rotate the ring one step up, making room at generation 0.
///
/// Renames the `.hash` before the `.json` at every index. A source file
/// that is already absent is skipped; any other rename failure aborts with
/// `PhysicalStorageFailure`.
pub fn rotate(layout: &StorageLayout) -> KvsResult<()> {
    let top = count(layout)?.min(KVS_MAX_SNAPSHOTS - 1);
    for idx in (0..=top).rev() {
        let old = idx.to_string();
        let new = (idx + 1).to_string();
        tracing::debug!(
            "rotating: {} -> {}",
            layout.json_file(&old).display(),
            layout.json_file(&new).display()
        );
        rename_if_present(layout, &layout.hash_file(&old), &layout.hash_file(&new))?;
        rename_if_present(layout, &layout.json_file(&old), &layout.json_file(&new))?;
    }
    Ok(())
}

fn rename_if_present(
    layout: &StorageLayout,
    from: &std::path::Path,
    to: &std::path::Path,
) -> KvsResult<()> {
    match layout.fs().rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::error!("could not rename {}: {e}", from.display());
            Err(ErrorCode::PhysicalStorageFailure)
        }
    }
}
