//! Timestamped backup copies of files about to be destructively replaced.
//!
//! A backup is a copy, not a move, so the caller can still delete or
//! overwrite the original immediately afterwards. Backups are never read
//! back by this crate and are never pruned.

use crate::core::error::StoreError;
use crate::core::time;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies `path` aside as `<stem>-<timestamp>.<ext>` in the same directory
/// and returns the backup path. Collisions from rapid repeated backups bump
/// the sub-second fraction until a free name is found.
pub fn backup_aside(path: &Path) -> Result<PathBuf, StoreError> {
    let directory = path
        .parent()
        .ok_or_else(|| StoreError::PathError(format!("no parent directory for {}", path.display())))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StoreError::PathError(format!("no file stem for {}", path.display())))?;
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut stamp = time::backup_timestamp();
    let mut target = directory.join(format!("{stem}-{stamp}{suffix}"));
    while target.exists() {
        stamp = bump_fraction(&stamp);
        target = directory.join(format!("{stem}-{stamp}{suffix}"));
    }
    fs::copy(path, &target)?;
    Ok(target)
}

fn bump_fraction(stamp: &str) -> String {
    match stamp.rsplit_once('-') {
        Some((head, fraction)) => {
            let next = fraction.parse::<u64>().unwrap_or(0) + 1;
            format!("{head}-{next:07}")
        }
        None => format!("{stamp}-0000001"),
    }
}
