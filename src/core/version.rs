//! Version marker and fingerprint sidecar maintenance.
//!
//! Decides, once per store construction, whether cached data should be
//! treated as stale after an application upgrade, and keeps the sidecar
//! files that make the decision possible on the next run: a version marker
//! holding the last-seen application version, and a fingerprint file
//! holding the strict serialization of the document type's default
//! instance (a complete structural snapshot of the schema that was live
//! when the data was written).

use crate::core::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache-kind tag distinguishing sidecar files among stores that share a
/// document stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON document stores, the kind `DocumentStore` produces.
    Json,
    /// Binary caches kept by collaborating subsystems.
    Binary,
}

impl StoreKind {
    pub fn tag(&self) -> &'static str {
        match self {
            StoreKind::Json => "json",
            StoreKind::Binary => "binary",
        }
    }
}

/// On-disk shape of the fingerprint file. The schema is fixed; an unknown
/// member is a parse failure, not forward-compatible noise.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InformationFile {
    #[serde(rename = "DefaultContent")]
    pub default_content: String,
}

#[derive(Debug)]
pub struct VersionTracker {
    information_path: PathBuf,
    version_path: PathBuf,
    running_version: String,
    clear_cache: bool,
}

impl VersionTracker {
    /// Derives the sidecar paths for `file_path` and reads the version
    /// marker to compute the cache-clear flag. Never fails: an unreadable
    /// or missing marker means the version cannot be confirmed, which is
    /// treated the same as a version change.
    pub fn new(file_path: &Path, kind: StoreKind, running_version: &str) -> Self {
        let information_path = sidecar_path(file_path, kind, "info.json");
        let version_path = sidecar_path(file_path, kind, "version.txt");
        let clear_cache = match fs::read_to_string(&version_path) {
            Ok(recorded) => recorded.trim() != running_version,
            Err(_) => true,
        };
        VersionTracker {
            information_path,
            version_path,
            running_version: running_version.to_string(),
            clear_cache,
        }
    }

    /// True when the recorded application version differs from the running
    /// one, or was never recorded. Computed once at construction.
    pub fn clear_cache(&self) -> bool {
        self.clear_cache
    }

    pub fn information_path(&self) -> &Path {
        &self.information_path
    }

    pub fn version_path(&self) -> &Path {
        &self.version_path
    }

    /// Reads and parses the fingerprint file.
    pub fn read_information(&self) -> Result<InformationFile, StoreError> {
        let text = fs::read_to_string(&self.information_path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Commits `content` as the new fingerprint baseline and rewrites the
    /// version marker to the running version. Failures are logged and
    /// swallowed; the next run recomputes from whatever state survives.
    pub fn close(&self, content: &str) {
        if let Err(e) = self.commit(content) {
            log::error!(
                "failed to commit fingerprint at <{}>: {e}",
                self.information_path.display()
            );
        }
    }

    fn commit(&self, content: &str) -> Result<(), StoreError> {
        if let Some(directory) = self.information_path.parent() {
            fs::create_dir_all(directory)?;
        }
        let information = InformationFile {
            default_content: content.to_string(),
        };
        fs::write(
            &self.information_path,
            serde_json::to_string_pretty(&information)?,
        )?;
        fs::write(&self.version_path, &self.running_version)?;
        Ok(())
    }
}

fn sidecar_path(file_path: &Path, kind: StoreKind, suffix: &str) -> PathBuf {
    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("store");
    let name = format!("{stem}-{}.{suffix}", kind.tag());
    match file_path.parent() {
        Some(directory) => directory.join(name),
        None => PathBuf::from(name),
    }
}
