//! The document store: load-with-fallback, corruption recovery, locked
//! saves, and clearing.
//!
//! One store owns one typed document and its on-disk file pair (document +
//! sidecars). The public surface is total: `load` always returns a usable
//! document, and `save`/`clear` swallow I/O failures after logging them,
//! keeping the in-memory document as the source of truth so a later retry
//! can succeed. Availability over data fidelity is the contract; anything
//! unreadable is backed up aside and replaced by a persisted structural
//! default.
//!
//! Single process, multiple threads: the document slot's mutex is also the
//! save lock, so `save`, `save_information_file`, and default resolution
//! are mutually exclusive per store. `load` is expected once at startup,
//! before concurrent mutation begins. No cross-process coordination is
//! provided.

use crate::core::backup;
use crate::core::codec::Codec;
use crate::core::error::StoreError;
use crate::core::version::{StoreKind, VersionTracker};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Directory name used by the conventional per-document layout.
pub const SETTINGS_DIRECTORY: &str = "settings";
/// File suffix for document files.
pub const FILE_SUFFIX: &str = "json";

/// Marker for types a `DocumentStore` can hold. Blanket-implemented; the
/// structural default doubles as the member-set oracle the strict codec
/// checks against.
pub trait Document: Serialize + DeserializeOwned + Default + Clone + Send {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Default + Clone + Send {}

/// Where a store keeps its document. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct StoreLocation {
    file_path: PathBuf,
    directory_path: PathBuf,
}

impl StoreLocation {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let directory_path = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        StoreLocation {
            file_path,
            directory_path,
        }
    }

    /// Conventional per-document location under a settings root:
    /// `<root>/settings/<name>.json`.
    pub fn settings_path(root: &Path, name: &str) -> Self {
        Self::new(
            root.join(SETTINGS_DIRECTORY)
                .join(format!("{name}.{FILE_SUFFIX}")),
        )
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }
}

/// A per-type JSON document store.
///
/// Orchestrates the codec pair, the backup helper, and the version tracker
/// behind a total load/save/clear contract.
pub struct DocumentStore<T> {
    location: StoreLocation,
    lenient: Codec,
    strict: Codec,
    tracker: VersionTracker,
    slot: Mutex<Option<T>>,
}

impl<T: Document> DocumentStore<T> {
    /// Store with the default lenient/strict codec pair.
    /// `running_version` is the host application's version identifier,
    /// compared against the recorded marker to detect upgrades.
    pub fn new(location: StoreLocation, running_version: &str) -> Self {
        Self::with_codecs(location, running_version, Codec::lenient(), Codec::strict())
    }

    pub fn with_codecs(
        location: StoreLocation,
        running_version: &str,
        lenient: Codec,
        strict: Codec,
    ) -> Self {
        let tracker = VersionTracker::new(location.file_path(), StoreKind::Json, running_version);
        DocumentStore {
            location,
            lenient,
            strict,
            tracker,
            slot: Mutex::new(None),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Loads the document, falling back to a persisted structural default
    /// on any missing, empty, corrupt, or schema-stale file. Never fails,
    /// and always leaves a readable document file on disk afterwards.
    pub fn load(&self) -> T {
        let mut slot = self.lock();
        let path = self.location.file_path();
        match fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => {
                if self.tracker.clear_cache() && !self.check_information_file(Some(&T::default())) {
                    log::warn!(
                        "schema drift detected for <{}>, discarding cached document",
                        path.display()
                    );
                    self.load_default(&mut slot);
                } else {
                    match self.lenient.decode::<T>(&text) {
                        Ok(Some(document)) => *slot = Some(document),
                        Ok(None) => self.load_default(&mut slot),
                        Err(e) => {
                            log::error!("deserialize error for json <{}>: {e}", path.display());
                            self.load_default(&mut slot);
                        }
                    }
                }
            }
            // Missing, empty, and whitespace-only files are equivalent.
            _ => self.load_default(&mut slot),
        }
        slot.get_or_insert_with(T::default).clone()
    }

    /// Mutates the in-memory document in place, installing a default first
    /// if nothing was loaded yet. Call `save` to persist the result.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        let mut slot = self.lock();
        mutate(slot.get_or_insert_with(T::default));
    }

    /// Replaces the in-memory document wholesale.
    pub fn set(&self, document: T) {
        *self.lock() = Some(document);
    }

    /// Persists the current in-memory document, fully replacing the file.
    /// Serialized against the other save paths of this store; a write
    /// failure is logged and the in-memory document is retained so a later
    /// retry can succeed.
    pub fn save(&self) {
        let slot = self.lock();
        self.persist(&slot);
    }

    /// Deletes the on-disk document and recreates a persisted default.
    /// No-op when the file never existed.
    pub fn clear(&self) {
        let mut slot = self.lock();
        let path = self.location.file_path();
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                log::error!("failed to delete cached data at <{}>: {e}", path.display());
                return;
            }
            log::info!("deleted cached data at <{}>", path.display());
            self.load_default(&mut slot);
        }
    }

    /// Records the strict serialization of `data` as the new fingerprint
    /// baseline. Shares the save lock: both operations mutate this store's
    /// on-disk state.
    pub fn save_information_file(&self, data: &T) {
        let _slot = self.lock();
        match self.strict.encode(data) {
            Ok(content) => self.tracker.close(&content),
            Err(e) => log::error!(
                "failed to serialize fingerprint for <{}>: {e}",
                self.location.file_path().display()
            ),
        }
    }

    /// Whether the host application version changed since the last run.
    /// When false, the fingerprint comparison can be skipped entirely; no
    /// file is read by this call.
    pub fn check_version_mismatch(&self) -> bool {
        self.tracker.clear_cache()
    }

    /// Authoritative schema-compatibility check. Returns false when cached
    /// data for this store should be discarded: the on-disk document no
    /// longer strict-decodes against `T` (the fingerprint is then rewritten
    /// from `actual`'s serialization), the fingerprint itself is
    /// unreadable, or `actual` is absent. Returns true when the shape is
    /// still compatible (recorded fingerprint retained) or on first
    /// observation (fingerprint adopted from `actual`).
    pub fn check_with_information_file_to_clear(&self, actual: Option<&T>) -> bool {
        self.check_information_file(actual)
    }

    fn check_information_file(&self, actual: Option<&T>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let document_path = self.location.file_path();

        if !self.tracker.information_path().exists() {
            // First observation of this document type: adopt its default.
            return match self.strict.encode(actual) {
                Ok(content) => {
                    self.tracker.close(&content);
                    true
                }
                Err(e) => {
                    log::error!(
                        "failed to serialize fingerprint for <{}>: {e}",
                        document_path.display()
                    );
                    false
                }
            };
        }

        let recorded = match self.tracker.read_information() {
            Ok(information) => information,
            Err(e) => {
                log::error!(
                    "error reading fingerprint for <{}>: {e}",
                    document_path.display()
                );
                return false;
            }
        };

        let current = fs::read_to_string(document_path).unwrap_or_default();
        match self.strict.decode::<T>(&current) {
            Ok(_) => {
                // Shape still compatible; retain the recorded baseline.
                self.tracker.close(&recorded.default_content);
                true
            }
            Err(e) => {
                log::warn!("schema drift for <{}>: {e}", document_path.display());
                match self.strict.encode(actual) {
                    Ok(content) => self.tracker.close(&content),
                    Err(e) => log::error!(
                        "failed to serialize fingerprint for <{}>: {e}",
                        document_path.display()
                    ),
                }
                false
            }
        }
    }

    /// Backs up whatever is on disk, then installs and persists the
    /// structural default, so the caller always finds a consistent file
    /// after any load.
    fn load_default(&self, slot: &mut Option<T>) {
        let path = self.location.file_path();
        if path.exists() {
            match backup::backup_aside(path) {
                Ok(backup_path) => log::info!(
                    "backed up <{}> to <{}>",
                    path.display(),
                    backup_path.display()
                ),
                // A failed backup never blocks default resolution.
                Err(e) => log::error!("backup failed for <{}>: {e}", path.display()),
            }
        }
        *slot = Some(T::default());
        self.persist(slot);
    }

    fn persist(&self, slot: &Option<T>) {
        let path = self.location.file_path();
        let Some(document) = slot else {
            log::warn!(
                "save requested before any document was loaded at <{}>",
                path.display()
            );
            return;
        };
        match self.write_document(document) {
            Ok(()) => log::info!("saved cached data at <{}>", path.display()),
            Err(e) => log::error!("error saving data at <{}>: {e}", path.display()),
        }
    }

    fn write_document(&self, document: &T) -> Result<(), StoreError> {
        fs::create_dir_all(self.location.directory_path())?;
        let serialized = self.lenient.encode(document)?;
        fs::write(self.location.file_path(), serialized)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        // A poisoned slot is still coherent; recover it rather than panic.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
