//! Molt: a typed JSON settings store with corruption recovery.
//!
//! Molt persists one typed document per store: loaded leniently, defaulted
//! when missing or corrupt, backed up before any destructive replacement,
//! and fingerprinted so schema drift across application upgrades can be
//! detected without migrating field values.
//!
//! # Design
//!
//! - **Total surface**: `load`, `save`, and `clear` never fail. Recoverable
//!   parse and I/O failures are logged and resolved to a persisted
//!   structural default; the store trades strict correctness for
//!   startup availability.
//! - **Two codecs**: a lenient profile for document round-trips (nulls
//!   omitted, unknown members tolerated) and a strict profile whose
//!   unknown-member rejection doubles as the shape-equality proxy for
//!   drift detection.
//! - **Sidecar files**: a version marker and a fingerprint file per store,
//!   derived from the document path and a cache-kind tag. The fingerprint
//!   records the strict serialization of the type's default instance and
//!   is the single source of truth for "was this schema seen before".
//! - **Backups**: anything judged unreadable is copied aside with a
//!   timestamped name before it is replaced. Backups accumulate; nothing
//!   prunes or re-reads them.
//!
//! # Example
//!
//! ```no_run
//! use molt::{DocumentStore, StoreLocation};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Preferences {
//!     count: u32,
//! }
//!
//! let location = StoreLocation::new("/tmp/app/preferences.json");
//! let store: DocumentStore<Preferences> = DocumentStore::new(location, "1.2.0");
//! let mut prefs = store.load();
//! prefs.count += 1;
//! store.set(prefs);
//! store.save();
//! ```
//!
//! # Crate structure
//!
//! - [`core`]: codec policy, backup copies, version tracking, and the
//!   document store
//! - [`cli`]: diagnostic command surface over store files

pub mod cli;
pub mod core;

pub use crate::core::codec::Codec;
pub use crate::core::error::StoreError;
pub use crate::core::store::{Document, DocumentStore, StoreLocation};
pub use crate::core::version::{InformationFile, StoreKind, VersionTracker};
