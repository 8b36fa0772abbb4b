//! Core modules of the store: codec policy, backup copies, version
//! tracking, and the document store itself.

pub mod backup;
pub mod codec;
pub mod error;
pub mod store;
pub mod time;
pub mod version;
