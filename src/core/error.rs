use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unknown member '{member}' at {path}")]
    UnknownMember { path: String, member: String },
    #[error("Path error: {0}")]
    PathError(String),
}
