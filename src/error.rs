//! Error types for the fallible edges (settings, export, CLI)
//!
//! The trial controller itself never fails; only I/O around it does.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("error table export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
