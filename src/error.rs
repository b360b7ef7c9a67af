use std::path::PathBuf;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RegError {
    #[error("resource path {0} is not under the configured storage root")]
    PathOutsideRoot(Utf8PathBuf),

    #[error("invalid md5 digest: {0}")]
    InvalidMd5(String),

    #[error("invalid adler32 digest: {0}")]
    InvalidAdler32(String),

    #[error("no configuration: REPLICA_REG_CONFIG is unset and no --config was given")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read manifest file at {0}")]
    ManifestRead(PathBuf),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("catalog request failed: {0}")]
    CatalogTransient(String),

    #[error("catalog returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
    },

    #[error("dataset {0} still missing after creation")]
    DatasetMissing(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
