//! Error types for keytrust

use keytrust_crypto::{LoadError, ParseError, SignError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in trust operations
#[derive(Error, Debug)]
pub enum Error {
    /// Key, certificate or public key loading failed
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Signing failed
    #[error("Signing error: {0}")]
    Signing(#[from] SignError),

    /// A signed buffer could not be split
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration document could not be parsed
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigIo {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The private key does not belong to the certificate
    #[error("private key does not match the certificate")]
    KeyMismatch,
}

/// Result type for keytrust operations
pub type Result<T> = std::result::Result<T, Error>;
