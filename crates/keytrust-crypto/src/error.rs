//! Error types for keytrust-crypto

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading keys or certificates
///
/// Whenever one of these is returned the affected store has been cleared.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No PEM block with an acceptable label was found
    #[error("no {0} PEM block found")]
    NoPemBlock(&'static str),

    /// PEM armor could not be decoded
    #[error("PEM error: {0}")]
    Pem(#[from] pem::PemError),

    /// DER/ASN.1 structure could not be decoded
    #[error("DER error: {0}")]
    Der(String),

    /// Encrypted private key could not be decrypted
    #[error("failed to decrypt private key (wrong password?)")]
    Decrypt,

    /// Private key uses an encryption envelope this crate does not read
    #[error("unsupported private key encryption: {0}")]
    UnsupportedEncryption(String),

    /// Key material is not RSA
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Operation requires material that is not loaded
    #[error("nothing loaded")]
    NotLoaded,
}

impl From<der::Error> for LoadError {
    fn from(e: der::Error) -> Self {
        LoadError::Der(e.to_string())
    }
}

/// Errors that can occur while signing
#[derive(Error, Debug)]
pub enum SignError {
    /// No private key is loaded
    #[error("no private key loaded")]
    NoKey,

    /// The RSA signing primitive failed
    #[error("signing failed: {0}")]
    Primitive(String),
}

impl From<rsa::Error> for SignError {
    fn from(e: rsa::Error) -> Self {
        SignError::Primitive(e.to_string())
    }
}

/// Errors from splitting a signed buffer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No line feed followed by at least one signature byte
    #[error("malformed signature tail")]
    MalformedTail,
}

/// Why a verification returned `false`
///
/// Only used for diagnostics. Public verification entry points collapse every
/// variant into a plain `false`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VerifyFailure {
    #[error("no certificate loaded")]
    NoCertificate,

    #[error("certificate does not carry an RSA public key")]
    UnsupportedKey,

    #[error("signature does not match")]
    BadSignature,

    #[error("no trusted public keys loaded")]
    NoTrustedKeys,

    #[error("no trusted public key accepted the signature")]
    NoKeyAccepted,
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;
