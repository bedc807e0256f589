//! Configuration for a [`TrustContext`](crate::TrustContext)
//!
//! The configuration is a small JSON document naming the files to load:
//!
//! ```json
//! {
//!   "certificate": "/srv/repo/publisher.crt",
//!   "privateKey": "/srv/repo/publisher.key",
//!   "publicKeys": "/etc/keytrust/keys/master.pub:/etc/keytrust/keys/backup.pub",
//!   "requireMatchingKeys": true
//! }
//! ```
//!
//! Every field is optional.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional location of the default master public key
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "/etc/keytrust/keys/master.pub";

/// Files and checks for building a trust context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrustConfig {
    /// Publisher certificate (PEM or DER)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PathBuf>,
    /// Publisher private key (PEM, optionally encrypted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<PathBuf>,
    /// Trusted master public keys, `:`-separated
    #[serde(skip_serializing_if = "String::is_empty")]
    pub public_keys: String,
    /// Fail unless the private key belongs to the certificate
    pub require_matching_keys: bool,
}

impl TrustConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Use the given certificate file
    pub fn with_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate = Some(path.into());
        self
    }

    /// Use the given private key file
    pub fn with_private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key = Some(path.into());
        self
    }

    /// Trust the keys in a `:`-separated list of files
    pub fn with_public_keys(mut self, list: impl Into<String>) -> Self {
        self.public_keys = list.into();
        self
    }

    /// Trust the key at [`DEFAULT_PUBLIC_KEY_PATH`]
    pub fn with_default_public_key(self) -> Self {
        self.with_public_keys(DEFAULT_PUBLIC_KEY_PATH)
    }

    /// Require the private key to match the certificate
    pub fn require_matching_keys(mut self) -> Self {
        self.require_matching_keys = true;
        self
    }
}
