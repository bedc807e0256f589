//! Keyring of trusted RSA public keys
//!
//! A keyring holds the master public keys that raw whitelist signatures are
//! checked against. Loading is all-or-nothing: the new set is built in full
//! before it replaces the old one, and any failure leaves the ring empty.

use crate::encoding::{find_pem_block, PUBLIC_KEY_LABELS};
use crate::error::{LoadError, Result};
use const_oid::db::rfc5912::RSA_ENCRYPTION;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use spki::SubjectPublicKeyInfoRef;
use std::path::{Path, PathBuf};

/// Separator between paths in a public key list
pub const DEFAULT_DELIMITER: char = ':';

/// A trusted RSA public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedPublicKey {
    key: RsaPublicKey,
    size_bytes: usize,
    source: Option<PathBuf>,
}

impl TrustedPublicKey {
    /// Parse a PEM `PUBLIC KEY` (SPKI) or `RSA PUBLIC KEY` (PKCS#1) block
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let block = find_pem_block(pem_bytes, PUBLIC_KEY_LABELS)?;

        let key = if block.tag == "RSA PUBLIC KEY" {
            RsaPublicKey::from_pkcs1_der(&block.der)
                .map_err(|e| LoadError::Der(format!("invalid PKCS#1 public key: {}", e)))?
        } else {
            let spki = SubjectPublicKeyInfoRef::try_from(block.der.as_slice())
                .map_err(|e| LoadError::Der(format!("failed to parse SPKI: {}", e)))?;
            if spki.algorithm.oid != RSA_ENCRYPTION {
                return Err(LoadError::UnsupportedAlgorithm(spki.algorithm.oid.to_string()));
            }
            RsaPublicKey::from_public_key_der(&block.der)
                .map_err(|e| LoadError::Der(format!("invalid RSA public key: {}", e)))?
        };

        Ok(Self::new(key))
    }

    /// Read and parse a public key file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut key = Self::from_pem(&bytes)?;
        key.source = Some(path.to_path_buf());
        Ok(key)
    }

    /// Wrap an already parsed key
    pub fn new(key: RsaPublicKey) -> Self {
        let size_bytes = key.size();
        Self {
            key,
            size_bytes,
            source: None,
        }
    }

    /// The RSA public key
    pub fn key(&self) -> &RsaPublicKey {
        &self.key
    }

    /// Modulus size in bytes, the largest block this key can recover
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// File the key was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// An ordered set of trusted public keys
#[derive(Debug, Default)]
pub struct PublicKeyRing {
    /// Keys in load order
    keys: Vec<TrustedPublicKey>,
}

impl PublicKeyRing {
    /// Create a new empty keyring
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Load keys from a `:`-separated list of PEM file paths
    ///
    /// An empty list is valid and leaves the ring empty.
    pub fn load_list(&mut self, delimited_paths: &str) -> Result<()> {
        self.load_list_with_delimiter(delimited_paths, DEFAULT_DELIMITER)
    }

    /// Load keys from a list of PEM file paths joined by `delimiter`
    pub fn load_list_with_delimiter(&mut self, delimited_paths: &str, delimiter: char) -> Result<()> {
        if delimited_paths.is_empty() {
            self.keys.clear();
            return Ok(());
        }

        let loaded = delimited_paths
            .split(delimiter)
            .map(TrustedPublicKey::from_path)
            .collect::<Result<Vec<_>>>();
        self.replace(loaded)
    }

    /// Load keys from in-memory PEM buffers
    pub fn load_pem_list(&mut self, pem_buffers: &[&[u8]]) -> Result<()> {
        let loaded = pem_buffers
            .iter()
            .map(|pem| TrustedPublicKey::from_pem(pem))
            .collect::<Result<Vec<_>>>();
        self.replace(loaded)
    }

    fn replace(&mut self, loaded: Result<Vec<TrustedPublicKey>>) -> Result<()> {
        match loaded {
            Ok(keys) => {
                tracing::debug!("Loaded {} trusted public key(s)", keys.len());
                self.keys = keys;
                Ok(())
            }
            Err(e) => {
                if !self.keys.is_empty() {
                    tracing::warn!("Public key reload failed, keyring cleared: {}", e);
                }
                self.keys.clear();
                Err(e)
            }
        }
    }

    /// Add a single key at the end of the ring
    pub fn add_key(&mut self, key: TrustedPublicKey) {
        self.keys.push(key);
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Iterate the keys in load order
    pub fn iter(&self) -> std::slice::Iter<'_, TrustedPublicKey> {
        self.keys.iter()
    }

    /// Get the number of keys in the keyring
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the keyring is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> IntoIterator for &'a PublicKeyRing {
    type Item = &'a TrustedPublicKey;
    type IntoIter = std::slice::Iter<'a, TrustedPublicKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
