//! The trust context
//!
//! A [`TrustContext`] owns one private key slot, one certificate slot and one
//! keyring. Loading takes `&mut self` and verification takes `&self`, so a
//! reload can never race a verification on the same owner. Share a context
//! across threads behind a `RwLock`.

use crate::config::TrustConfig;
use crate::error::{Error, Result};
use keytrust_crypto::{
    tail, CertificateStore, Fingerprint, KeyStore, PublicKeyRing, RawRsaVerifier, Signature,
    SigningEngine,
};
use std::path::Path;

/// Private key, certificate and trusted public keys of one repository client
#[derive(Debug, Default)]
pub struct TrustContext {
    keys: KeyStore,
    certificates: CertificateStore,
    public_keys: PublicKeyRing,
}

impl TrustContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a configuration
    ///
    /// Loads the configured public keys, certificate and private key in that
    /// order and stops at the first failure. With `require_matching_keys` set
    /// the private key must belong to the certificate.
    pub fn from_config(config: &TrustConfig, password: &str) -> Result<Self> {
        let mut context = Self::new();
        context.load_public_keys(&config.public_keys)?;
        if let Some(path) = &config.certificate {
            context.load_certificate_path(path)?;
        }
        if let Some(path) = &config.private_key {
            context.load_private_key_path(path, password)?;
        }

        if config.require_matching_keys && !context.keys_match() {
            return Err(Error::KeyMismatch);
        }

        tracing::debug!(
            "Trust context ready: key={}, certificate={}, public keys={}",
            context.has_private_key(),
            context.has_certificate(),
            context.public_key_count()
        );
        Ok(context)
    }

    /// Release all loaded material
    pub fn reset(&mut self) {
        self.keys.unload();
        self.certificates.clear();
        self.public_keys.clear();
    }

    /// Load a PEM private key, decrypting it with `password` if needed
    pub fn load_private_key(&mut self, pem: &[u8], password: &str) -> Result<()> {
        Ok(self.keys.load(pem, password)?)
    }

    /// Load a PEM private key from a file
    pub fn load_private_key_path(&mut self, path: impl AsRef<Path>, password: &str) -> Result<()> {
        Ok(self.keys.load_from_path(path, password)?)
    }

    /// Drop the private key, if any
    pub fn unload_private_key(&mut self) {
        self.keys.unload();
    }

    /// Load a PEM or DER certificate
    ///
    /// On failure the previous certificate is gone as well.
    pub fn load_certificate(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.certificates.load_from_bytes(bytes)?)
    }

    /// Load a PEM or DER certificate from a file
    pub fn load_certificate_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.certificates.load_from_path(path)?)
    }

    /// Drop the certificate, if any
    pub fn unload_certificate(&mut self) {
        self.certificates.clear();
    }

    /// The loaded certificate as PEM text
    pub fn export_certificate(&self) -> Result<String> {
        Ok(self.certificates.export()?)
    }

    /// Replace the trusted keys with those in a `:`-separated list of files
    ///
    /// An empty list leaves no trusted keys. If any file fails to load the
    /// keyring ends up empty.
    pub fn load_public_keys(&mut self, list: &str) -> Result<()> {
        Ok(self.public_keys.load_list(list)?)
    }

    /// Sign `message` with the private key
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.engine().sign(message)?)
    }

    /// Verify a digest signature against the certificate
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.engine().verify(message, signature)
    }

    /// Verify a raw signature against the trusted public keys
    pub fn verify_rsa(&self, message: &[u8], signature: &[u8]) -> bool {
        RawRsaVerifier::new(&self.public_keys).verify_any(message, signature)
    }

    /// Verify a whitelist whose raw signature follows the first line feed
    /// after `skip_bytes`
    pub fn verify_whitelist(&self, buffer: &[u8], skip_bytes: usize) -> bool {
        match tail::split(buffer, skip_bytes) {
            Ok(parts) => self.verify_rsa(parts.plaintext, parts.signature),
            Err(e) => {
                tracing::debug!("Whitelist rejected: {}", e);
                false
            }
        }
    }

    /// SHA-1 fingerprint of the certificate, empty when none is loaded
    pub fn fingerprint(&self) -> Fingerprint {
        self.certificates.fingerprint()
    }

    /// Subject and issuer of the certificate
    pub fn describe(&self) -> String {
        self.certificates.describe()
    }

    /// Whether the private key belongs to the certificate
    pub fn keys_match(&self) -> bool {
        self.engine().self_check()
    }

    /// Whether a private key is loaded
    pub fn has_private_key(&self) -> bool {
        self.keys.is_loaded()
    }

    /// Whether a certificate is loaded
    pub fn has_certificate(&self) -> bool {
        self.certificates.is_loaded()
    }

    /// Number of trusted public keys
    pub fn public_key_count(&self) -> usize {
        self.public_keys.len()
    }

    /// Trusted public keys in load order
    pub fn public_keys(&self) -> &PublicKeyRing {
        &self.public_keys
    }

    fn engine(&self) -> SigningEngine<'_> {
        SigningEngine::new(&self.keys, &self.certificates)
    }
}
