//! X.509 certificate storage
//!
//! Certificates are used purely as containers for a public key. Nothing here
//! checks validity periods, extensions or the issuing chain.

use crate::encoding::{find_pem_block, looks_like_der, CertificateDer, CERTIFICATE_LABELS};
use crate::error::{LoadError, Result};
use crate::hash::Fingerprint;
use const_oid::db::rfc5912::RSA_ENCRYPTION;
use const_oid::ObjectIdentifier;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use std::path::Path;
use x509_cert::der::{Any, Decode, Encode, Reader, SliceReader};
use x509_cert::name::Name;
use x509_cert::Certificate;

/// Returned by [`CertificateStore::describe`] when the store is empty
pub const NO_CERTIFICATE: &str = "No certificate loaded";

/// Short names OpenSSL uses for the usual distinguished name attributes
const ATTRIBUTE_NAMES: &[(ObjectIdentifier, &str)] = &[
    (ObjectIdentifier::new_unwrap("2.5.4.3"), "CN"),
    (ObjectIdentifier::new_unwrap("2.5.4.4"), "SN"),
    (ObjectIdentifier::new_unwrap("2.5.4.5"), "serialNumber"),
    (ObjectIdentifier::new_unwrap("2.5.4.6"), "C"),
    (ObjectIdentifier::new_unwrap("2.5.4.7"), "L"),
    (ObjectIdentifier::new_unwrap("2.5.4.8"), "ST"),
    (ObjectIdentifier::new_unwrap("2.5.4.9"), "street"),
    (ObjectIdentifier::new_unwrap("2.5.4.10"), "O"),
    (ObjectIdentifier::new_unwrap("2.5.4.11"), "OU"),
    (ObjectIdentifier::new_unwrap("2.5.4.12"), "title"),
    (ObjectIdentifier::new_unwrap("2.5.4.42"), "GN"),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1"), "emailAddress"),
    (ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.1"), "UID"),
    (ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25"), "DC"),
];

/// A parsed certificate together with its DER encoding
pub struct LoadedCertificate {
    cert: Certificate,
    der: CertificateDer,
    public_key: Option<RsaPublicKey>,
}

impl LoadedCertificate {
    /// Parse a PEM or DER certificate
    ///
    /// The DER bytes are kept exactly as they were read. Fingerprints and
    /// exports never see a re-encoding.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let (cert, der) = if looks_like_der(input) {
            (Certificate::from_der(input)?, input.to_vec())
        } else {
            let block = find_pem_block(input, CERTIFICATE_LABELS)?;
            if block.tag == "TRUSTED CERTIFICATE" {
                // Auxiliary trust settings follow the certificate
                let mut reader = SliceReader::new(&block.der)?;
                let cert = Certificate::decode(&mut reader)?;
                let consumed = usize::try_from(reader.position())?;
                (cert, block.der[..consumed].to_vec())
            } else {
                (Certificate::from_der(&block.der)?, block.der.to_vec())
            }
        };

        let der = CertificateDer::new(der);
        let public_key = rsa_public_key(&cert)?;

        Ok(Self {
            cert,
            der,
            public_key,
        })
    }

    /// Subject name in OpenSSL one-line form (`/C=CH/O=Org/CN=name`)
    pub fn subject(&self) -> String {
        oneline(&self.cert.tbs_certificate.subject)
    }

    /// Issuer name in OpenSSL one-line form
    pub fn issuer(&self) -> String {
        oneline(&self.cert.tbs_certificate.issuer)
    }

    /// DER encoding of the certificate
    pub fn der(&self) -> &CertificateDer {
        &self.der
    }

    /// The embedded public key, when it is an RSA key
    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.public_key.as_ref()
    }

    /// SHA-1 fingerprint of the DER encoding
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_der(self.der.as_bytes())
    }
}

/// Extract the RSA public key from the SubjectPublicKeyInfo
///
/// Certificates with other key types still load; they can be described and
/// fingerprinted but never verify anything.
fn rsa_public_key(cert: &Certificate) -> Result<Option<RsaPublicKey>> {
    let spki = &cert.tbs_certificate.subject_public_key_info;
    if spki.algorithm.oid != RSA_ENCRYPTION {
        tracing::warn!(
            "Certificate public key algorithm {} is not RSA",
            spki.algorithm.oid
        );
        return Ok(None);
    }

    let spki_der = spki.to_der()?;
    let key = RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| LoadError::Der(format!("invalid RSA public key in certificate: {}", e)))?;
    Ok(Some(key))
}

/// Render a distinguished name the way `X509_NAME_oneline` does
fn oneline(name: &Name) -> String {
    let mut out = String::new();
    for rdn in name.0.iter() {
        for (i, atv) in rdn.0.iter().enumerate() {
            out.push(if i == 0 { '/' } else { '+' });
            match ATTRIBUTE_NAMES.iter().find(|(oid, _)| *oid == atv.oid) {
                Some((_, short)) => out.push_str(short),
                None => out.push_str(&atv.oid.to_string()),
            }
            out.push('=');
            out.push_str(&attribute_value(&atv.value));
        }
    }
    out
}

/// Printable ASCII is copied, `/` and `+` are backslash-escaped and every
/// other content byte becomes `\xHH`. Multi-byte strings are not decoded, so
/// a BMPString shows its UTF-16BE bytes.
fn attribute_value(value: &Any) -> String {
    let mut out = String::with_capacity(value.value().len());
    for &byte in value.value() {
        match byte {
            b'/' | b'+' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            b' '..=b'~' => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{:02X}", byte)),
        }
    }
    out
}

impl std::fmt::Debug for LoadedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedCertificate")
            .field("subject", &self.subject())
            .field("fingerprint", &self.fingerprint().as_str())
            .finish()
    }
}

/// Holder of the active verification certificate
#[derive(Debug, Default)]
pub struct CertificateStore {
    current: Option<LoadedCertificate>,
}

impl CertificateStore {
    /// Create an empty certificate store
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Load a PEM or DER certificate from memory
    ///
    /// On success the new certificate replaces the old one. On failure the
    /// store is cleared: a failed reload does not keep trusting the previous
    /// certificate.
    pub fn load_from_bytes(&mut self, input: &[u8]) -> Result<()> {
        match LoadedCertificate::parse(input) {
            Ok(cert) => {
                tracing::debug!("Loaded certificate for {}", cert.subject());
                self.current = Some(cert);
                Ok(())
            }
            Err(e) => {
                self.fail_closed(&e);
                Err(e)
            }
        }
    }

    /// Read and load a certificate file
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => self.load_from_bytes(&bytes),
            Err(source) => {
                let e = LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                self.fail_closed(&e);
                Err(e)
            }
        }
    }

    fn fail_closed(&mut self, error: &LoadError) {
        if self.current.take().is_some() {
            tracing::warn!("Certificate reload failed, previous certificate dropped: {}", error);
        }
    }

    /// Drop the current certificate, if any
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Whether a certificate is loaded
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// The loaded certificate
    pub fn current(&self) -> Option<&LoadedCertificate> {
        self.current.as_ref()
    }

    /// RSA public key of the current certificate
    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.current.as_ref().and_then(LoadedCertificate::public_key)
    }

    /// PEM encoding of the current certificate
    pub fn export(&self) -> Result<String> {
        self.current
            .as_ref()
            .map(|cert| cert.der().to_pem())
            .ok_or(LoadError::NotLoaded)
    }

    /// Human-readable publisher and issuer of the current certificate
    pub fn describe(&self) -> String {
        match &self.current {
            Some(cert) => format!(
                "Publisher: {}\nCertificate issued by: {}",
                cert.subject(),
                cert.issuer()
            ),
            None => NO_CERTIFICATE.to_string(),
        }
    }

    /// Fingerprint of the current certificate, empty when none is loaded
    pub fn fingerprint(&self) -> Fingerprint {
        self.current
            .as_ref()
            .map(LoadedCertificate::fingerprint)
            .unwrap_or_else(Fingerprint::empty)
    }
}
