//! Type-safe wrappers for encoded key material
//!
//! This module provides newtype wrappers that make it clear what encoding
//! format data is in, plus the PEM block lookup shared by the stores.

use crate::error::{LoadError, Result};
use zeroize::Zeroizing;

/// PEM labels accepted for certificates
pub const CERTIFICATE_LABELS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE", "TRUSTED CERTIFICATE"];

/// PEM labels accepted for private keys
pub const PRIVATE_KEY_LABELS: &[&str] = &["PRIVATE KEY", "ENCRYPTED PRIVATE KEY", "RSA PRIVATE KEY"];

/// PEM labels accepted for trusted public keys
pub const PUBLIC_KEY_LABELS: &[&str] = &["PUBLIC KEY", "RSA PUBLIC KEY"];

/// ASN.1 SEQUENCE tag, the first byte of any DER certificate
const DER_SEQUENCE_TAG: u8 = 0x30;

/// A DER-encoded X.509 certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDer(Vec<u8>);

impl CertificateDer {
    /// Create from DER bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the underlying DER bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode as a PEM `CERTIFICATE` block with LF line endings
    pub fn to_pem(&self) -> String {
        let block = pem::Pem::new("CERTIFICATE", self.0.clone());
        pem::encode_config(
            &block,
            pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
        )
    }
}

impl AsRef<[u8]> for CertificateDer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

const PEM_BEGIN: &[u8] = b"-----BEGIN ";
const PEM_END: &[u8] = b"-----END ";
const PEM_DASHES: &[u8] = b"-----";

/// The contents of a PEM block, wiped when dropped
pub struct PemBlock {
    /// Label between `BEGIN` and the dashes
    pub tag: String,
    /// Whether the block carries a legacy `Proc-Type: 4,ENCRYPTED` header
    pub legacy_encrypted: bool,
    /// Value of the `DEK-Info` header, naming the cipher and IV
    pub dek_info: Option<String>,
    /// Decoded contents, ciphertext when `legacy_encrypted` is set
    pub der: Zeroizing<Vec<u8>>,
}

/// Find the first PEM block in `input` whose label is one of `labels`
///
/// Text before, between and after blocks is ignored, the way OpenSSL's PEM
/// readers skip over it. Blocks with other labels are never decoded, so a
/// damaged neighbour does not spoil the block that is asked for.
pub fn find_pem_block(input: &[u8], labels: &[&'static str]) -> Result<PemBlock> {
    let mut rest = input;
    while let Some(start) = find(rest, PEM_BEGIN) {
        let armored = &rest[start..];
        let Some(label_len) = find(&armored[PEM_BEGIN.len()..], PEM_DASHES) else {
            break;
        };
        let label = &armored[PEM_BEGIN.len()..PEM_BEGIN.len() + label_len];
        let Some(end) = find(armored, PEM_END) else {
            break;
        };
        let trailer = end + PEM_END.len();
        let close = find(&armored[trailer..], PEM_DASHES)
            .map_or(armored.len(), |pos| trailer + pos + PEM_DASHES.len());
        rest = &armored[close..];

        if !labels.iter().any(|wanted| wanted.as_bytes() == label) {
            tracing::trace!("Skipping PEM block {}", String::from_utf8_lossy(label));
            continue;
        }
        return decode_block(&armored[..close]);
    }

    Err(LoadError::NoPemBlock(labels[0]))
}

fn decode_block(armored: &[u8]) -> Result<PemBlock> {
    let block = pem::parse(armored)?;
    let legacy_encrypted = block
        .headers()
        .get("Proc-Type")
        .is_some_and(|v| v.contains("ENCRYPTED"));
    let dek_info = block.headers().get("DEK-Info").map(str::to_string);
    let tag = block.tag().to_string();

    Ok(PemBlock {
        tag,
        legacy_encrypted,
        dek_info,
        der: Zeroizing::new(block.into_contents()),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Whether `input` looks like raw DER rather than PEM armor
pub fn looks_like_der(input: &[u8]) -> bool {
    input.first() == Some(&DER_SEQUENCE_TAG)
}
