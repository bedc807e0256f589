//! Traditional OpenSSL PEM encryption
//!
//! Blocks written by `openssl genrsa -aes256 -traditional` carry
//! `Proc-Type: 4,ENCRYPTED` and `DEK-Info: <cipher>,<hex iv>` headers. The
//! key is derived with `EVP_BytesToKey` (MD5, one round, the first eight IV
//! bytes as salt) and the body is CBC-encrypted with PKCS#7 padding.

use crate::error::{LoadError, Result};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit};
use md5::{Digest, Md5};
use zeroize::Zeroizing;

const SALT_LEN: usize = 8;

/// Ciphers OpenSSL writes into `DEK-Info`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DekCipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
    DesCbc,
}

impl DekCipher {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AES-128-CBC" => Some(Self::Aes128Cbc),
            "AES-192-CBC" => Some(Self::Aes192Cbc),
            "AES-256-CBC" => Some(Self::Aes256Cbc),
            "DES-EDE3-CBC" => Some(Self::DesEde3Cbc),
            "DES-CBC" => Some(Self::DesCbc),
            _ => None,
        }
    }

    fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc | Self::DesEde3Cbc => 24,
            Self::Aes256Cbc => 32,
            Self::DesCbc => 8,
        }
    }

    fn iv_len(self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes192Cbc | Self::Aes256Cbc => 16,
            Self::DesEde3Cbc | Self::DesCbc => 8,
        }
    }
}

/// Decrypt the body of a legacy encrypted PEM block
///
/// A wrong password surfaces as [`LoadError::Decrypt`] when the padding does
/// not check out. Callers must also treat a failure to parse the plaintext
/// as a wrong password.
pub(crate) fn decrypt(dek_info: &str, ciphertext: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let (name, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| LoadError::UnsupportedEncryption(format!("malformed DEK-Info: {}", dek_info)))?;
    let cipher = DekCipher::from_name(name.trim())
        .ok_or_else(|| LoadError::UnsupportedEncryption(name.trim().to_string()))?;
    let iv = hex::decode(iv_hex.trim())
        .ok()
        .filter(|iv| iv.len() == cipher.iv_len())
        .ok_or_else(|| LoadError::UnsupportedEncryption(format!("bad IV in DEK-Info: {}", dek_info)))?;

    let key = bytes_to_key(password.as_bytes(), &iv[..SALT_LEN], cipher.key_len());
    let plaintext = match cipher {
        DekCipher::Aes128Cbc => decrypt_cbc::<aes::Aes128>(&key, &iv, ciphertext)?,
        DekCipher::Aes192Cbc => decrypt_cbc::<aes::Aes192>(&key, &iv, ciphertext)?,
        DekCipher::Aes256Cbc => decrypt_cbc::<aes::Aes256>(&key, &iv, ciphertext)?,
        DekCipher::DesEde3Cbc => decrypt_cbc::<des::TdesEde3>(&key, &iv, ciphertext)?,
        DekCipher::DesCbc => decrypt_cbc::<des::Des>(&key, &iv, ciphertext)?,
    };
    Ok(plaintext)
}

/// `EVP_BytesToKey` with MD5 and a single round
fn bytes_to_key(password: &[u8], salt: &[u8], key_len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(key_len + 16));
    while key.len() < key_len {
        let mut hasher = Md5::new();
        // Chain on the previous digest block
        hasher.update(&key[key.len().saturating_sub(16)..]);
        hasher.update(password);
        hasher.update(salt);
        key.extend_from_slice(&hasher.finalize());
    }
    key.truncate(key_len);
    key
}

fn decrypt_cbc<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| LoadError::UnsupportedEncryption(e.to_string()))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| LoadError::Decrypt)
}
