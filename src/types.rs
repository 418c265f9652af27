//! Key, secret, and container types shared across the pipeline.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{FilecryptError, Result};

/// AES block size and CBC chaining unit.
pub const BLOCK_SIZE: usize = 16;

/// IV length stored at the head of every container.
pub const IV_LEN: usize = 16;

/// AES-256 key length taken from the shared secret.
pub const KEY_LEN: usize = 32;

/// Number of bytes shown when previewing public keys and ciphertexts in logs.
/// Kept below [`KEY_LEN`] so a key-sized buffer is never shown whole.
pub(crate) const PREVIEW_LEN: usize = 16;

/// Hex of at most [`PREVIEW_LEN`] leading bytes, with an ellipsis when truncated.
pub(crate) fn hex_preview(bytes: &[u8]) -> String {
    if bytes.len() > PREVIEW_LEN {
        format!("{}...", hex::encode(&bytes[..PREVIEW_LEN]))
    } else {
        hex::encode(bytes)
    }
}

/// Encoded KEM public (encapsulation) key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        PublicKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bytes, {})", self.0.len(), hex_preview(&self.0))
    }
}

/// Encoded KEM secret (decapsulation) key. Wiped on drop.
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        SecretKey(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({} bytes, redacted)", self.0.len())
    }
}

/// Key pair produced by one keygen call.
///
/// Owned by the key exchange; the secret half never reaches the cipher engine.
#[derive(Debug)]
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

/// Secret agreed through the KEM. Wiped on drop.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    pub fn new(bytes: Vec<u8>) -> Self {
        SharedSecret(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex SHA-256 of the secret, safe to log.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.as_bytes()))
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret({} bytes, redacted)", self.0.len())
    }
}

/// Output of encapsulating against a public key.
#[derive(Debug, Clone)]
pub struct EncapsulationResult {
    /// Secret held by the encapsulating party.
    pub shared_secret: SharedSecret,
    /// Value sent to the holder of the secret key.
    pub encap_ciphertext: Vec<u8>,
}

/// Container written to disk: `iv || ciphertext`, no header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedContainer {
    /// Random IV seeding the CBC chain.
    pub iv: [u8; IV_LEN],
    /// PKCS#7-padded AES-256-CBC ciphertext.
    pub ciphertext: Vec<u8>,
}

impl EncryptedContainer {
    /// Serialized size in bytes.
    pub fn serialized_len(&self) -> usize {
        IV_LEN + self.ciphertext.len()
    }

    /// Serialize as `iv || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split stored bytes into IV and ciphertext.
    ///
    /// The ciphertext length is implied by the total length, so the only
    /// checks possible are the IV prefix and block alignment of the rest.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IV_LEN {
            return Err(FilecryptError::MalformedContainer("shorter than iv"));
        }
        let (iv_bytes, ciphertext) = bytes.split_at(IV_LEN);
        check_ciphertext_len(ciphertext.len())?;
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);
        Ok(EncryptedContainer {
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

pub(crate) fn check_ciphertext_len(len: usize) -> Result<()> {
    if len == 0 {
        return Err(FilecryptError::MalformedContainer("empty ciphertext"));
    }
    if len % BLOCK_SIZE != 0 {
        return Err(FilecryptError::MalformedContainer(
            "ciphertext not block aligned",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_key_sized_buffers() {
        let bytes: Vec<u8> = (0..KEY_LEN as u8).collect();
        let preview = hex_preview(&bytes);
        assert!(preview.ends_with("..."));
        assert!(!preview.contains(&hex::encode(&bytes)));
        assert_eq!(preview.len(), PREVIEW_LEN * 2 + 3);
    }

    #[test]
    fn preview_keeps_short_buffers_whole() {
        assert_eq!(hex_preview(&[0xab, 0xcd]), "abcd");
    }

    #[test]
    fn shared_secret_fingerprint_hides_bytes() {
        let bytes: Vec<u8> = (0..32).collect();
        let shared = SharedSecret::new(bytes.clone());
        let fp = shared.fingerprint();
        assert_eq!(fp.len(), 64);
        assert!(!fp.contains(&hex::encode(&bytes[..PREVIEW_LEN])));
        assert_eq!(fp, SharedSecret::new(bytes).fingerprint());
    }
}
