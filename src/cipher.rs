//! AES-256-CBC engine keyed from the KEM shared secret.

use std::fmt;

use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::{debug, info};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{FilecryptError, Result};
use crate::padding::{pad, unpad};
use crate::types::*;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// 32-byte AES-256 key. Wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        DerivedKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Hex SHA-256 of the key, safe to display.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.0))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey(sha256={})", self.fingerprint())
    }
}

/// First [`KEY_LEN`] bytes of the shared secret.
pub fn derive_key(shared: &SharedSecret) -> Result<DerivedKey> {
    let bytes = shared.as_bytes();
    if bytes.len() < KEY_LEN {
        return Err(FilecryptError::InsufficientKeyMaterial { len: bytes.len() });
    }
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&bytes[..KEY_LEN]);
    let derived = DerivedKey(key);
    key.zeroize();
    Ok(derived)
}

/// Length of the container produced for a plaintext of `plaintext_len` bytes.
pub fn container_len(plaintext_len: usize) -> usize {
    IV_LEN + (plaintext_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/* ---------------- Encrypt ---------------- */

/// Pad and encrypt under a fresh random IV.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> EncryptedContainer {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let padded = pad(plaintext);
    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<NoPadding>(&padded);

    info!(
        "Encrypted {} bytes into {} ciphertext bytes",
        plaintext.len(),
        ciphertext.len()
    );
    debug!("iv: {}", hex::encode(iv));
    EncryptedContainer { iv, ciphertext }
}

/* ---------------- Decrypt ---------------- */

/// Reverse [`encrypt`].
///
/// A [`FilecryptError::PaddingValidation`] here means a wrong key or a
/// modified container; there is no other authentication.
pub fn decrypt(container: &EncryptedContainer, key: &DerivedKey) -> Result<Vec<u8>> {
    check_ciphertext_len(container.ciphertext.len())?;

    let padded = Aes256CbcDec::new(key.as_bytes().into(), &container.iv.into())
        .decrypt_padded_vec_mut::<NoPadding>(&container.ciphertext)
        .map_err(|_| FilecryptError::MalformedContainer("ciphertext not block aligned"))?;
    let plaintext = unpad(&padded)?;

    info!(
        "Decrypted {} ciphertext bytes into {} bytes",
        container.ciphertext.len(),
        plaintext.len()
    );
    Ok(plaintext)
}

/// Parse stored container bytes and decrypt them.
pub fn decrypt_bytes(stored: &[u8], key: &DerivedKey) -> Result<Vec<u8>> {
    let container = EncryptedContainer::from_bytes(stored)?;
    decrypt(&container, key)
}
