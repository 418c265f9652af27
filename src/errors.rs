//! Error types for kyber-filecrypt operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the key exchange, the cipher engine, or file handling.
#[derive(Debug, Error)]
pub enum FilecryptError {
    /// The KEM provider rejected the encoded public key.
    #[error("invalid public key encoding")]
    InvalidPublicKey,

    /// The KEM provider could not recover a secret from the encapsulation.
    #[error("decapsulation failed")]
    DecapsulationFailure,

    /// Encapsulated and decapsulated secrets differ.
    #[error("key agreement failed: shared secrets do not match")]
    KeyAgreementFailed,

    /// Shared secret is shorter than the symmetric key.
    #[error("insufficient key material: need 32 bytes, got {len}")]
    InsufficientKeyMaterial { len: usize },

    /// Container bytes do not split into an IV and block-aligned ciphertext.
    #[error("malformed container: {0}")]
    MalformedContainer(&'static str),

    /// Trailing pad bytes are inconsistent (wrong key or tampered data).
    #[error("padding validation failed")]
    PaddingValidation,

    /// Decrypted output does not match the original plaintext.
    #[error("integrity check failed: decrypted data differs from the original")]
    IntegrityMismatch,

    /// Input file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Any other I/O failure, tagged with the path involved.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FilecryptError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FilecryptError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilecryptError>;
