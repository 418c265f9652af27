//! # kyber-filecrypt
//!
//! Post-quantum file encryption: an ML-KEM key exchange produces a shared
//! secret, the first 32 bytes of which key AES-256-CBC over a file. The
//! decrypted copy is then compared byte for byte with the original.
//!
//! ## Algorithm Suite
//!
//! - **Key Encapsulation:** ML-KEM-512 by default (ML-KEM-768 and ML-KEM-1024 selectable)
//! - **Symmetric Encryption:** AES-256 in CBC mode with PKCS#7 padding
//! - **Container Format:** `iv (16 bytes) || ciphertext`, no header
//!
//! ## Example
//!
//! ```rust
//! use kyber_filecrypt::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let exchange = KeyExchange::new(KemSuite::MlKem512.provider());
//! let shared = exchange.establish()?;
//! let key = derive_key(&shared)?;
//!
//! let container = encrypt(b"hello world", &key);
//! let stored = container.to_bytes();
//! assert_eq!(stored.len(), container_len(11));
//!
//! let recovered = decrypt_bytes(&stored, &key)?;
//! assert!(compare(b"hello world", &recovered));
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Considerations
//!
//! - CBC with padding carries no authentication tag. A padding failure on
//!   decryption is the only tamper signal, and a modified container can
//!   still occasionally decrypt to garbage that passes unpadding.
//! - Secret keys, shared secrets, and derived keys are zeroized on drop.
//!
//! ## License
//!
//! Licensed under the Apache License, Version 2.0.

mod cipher;
mod errors;
mod files;
mod integrity;
mod kem;
mod padding;
mod pipeline;
mod types;

pub use cipher::*;
pub use errors::{FilecryptError, Result};
pub use files::{read_file, with_suffix, write_file_atomic};
pub use integrity::*;
pub use kem::*;
pub use padding::{pad, unpad};
pub use pipeline::*;
pub use types::*;
