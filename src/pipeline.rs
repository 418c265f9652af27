//! The full run: key exchange, encrypt, decrypt, verify.
//!
//! Each stage is a method taking its inputs explicitly, so a caller (or a
//! test) can start from any point with injected keys or containers. `run`
//! chains them in the only valid order and stops at the first failure.

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::cipher::{self, derive_key, DerivedKey};
use crate::errors::{FilecryptError, Result};
use crate::files::{read_file, with_suffix, write_file_atomic};
use crate::integrity::compare_files;
use crate::kem::{KemProvider, KeyExchange};
use crate::types::EncryptedContainer;

/// Pipeline stage, used to report where a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Encapsulation,
    Decapsulation,
    KeyAgreement,
    KeyDerivation,
    ReadInput,
    WriteContainer,
    ReadContainer,
    Decryption,
    WriteOutput,
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Encapsulation => "key encapsulation",
            Stage::Decapsulation => "key decapsulation",
            Stage::KeyAgreement => "key agreement",
            Stage::KeyDerivation => "key derivation",
            Stage::ReadInput => "reading input",
            Stage::WriteContainer => "writing encrypted file",
            Stage::ReadContainer => "reading encrypted file",
            Stage::Decryption => "decryption",
            Stage::WriteOutput => "writing decrypted file",
            Stage::Verification => "integrity verification",
        };
        f.write_str(name)
    }
}

/// A crate error tagged with the stage that raised it.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: FilecryptError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

/// Output naming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Appended to the input path for the container.
    pub encrypted_suffix: String,
    /// Appended to the input path for the decrypted copy.
    pub decrypted_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            encrypted_suffix: ".enc".to_string(),
            decrypted_suffix: "_decrypted".to_string(),
        }
    }
}

/// Container written by [`Pipeline::encrypt_file`].
#[derive(Clone, Debug)]
pub struct EncryptedFile {
    pub path: PathBuf,
    pub plaintext_len: usize,
    pub container_len: usize,
}

/// Summary of a successful run.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub encrypted: PathBuf,
    pub decrypted: PathBuf,
    /// SHA-256 of the symmetric key, hex.
    pub key_fingerprint: String,
    pub plaintext_len: usize,
    pub container_len: usize,
}

/// Sequential encrypt/decrypt/verify run over one file.
pub struct Pipeline<P> {
    exchange: KeyExchange<P>,
    config: PipelineConfig,
}

impl<P: KemProvider> Pipeline<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, PipelineConfig::default())
    }

    pub fn with_config(provider: P, config: PipelineConfig) -> Self {
        Pipeline {
            exchange: KeyExchange::new(provider),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn key_exchange(&self) -> &KeyExchange<P> {
        &self.exchange
    }

    /// Container path for `input`.
    pub fn encrypted_path(&self, input: &Path) -> PathBuf {
        with_suffix(input, &self.config.encrypted_suffix)
    }

    /// Decrypted-output path for `input`.
    pub fn decrypted_path(&self, input: &Path) -> PathBuf {
        with_suffix(input, &self.config.decrypted_suffix)
    }

    /// Keygen, encapsulate, decapsulate, check agreement, derive the AES key.
    ///
    /// The key pair does not outlive this call.
    pub fn establish_key(&self) -> std::result::Result<DerivedKey, PipelineError> {
        let shared = self.exchange.establish().map_err(|source| {
            let stage = match source {
                FilecryptError::DecapsulationFailure => Stage::Decapsulation,
                FilecryptError::KeyAgreementFailed => Stage::KeyAgreement,
                _ => Stage::Encapsulation,
            };
            PipelineError { stage, source }
        })?;
        let key = derive_key(&shared).at(Stage::KeyDerivation)?;
        info!("AES-256 key fingerprint (SHA-256): {}", key.fingerprint());
        Ok(key)
    }

    /// Encrypt `input` into `output`.
    pub fn encrypt_file(
        &self,
        input: &Path,
        output: &Path,
        key: &DerivedKey,
    ) -> std::result::Result<EncryptedFile, PipelineError> {
        info!("Encrypting {}", input.display());
        let plaintext = read_file(input).at(Stage::ReadInput)?;
        let container = cipher::encrypt(&plaintext, key);
        let bytes = container.to_bytes();
        write_file_atomic(output, &bytes).at(Stage::WriteContainer)?;
        info!("Encrypted file written to {}", output.display());
        Ok(EncryptedFile {
            path: output.to_path_buf(),
            plaintext_len: plaintext.len(),
            container_len: bytes.len(),
        })
    }

    /// Decrypt the container at `container_path` into `output`.
    pub fn decrypt_file(
        &self,
        container_path: &Path,
        output: &Path,
        key: &DerivedKey,
    ) -> std::result::Result<PathBuf, PipelineError> {
        info!("Decrypting {}", container_path.display());
        let stored = read_file(container_path).at(Stage::ReadContainer)?;
        let container = EncryptedContainer::from_bytes(&stored).at(Stage::ReadContainer)?;
        let plaintext = cipher::decrypt(&container, key).at(Stage::Decryption)?;
        write_file_atomic(output, &plaintext).at(Stage::WriteOutput)?;
        info!("Decrypted file written to {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Byte-compare `original` against `decrypted`; a mismatch is an error.
    pub fn verify(
        &self,
        original: &Path,
        decrypted: &Path,
    ) -> std::result::Result<(), PipelineError> {
        if compare_files(original, decrypted).at(Stage::Verification)? {
            info!("Verification successful: decrypted file matches the original");
            Ok(())
        } else {
            Err(PipelineError {
                stage: Stage::Verification,
                source: FilecryptError::IntegrityMismatch,
            })
        }
    }

    /// All stages over `input`, writing the container and decrypted copy beside it.
    pub fn run(&self, input: &Path) -> std::result::Result<PipelineReport, PipelineError> {
        if !input.exists() {
            return Err(PipelineError {
                stage: Stage::ReadInput,
                source: FilecryptError::FileNotFound(input.to_path_buf()),
            });
        }

        let key = self.establish_key()?;
        let encrypted = self.encrypt_file(input, &self.encrypted_path(input), &key)?;
        let decrypted = self.decrypt_file(&encrypted.path, &self.decrypted_path(input), &key)?;
        self.verify(input, &decrypted)?;

        Ok(PipelineReport {
            input: input.to_path_buf(),
            encrypted: encrypted.path,
            decrypted,
            key_fingerprint: key.fingerprint(),
            plaintext_len: encrypted.plaintext_len,
            container_len: encrypted.container_len,
        })
    }
}
