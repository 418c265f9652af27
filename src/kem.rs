//! Key exchange over ML-KEM (FIPS 203).
//!
//! The lattice arithmetic lives in the `ml-kem` crate; this module only
//! moves encoded keys and ciphertexts across the [`KemProvider`] seam and
//! enforces that both parties end up holding the same secret.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use log::{debug, info};
use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, Encoded, EncodedSizeUser, KemCore, MlKem1024, MlKem512, MlKem768};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::errors::{FilecryptError, Result};
use crate::types::*;

/// Primitive KEM operations over encoded byte strings.
pub trait KemProvider {
    /// Human-readable parameter set name.
    fn name(&self) -> &'static str;

    /// Fresh key pair.
    fn keygen(&self) -> KeyPair;

    /// Encapsulate a fresh secret against `public`.
    fn encapsulate(&self, public: &PublicKey) -> Result<EncapsulationResult>;

    /// Recover the secret carried by `encap_ciphertext`.
    fn decapsulate(&self, secret: &SecretKey, encap_ciphertext: &[u8]) -> Result<SharedSecret>;
}

impl<P: KemProvider + ?Sized> KemProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn keygen(&self) -> KeyPair {
        (**self).keygen()
    }

    fn encapsulate(&self, public: &PublicKey) -> Result<EncapsulationResult> {
        (**self).encapsulate(public)
    }

    fn decapsulate(&self, secret: &SecretKey, encap_ciphertext: &[u8]) -> Result<SharedSecret> {
        (**self).decapsulate(secret, encap_ciphertext)
    }
}

/// ML-KEM provider for one parameter set (`MlKem512`, `MlKem768`, `MlKem1024`).
pub struct MlKem<K> {
    name: &'static str,
    _params: PhantomData<fn() -> K>,
}

impl<K: KemCore> MlKem<K> {
    fn with_name(name: &'static str) -> Self {
        MlKem {
            name,
            _params: PhantomData,
        }
    }
}

impl<K: KemCore> KemProvider for MlKem<K> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn keygen(&self) -> KeyPair {
        let mut rng = OsRng;
        let (dk, ek) = K::generate(&mut rng);
        KeyPair {
            public: PublicKey::new(ek.as_bytes().to_vec()),
            secret: SecretKey::new(dk.as_bytes().to_vec()),
        }
    }

    fn encapsulate(&self, public: &PublicKey) -> Result<EncapsulationResult> {
        let encoded = Encoded::<K::EncapsulationKey>::try_from(public.as_bytes())
            .map_err(|_| FilecryptError::InvalidPublicKey)?;
        let ek = <K::EncapsulationKey as EncodedSizeUser>::from_bytes(&encoded);
        // FIPS 203 input check: decoding must not have reduced any coefficient.
        if ek.as_bytes().as_slice() != public.as_bytes() {
            return Err(FilecryptError::InvalidPublicKey);
        }

        let mut rng = OsRng;
        let (ct, shared) = ek
            .encapsulate(&mut rng)
            .map_err(|_| FilecryptError::InvalidPublicKey)?;
        Ok(EncapsulationResult {
            shared_secret: SharedSecret::new(shared.as_slice().to_vec()),
            encap_ciphertext: ct.as_slice().to_vec(),
        })
    }

    fn decapsulate(&self, secret: &SecretKey, encap_ciphertext: &[u8]) -> Result<SharedSecret> {
        let encoded = Encoded::<K::DecapsulationKey>::try_from(secret.as_bytes())
            .map_err(|_| FilecryptError::DecapsulationFailure)?;
        let dk = <K::DecapsulationKey as EncodedSizeUser>::from_bytes(&encoded);
        let ct = Ciphertext::<K>::try_from(encap_ciphertext)
            .map_err(|_| FilecryptError::DecapsulationFailure)?;
        let shared = dk
            .decapsulate(&ct)
            .map_err(|_| FilecryptError::DecapsulationFailure)?;
        Ok(SharedSecret::new(shared.as_slice().to_vec()))
    }
}

/// Supported ML-KEM parameter sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KemSuite {
    #[default]
    MlKem512,
    MlKem768,
    MlKem1024,
}

impl KemSuite {
    pub const ALL: [KemSuite; 3] = [KemSuite::MlKem512, KemSuite::MlKem768, KemSuite::MlKem1024];

    pub fn name(self) -> &'static str {
        match self {
            KemSuite::MlKem512 => "ml-kem-512",
            KemSuite::MlKem768 => "ml-kem-768",
            KemSuite::MlKem1024 => "ml-kem-1024",
        }
    }

    /// Encoded encapsulation key size.
    pub fn public_key_len(self) -> usize {
        match self {
            KemSuite::MlKem512 => 800,
            KemSuite::MlKem768 => 1184,
            KemSuite::MlKem1024 => 1568,
        }
    }

    /// Encoded decapsulation key size.
    pub fn secret_key_len(self) -> usize {
        match self {
            KemSuite::MlKem512 => 1632,
            KemSuite::MlKem768 => 2400,
            KemSuite::MlKem1024 => 3168,
        }
    }

    /// Encapsulation ciphertext size.
    pub fn ciphertext_len(self) -> usize {
        match self {
            KemSuite::MlKem512 => 768,
            KemSuite::MlKem768 => 1088,
            KemSuite::MlKem1024 => 1568,
        }
    }

    /// Shared secret size, identical across parameter sets.
    pub fn shared_secret_len(self) -> usize {
        32
    }

    pub fn provider(self) -> Box<dyn KemProvider> {
        match self {
            KemSuite::MlKem512 => Box::new(MlKem::<MlKem512>::with_name(self.name())),
            KemSuite::MlKem768 => Box::new(MlKem::<MlKem768>::with_name(self.name())),
            KemSuite::MlKem1024 => Box::new(MlKem::<MlKem1024>::with_name(self.name())),
        }
    }
}

impl fmt::Display for KemSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KemSuite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        KemSuite::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown KEM suite '{s}'"))
    }
}

/// Constant-time comparison of two shared secrets.
pub fn verify_agreement(a: &SharedSecret, b: &SharedSecret) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Drives keygen, encapsulation and decapsulation, and checks agreement.
pub struct KeyExchange<P> {
    provider: P,
}

impl<P: KemProvider> KeyExchange<P> {
    pub fn new(provider: P) -> Self {
        KeyExchange { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn generate_keys(&self) -> KeyPair {
        info!("Generating {} key pair", self.provider.name());
        let pair = self.provider.keygen();
        debug!("public key: {}", hex_preview(pair.public.as_bytes()));
        debug!("secret key: {} bytes", pair.secret.len());
        pair
    }

    pub fn encapsulate(&self, public: &PublicKey) -> Result<EncapsulationResult> {
        info!("Performing key encapsulation");
        let result = self.provider.encapsulate(public)?;
        debug!(
            "encapsulated secret: {} bytes, sha256={}",
            result.shared_secret.len(),
            result.shared_secret.fingerprint()
        );
        debug!(
            "encapsulation ciphertext: {}",
            hex_preview(&result.encap_ciphertext)
        );
        Ok(result)
    }

    pub fn decapsulate(&self, secret: &SecretKey, encap_ciphertext: &[u8]) -> Result<SharedSecret> {
        info!("Decapsulating the shared secret");
        let recovered = self.provider.decapsulate(secret, encap_ciphertext)?;
        debug!(
            "recovered secret: {} bytes, sha256={}",
            recovered.len(),
            recovered.fingerprint()
        );
        Ok(recovered)
    }

    /// Runs the full exchange and returns the agreed secret.
    ///
    /// Decapsulation with a mismatched key still returns a value (implicit
    /// rejection), so the two sides are compared explicitly.
    pub fn establish(&self) -> Result<SharedSecret> {
        let pair = self.generate_keys();
        let encapsulation = self.encapsulate(&pair.public)?;
        let recovered = self.decapsulate(&pair.secret, &encapsulation.encap_ciphertext)?;
        if !verify_agreement(&encapsulation.shared_secret, &recovered) {
            return Err(FilecryptError::KeyAgreementFailed);
        }
        info!("Shared secrets agree");
        Ok(encapsulation.shared_secret)
    }
}
