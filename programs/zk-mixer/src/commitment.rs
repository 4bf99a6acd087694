use crate::field::{to_canonical_bytes, FieldElement};
use crate::hasher::{leaf_hash, parent_hash};
use anchor_lang::prelude::*;
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

/// A user secret (nullifier or secret half of a note).
///
/// Holds one canonical field value. The proving oracle takes the integer view
/// and the hashers take the byte view, so both are derived from the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secret(FieldElement);

impl Secret {
    /// Wallet encoding of an integer seed: the seed's little-endian bytes at the
    /// front of a 32-byte buffer, read back as a big-endian value and reduced.
    pub fn from_seed(seed: u64) -> Result<Self> {
        let mut bytes = to_canonical_bytes(&BigUint::from(seed))?;
        bytes.reverse();
        Self::from_bytes(&bytes)
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    /// Reduce 32 raw bytes into a secret
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(FieldElement::reduce(bytes)?))
    }

    /// Integer form, as fed to the proving oracle
    pub fn numeric(&self) -> BigUint {
        self.0.to_biguint()
    }

    /// Byte form, as fed to the hashers
    pub fn bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn field(&self) -> FieldElement {
        self.0
    }
}

/// `parent_hash(reduce(nullifier), reduce(secret))`
pub fn commitment_of(nullifier: &[u8], secret: &[u8]) -> Result<FieldElement> {
    parent_hash(nullifier, secret)
}

/// `leaf_hash(nullifier)`, published on withdrawal to prevent double spends
pub fn nullifier_hash_of(nullifier: &[u8]) -> Result<FieldElement> {
    leaf_hash(nullifier)
}

/// A deposit note: two secrets and the leaf they commit to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    pub nullifier: Secret,
    pub secret: Secret,
    pub hash: FieldElement,
}

impl Commitment {
    pub fn new(nullifier: Secret, secret: Secret) -> Result<Self> {
        let hash = commitment_of(&nullifier.bytes(), &secret.bytes())?;
        Ok(Self {
            nullifier,
            secret,
            hash,
        })
    }

    pub fn from_seeds(nullifier: u64, secret: u64) -> Result<Self> {
        Self::new(Secret::from_seed(nullifier)?, Secret::from_seed(secret)?)
    }

    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        Self::new(Secret::random(rng)?, Secret::random(rng)?)
    }

    pub fn nullifier_hash(&self) -> Result<FieldElement> {
        nullifier_hash_of(&self.nullifier.bytes())
    }
}
