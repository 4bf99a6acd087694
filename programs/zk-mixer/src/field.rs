use crate::constants::FIELD_ELEMENT_LEN;
use crate::errors::ZkMixerError;
use anchor_lang::prelude::*;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// FIELD ARITHMETIC
// ============================================================================
//
// Every value that reaches the Poseidon hasher, the circuit or the ledger is a
// BN254 scalar field element encoded as 32 BIG-ENDIAN bytes.
//
// Producers disagree on byte orientation (wallet secrets are emitted
// little-endian, the ledger and the circuit speak big-endian), so conversions
// that read raw bytes always take an explicit `Endianness`.
//
// ============================================================================

/// Byte order of a raw integer encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    BigEndian,
    LittleEndian,
}

/// The BN254 scalar field order as an integer
pub fn modulus() -> BigUint {
    BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be())
}

/// Encode an integer as 32 big-endian bytes, zero-padded on the left
pub fn to_canonical_bytes(value: &BigUint) -> Result<[u8; 32]> {
    let bytes = value.to_bytes_be();
    require!(
        bytes.len() <= FIELD_ELEMENT_LEN,
        ZkMixerError::InvalidLength
    );

    let mut out = [0u8; 32];
    out[FIELD_ELEMENT_LEN - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Decode an arbitrary-length byte string as an unsigned integer
pub fn from_bytes(bytes: &[u8], endianness: Endianness) -> BigUint {
    match endianness {
        Endianness::BigEndian => BigUint::from_bytes_be(bytes),
        Endianness::LittleEndian => BigUint::from_bytes_le(bytes),
    }
}

/// Reduce a 32-byte big-endian value modulo the field order.
///
/// The input is reversed, read as little-endian, reduced and re-emitted as
/// big-endian. This is the single normalization point for hash inputs.
pub fn reduce(bytes: &[u8]) -> Result<[u8; 32]> {
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ZkMixerError::InvalidLength)?;
    Ok(reduce_array(&bytes))
}

fn reduce_array(bytes: &[u8; 32]) -> [u8; 32] {
    let mut le = *bytes;
    le.reverse();
    fr_to_bytes(&Fr::from_le_bytes_mod_order(&le))
}

/// Copy a short byte string into the front of a zeroed 32-byte buffer
pub fn left_align(bytes: &[u8]) -> Result<[u8; 32]> {
    require!(
        bytes.len() <= FIELD_ELEMENT_LEN,
        ZkMixerError::InvalidLength
    );

    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

fn fr_to_bytes(value: &Fr) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&value.into_bigint().to_bytes_be());
    out
}

/// Canonical field element: 32 big-endian bytes, always below the modulus
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement([u8; 32]);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0u8; 32]);

    /// Reduce arbitrary 32 bytes into the field
    pub fn reduce(bytes: &[u8]) -> Result<Self> {
        Ok(Self(reduce(bytes)?))
    }

    /// Accept bytes only if they are already canonical
    pub fn from_canonical(bytes: [u8; 32]) -> Result<Self> {
        require!(
            reduce_array(&bytes) == bytes,
            ZkMixerError::FieldOutOfRange
        );
        Ok(Self(bytes))
    }

    pub fn from_biguint(value: &BigUint) -> Self {
        Self::from_fr(&Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_fr(&Fr::from(value))
    }

    pub fn to_biguint(&self) -> BigUint {
        from_bytes(&self.0, Endianness::BigEndian)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn from_fr(value: &Fr) -> Self {
        Self(fr_to_bytes(value))
    }

    pub(crate) fn to_fr(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x")?;
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl AsRef<[u8]> for FieldElement {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Arbitrary-precision integer carried as a decimal string on the wire.
///
/// This is the format the proving oracle consumes and produces. Hex strings
/// (`0x` prefix) and plain JSON integers are accepted on input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signal(pub BigUint);

impl Signal {
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_biguint(&self.0)
    }
}

impl From<BigUint> for Signal {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Signal {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<FieldElement> for Signal {
    fn from(value: FieldElement) -> Self {
        Self(value.to_biguint())
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SignalVisitor;

        impl de::Visitor<'_> for SignalVisitor {
            type Value = Signal;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal or 0x-prefixed hex integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Signal, E> {
                Ok(Signal::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Signal, E> {
                let parsed = match v.strip_prefix("0x") {
                    Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
                    None => BigUint::parse_bytes(v.as_bytes(), 10),
                };
                parsed
                    .map(Signal)
                    .ok_or_else(|| E::custom(format!("invalid integer: {v}")))
            }
        }

        deserializer.deserialize_any(SignalVisitor)
    }
}
