use crate::constants::PROOF_LEN;
use crate::errors::ZkMixerError;
use crate::field::{to_canonical_bytes, Signal};
use anchor_lang::prelude::*;
use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use bytemuck::{Pod, Zeroable};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

// ============================================================================
// PROOF ENCODING ADAPTER
// ============================================================================
//
// The prover emits snarkjs JSON: decimal coordinates, projective points, and
// Fp2 elements ordered (c0, c1). The ledger's alt_bn128 verifier takes 256
// BIG-ENDIAN bytes with Fp2 elements ordered (c1, c0):
//
//   A.x | A.y | B.x.c1 | B.x.c0 | B.y.c1 | B.y.c0 | C.x | C.y
//
// The (c1, c0) swap is a versioned contract with the verifier. Changing
// either side requires changing both.
//
// Every point must be on the curve (B in the r-torsion of the twist) with
// coordinates below the base-field modulus, or the ledger's deserializer
// rejects it.
//
// ============================================================================

/// Groth16 proof as produced by snarkjs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkjsProof {
    pub pi_a: Vec<Signal>,
    pub pi_b: Vec<Vec<Signal>>,
    pub pi_c: Vec<Signal>,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub curve: String,
}

impl SnarkjsProof {
    pub fn from_json(json: &str) -> Result<Self> {
        let proof: Self = serde_json::from_str(json).map_err(|_| ZkMixerError::MalformedProof)?;
        require!(
            proof.protocol.is_empty() || proof.protocol == "groth16",
            ZkMixerError::MalformedProof
        );
        require!(
            proof.curve.is_empty() || proof.curve == "bn128",
            ZkMixerError::MalformedProof
        );
        Ok(proof)
    }
}

/// G1 point (2 coordinates, each 32 bytes)
///
/// **Encoding**: BIG-ENDIAN field elements
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct G1Point {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

/// G2 point (4 coordinates, each 32 bytes - 2x2 Fp2 elements)
///
/// **Encoding**: BIG-ENDIAN field elements, each Fp2 element as (c1, c0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct G2Point {
    pub x: [[u8; 32]; 2],
    pub y: [[u8; 32]; 2],
}

/// Groth16 proof structure (BN254 curve), laid out exactly as the verifier reads it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Groth16Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

impl G1Point {
    fn from_snarkjs(group: &[Signal]) -> Result<Self> {
        let [x, y] = affine(group, &[1])?;
        let point = Self {
            x: coordinate(x)?,
            y: coordinate(y)?,
        };
        point.to_affine()?;
        Ok(point)
    }

    /// The (0, 0) encoding is not on the curve, so it is rejected here too
    fn to_affine(&self) -> Result<G1Affine> {
        let point = G1Affine::new_unchecked(base_field(&self.x)?, base_field(&self.y)?);
        require!(point.is_on_curve(), ZkMixerError::MalformedProof);
        Ok(point)
    }
}

impl G2Point {
    fn from_snarkjs(group: &[Vec<Signal>]) -> Result<Self> {
        let (x, y) = match group {
            [x, y] => (x, y),
            [x, y, z] if is_constant(z, &[1, 0]) => (x, y),
            _ => return Err(ZkMixerError::MalformedProof.into()),
        };
        let [x_c0, x_c1] = pair(x)?;
        let [y_c0, y_c1] = pair(y)?;

        let point = Self {
            x: [coordinate(x_c1)?, coordinate(x_c0)?],
            y: [coordinate(y_c1)?, coordinate(y_c0)?],
        };
        point.to_affine()?;
        Ok(point)
    }

    fn to_affine(&self) -> Result<G2Affine> {
        let [x_c1, x_c0] = &self.x;
        let [y_c1, y_c0] = &self.y;
        let point = G2Affine::new_unchecked(
            Fq2::new(base_field(x_c0)?, base_field(x_c1)?),
            Fq2::new(base_field(y_c0)?, base_field(y_c1)?),
        );
        require!(point.is_on_curve(), ZkMixerError::MalformedProof);
        require!(
            point.is_in_correct_subgroup_assuming_on_curve(),
            ZkMixerError::MalformedProof
        );
        Ok(point)
    }
}

impl Groth16Proof {
    pub fn from_snarkjs(proof: &SnarkjsProof) -> Result<Self> {
        Ok(Self {
            a: G1Point::from_snarkjs(&proof.pi_a)?,
            b: G2Point::from_snarkjs(&proof.pi_b)?,
            c: G1Point::from_snarkjs(&proof.pi_c)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; PROOF_LEN] {
        bytemuck::cast(*self)
    }

    /// Split a serialized proof back into its points.
    /// Expected format: A (64 bytes) + B (128 bytes) + C (64 bytes) = 256 bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        require!(bytes.len() == PROOF_LEN, ZkMixerError::InvalidLength);
        let proof: Self = bytemuck::pod_read_unaligned(bytes);

        proof.a.to_affine()?;
        proof.b.to_affine()?;
        proof.c.to_affine()?;
        Ok(proof)
    }
}

/// Serialize a snarkjs proof into the verifier's 256-byte layout
pub fn serialize(proof: &SnarkjsProof) -> Result<[u8; PROOF_LEN]> {
    Ok(Groth16Proof::from_snarkjs(proof)?.to_bytes())
}

/// Affine coordinates of a point, dropping a trailing projective `z`
fn affine<'a>(group: &'a [Signal], z: &[u64]) -> Result<[&'a Signal; 2]> {
    match group {
        [x, y] => Ok([x, y]),
        [x, y, last] if is_constant(std::slice::from_ref(last), z) => Ok([x, y]),
        _ => Err(ZkMixerError::MalformedProof.into()),
    }
}

fn pair(group: &[Signal]) -> Result<[&Signal; 2]> {
    match group {
        [c0, c1] => Ok([c0, c1]),
        _ => Err(ZkMixerError::MalformedProof.into()),
    }
}

fn is_constant(group: &[Signal], expected: &[u64]) -> bool {
    group.len() == expected.len()
        && group
            .iter()
            .zip(expected)
            .all(|(s, e)| s.0 == BigUint::from(*e))
}

/// Base-field coordinate as 32 big-endian bytes, without reduction
fn coordinate(value: &Signal) -> Result<[u8; 32]> {
    to_canonical_bytes(&value.0).map_err(|_| ZkMixerError::MalformedProof.into())
}

/// Coordinates at or above the base-field modulus are not canonical
fn base_field(bytes: &[u8; 32]) -> Result<Fq> {
    let value = Fq::from_be_bytes_mod_order(bytes);
    require!(
        value.into_bigint().to_bytes_be() == bytes.as_slice(),
        ZkMixerError::MalformedProof
    );
    Ok(value)
}
