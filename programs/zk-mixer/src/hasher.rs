use crate::errors::ZkMixerError;
use crate::field::FieldElement;
use anchor_lang::prelude::*;
use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};

/// Circom-compatible Poseidon over BN254 (x^5 S-box, big-endian output),
/// the same parameter set as the ledger's `Bn254X5` syscall.
fn poseidon(inputs: &[Fr]) -> Result<FieldElement> {
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).map_err(|_| ZkMixerError::UnhashableValue)?;
    let hash = hasher
        .hash(inputs)
        .map_err(|_| ZkMixerError::UnhashableValue)?;
    Ok(FieldElement::from_fr(&hash))
}

/// Hash a single 32-byte value into a leaf: `poseidon1(reduce(data))`
pub fn leaf_hash(data: &[u8]) -> Result<FieldElement> {
    let data = FieldElement::reduce(data)?;
    poseidon(&[data.to_fr()])
}

/// Hash two children into their parent: `poseidon2(reduce(left), reduce(right))`
///
/// Operand order is significant.
pub fn parent_hash(left: &[u8], right: &[u8]) -> Result<FieldElement> {
    let left = FieldElement::reduce(left)?;
    let right = FieldElement::reduce(right)?;
    poseidon(&[left.to_fr(), right.to_fr()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_error;
    use crate::field::tests::hex32;

    #[test]
    fn test_poseidon_known_answers() {
        let one = FieldElement::from_u64(1);
        let two = FieldElement::from_u64(2);

        assert_eq!(
            leaf_hash(one.as_bytes()).unwrap().to_bytes(),
            hex32("29176100eaa962bdc1fe6c654d6a3c130e96a4d1168b33848b897dc502820133")
        );
        assert_eq!(
            parent_hash(one.as_bytes(), two.as_bytes()).unwrap().to_bytes(),
            hex32("115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a")
        );
    }

    #[test]
    fn test_hashes_are_deterministic() {
        let a = [0x42u8; 32];
        let b = [0x07u8; 32];
        assert_eq!(leaf_hash(&a).unwrap(), leaf_hash(&a).unwrap());
        assert_eq!(parent_hash(&a, &b).unwrap(), parent_hash(&a, &b).unwrap());
    }

    #[test]
    fn test_parent_hash_order_matters() {
        let a = FieldElement::from_u64(1);
        let b = FieldElement::from_u64(2);
        assert_ne!(
            parent_hash(a.as_bytes(), b.as_bytes()).unwrap(),
            parent_hash(b.as_bytes(), a.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_inputs_are_reduced_before_hashing() {
        // 0xff..ff and its reduction are the same field element
        let raw = [0xffu8; 32];
        let reduced = crate::field::reduce(&raw).unwrap();
        assert_eq!(leaf_hash(&raw).unwrap(), leaf_hash(&reduced).unwrap());
        assert_eq!(
            parent_hash(&raw, &reduced).unwrap(),
            parent_hash(&reduced, &reduced).unwrap()
        );
    }

    #[test]
    fn test_rejects_short_input() {
        assert_error(leaf_hash(&[1u8; 7]).unwrap_err(), ZkMixerError::InvalidLength);
        assert_error(
            parent_hash(&[1u8; 32], &[1u8; 16]).unwrap_err(),
            ZkMixerError::InvalidLength,
        );
    }
}
