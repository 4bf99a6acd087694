use crate::commitment::Commitment;
use crate::errors::ZkMixerError;
use crate::field::FieldElement;
use crate::tree::{MerkleTree, PathElement};
use anchor_lang::prelude::*;

/// Ledger payload of a deposit: the commitment that becomes the next leaf
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DepositArgs {
    pub input: [u8; 32],
}

pub fn prepare_deposit(note: &Commitment) -> DepositArgs {
    DepositArgs {
        input: note.hash.to_bytes(),
    }
}

/// Ledger side of a deposit: append the commitment and return the written nodes
pub fn apply_deposit(tree: &mut MerkleTree, args: &DepositArgs) -> Result<Vec<PathElement>> {
    // Non-canonical input would be rejected by the Poseidon syscall
    let leaf =
        FieldElement::from_canonical(args.input).map_err(|_| ZkMixerError::UnhashableValue)?;

    msg!("Deposit at leaf index {}", tree.next_index());
    tree.insert(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::errors::assert_error;
    use crate::field::modulus;
    use crate::field::to_canonical_bytes;

    #[test]
    fn test_deposit_inserts_commitment() {
        let mut tree = MerkleTree::new(&PoolConfig::new(3, 8).unwrap()).unwrap();
        let note = Commitment::from_seeds(456, 123).unwrap();
        let args = prepare_deposit(&note);
        assert_eq!(args.input, note.hash.to_bytes());

        let written = apply_deposit(&mut tree, &args).unwrap();
        assert_eq!(written[0], PathElement { index: 0, hash: args.input });
        assert_eq!(tree.next_index(), 1);
    }

    #[test]
    fn test_rejects_non_canonical_input() {
        let mut tree = MerkleTree::new(&PoolConfig::new(3, 8).unwrap()).unwrap();
        let args = DepositArgs {
            input: to_canonical_bytes(&modulus()).unwrap(),
        };
        assert_error(
            apply_deposit(&mut tree, &args).unwrap_err(),
            ZkMixerError::UnhashableValue,
        );
        assert_eq!(tree.next_index(), 0);
    }

    #[test]
    fn test_args_borsh_layout() {
        let args = DepositArgs { input: [7u8; 32] };
        let mut bytes = Vec::new();
        args.serialize(&mut bytes).unwrap();
        assert_eq!(bytes, vec![7u8; 32]);
        assert_eq!(DepositArgs::try_from_slice(&bytes).unwrap(), args);
    }
}
