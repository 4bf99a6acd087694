use crate::commitment::Commitment;
use crate::config::PoolConfig;
use crate::constants::{PROOF_LEN, WITHDRAW_PUBLIC_INPUTS};
use crate::errors::ZkMixerError;
use crate::field::FieldElement;
use crate::indexer::sibling_path;
use crate::proof::{self, Groth16Proof};
use crate::tree::{fetch_siblings, fold_root, MerkleTree, NodeSource};
use crate::witness::{check_public_signals, recipient_field, ProvingOracle, WithdrawCircuitInputs};
use anchor_lang::prelude::*;

/// Ledger payload of a withdrawal
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawArgs {
    pub nullifier_hash: [u8; 32],
    pub proof: [u8; PROOF_LEN],
    pub root: [u8; 32],
}

impl WithdrawArgs {
    /// Verifier public inputs, in circuit order: [recipient, nullifier_hash]
    pub fn public_inputs(&self, recipient: &Pubkey) -> Result<[[u8; 32]; WITHDRAW_PUBLIC_INPUTS]> {
        Ok([recipient_field(recipient)?.to_bytes(), self.nullifier_hash])
    }
}

/// Build a withdrawal for the note at `leaf_index`.
///
/// Siblings are read from `nodes` once each; the root they fold into must be
/// the source's current root before the oracle is asked for a proof.
pub async fn prepare_withdraw<N, O>(
    config: &PoolConfig,
    note: &Commitment,
    leaf_index: u64,
    recipient: &Pubkey,
    nodes: &N,
    oracle: &O,
) -> Result<WithdrawArgs>
where
    N: NodeSource,
    O: ProvingOracle,
{
    config.validate()?;
    let path = sibling_path(leaf_index, config.merkle_depth)?;
    let siblings = fetch_siblings(&path, nodes)?;

    let root = fold_root(&note.hash, &path, &siblings)?;
    if root != nodes.root()? {
        msg!("Note at leaf {} does not fold into the current root", leaf_index);
        return Err(ZkMixerError::RootNotFound.into());
    }

    let recipient = recipient_field(recipient)?;
    let inputs = WithdrawCircuitInputs::new(&root, note, &recipient, &path, &siblings)?;

    let output = oracle.prove(&config.circuit_name(), &inputs).await?;
    check_public_signals(&output, &inputs)?;

    Ok(WithdrawArgs {
        nullifier_hash: note.nullifier_hash()?.to_bytes(),
        proof: proof::serialize(&output.proof)?,
        root: root.to_bytes(),
    })
}

/// Ledger-side checks that do not need the verifying key
pub fn check_withdraw(tree: &MerkleTree, args: &WithdrawArgs) -> Result<()> {
    let root = FieldElement::from_canonical(args.root)?;
    require!(tree.known_root(&root), ZkMixerError::RootNotFound);
    FieldElement::from_canonical(args.nullifier_hash)?;
    Groth16Proof::parse(&args.proof)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_error;
    use crate::instructions::deposit::{apply_deposit, prepare_deposit};
    use crate::proof::SnarkjsProof;
    use crate::witness::OracleOutput;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FIXTURE: &str = include_str!("../../tests/fixtures/withdraw_proof.json");

    /// Echoes the requested public signals with a recorded proof
    struct EchoOracle;

    impl ProvingOracle for EchoOracle {
        async fn prove(&self, circuit: &str, inputs: &WithdrawCircuitInputs) -> Result<OracleOutput> {
            assert_eq!(circuit, "withdraw3");
            Ok(OracleOutput {
                proof: SnarkjsProof::from_json(FIXTURE)?,
                public_signals: vec![inputs.recipient.clone(), inputs.nullifier_hash.clone()],
            })
        }
    }

    struct FailingOracle;

    impl ProvingOracle for FailingOracle {
        async fn prove(&self, _: &str, _: &WithdrawCircuitInputs) -> Result<OracleOutput> {
            Err(ZkMixerError::OracleFailure.into())
        }
    }

    /// Counts every node read made against the tree
    struct CountingNodes<'a> {
        tree: &'a MerkleTree,
        reads: AtomicUsize,
    }

    impl NodeSource for CountingNodes<'_> {
        fn node(&self, index: u64) -> Result<FieldElement> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            self.tree.node(index)
        }

        fn root(&self) -> Result<FieldElement> {
            self.tree.root()
        }
    }

    fn funded_tree(config: &PoolConfig, note: &Commitment) -> MerkleTree {
        let mut tree = MerkleTree::new(config).unwrap();
        apply_deposit(&mut tree, &prepare_deposit(note)).unwrap();
        tree
    }

    #[tokio::test]
    async fn test_withdraw_round_trip() {
        let config = PoolConfig::new(3, 8).unwrap();
        let note = Commitment::from_seeds(456, 123).unwrap();
        let tree = funded_tree(&config, &note);
        let recipient = Pubkey::new_unique();

        let args = prepare_withdraw(&config, &note, 0, &recipient, &tree, &EchoOracle)
            .await
            .unwrap();

        assert_eq!(args.root, tree.current_root().to_bytes());
        assert_eq!(args.nullifier_hash, note.nullifier_hash().unwrap().to_bytes());
        assert!(check_withdraw(&tree, &args).is_ok());
        assert_eq!(
            args.public_inputs(&recipient).unwrap(),
            [
                FieldElement::reduce(&recipient.to_bytes()).unwrap().to_bytes(),
                args.nullifier_hash
            ]
        );
    }

    #[tokio::test]
    async fn test_each_sibling_is_read_once() {
        let config = PoolConfig::new(3, 8).unwrap();
        let note = Commitment::from_seeds(456, 123).unwrap();
        let tree = funded_tree(&config, &note);
        let nodes = CountingNodes {
            tree: &tree,
            reads: AtomicUsize::new(0),
        };

        let args = prepare_withdraw(&config, &note, 0, &Pubkey::new_unique(), &nodes, &EchoOracle)
            .await
            .unwrap();
        assert_eq!(args.root, tree.current_root().to_bytes());
        assert_eq!(nodes.reads.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_withdraw_wrong_leaf() {
        let config = PoolConfig::new(3, 8).unwrap();
        let note = Commitment::from_seeds(456, 123).unwrap();
        let tree = funded_tree(&config, &note);

        let err = prepare_withdraw(&config, &note, 1, &Pubkey::new_unique(), &tree, &EchoOracle)
            .await
            .unwrap_err();
        assert_error(err, ZkMixerError::RootNotFound);
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let config = PoolConfig::new(3, 8).unwrap();
        let note = Commitment::from_seeds(1, 2).unwrap();
        let tree = funded_tree(&config, &note);

        let err = prepare_withdraw(&config, &note, 0, &Pubkey::new_unique(), &tree, &FailingOracle)
            .await
            .unwrap_err();
        assert_error(err, ZkMixerError::OracleFailure);
    }

    #[test]
    fn test_check_withdraw_rejects_unknown_root() {
        let config = PoolConfig::new(3, 8).unwrap();
        let note = Commitment::from_seeds(1, 2).unwrap();
        let tree = funded_tree(&config, &note);
        let proof = proof::serialize(&SnarkjsProof::from_json(FIXTURE).unwrap()).unwrap();

        let args = WithdrawArgs {
            nullifier_hash: note.nullifier_hash().unwrap().to_bytes(),
            proof,
            root: FieldElement::from_u64(5).to_bytes(),
        };
        assert_error(
            check_withdraw(&tree, &args).unwrap_err(),
            ZkMixerError::RootNotFound,
        );
    }
}
