use crate::commitment::Commitment;
use crate::constants::WITHDRAW_PUBLIC_INPUTS;
use crate::errors::ZkMixerError;
use crate::field::{FieldElement, Signal};
use crate::indexer::MerklePath;
use crate::proof::SnarkjsProof;
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

/// Private and public inputs of the withdraw circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawCircuitInputs {
    pub root: Signal,
    pub commitment: Signal,
    pub nullifier_hash: Signal,
    pub recipient: Signal,
    pub nullifier: Signal,
    pub secret: Signal,
    /// Sibling hashes, leaf level first
    pub path_elements: Vec<Signal>,
    /// 0 where the path node is the left operand, 1 where it is the right
    pub path_indices: Vec<u8>,
}

impl WithdrawCircuitInputs {
    pub fn new(
        root: &FieldElement,
        note: &Commitment,
        recipient: &FieldElement,
        path: &MerklePath,
        siblings: &[FieldElement],
    ) -> Result<Self> {
        let path_indices = path.path_indices();
        require!(
            siblings.len() == path_indices.len(),
            ZkMixerError::InvalidLength
        );

        Ok(Self {
            root: Signal::from(*root),
            commitment: Signal::from(note.hash),
            nullifier_hash: Signal::from(note.nullifier_hash()?),
            recipient: Signal::from(*recipient),
            nullifier: Signal(note.nullifier.numeric()),
            secret: Signal(note.secret.numeric()),
            path_elements: siblings.iter().copied().map(Signal::from).collect(),
            path_indices,
        })
    }
}

/// Recipient public key as the circuit sees it: its 32 bytes reduced into the field
pub fn recipient_field(recipient: &Pubkey) -> Result<FieldElement> {
    FieldElement::reduce(&recipient.to_bytes())
}

/// What the proving oracle hands back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleOutput {
    pub proof: SnarkjsProof,
    pub public_signals: Vec<Signal>,
}

/// External Groth16 prover for the withdraw circuit.
///
/// Implementations may shell out to snarkjs, call a proving service, or run
/// an in-process prover. Transport failures surface as `OracleFailure`, which
/// callers may retry.
pub trait ProvingOracle: Send + Sync {
    /// Generate a proof with the artifacts named `circuit` (e.g. `withdraw20`)
    fn prove(
        &self,
        circuit: &str,
        inputs: &WithdrawCircuitInputs,
    ) -> impl core::future::Future<Output = Result<OracleOutput>> + Send;
}

/// Public signals must be exactly `[recipient, nullifierHash]` as sent
pub fn check_public_signals(output: &OracleOutput, inputs: &WithdrawCircuitInputs) -> Result<()> {
    let expected = [&inputs.recipient, &inputs.nullifier_hash];

    if output.public_signals.len() != WITHDRAW_PUBLIC_INPUTS {
        msg!(
            "Oracle returned {} public signals, expected {}",
            output.public_signals.len(),
            WITHDRAW_PUBLIC_INPUTS
        );
        return Err(ZkMixerError::OracleFailure.into());
    }

    for (i, (got, want)) in output.public_signals.iter().zip(expected).enumerate() {
        if got != want {
            msg!("Oracle public signal {} does not match the request", i);
            return Err(ZkMixerError::OracleFailure.into());
        }
    }

    Ok(())
}
