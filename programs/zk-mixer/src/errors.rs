use anchor_lang::prelude::*;

#[error_code]
pub enum ZkMixerError {
    #[msg("Invalid length for a 32-byte field encoding")]
    InvalidLength,

    #[msg("Tree index out of range for the given height")]
    IndexOutOfRange,

    #[msg("Malformed proof: wrong component arity or empty point")]
    MalformedProof,

    #[msg("Proving oracle failed or returned inconsistent public signals")]
    OracleFailure,

    #[msg("Field element out of range")]
    FieldOutOfRange,

    #[msg("Invalid Merkle depth: must be between 1 and MAX_MERKLE_DEPTH")]
    InvalidMerkleDepth,

    #[msg("Invalid root window size: must be between 1 and MAX_ROOT_WINDOW")]
    InvalidRootWindow,

    #[msg("Merkle tree is full")]
    MerkleTreeFull,

    #[msg("Merkle root not found in recent roots")]
    RootNotFound,

    #[msg("Value can't be Poseidon hashed")]
    UnhashableValue,
}

/// Asserts that `err` carries the given error code.
#[cfg(test)]
pub(crate) fn assert_error(err: anchor_lang::error::Error, expected: ZkMixerError) {
    match err {
        anchor_lang::error::Error::AnchorError(e) => {
            assert_eq!(e.error_code_number, u32::from(expected), "{}", e.error_msg)
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}
