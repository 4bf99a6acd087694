use crate::constants::*;
use crate::errors::ZkMixerError;
use crate::zeros::{self, ZeroTable};
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pool configuration shared by the tree, the zero table and the circuit
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AnchorSerialize, AnchorDeserialize,
)]
pub struct PoolConfig {
    /// Merkle tree depth in levels, leaves through root (1-32)
    pub merkle_depth: u8,

    /// Number of recent roots a withdrawal may reference
    pub root_window: u16,

    /// Seed hashed into the empty leaf
    pub empty_leaf_seed: Vec<u8>,
}

impl PoolConfig {
    pub fn new(merkle_depth: u8, root_window: u16) -> Result<Self> {
        Self::with_seed(merkle_depth, root_window, EMPTY_LEAF_SEED.to_vec())
    }

    pub fn with_seed(merkle_depth: u8, root_window: u16, empty_leaf_seed: Vec<u8>) -> Result<Self> {
        let config = Self {
            merkle_depth,
            root_window,
            empty_leaf_seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks bounds on a config that may have been deserialized
    pub fn validate(&self) -> Result<()> {
        require!(
            self.merkle_depth > 0 && self.merkle_depth <= MAX_MERKLE_DEPTH,
            ZkMixerError::InvalidMerkleDepth
        );
        require!(
            self.root_window > 0 && self.root_window <= MAX_ROOT_WINDOW,
            ZkMixerError::InvalidRootWindow
        );
        require!(
            self.empty_leaf_seed.len() <= FIELD_ELEMENT_LEN,
            ZkMixerError::InvalidLength
        );
        Ok(())
    }

    /// Edges from a leaf to the root
    pub fn height(&self) -> u8 {
        self.merkle_depth - 1
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.height()
    }

    /// Name of the withdraw circuit artifacts for this depth
    pub fn circuit_name(&self) -> String {
        format!("{}{}", WITHDRAW_CIRCUIT_PREFIX, self.merkle_depth)
    }

    /// Zero table for this depth and seed.
    ///
    /// Only the protocol seed goes through the process-wide cache.
    pub fn zeros(&self) -> Result<Arc<ZeroTable>> {
        if self.empty_leaf_seed == EMPTY_LEAF_SEED {
            zeros::cached(self.merkle_depth)
        } else {
            ZeroTable::build(self.merkle_depth, &self.empty_leaf_seed).map(Arc::new)
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            merkle_depth: DEFAULT_MERKLE_DEPTH,
            root_window: DEFAULT_ROOT_WINDOW,
            empty_leaf_seed: EMPTY_LEAF_SEED.to_vec(),
        }
    }
}
