pub mod commitment;
pub mod config;
pub mod constants;
pub mod errors;
pub mod field;
pub mod hasher;
pub mod indexer;
pub mod instructions;
pub mod proof;
pub mod tree;
pub mod witness;
pub mod zeros;

pub use commitment::{commitment_of, nullifier_hash_of, Commitment, Secret};
pub use config::PoolConfig;
pub use errors::ZkMixerError;
pub use field::{Endianness, FieldElement, Signal};
pub use hasher::{leaf_hash, parent_hash};
pub use indexer::{sibling_path, MerklePath, Side, SiblingPathStep};
pub use instructions::*;
pub use proof::{Groth16Proof, SnarkjsProof};
pub use tree::{fetch_siblings, fold_root, recompute_root, MerkleTree, NodeSource, PathElement, RootHistory};
pub use witness::{OracleOutput, ProvingOracle, WithdrawCircuitInputs};
pub use zeros::ZeroTable;
