/// Maximum Merkle tree depth supported
pub const MAX_MERKLE_DEPTH: u8 = 32;

/// Default Merkle tree depth
pub const DEFAULT_MERKLE_DEPTH: u8 = 20;

/// Default root window size (number of recent roots to keep)
pub const DEFAULT_ROOT_WINDOW: u16 = 64;

/// Maximum root window size
pub const MAX_ROOT_WINDOW: u16 = 256;

/// BN254 scalar field modulus
pub const BN254_SCALAR_FIELD: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Seed hashed into the level-0 empty leaf. Must match the ledger's zero table.
pub const EMPTY_LEAF_SEED: &[u8] = b"ZKL$SOL";

/// Width of every encoded field element
pub const FIELD_ELEMENT_LEN: usize = 32;

/// Serialized proof layout: A (64 bytes) + B (128 bytes) + C (64 bytes)
pub const G1_POINT_LEN: usize = 64;
pub const G2_POINT_LEN: usize = 128;
pub const PROOF_LEN: usize = 2 * G1_POINT_LEN + G2_POINT_LEN;

/// Number of public signals of the withdraw circuit: [recipient, nullifier_hash]
pub const WITHDRAW_PUBLIC_INPUTS: usize = 2;

/// Circuit artifacts are named after the tree depth, e.g. `withdraw20`
pub const WITHDRAW_CIRCUIT_PREFIX: &str = "withdraw";
