use crate::constants::{EMPTY_LEAF_SEED, MAX_MERKLE_DEPTH};
use crate::errors::ZkMixerError;
use crate::field::{left_align, FieldElement};
use crate::hasher::{leaf_hash, parent_hash};
use anchor_lang::prelude::*;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Hashes of empty subtrees, one per level.
///
/// Level 0 is the hash of the empty-leaf seed; level `i` is the parent of two
/// empty subtrees of level `i - 1`. The last level is the root of an empty tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroTable {
    depth: u8,
    zeros: Vec<FieldElement>,
}

impl ZeroTable {
    pub fn build(depth: u8, seed: &[u8]) -> Result<Self> {
        require!(
            depth > 0 && depth <= MAX_MERKLE_DEPTH,
            ZkMixerError::InvalidMerkleDepth
        );

        let mut zeros = Vec::with_capacity(depth as usize);
        zeros.push(leaf_hash(&left_align(seed)?)?);
        for level in 1..depth as usize {
            let below = zeros[level - 1];
            zeros.push(parent_hash(below.as_bytes(), below.as_bytes())?);
        }

        Ok(Self { depth, zeros })
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Empty-subtree hash at `level` (0 = leaf level)
    pub fn get(&self, level: u8) -> Result<FieldElement> {
        self.zeros
            .get(level as usize)
            .copied()
            .ok_or_else(|| ZkMixerError::IndexOutOfRange.into())
    }

    pub fn leaf(&self) -> FieldElement {
        self.zeros[0]
    }

    /// Root of a tree in which every leaf is empty
    pub fn root(&self) -> FieldElement {
        self.zeros[self.zeros.len() - 1]
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.zeros
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const UNINIT: OnceCell<Arc<ZeroTable>> = OnceCell::new();

static CACHE: [OnceCell<Arc<ZeroTable>>; MAX_MERKLE_DEPTH as usize + 1] =
    [UNINIT; MAX_MERKLE_DEPTH as usize + 1];

/// Zero table for the protocol seed, built at most once per depth
pub fn cached(depth: u8) -> Result<Arc<ZeroTable>> {
    require!(
        depth > 0 && depth <= MAX_MERKLE_DEPTH,
        ZkMixerError::InvalidMerkleDepth
    );

    CACHE[depth as usize]
        .get_or_try_init(|| {
            msg!("Building zero table for depth {}", depth);
            ZeroTable::build(depth, EMPTY_LEAF_SEED).map(Arc::new)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_error;
    use std::thread;

    #[test]
    fn test_levels_are_built_bottom_up() {
        let table = ZeroTable::build(4, EMPTY_LEAF_SEED).unwrap();
        let z0 = leaf_hash(&left_align(EMPTY_LEAF_SEED).unwrap()).unwrap();
        let z1 = parent_hash(z0.as_bytes(), z0.as_bytes()).unwrap();
        let z2 = parent_hash(z1.as_bytes(), z1.as_bytes()).unwrap();

        assert_eq!(table.depth(), 4);
        assert_eq!(table.as_slice().len(), 4);
        assert_eq!(table.leaf(), z0);
        assert_eq!(table.get(1).unwrap(), z1);
        assert_eq!(table.get(2).unwrap(), z2);
        assert_eq!(
            table.root(),
            parent_hash(z2.as_bytes(), z2.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_shallow_table_is_prefix_of_deeper_one() {
        let shallow = ZeroTable::build(3, EMPTY_LEAF_SEED).unwrap();
        let deep = ZeroTable::build(8, EMPTY_LEAF_SEED).unwrap();
        assert_eq!(shallow.as_slice(), &deep.as_slice()[..3]);
    }

    #[test]
    fn test_seed_changes_every_level() {
        let a = ZeroTable::build(3, EMPTY_LEAF_SEED).unwrap();
        let b = ZeroTable::build(3, b"OTHER").unwrap();
        for level in 0..3 {
            assert_ne!(a.get(level).unwrap(), b.get(level).unwrap());
        }
    }

    #[test]
    fn test_invalid_depths() {
        assert_error(
            ZeroTable::build(0, EMPTY_LEAF_SEED).unwrap_err(),
            ZkMixerError::InvalidMerkleDepth,
        );
        assert_error(
            cached(MAX_MERKLE_DEPTH + 1).unwrap_err(),
            ZkMixerError::InvalidMerkleDepth,
        );
        let table = ZeroTable::build(2, EMPTY_LEAF_SEED).unwrap();
        assert_error(table.get(2).unwrap_err(), ZkMixerError::IndexOutOfRange);
    }

    #[test]
    fn test_cache_is_shared_across_threads() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(|| cached(6).unwrap())).collect();
        let tables: Vec<Arc<ZeroTable>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for table in &tables {
            assert!(Arc::ptr_eq(table, &tables[0]));
        }
        assert_eq!(*tables[0], ZeroTable::build(6, EMPTY_LEAF_SEED).unwrap());
    }
}
