use crate::config::PoolConfig;
use crate::errors::ZkMixerError;
use crate::field::FieldElement;
use crate::hasher::parent_hash;
use crate::indexer::{self, MerklePath, SiblingPathStep};
use crate::zeros::ZeroTable;
use anchor_lang::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A node written by an insertion, addressed by its flattened index
#[derive(Debug, Clone, Copy, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct PathElement {
    pub index: u64,
    pub hash: [u8; 32],
}

impl PathElement {
    fn new(index: u64, hash: &FieldElement) -> Self {
        Self {
            index,
            hash: hash.to_bytes(),
        }
    }
}

/// Ring buffer of recent Merkle roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHistory {
    /// Ring buffer of roots
    roots: Vec<FieldElement>,

    /// Current write cursor
    cursor: u16,

    /// Number of roots currently stored
    size: u16,

    /// Maximum capacity (from PoolConfig.root_window)
    capacity: u16,
}

impl RootHistory {
    pub fn new(capacity: u16) -> Result<Self> {
        require!(capacity > 0, ZkMixerError::InvalidRootWindow);
        Ok(Self {
            roots: vec![FieldElement::ZERO; capacity as usize],
            cursor: 0,
            size: 0,
            capacity,
        })
    }

    /// Check if a root exists in the ring buffer
    pub fn contains_root(&self, root: &FieldElement) -> bool {
        self.roots
            .iter()
            .take(self.size as usize)
            .any(|r| r == root)
    }

    /// Add a new root to the ring buffer, evicting the oldest when full
    pub fn add_root(&mut self, root: FieldElement) {
        self.roots[self.cursor as usize] = root;

        self.cursor = (self.cursor + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }
    }

    pub fn latest(&self) -> Option<FieldElement> {
        if self.size == 0 {
            return None;
        }
        let idx = match self.cursor {
            0 => self.capacity - 1,
            c => c - 1,
        };
        Some(self.roots[idx as usize])
    }

    pub fn len(&self) -> usize {
        self.size as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Read access to node hashes by flattened index
pub trait NodeSource {
    fn node(&self, index: u64) -> Result<FieldElement>;

    fn root(&self) -> Result<FieldElement>;
}

/// Append-only Merkle tree with a bounded history of roots.
///
/// Only nodes touched by an insertion are stored; every other slot holds the
/// zero hash of its level.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    depth: u8,
    next_index: u64,
    zeros: Arc<ZeroTable>,
    filled_subtrees: Vec<FieldElement>,
    roots: RootHistory,
    nodes: BTreeMap<u64, FieldElement>,
}

impl MerkleTree {
    pub fn new(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        let zeros = config.zeros()?;

        let filled_subtrees = zeros.as_slice()[..config.height() as usize].to_vec();
        let mut roots = RootHistory::new(config.root_window)?;
        roots.add_root(zeros.root());

        Ok(Self {
            depth: config.merkle_depth,
            next_index: 0,
            zeros,
            filled_subtrees,
            roots,
            nodes: BTreeMap::new(),
        })
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    fn height(&self) -> u8 {
        self.depth - 1
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.height()
    }

    pub fn zeros(&self) -> &ZeroTable {
        &self.zeros
    }

    /// Current root; the empty-tree root before the first insertion
    pub fn current_root(&self) -> FieldElement {
        self.roots.latest().unwrap_or_else(|| self.zeros.root())
    }

    /// Whether `root` is among the last `root_window` roots
    pub fn known_root(&self, root: &FieldElement) -> bool {
        self.roots.contains_root(root)
    }

    pub fn root_history(&self) -> &RootHistory {
        &self.roots
    }

    /// Append `leaf` and return every node the insertion wrote: both children at
    /// each level, leaf level first, then the new root.
    ///
    /// Even positions pair with the zero of their level and become the filled
    /// subtree; odd positions pair with the filled subtree on their left.
    pub fn insert(&mut self, leaf: FieldElement) -> Result<Vec<PathElement>> {
        require!(
            self.next_index < self.capacity(),
            ZkMixerError::MerkleTreeFull
        );

        let height = self.height();
        let mut position = self.next_index;
        let mut slot = self.next_index;
        let mut current = leaf;
        let mut written = Vec::with_capacity(2 * height as usize + 1);

        for level in 0..height {
            let (left, right) = if position % 2 == 0 {
                self.filled_subtrees[level as usize] = current;
                (current, self.zeros.get(level)?)
            } else {
                (self.filled_subtrees[level as usize], current)
            };

            let left_slot = slot - slot % 2;
            written.push(PathElement::new(left_slot, &left));
            written.push(PathElement::new(left_slot + 1, &right));
            self.nodes.insert(left_slot, left);
            self.nodes.insert(left_slot + 1, right);

            current = parent_hash(left.as_bytes(), right.as_bytes())?;
            if let Some(parent) = indexer::parent_of(slot, height)? {
                slot = parent;
            }
            position /= 2;
        }

        written.push(PathElement::new(slot, &current));
        self.nodes.insert(slot, current);
        self.roots.add_root(current);

        msg!(
            "Inserted leaf {} of {}, root updated",
            self.next_index,
            self.capacity()
        );
        self.next_index += 1;

        Ok(written)
    }

    /// Inclusion path for a leaf already in the tree
    pub fn path(&self, leaf_index: u64) -> Result<MerklePath> {
        require!(
            leaf_index < self.next_index,
            ZkMixerError::IndexOutOfRange
        );
        indexer::sibling_path(leaf_index, self.depth)
    }
}

impl NodeSource for MerkleTree {
    fn node(&self, index: u64) -> Result<FieldElement> {
        match self.nodes.get(&index) {
            Some(hash) => Ok(*hash),
            None => self.zeros.get(indexer::level_of(index, self.height())?),
        }
    }

    fn root(&self) -> Result<FieldElement> {
        Ok(self.current_root())
    }
}

/// Sibling hashes along `path`, leaf level first. One read per sibling.
pub fn fetch_siblings(path: &MerklePath, source: &impl NodeSource) -> Result<Vec<FieldElement>> {
    path.sibling_indices()
        .into_iter()
        .map(|index| source.node(index))
        .collect()
}

/// Fold `leaf` up `path` with siblings that were already fetched
pub fn fold_root(
    leaf: &FieldElement,
    path: &MerklePath,
    siblings: &[FieldElement],
) -> Result<FieldElement> {
    require!(
        siblings.len() == path.sibling_indices().len(),
        ZkMixerError::InvalidLength
    );

    let mut siblings = siblings.iter();
    let mut current = *leaf;
    for step in &path.steps {
        if let SiblingPathStep::Internal { queried, .. } = *step {
            let sibling = siblings.next().ok_or(ZkMixerError::InvalidLength)?;
            current = match queried {
                indexer::Side::Left => parent_hash(current.as_bytes(), sibling.as_bytes())?,
                indexer::Side::Right => parent_hash(sibling.as_bytes(), current.as_bytes())?,
            };
        }
    }
    Ok(current)
}

/// Fold `leaf` up `path`, fetching siblings from `source`
pub fn recompute_root(
    leaf: &FieldElement,
    path: &MerklePath,
    source: &impl NodeSource,
) -> Result<FieldElement> {
    fold_root(leaf, path, &fetch_siblings(path, source)?)
}
