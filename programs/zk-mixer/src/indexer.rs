use crate::constants::MAX_MERKLE_DEPTH;
use crate::errors::ZkMixerError;
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// FLATTENED TREE INDEXING
// ============================================================================
//
// A tree of height H is stored bottom-up in one array of 2^(H+1) - 1 slots:
//
//   height 2:        6            level 2 (root)
//                 4     5         level 1
//                0 1   2 3        level 0 (leaves)
//
// Level L begins at 2^(H+1) - 2^(H-L+1). Every level begins on an even slot,
// so the left member of a sibling pair is always the even index.
//
// A tree of depth D counts D levels (leaves through root) and has height
// D - 1. Sibling paths are indexed by depth, everything else by height.
//
// ============================================================================

/// Position of the queried node within its sibling pair
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AnchorSerialize, AnchorDeserialize,
)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Circuit `pathIndices` encoding: 0 when the queried node is the left operand
    pub fn path_index(self) -> u8 {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// One level of an inclusion path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPathStep {
    /// Both members of the pair, and which one lies on the queried path
    Internal { left: u64, right: u64, queried: Side },
    /// The queried node is the root; nothing left to pair with
    Terminal { index: u64 },
}

impl SiblingPathStep {
    pub fn queried_index(&self) -> u64 {
        match *self {
            SiblingPathStep::Internal {
                left,
                queried: Side::Left,
                ..
            } => left,
            SiblingPathStep::Internal {
                right,
                queried: Side::Right,
                ..
            } => right,
            SiblingPathStep::Terminal { index } => index,
        }
    }

    pub fn sibling_index(&self) -> Option<u64> {
        match *self {
            SiblingPathStep::Internal {
                right,
                queried: Side::Left,
                ..
            } => Some(right),
            SiblingPathStep::Internal {
                left,
                queried: Side::Right,
                ..
            } => Some(left),
            SiblingPathStep::Terminal { .. } => None,
        }
    }
}

/// Ordered inclusion path for one leaf, leaf level first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    pub depth: u8,
    pub leaf_index: u64,
    pub steps: Vec<SiblingPathStep>,
}

impl MerklePath {
    /// Tree indices whose hashes the caller must fetch, in path order
    pub fn sibling_indices(&self) -> Vec<u64> {
        self.steps.iter().filter_map(|s| s.sibling_index()).collect()
    }

    /// Side of the queried node at every internal step, as the circuit expects it
    pub fn path_indices(&self) -> Vec<u8> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                SiblingPathStep::Internal { queried, .. } => Some(queried.path_index()),
                SiblingPathStep::Terminal { .. } => None,
            })
            .collect()
    }

    pub fn root_index(&self) -> Result<u64> {
        check_depth(self.depth)?;
        root_index(self.depth - 1)
    }
}

fn check_height(height: u8) -> Result<()> {
    require!(height < MAX_MERKLE_DEPTH, ZkMixerError::InvalidMerkleDepth);
    Ok(())
}

fn check_depth(depth: u8) -> Result<()> {
    require!(
        depth > 0 && depth <= MAX_MERKLE_DEPTH,
        ZkMixerError::InvalidMerkleDepth
    );
    Ok(())
}

/// Slots in a tree of height `height`: 2^(H+1) - 1
pub fn total_nodes(height: u8) -> Result<u64> {
    check_height(height)?;
    Ok(slots(height))
}

pub fn root_index(height: u8) -> Result<u64> {
    check_height(height)?;
    Ok(slots(height) - 1)
}

pub fn leaf_count(height: u8) -> Result<u64> {
    check_height(height)?;
    Ok(1u64 << height)
}

/// First slot of `level`; for `level == height + 1` this is `total_nodes`
pub fn nodes_up_to_level(level: u8, height: u8) -> Result<u64> {
    check_height(height)?;
    require!(level <= height + 1, ZkMixerError::IndexOutOfRange);
    Ok(level_start(level, height))
}

// Callers must have passed `check_height`
fn slots(height: u8) -> u64 {
    (1u64 << (height as u32 + 1)) - 1
}

fn level_start(level: u8, height: u8) -> u64 {
    (1u64 << (height as u32 + 1)) - (1u64 << (height as u32 + 1 - level as u32))
}

/// Level containing slot `index`
pub fn level_of(index: u64, height: u8) -> Result<u8> {
    check_height(height)?;
    require!(index < slots(height), ZkMixerError::IndexOutOfRange);

    // Slots remaining after `index` lie in [2^(H-L), 2^(H-L+1) - 1]
    let remaining = slots(height) - index;
    Ok(height - remaining.ilog2() as u8)
}

/// Parent slot of `index`, or `None` for the root
pub fn parent_of(index: u64, height: u8) -> Result<Option<u64>> {
    check_height(height)?;
    require!(index < slots(height), ZkMixerError::IndexOutOfRange);
    if index == slots(height) - 1 {
        return Ok(None);
    }

    let level = level_of(index, height)?;
    let current_start = level_start(level, height);
    let next_start = level_start(level + 1, height);
    Ok(Some(next_start + (index - current_start) / 2))
}

/// Inclusion path for `leaf_index` in a tree of `depth` levels.
///
/// Always `depth` steps long; the last one is the terminal root step.
pub fn sibling_path(leaf_index: u64, depth: u8) -> Result<MerklePath> {
    check_depth(depth)?;
    let height = depth - 1;
    require!(
        leaf_index < leaf_count(height)?,
        ZkMixerError::IndexOutOfRange
    );

    let root = root_index(height)?;
    let mut steps = Vec::with_capacity(depth as usize);
    let mut current = leaf_index;

    for _ in 0..depth {
        let step = if current == root {
            SiblingPathStep::Terminal { index: current }
        } else if current % 2 == 0 {
            SiblingPathStep::Internal {
                left: current,
                right: current + 1,
                queried: Side::Left,
            }
        } else {
            SiblingPathStep::Internal {
                left: current - 1,
                right: current,
                queried: Side::Right,
            }
        };
        steps.push(step);

        if let Some(parent) = parent_of(current, height)? {
            current = parent;
        }
    }

    Ok(MerklePath {
        depth,
        leaf_index,
        steps,
    })
}
