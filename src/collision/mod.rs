//! Grouping of content-identical blocks.
//!
//! TPS encrypts in ECB mode, so identical ciphertext blocks decrypt to the
//! same plaintext. Repeated blocks are mostly empty space whose plaintext is
//! known (see [`crate::pattern`]), which makes every member of a class a
//! usable known-plaintext position once one of them is known.
//!
//! # Grouping rules
//!
//! - The representative of a class is the first block of that content in
//!   scan order.
//! - Duplicates are listed in scan order and exclude the representative.
//! - Content that occurs only once produces no entry.
//! - The map iterates in [`Block`] order, not insertion order.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::block::{Block, WORDS_PER_BLOCK};

pub type CollisionMap = BTreeMap<Block, Vec<Block>>;

/// Find blocks with identical content by a pairwise scan.
pub fn find_identical_blocks(blocks: &[Block]) -> CollisionMap {
    let mut same = CollisionMap::new();
    let mut done = vec![false; blocks.len()];
    for t in 0..blocks.len() {
        if done[t] {
            continue;
        }
        done[t] = true;
        let a = &blocks[t];
        let mut duplicates = Vec::new();
        for y in t..blocks.len() {
            if done[y] || !a.same_value(&blocks[y]) {
                continue;
            }
            duplicates.push(blocks[y]);
            done[y] = true;
        }
        if !duplicates.is_empty() {
            trace!(offset = a.offset(), duplicates = duplicates.len(), "collision class");
            same.insert(*a, duplicates);
        }
    }
    debug!(blocks = blocks.len(), classes = same.len(), "grouped identical blocks");
    same
}

/// Same result as [`find_identical_blocks`], but candidates are bucketed by
/// content first so each block is only compared within its bucket.
///
/// With the `parallel` feature the buckets are turned into classes on the
/// rayon pool.
pub fn find_identical_blocks_bucketed(blocks: &[Block]) -> CollisionMap {
    let mut buckets: HashMap<[u32; WORDS_PER_BLOCK], Vec<usize>> = HashMap::new();
    for (index, block) in blocks.iter().enumerate() {
        buckets.entry(*block.words()).or_default().push(index);
    }
    let colliding: Vec<Vec<usize>> = buckets
        .into_values()
        .filter(|indices| indices.len() > 1)
        .collect();

    let to_class = |indices: &Vec<usize>| -> (Block, Vec<Block>) {
        // Indices were pushed in scan order.
        let representative = blocks[indices[0]];
        let duplicates = indices[1..].iter().map(|&i| blocks[i]).collect();
        (representative, duplicates)
    };

    #[cfg(feature = "parallel")]
    let same: CollisionMap = {
        use rayon::prelude::*;
        colliding.par_iter().map(to_class).collect::<Vec<_>>().into_iter().collect()
    };
    #[cfg(not(feature = "parallel"))]
    let same: CollisionMap = colliding.iter().map(to_class).collect();

    debug!(blocks = blocks.len(), classes = same.len(), "grouped identical blocks by bucket");
    same
}

/// Aggregate figures over a [`CollisionMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionSummary {
    /// Number of distinct repeated contents.
    pub classes:       usize,
    /// Blocks that repeat an earlier block (representatives not counted).
    pub duplicates:    usize,
    /// Size of the biggest class, representative included.
    pub largest_class: usize,
}

impl CollisionSummary {
    pub fn of(map: &CollisionMap) -> Self {
        let duplicates = map.values().map(Vec::len).sum();
        let largest_class = map.values().map(|d| d.len() + 1).max().unwrap_or(0);
        Self { classes: map.len(), duplicates, largest_class }
    }

    /// Representative of the biggest class; ties go to the earliest offset.
    pub fn largest(map: &CollisionMap) -> Option<&Block> {
        map.iter()
            .max_by(|(a, da), (b, db)| {
                da.len().cmp(&db.len()).then(b.offset().cmp(&a.offset()))
            })
            .map(|(rep, _)| rep)
    }
}
