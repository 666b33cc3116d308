//! Test utilities: a deterministic mock hasher and a naive reference tree.

use std::{
    cell::Cell,
    sync::{Arc, OnceLock},
};

use num_bigint::BigUint;

use crate::{
    encoding::{encode_field, FIELD_BYTES},
    hash::hash_nodes,
    DefaultNodes, LevelHasher, Node, Result,
};

/// Affine, level-tagged and non-commutative hash for testing.
///
/// `hash(a, b, level) = (3a + 5b + level + 1) mod (2^255 - 19)`. Cheap and
/// free of any cryptographic backend, but still sensitive to argument order
/// and level.
#[derive(Debug, Default)]
pub(crate) struct MockHasher {
    calls: Cell<u64>,
}

impl MockHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `hash` calls made through this instance.
    pub fn calls(&self) -> u64 {
        self.calls.get()
    }
}

fn mock_modulus() -> BigUint {
    (BigUint::from(1u8) << 255u32) - BigUint::from(19u8)
}

impl LevelHasher for MockHasher {
    fn hash(
        &self,
        left: &[u8; FIELD_BYTES],
        right: &[u8; FIELD_BYTES],
        level: u8,
    ) -> Result<[u8; FIELD_BYTES]> {
        self.calls.set(self.calls.get() + 1);
        let a = BigUint::from_bytes_be(left);
        let b = BigUint::from_bytes_be(right);
        let out = (a * 3u8 + b * 5u8 + BigUint::from(level) + 1u8) % mock_modulus();
        encode_field(&out)
    }

    fn default_nodes(&self) -> Result<Arc<DefaultNodes>> {
        static TABLE: OnceLock<Arc<DefaultNodes>> = OnceLock::new();
        if let Some(table) = TABLE.get() {
            return Ok(Arc::clone(table));
        }
        // built on a throwaway instance so call counts only see real work
        let table = Arc::new(DefaultNodes::compute(&MockHasher::new())?);
        Ok(Arc::clone(TABLE.get_or_init(|| table)))
    }
}

/// Leaf value used throughout the tests.
pub fn leaf(n: u64) -> Node {
    Node::from(n)
}

/// Leaves `start..end` as node values.
pub fn leaves(start: u64, end: u64) -> Vec<Node> {
    (start..end).map(leaf).collect()
}

/// Every level of a fully materialised tree built from `leaves`.
///
/// Level `i` has `2^(height - i)` entries. Only usable for small heights.
pub fn reference_levels<H: LevelHasher + ?Sized>(
    hasher: &H,
    leaves: &[Node],
    height: u8,
) -> Vec<Vec<Node>> {
    let defaults = DefaultNodes::compute(hasher).expect("defaults");
    let mut row: Vec<Node> = leaves.to_vec();
    row.resize(1usize << height, defaults.as_slice()[0].clone());
    let mut levels = vec![row];
    for level in 0..usize::from(height) {
        let next = levels[level]
            .chunks_exact(2)
            .map(|pair| hash_nodes(hasher, &pair[0], &pair[1], level as u8).expect("hash"))
            .collect();
        levels.push(next);
    }
    levels
}

/// Root of a tree rebuilt from scratch.
pub fn reference_root<H: LevelHasher + ?Sized>(hasher: &H, leaves: &[Node], height: u8) -> Node {
    reference_levels(hasher, leaves, height)[usize::from(height)][0].clone()
}

/// Sibling path of `index` in a tree rebuilt from scratch.
pub fn reference_proof<H: LevelHasher + ?Sized>(
    hasher: &H,
    leaves: &[Node],
    height: u8,
    index: u64,
) -> Vec<Node> {
    let levels = reference_levels(hasher, leaves, height);
    (0..usize::from(height))
        .map(|level| levels[level][((index >> level) ^ 1) as usize].clone())
        .collect()
}
