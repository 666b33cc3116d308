//! Pair-append witness.
//!
//! Leaves are appended two at a time at an even position. The sibling path
//! of the pair above level 0 only covers nodes left of the pair or empty
//! subtrees, so one path authenticates both the root before the append
//! (pair slot holding `defaults[1]`) and the root after it (pair slot holding
//! `hash(pair[0], pair[1], 0)`).

use tracing::debug;

use crate::{
    encoding::{encode_field, FIELD_BYTES},
    hash::hash_nodes,
    tree::SparseMerkleTree,
    verify::{hex_node, verify_root},
    AccumulatorError, LevelHasher, Node, Result,
};

/// Evidence that a pair of leaves was appended to a known tree state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairAppendWitness {
    /// Index of the first leaf of the pair.
    pub index: u64,
    /// The appended leaves.
    pub pair: [Node; 2],
    /// `hash(pair[0], pair[1], 0)`.
    pub pair_hash: Node,
    /// Siblings of the pair node, levels `1..height`.
    pub siblings: Vec<Node>,
    /// Root before the append.
    pub old_root: Node,
    /// Root after the append.
    pub new_root: Node,
}

impl PairAppendWitness {
    /// Append `pair` to `tree` and record the witness.
    ///
    /// The tree must hold an even number of leaves. Nothing is appended on
    /// error.
    pub fn build<H: LevelHasher>(tree: &mut SparseMerkleTree<H>, pair: [Node; 2]) -> Result<Self> {
        let index = tree.size();
        if index % 2 != 0 {
            return Err(AccumulatorError::MalformedProof(format!(
                "pair must start at an even index, tree holds {} leaves",
                index
            )));
        }
        let old_root = tree.root().clone();
        // fails for a full tree before anything is hashed
        let siblings = tree.proof_from(index, 1)?;
        let pair_hash = hash_nodes(tree.hasher(), &pair[0], &pair[1], 0)?;
        tree.push_many(pair.iter().cloned())?;
        let new_root = tree.root().clone();
        debug!(index, "built pair append witness");
        Ok(Self {
            index,
            pair,
            pair_hash,
            siblings,
            old_root,
            new_root,
        })
    }

    /// Check the pair hash and both roots against the sibling path.
    pub fn verify<H: LevelHasher + ?Sized>(&self, hasher: &H) -> Result<()> {
        let pair_hash = hash_nodes(hasher, &self.pair[0], &self.pair[1], 0)?;
        if pair_hash != self.pair_hash {
            return Err(AccumulatorError::RootMismatch {
                expected: hex_node(&self.pair_hash),
                actual: hex_node(&pair_hash),
            });
        }
        let defaults = hasher.default_nodes()?;
        verify_root(
            hasher,
            &self.siblings,
            self.index,
            defaults.get(1)?,
            1,
            &self.old_root,
        )?;
        verify_root(
            hasher,
            &self.siblings,
            self.index,
            &self.pair_hash,
            1,
            &self.new_root,
        )
    }

    /// Encoded public inputs: pair hash, siblings, old root, new root.
    pub fn public_values(&self) -> Result<Vec<[u8; FIELD_BYTES]>> {
        std::iter::once(&self.pair_hash)
            .chain(&self.siblings)
            .chain([&self.old_root, &self.new_root])
            .map(encode_field)
            .collect()
    }
}
