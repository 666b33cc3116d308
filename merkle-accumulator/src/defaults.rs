//! Hashes of all-zero subtrees, one per level.

use tracing::trace;

use crate::{hash::hash_nodes, AccumulatorError, LevelHasher, Node, Result};

/// Number of entries in a default table.
///
/// Bounds both the tree height (`height < DEFAULT_TABLE_LEN`) and the length
/// of a proof accepted by proof maintenance (`len <= DEFAULT_TABLE_LEN`).
pub const DEFAULT_TABLE_LEN: usize = 64;

/// `defaults[0] = 0`, `defaults[i] = hash(defaults[i-1], defaults[i-1], i-1)`.
///
/// Immutable once built. Trees share a table through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultNodes {
    nodes: Vec<Node>,
}

impl DefaultNodes {
    /// Build the table by repeatedly hashing the previous level with itself.
    pub fn compute<H: LevelHasher + ?Sized>(hasher: &H) -> Result<Self> {
        let mut nodes = Vec::with_capacity(DEFAULT_TABLE_LEN);
        let mut current = Node::default();
        nodes.push(current.clone());
        for level in 1..DEFAULT_TABLE_LEN {
            current = hash_nodes(hasher, &current, &current, (level - 1) as u8)?;
            nodes.push(current.clone());
        }
        trace!(levels = nodes.len(), "computed default subtree table");
        Ok(Self { nodes })
    }

    /// Default value at `level`.
    pub fn get(&self, level: usize) -> Result<&Node> {
        self.nodes.get(level).ok_or(AccumulatorError::InvalidLevel {
            level,
            limit: DEFAULT_TABLE_LEN,
        })
    }

    /// The whole table, indexed by level.
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of levels in the table.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a table holds at least the leaf default.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
