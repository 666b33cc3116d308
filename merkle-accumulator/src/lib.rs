//! Append-only sparse Merkle accumulator.
//!
//! A binary tree of fixed height whose leaves are field elements appended
//! left to right. Only written positions are stored; every other position
//! equals the hash of an all-zero subtree at that level. Internal nodes are
//! combined with a level-tagged two-input hash:
//!
//! `node(i + 1, p) = hash(node(i, 2p), node(i, 2p + 1), i)`
//!
//! Besides insertion, root and sibling-path queries, the crate can move an
//! existing sibling path past a batch of appended leaves without rebuilding
//! the tree (see [`update_leaf_proof`]).

#![warn(missing_docs)]

mod accumulator;
mod config;
mod defaults;
pub mod encoding;
mod error;
pub mod hash;
mod proof;
pub(crate) mod tree;
mod update;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;

/// A node value: leaf, internal hash or default.
pub type Node = num_bigint::BigUint;

pub use accumulator::PairAppendWitness;
pub use config::{AccumulatorConfig, DEFAULT_HEIGHT, MAX_HEIGHT};
pub use defaults::{DefaultNodes, DEFAULT_TABLE_LEN};
pub use encoding::{decode, encode, Value};
pub use error::{AccumulatorError, Result};
pub use hash::{Blake3LevelHasher, LevelHasher, MAX_HASH_LEVEL};
pub use num_bigint::BigUint;
pub use proof::EncodedSiblingPath;
pub use tree::SparseMerkleTree;
pub use update::{update_leaf_proof, update_proof};
pub use verify::{recompute_root, verify_root};
#[cfg(any(test, feature = "test_utils"))]
pub use verify::{random_field_element, random_right_leaning_proof};
