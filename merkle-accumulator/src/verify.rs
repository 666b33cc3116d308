//! Root recomputation from a sibling path. Pure functions, no tree needed.

use crate::{
    encoding::encode_field,
    hash::{hash_nodes, MAX_HASH_LEVEL},
    AccumulatorError, LevelHasher, Node, Result,
};

#[cfg(any(test, feature = "test_utils"))]
pub use random::{random_field_element, random_right_leaning_proof};

/// Fold `leaf` up through `proof` and return the resulting root.
///
/// `proof[i]` is the sibling at level `i + offset`. When bit `i + offset` of
/// `index` is 0 the running value is the left input, otherwise the right.
pub fn recompute_root<H: LevelHasher + ?Sized>(
    hasher: &H,
    proof: &[Node],
    index: u64,
    leaf: &Node,
    offset: u8,
) -> Result<Node> {
    let mut root = leaf.clone();
    for (i, sibling) in proof.iter().enumerate() {
        let level = i + usize::from(offset);
        if level >= usize::from(MAX_HASH_LEVEL) {
            return Err(AccumulatorError::InvalidLevel {
                level,
                limit: MAX_HASH_LEVEL.into(),
            });
        }
        root = if (index >> level) & 1 == 0 {
            hash_nodes(hasher, &root, sibling, level as u8)?
        } else {
            hash_nodes(hasher, sibling, &root, level as u8)?
        };
    }
    Ok(root)
}

/// Recompute the root and compare it with `expected`.
pub fn verify_root<H: LevelHasher + ?Sized>(
    hasher: &H,
    proof: &[Node],
    index: u64,
    leaf: &Node,
    offset: u8,
    expected: &Node,
) -> Result<()> {
    let actual = recompute_root(hasher, proof, index, leaf, offset)?;
    if &actual != expected {
        return Err(AccumulatorError::RootMismatch {
            expected: hex_node(expected),
            actual: hex_node(&actual),
        });
    }
    Ok(())
}

pub(crate) fn hex_node(node: &Node) -> String {
    match encode_field(node) {
        Ok(bytes) => hex::encode(bytes),
        Err(_) => node.to_str_radix(16),
    }
}

/// Synthetic proofs and leaves for tests and benchmarks.
#[cfg(any(test, feature = "test_utils"))]
mod random {
    use num_bigint::BigUint;
    use rand::RngCore;

    use crate::{
        defaults::{DefaultNodes, DEFAULT_TABLE_LEN},
        encoding::FIELD_BYTES,
        hash::fr_modulus,
        AccumulatorError, Node, Result,
    };

    /// Synthetic sibling path for `index`.
    ///
    /// Levels where `index` has a set bit get a random field element (a filled
    /// left neighbour); all other levels get the level default, as if nothing
    /// had been appended to the right of `index`.
    pub fn random_right_leaning_proof<R: RngCore + ?Sized>(
        rng: &mut R,
        defaults: &DefaultNodes,
        length: usize,
        index: u64,
    ) -> Result<Vec<Node>> {
        if length > DEFAULT_TABLE_LEN {
            return Err(AccumulatorError::MalformedProof(format!(
                "proof has {} levels, at most {} are supported",
                length, DEFAULT_TABLE_LEN
            )));
        }
        (0..length)
            .map(|level| {
                if (index >> level) & 1 == 1 {
                    Ok(random_field_element(rng))
                } else {
                    defaults.get(level).cloned()
                }
            })
            .collect()
    }

    /// Uniform-ish element of the BLS12-381 scalar field.
    pub fn random_field_element<R: RngCore + ?Sized>(rng: &mut R) -> Node {
        let mut bytes = [0u8; FIELD_BYTES];
        rng.fill_bytes(&mut bytes);
        BigUint::from_bytes_be(&bytes) % fr_modulus()
    }
}
