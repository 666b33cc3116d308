//! Proof maintenance across appends.
//!
//! A batch appended at `size` only changes nodes on or right of the path of
//! position `size`. Given the sibling path of that slot (the frontier proof)
//! the changed nodes can be rebuilt level by level from the batch alone:
//! at each level the run of new values is prefixed with the unchanged left
//! neighbour when the frontier position is odd, padded with the level
//! default when its length is odd, and hashed pairwise into the next level.
//! Siblings are then read from these runs instead of from a rebuilt tree.

use tracing::debug;

use crate::{
    defaults::{DefaultNodes, DEFAULT_TABLE_LEN},
    encoding::check_width,
    error::capacity_for_height,
    hash::hash_nodes,
    tree::LevelRun,
    AccumulatorError, LevelHasher, Node, Result,
};

/// Move the frontier proof of slot `index` past a batch.
///
/// `sibling` must be `proof(index)` taken while the tree held exactly
/// `index` leaves, and `elements` is the batch appended at `index`. Returns
/// `proof(index + elements.len())` of the grown tree. The new slot must still
/// be addressable by a path of this length.
pub fn update_proof<H: LevelHasher + ?Sized>(
    hasher: &H,
    sibling: &[Node],
    index: u64,
    elements: &[Node],
) -> Result<Vec<Node>> {
    check_proof_len(sibling.len())?;
    let capacity = capacity_for_height(sibling.len());
    let count = elements.len() as u64;
    let target = index
        .checked_add(count)
        .filter(|target| u128::from(*target) < capacity)
        .ok_or(AccumulatorError::CapacityExceeded {
            requested: u128::from(index) + u128::from(count) + 1,
            capacity,
        })?;
    if count == 0 {
        return Ok(sibling.to_vec());
    }

    let defaults = hasher.default_nodes()?;
    let runs = fold_batch(hasher, &defaults, sibling, index, elements)?;
    debug!(
        proof_len = sibling.len(),
        index,
        count,
        "moved frontier proof past batch"
    );
    runs.iter()
        .zip(sibling)
        .enumerate()
        .map(|(level, (run, old))| -> Result<Node> {
            let position = (target >> level) ^ 1;
            Ok(run.value_at(position, old, defaults.get(level)?).clone())
        })
        .collect()
}

/// Refresh the proof of an existing leaf after a batch is appended.
///
/// `leaf_proof` is `proof(leaf_index)` and `frontier` is `proof(size)`, both
/// taken while the tree held `size` leaves; `elements` is appended at
/// `size`. Returns `proof(leaf_index)` of the grown tree, identical to what
/// a rebuilt tree would produce.
pub fn update_leaf_proof<H: LevelHasher + ?Sized>(
    hasher: &H,
    leaf_proof: &[Node],
    leaf_index: u64,
    frontier: &[Node],
    size: u64,
    elements: &[Node],
) -> Result<Vec<Node>> {
    check_proof_len(frontier.len())?;
    if leaf_proof.len() != frontier.len() {
        return Err(AccumulatorError::MalformedProof(format!(
            "leaf proof has {} levels but frontier proof has {}",
            leaf_proof.len(),
            frontier.len()
        )));
    }
    let capacity = capacity_for_height(frontier.len());
    if u128::from(leaf_index) >= capacity {
        return Err(AccumulatorError::IndexOutOfRange {
            index: leaf_index,
            level: 0,
            width: capacity,
        });
    }
    let count = elements.len() as u64;
    let new_size = u128::from(size) + u128::from(count);
    if new_size > capacity || (count > 0 && u128::from(size) >= capacity) {
        return Err(AccumulatorError::CapacityExceeded {
            requested: new_size,
            capacity,
        });
    }
    if count == 0 {
        return Ok(leaf_proof.to_vec());
    }

    let defaults = hasher.default_nodes()?;
    let runs = fold_batch(hasher, &defaults, frontier, size, elements)?;
    debug!(
        proof_len = frontier.len(),
        leaf_index,
        size,
        count,
        "refreshed leaf proof past batch"
    );
    runs.iter()
        .zip(leaf_proof)
        .enumerate()
        .map(|(level, (run, old))| -> Result<Node> {
            let position = (leaf_index >> level) ^ 1;
            Ok(run.value_at(position, old, defaults.get(level)?).clone())
        })
        .collect()
}

fn check_proof_len(len: usize) -> Result<()> {
    if len > DEFAULT_TABLE_LEN {
        return Err(AccumulatorError::MalformedProof(format!(
            "proof has {} levels, at most {} are supported",
            len, DEFAULT_TABLE_LEN
        )));
    }
    Ok(())
}

/// Build, for every level of the frontier proof, the run of node values
/// that the batch produces.
///
/// The run at level `i` starts at `(size >> i) & !1`, so pairs always align
/// with their parent.
fn fold_batch<H: LevelHasher + ?Sized>(
    hasher: &H,
    defaults: &DefaultNodes,
    frontier: &[Node],
    size: u64,
    elements: &[Node],
) -> Result<Vec<LevelRun>> {
    for element in elements {
        check_width(element)?;
    }
    let mut runs: Vec<LevelRun> = Vec::with_capacity(frontier.len());
    for (level, left_neighbour) in frontier.iter().enumerate() {
        let position = size >> level;
        let offset = position & 1;
        let mut values = Vec::new();
        if offset == 1 {
            values.push(left_neighbour.clone());
        }
        match runs.last() {
            None => values.extend_from_slice(elements),
            Some(below) => {
                values.reserve(below.values.len() / 2 + 1);
                for pair in below.values.chunks_exact(2) {
                    values.push(hash_nodes(hasher, &pair[0], &pair[1], (level - 1) as u8)?);
                }
            }
        }
        if values.len() % 2 == 1 {
            values.push(defaults.get(level)?.clone());
        }
        runs.push(LevelRun {
            start: position - offset,
            values,
        });
    }
    Ok(runs)
}
