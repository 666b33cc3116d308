use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    config::AccumulatorConfig,
    defaults::DefaultNodes,
    encoding::check_width,
    error::validate_height,
    hash::{hash_nodes, Blake3LevelHasher},
    AccumulatorError, LevelHasher, Node, Result,
};

/// A contiguous run of node values at one level, starting at `start`.
///
/// Used to stage recomputed positions before they are committed, and by
/// proof maintenance to hold the nodes a batch produces.
#[derive(Debug, Clone)]
pub(crate) struct LevelRun {
    pub(crate) start: u64,
    pub(crate) values: Vec<Node>,
}

impl LevelRun {
    /// Value at `position` after the run was produced.
    ///
    /// Positions left of the run were not touched, so `unchanged` is
    /// returned for them. Positions right of the run are empty subtrees.
    pub(crate) fn value_at<'a>(
        &'a self,
        position: u64,
        unchanged: &'a Node,
        default: &'a Node,
    ) -> &'a Node {
        if position < self.start {
            return unchanged;
        }
        usize::try_from(position - self.start)
            .ok()
            .and_then(|offset| self.values.get(offset))
            .unwrap_or(default)
    }
}

/// An append-only sparse Merkle tree.
///
/// Level 0 holds the leaves and level `height` holds the root. Each level
/// stores only the positions written so far; anything past the end of a row
/// equals that level's default. Position `p` at level `i + 1` is
/// `hash(cell(i, 2p), cell(i, 2p + 1), i)`, recomputed on every insertion.
///
/// The tree is not synchronised. Readers may share it, but writers need
/// exclusive access (`&mut self`).
#[derive(Debug, Clone)]
pub struct SparseMerkleTree<H = Blake3LevelHasher> {
    height: u8,
    cells: Vec<Vec<Node>>,
    hasher: H,
    defaults: Arc<DefaultNodes>,
}

impl SparseMerkleTree<Blake3LevelHasher> {
    /// Create an empty tree hashed with [`Blake3LevelHasher`].
    pub fn with_blake3(height: u8) -> Result<Self> {
        Self::new(height, Blake3LevelHasher)
    }
}

impl<H: LevelHasher> SparseMerkleTree<H> {
    /// Create an empty tree of the given height.
    ///
    /// Height must be below [`DEFAULT_TABLE_LEN`](crate::DEFAULT_TABLE_LEN).
    pub fn new(height: u8, hasher: H) -> Result<Self> {
        validate_height(height)?;
        let defaults = hasher.default_nodes()?;
        trace!(height, "created sparse merkle tree");
        Ok(Self {
            height,
            cells: vec![Vec::new(); usize::from(height) + 1],
            hasher,
            defaults,
        })
    }

    /// Create an empty tree from settings.
    pub fn from_config(config: &AccumulatorConfig, hasher: H) -> Result<Self> {
        Self::new(config.height, hasher)
    }

    /// Number of levels below the root.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Maximum number of leaves.
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    /// Number of leaves appended so far.
    pub fn size(&self) -> u64 {
        self.cells[0].len() as u64
    }

    /// Returns `true` if no leaf has been appended.
    pub fn is_empty(&self) -> bool {
        self.cells[0].is_empty()
    }

    /// Number of explicitly stored positions at `level`, never more than
    /// the level's width.
    pub fn level_size(&self, level: u8) -> Result<u64> {
        self.check_level(level)?;
        Ok(self.cells[usize::from(level)].len() as u64)
    }

    /// The hashing port this tree was built with.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// The default table shared by this tree.
    pub fn defaults(&self) -> &DefaultNodes {
        &self.defaults
    }

    /// Node value at `(level, index)`, or the level default if unwritten.
    pub fn cell(&self, level: u8, index: u64) -> Result<&Node> {
        self.check_level(level)?;
        let width = self.capacity() >> level;
        if index >= width {
            return Err(AccumulatorError::IndexOutOfRange {
                index,
                level,
                width: width.into(),
            });
        }
        Ok(self.cell_or_default(usize::from(level), index))
    }

    /// The leaf at `index`, if it has been appended.
    pub fn leaf(&self, index: u64) -> Option<&Node> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cells[0].get(i))
    }

    /// The root value.
    pub fn root(&self) -> &Node {
        self.cell_or_default(usize::from(self.height), 0)
    }

    /// Append one leaf. See [`push_many`](Self::push_many).
    pub fn push(&mut self, leaf: Node) -> Result<(u64, u64)> {
        self.push_many([leaf])
    }

    /// Append leaves in order and recompute every affected ancestor.
    ///
    /// Returns `(first_index, hash_calls)`. At level `i` the positions
    /// `index >> i ..= (index + count) >> i` are recomputed, capped at the
    /// last position of the level. All new values are staged first, so on
    /// error the tree is left untouched.
    pub fn push_many<I>(&mut self, elements: I) -> Result<(u64, u64)>
    where
        I: IntoIterator<Item = Node>,
    {
        let elements: Vec<Node> = elements.into_iter().collect();
        let index = self.size();
        let count = elements.len() as u64;
        let capacity = self.capacity();
        let end = index
            .checked_add(count)
            .filter(|end| *end <= capacity)
            .ok_or(AccumulatorError::CapacityExceeded {
                requested: u128::from(index) + u128::from(count),
                capacity: capacity.into(),
            })?;
        if count == 0 {
            return Ok((index, 0));
        }
        for element in &elements {
            check_width(element)?;
        }

        let mut staged = Vec::with_capacity(self.cells.len());
        staged.push(LevelRun {
            start: index,
            values: elements,
        });
        let mut hash_calls = 0u64;
        for level in 1..self.cells.len() {
            let below = &staged[level - 1];
            // a batch that fills the tree would reach one past the last position
            let last = (capacity >> level) - 1;
            let (lo, hi) = (index >> level, (end >> level).min(last));
            let mut values = Vec::with_capacity((hi - lo + 1) as usize);
            for position in lo..=hi {
                let left = self.staged_cell(level - 1, below, 2 * position);
                let right = self.staged_cell(level - 1, below, 2 * position + 1);
                values.push(hash_nodes(&self.hasher, left, right, (level - 1) as u8)?);
                hash_calls += 1;
            }
            staged.push(LevelRun { start: lo, values });
        }

        for (level, run) in staged.into_iter().enumerate() {
            let row = &mut self.cells[level];
            let start = run.start as usize;
            row.truncate(start);
            row.resize(start, self.defaults.as_slice()[level].clone());
            row.extend(run.values);
        }
        debug!(first_index = index, count, hash_calls, "appended leaves");
        Ok((index, hash_calls))
    }

    /// Sibling path for `index`, one node per level from the leaves up.
    pub fn proof(&self, index: u64) -> Result<Vec<Node>> {
        self.proof_from(index, 0)
    }

    /// Sibling path for `index` starting at level `offset`.
    ///
    /// Used when the caller folds in the lower levels itself, e.g. a pair of
    /// leaves hashed into a level-1 node.
    pub fn proof_from(&self, index: u64, offset: u8) -> Result<Vec<Node>> {
        if index >= self.capacity() {
            return Err(AccumulatorError::IndexOutOfRange {
                index,
                level: 0,
                width: self.capacity().into(),
            });
        }
        if offset > self.height {
            return Err(AccumulatorError::InvalidLevel {
                level: offset.into(),
                limit: usize::from(self.height) + 1,
            });
        }
        Ok((usize::from(offset)..usize::from(self.height))
            .map(|level| self.cell_or_default(level, (index >> level) ^ 1).clone())
            .collect())
    }

    /// Sibling path of the next free slot, `proof(size())`.
    ///
    /// This is the path proof maintenance consumes.
    pub fn frontier_proof(&self) -> Result<Vec<Node>> {
        self.proof(self.size())
    }

    fn check_level(&self, level: u8) -> Result<()> {
        if level > self.height {
            return Err(AccumulatorError::InvalidLevel {
                level: level.into(),
                limit: usize::from(self.height) + 1,
            });
        }
        Ok(())
    }

    fn cell_or_default(&self, level: usize, index: u64) -> &Node {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cells[level].get(i))
            .unwrap_or(&self.defaults.as_slice()[level])
    }

    // Committed rows hold stale values from `run.start` on while a push is
    // staged, so the run takes precedence there.
    fn staged_cell<'a>(&'a self, level: usize, run: &'a LevelRun, position: u64) -> &'a Node {
        if position < run.start {
            return self.cell_or_default(level, position);
        }
        run.value_at(position, &self.defaults.as_slice()[level], &self.defaults.as_slice()[level])
    }
}
