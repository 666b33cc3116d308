//! Wire form of sibling paths.
//!
//! An [`EncodedSiblingPath`] carries every sibling as a 32-byte big-endian
//! field element, the same encoding the domain hash and external verifiers
//! consume, and serialises with bincode.

use bincode::{Decode, Encode};

use crate::{
    defaults::DEFAULT_TABLE_LEN,
    encoding::{decode_field, encode_field, FIELD_BYTES},
    verify::{recompute_root, verify_root},
    AccumulatorError, LevelHasher, Node, Result,
};

/// Upper bound on decoded proof size.
const MAX_ENCODED_PROOF_BYTES: usize = 64 * 1024;

/// A sibling path for one leaf, ready to leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct EncodedSiblingPath {
    /// Position of the proved leaf.
    pub index: u64,
    /// Level of the first sibling.
    pub offset: u8,
    /// Siblings from level `offset` upward.
    pub siblings: Vec<[u8; FIELD_BYTES]>,
}

impl EncodedSiblingPath {
    /// Encode a sibling path produced by the tree.
    pub fn from_nodes(index: u64, offset: u8, siblings: &[Node]) -> Result<Self> {
        let siblings = siblings
            .iter()
            .map(encode_field)
            .collect::<Result<Vec<_>>>()?;
        let path = Self {
            index,
            offset,
            siblings,
        };
        path.validate()?;
        Ok(path)
    }

    /// Decode the siblings back into node values.
    pub fn to_nodes(&self) -> Vec<Node> {
        self.siblings
            .iter()
            .map(|bytes| Node::from_bytes_be(bytes))
            .collect()
    }

    /// Siblings as a flat list of 32-byte buffers, lowest level first.
    pub fn public_values(&self) -> &[[u8; FIELD_BYTES]] {
        &self.siblings
    }

    /// Root obtained by folding the encoded `leaf` up this path.
    pub fn recompute_root<H: LevelHasher + ?Sized>(
        &self,
        hasher: &H,
        leaf: &[u8],
    ) -> Result<Node> {
        let leaf = decode_field(leaf)?;
        recompute_root(hasher, &self.to_nodes(), self.index, &leaf, self.offset)
    }

    /// Check the encoded `leaf` against an encoded `root`.
    pub fn verify<H: LevelHasher + ?Sized>(
        &self,
        hasher: &H,
        leaf: &[u8],
        root: &[u8],
    ) -> Result<()> {
        let leaf = decode_field(leaf)?;
        let root = decode_field(root)?;
        verify_root(
            hasher,
            &self.to_nodes(),
            self.index,
            &leaf,
            self.offset,
            &root,
        )
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| AccumulatorError::Encoding(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects paths that reach past the default table.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<MAX_ENCODED_PROOF_BYTES>();
        let (path, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| AccumulatorError::Encoding(format!("decode error: {}", e)))?;
        path.validate()?;
        Ok(path)
    }

    fn validate(&self) -> Result<()> {
        let top = usize::from(self.offset) + self.siblings.len();
        if top > DEFAULT_TABLE_LEN {
            return Err(AccumulatorError::MalformedProof(format!(
                "path reaches level {}, at most {} levels are supported",
                top, DEFAULT_TABLE_LEN
            )));
        }
        if u128::from(self.index) >> top != 0 {
            return Err(AccumulatorError::MalformedProof(format!(
                "index {} does not fit in a path of {} levels",
                self.index, top
            )));
        }
        Ok(())
    }
}
