//! Level-tagged node hashing.
//!
//! The domain hash is an external primitive, so the tree only sees it through
//! the [`LevelHasher`] port. Node values are encoded to 32-byte big-endian
//! buffers on the way in and decoded on the way out; the argument order and
//! level tag are part of the protocol.

use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;

use crate::{
    defaults::DefaultNodes,
    encoding::{encode_field, FIELD_BYTES},
    AccumulatorError, Node, Result,
};

/// Hash levels must be strictly below this value.
pub const MAX_HASH_LEVEL: u8 = 63;

/// Domain tag prepended to internal node inputs.
const NODE_DOMAIN_TAG: u8 = 0x01;

/// Order of the BLS12-381 scalar field, big-endian.
const FR_MODULUS_BE: [u8; FIELD_BYTES] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Two-input hash parameterised by tree level.
///
/// `hash(left, right, level)` combines the children of a node at
/// `level + 1`. Implementations must be deterministic and free of side
/// effects. Swapping `left`/`right` or changing `level` must be treated as a
/// different input.
pub trait LevelHasher {
    /// Hash two encoded field elements at the given level.
    fn hash(
        &self,
        left: &[u8; FIELD_BYTES],
        right: &[u8; FIELD_BYTES],
        level: u8,
    ) -> Result<[u8; FIELD_BYTES]>;

    /// Per-level hashes of all-zero subtrees for this hasher.
    ///
    /// Called on every proof update, so implementations must build the table
    /// once per process (see [`DefaultNodes::compute`]) and hand out the
    /// shared copy.
    fn default_nodes(&self) -> Result<Arc<DefaultNodes>>;
}

impl<H: LevelHasher + ?Sized> LevelHasher for &H {
    fn hash(
        &self,
        left: &[u8; FIELD_BYTES],
        right: &[u8; FIELD_BYTES],
        level: u8,
    ) -> Result<[u8; FIELD_BYTES]> {
        (**self).hash(left, right, level)
    }

    fn default_nodes(&self) -> Result<Arc<DefaultNodes>> {
        (**self).default_nodes()
    }
}

/// Hash two node values through the port.
///
/// Rejects levels at or above [`MAX_HASH_LEVEL`] before the port is reached.
pub fn hash_nodes<H: LevelHasher + ?Sized>(
    hasher: &H,
    left: &Node,
    right: &Node,
    level: u8,
) -> Result<Node> {
    if level >= MAX_HASH_LEVEL {
        return Err(AccumulatorError::InvalidLevel {
            level: level.into(),
            limit: MAX_HASH_LEVEL.into(),
        });
    }
    let left = encode_field(left)?;
    let right = encode_field(right)?;
    let out = hasher.hash(&left, &right, level)?;
    Ok(BigUint::from_bytes_be(&out))
}

/// The BLS12-381 scalar field order.
pub fn fr_modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| BigUint::from_bytes_be(&FR_MODULUS_BE))
}

/// Returns `true` if the encoded value is a canonical scalar field element.
pub fn is_field_element(bytes: &[u8; FIELD_BYTES]) -> bool {
    // big-endian byte order compares like the integers it encodes
    bytes < &FR_MODULUS_BE
}

/// Blake3 level hasher over the BLS12-381 scalar field.
///
/// `hash = blake3(0x01 || level || left || right) mod r`. Inputs must already
/// be reduced modulo `r`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3LevelHasher;

impl LevelHasher for Blake3LevelHasher {
    fn hash(
        &self,
        left: &[u8; FIELD_BYTES],
        right: &[u8; FIELD_BYTES],
        level: u8,
    ) -> Result<[u8; FIELD_BYTES]> {
        if !is_field_element(left) || !is_field_element(right) {
            return Err(AccumulatorError::InvalidFieldElement);
        }
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[NODE_DOMAIN_TAG, level]);
        hasher.update(left);
        hasher.update(right);
        let digest = BigUint::from_bytes_be(hasher.finalize().as_bytes()) % fr_modulus();
        encode_field(&digest)
    }

    fn default_nodes(&self) -> Result<Arc<DefaultNodes>> {
        static TABLE: OnceLock<Arc<DefaultNodes>> = OnceLock::new();
        if let Some(table) = TABLE.get() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(DefaultNodes::compute(self)?);
        Ok(Arc::clone(TABLE.get_or_init(|| table)))
    }
}
