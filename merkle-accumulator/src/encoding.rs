//! Canonical encoding of field elements.
//!
//! Every value exchanged with the domain hash or with an external proof
//! verifier is a 32-byte big-endian buffer. [`encode`] turns integers into
//! such buffers and [`decode`] turns exactly-32-byte buffers back into
//! integers; both walk sequences and records element-wise.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::{AccumulatorError, Result};

/// Width in bytes of an encoded field element.
pub const FIELD_BYTES: usize = 32;

/// A value crossing the boundary to the external hash or proof system.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Non-negative integer, at most 256 bits wide once encoded.
    Int(BigUint),
    /// Raw buffer.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    Sequence(Vec<Value>),
    /// Keyed record.
    Record(BTreeMap<String, Value>),
}

impl From<BigUint> for Value {
    fn from(value: BigUint) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(BigUint::from(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

/// Replace every integer with its 32-byte big-endian encoding.
///
/// Buffers pass through untouched. Fails with
/// [`AccumulatorError::ValueTooLarge`] if an integer needs more than 256 bits.
pub fn encode(value: Value) -> Result<Value> {
    match value {
        Value::Int(n) => Ok(Value::Bytes(encode_field(&n)?.to_vec())),
        Value::Bytes(bytes) => Ok(Value::Bytes(bytes)),
        Value::Sequence(items) => items
            .into_iter()
            .map(encode)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Record(fields) => fields
            .into_iter()
            .map(|(key, v)| encode(v).map(|v| (key, v)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Value::Record),
    }
}

/// Replace every buffer of exactly 32 bytes with the integer it encodes.
///
/// Buffers of any other length and integers pass through untouched.
pub fn decode(value: Value) -> Value {
    match value {
        Value::Bytes(bytes) if bytes.len() == FIELD_BYTES => {
            Value::Int(BigUint::from_bytes_be(&bytes))
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(decode).collect()),
        Value::Record(fields) => Value::Record(
            fields
                .into_iter()
                .map(|(key, v)| (key, decode(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Encode one integer as a left-padded 32-byte big-endian buffer.
pub fn encode_field(value: &BigUint) -> Result<[u8; FIELD_BYTES]> {
    check_width(value)?;
    let be = value.to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    // zero encodes as a single 0x00 byte
    out[FIELD_BYTES - be.len()..].copy_from_slice(&be);
    Ok(out)
}

/// Decode a buffer that must hold exactly one encoded integer.
pub fn decode_field(bytes: &[u8]) -> Result<BigUint> {
    if bytes.len() != FIELD_BYTES {
        return Err(AccumulatorError::MalformedProof(format!(
            "expected a {}-byte field element, got {} bytes",
            FIELD_BYTES,
            bytes.len()
        )));
    }
    Ok(BigUint::from_bytes_be(bytes))
}

/// Check that an integer is representable without encoding it.
pub(crate) fn check_width(value: &BigUint) -> Result<()> {
    let bits = value.bits();
    if bits > (FIELD_BYTES as u64) * 8 {
        return Err(AccumulatorError::ValueTooLarge { bits });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encode_zero_is_all_zero_bytes() {
        let encoded = encode_field(&BigUint::from(0u8)).expect("zero fits");
        assert_eq!(encoded, [0u8; 32]);
    }

    #[test]
    fn test_encode_is_big_endian_left_padded() {
        let encoded = encode_field(&BigUint::from(0x0102u32)).expect("fits");
        assert_eq!(encoded[30], 0x01);
        assert_eq!(encoded[31], 0x02);
        assert!(encoded[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_rejects_wide_integer() {
        let wide = BigUint::from(1u8) << 256;
        assert_eq!(
            encode_field(&wide),
            Err(AccumulatorError::ValueTooLarge { bits: 257 })
        );
        let max = (BigUint::from(1u8) << 256) - 1u8;
        assert_eq!(encode_field(&max).expect("fits"), [0xff; 32]);
    }

    #[test]
    fn test_decode_field_requires_exact_width() {
        assert!(matches!(
            decode_field(&[1u8; 31]),
            Err(AccumulatorError::MalformedProof(_))
        ));
        assert_eq!(
            decode_field(&[0u8; 32]).expect("32 bytes"),
            BigUint::from(0u8)
        );
    }

    #[test]
    fn test_nested_record_round_trip() {
        let mut note = BTreeMap::new();
        note.insert("amount".to_string(), Value::from(10u64));
        note.insert("memo".to_string(), Value::Bytes(b"hello".to_vec()));
        note.insert(
            "path".to_string(),
            Value::Sequence(vec![Value::from(1u64), Value::from(2u64)]),
        );
        let original = Value::Record(note);

        let encoded = encode(original.clone()).expect("encode");
        let Value::Record(fields) = &encoded else {
            panic!("record shape must be preserved");
        };
        assert_eq!(fields["amount"], Value::Bytes(encode_field(&10u8.into()).unwrap().to_vec()));
        // short buffers are not integers
        assert_eq!(fields["memo"], Value::Bytes(b"hello".to_vec()));

        assert_eq!(decode(encoded), original);
    }

    #[test]
    fn test_decode_leaves_other_lengths_alone() {
        let value = Value::Sequence(vec![Value::Bytes(vec![7u8; 33]), Value::Bytes(vec![])]);
        assert_eq!(decode(value.clone()), value);
    }

    #[test]
    fn test_encode_fails_inside_sequence() {
        let value = Value::Sequence(vec![Value::from(1u64), Value::Int(BigUint::from(1u8) << 300)]);
        assert!(matches!(
            encode(value),
            Err(AccumulatorError::ValueTooLarge { bits: 301 })
        ));
    }

    proptest! {
        #[test]
        fn test_integer_round_trip(bytes in prop::array::uniform32(any::<u8>())) {
            let x = BigUint::from_bytes_be(&bytes);
            let encoded = encode(Value::Int(x.clone())).expect("fits");
            prop_assert_eq!(decode(encoded), Value::Int(x));
        }

        #[test]
        fn test_non_field_buffers_pass_through(
            bytes in prop::collection::vec(any::<u8>(), 0..80)
                .prop_filter("not field width", |b| b.len() != FIELD_BYTES),
        ) {
            let value = Value::Bytes(bytes);
            prop_assert_eq!(decode(value.clone()), value.clone());
            prop_assert_eq!(encode(value.clone()).expect("buffers pass"), value);
        }
    }
}
