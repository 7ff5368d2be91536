//! Lexicographically-ordered key encoding.
//!
//! Partition keys are compared as plain byte strings both client- and
//! server-side, so every column encoding here must preserve the value
//! order of its type in the byte order of its encoding:
//!
//! - signed integers: big-endian with the sign bit flipped;
//! - unsigned integers and booleans: big-endian;
//! - floats: IEEE-754 bits, all bits inverted for negative values and the
//!   sign bit flipped otherwise;
//! - var-len bytes: verbatim when the column is the last one in the key,
//!   otherwise `0x00` escaped as `0x00 0x01` and terminated by `0x00 0x00`
//!   so that no value is a prefix of a longer sibling.
//!
//! These bytes are wire-visible: the server addresses tablets with the same
//! encoding, so the exact byte sequences here are part of the protocol.

use strata_result::{Error, Result};
use strata_types::{ColumnIdx, DataType, Datum};

use crate::row::PartialRow;
use crate::schema::Schema;

const SIGN_FLIP_32: u32 = 1 << 31;
const SIGN_FLIP_64: u64 = 1 << 63;

/// Append the order-preserving encoding of `value` to `buf`.
///
/// `is_last` must be `true` iff the column is the final one of the key being
/// built; it controls var-len escaping and termination.
pub fn encode_column_into(buf: &mut Vec<u8>, value: &Datum, is_last: bool) {
    match value {
        Datum::Int8(v) => buf.push((*v as u8) ^ 0x80),
        Datum::Int16(v) => buf.extend_from_slice(&((*v as u16) ^ 0x8000).to_be_bytes()),
        Datum::Int32(v) => buf.extend_from_slice(&((*v as u32) ^ SIGN_FLIP_32).to_be_bytes()),
        Datum::Int64(v) => buf.extend_from_slice(&((*v as u64) ^ SIGN_FLIP_64).to_be_bytes()),
        Datum::UInt8(v) => buf.push(*v),
        Datum::UInt16(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Datum::UInt32(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Datum::UInt64(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Datum::Bool(v) => buf.push(u8::from(*v)),
        Datum::Float32(v) => buf.extend_from_slice(&order_bits_f32(*v).to_be_bytes()),
        Datum::Float64(v) => buf.extend_from_slice(&order_bits_f64(*v).to_be_bytes()),
        Datum::String(v) => encode_var_len(buf, v.as_bytes(), is_last),
        Datum::Binary(v) => encode_var_len(buf, v, is_last),
    }
}

fn encode_var_len(buf: &mut Vec<u8>, bytes: &[u8], is_last: bool) {
    if is_last {
        buf.extend_from_slice(bytes);
        return;
    }
    for &b in bytes {
        if b == 0x00 {
            buf.extend_from_slice(&[0x00, 0x01]);
        } else {
            buf.push(b);
        }
    }
    buf.extend_from_slice(&[0x00, 0x00]);
}

#[inline]
fn order_bits_f32(v: f32) -> u32 {
    let bits = v.to_bits();
    if bits & SIGN_FLIP_32 != 0 { !bits } else { bits ^ SIGN_FLIP_32 }
}

#[inline]
fn order_bits_f64(v: f64) -> u64 {
    let bits = v.to_bits();
    if bits & SIGN_FLIP_64 != 0 { !bits } else { bits ^ SIGN_FLIP_64 }
}

/// Encode the listed row columns, in order, as a range key.
///
/// Every listed cell must be set; the final column is encoded with
/// `is_last = true`.
pub fn encode_range_key(row: &PartialRow<'_>, column_idxs: &[ColumnIdx]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for (i, &idx) in column_idxs.iter().enumerate() {
        let value = row.get(idx).ok_or_else(|| {
            Error::Internal(format!("range key column index {idx} is not set"))
        })?;
        encode_column_into(&mut buf, value, i + 1 == column_idxs.len());
    }
    Ok(buf)
}

/// Append a hash bucket index as four big-endian bytes.
#[inline]
pub fn encode_hash_bucket(buf: &mut Vec<u8>, bucket: u32) {
    buf.extend_from_slice(&bucket.to_be_bytes());
}

/// Lexicographically bump the key formed by `column_idxs` by one unit.
///
/// Columns are incremented from the rightmost index leftward; a column that
/// overflows wraps to its type minimum and carries into its predecessor.
/// Returns `true` iff some column incremented without overflow, i.e. the
/// resulting key is still a valid successor. All listed cells must be set.
pub fn increment_key(row: &mut PartialRow<'_>, column_idxs: &[ColumnIdx]) -> Result<bool> {
    for &idx in column_idxs.iter().rev() {
        if row.increment_column(idx)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decode an encoded range key back into a partial row.
///
/// The inverse of [`encode_range_key`] over the same column list. Trailing
/// garbage, truncated values, and malformed escape sequences are rejected.
pub fn decode_range_key<'a>(
    schema: &'a Schema,
    column_idxs: &[ColumnIdx],
    bytes: &[u8],
) -> Result<PartialRow<'a>> {
    let mut row = schema.new_partial_row();
    let mut rest = bytes;
    for (i, &idx) in column_idxs.iter().enumerate() {
        let is_last = i + 1 == column_idxs.len();
        let data_type = schema.column_by_index(idx).data_type();
        let (value, remaining) = decode_column(data_type, rest, is_last)?;
        row.set(idx, value)?;
        rest = remaining;
    }
    if !rest.is_empty() {
        return Err(Error::invalid_argument(format!(
            "{} trailing bytes after range key",
            rest.len()
        )));
    }
    Ok(row)
}

fn decode_column<'b>(
    data_type: DataType,
    bytes: &'b [u8],
    is_last: bool,
) -> Result<(Datum, &'b [u8])> {
    if let Some(width) = data_type.width() {
        if bytes.len() < width {
            return Err(Error::invalid_argument(format!(
                "range key truncated: {} bytes left for {} column",
                bytes.len(),
                data_type.name()
            )));
        }
        let (head, rest) = bytes.split_at(width);
        return Ok((decode_fixed_column(data_type, head)?, rest));
    }

    let (raw, rest) = if is_last {
        (bytes.to_vec(), &bytes[bytes.len()..])
    } else {
        decode_escaped(bytes)?
    };
    let value = match data_type {
        DataType::String => Datum::from_raw(DataType::String, &raw)?,
        _ => Datum::Binary(raw),
    };
    Ok((value, rest))
}

fn decode_fixed_column(data_type: DataType, bytes: &[u8]) -> Result<Datum> {
    let value = match data_type {
        DataType::Int8 => Datum::Int8((bytes[0] ^ 0x80) as i8),
        DataType::Int16 => Datum::Int16((be_u16(bytes) ^ 0x8000) as i16),
        DataType::Int32 => Datum::Int32((be_u32(bytes) ^ SIGN_FLIP_32) as i32),
        DataType::Int64 => Datum::Int64((be_u64(bytes) ^ SIGN_FLIP_64) as i64),
        DataType::UInt8 => Datum::UInt8(bytes[0]),
        DataType::UInt16 => Datum::UInt16(be_u16(bytes)),
        DataType::UInt32 => Datum::UInt32(be_u32(bytes)),
        DataType::UInt64 => Datum::UInt64(be_u64(bytes)),
        DataType::Bool => Datum::Bool(bytes[0] != 0),
        DataType::Float32 => {
            let enc = be_u32(bytes);
            let bits = if enc & SIGN_FLIP_32 != 0 { enc ^ SIGN_FLIP_32 } else { !enc };
            Datum::Float32(f32::from_bits(bits))
        }
        DataType::Float64 => {
            let enc = be_u64(bytes);
            let bits = if enc & SIGN_FLIP_64 != 0 { enc ^ SIGN_FLIP_64 } else { !enc };
            Datum::Float64(f64::from_bits(bits))
        }
        DataType::String | DataType::Binary => {
            return Err(Error::Internal("var-len column in fixed-width decode".into()));
        }
    };
    Ok(value)
}

fn decode_escaped(bytes: &[u8]) -> Result<(Vec<u8>, &[u8])> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != 0x00 {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(0x00) => return Ok((out, &bytes[i + 2..])),
            Some(0x01) => {
                out.push(0x00);
                i += 2;
            }
            _ => {
                return Err(Error::invalid_argument(
                    "malformed escape sequence in range key",
                ));
            }
        }
    }
    Err(Error::invalid_argument("unterminated var-len range key column"))
}

#[inline]
fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

#[inline]
fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
fn be_u64(bytes: &[u8]) -> u64 {
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;

    fn encode_one(value: &Datum, is_last: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_column_into(&mut buf, value, is_last);
        buf
    }

    #[test]
    fn signed_ints_flip_sign_bit() {
        assert_eq!(encode_one(&Datum::Int8(0), true), vec![0x80]);
        assert_eq!(encode_one(&Datum::Int8(-128), true), vec![0x00]);
        assert_eq!(encode_one(&Datum::Int8(127), true), vec![0xff]);
        assert_eq!(
            encode_one(&Datum::Int32(0), true),
            vec![0x80, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encode_one(&Datum::Int32(-1), true),
            vec![0x7f, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            encode_one(&Datum::Int64(1), true),
            vec![0x80, 0, 0, 0, 0, 0, 0, 0x01]
        );
    }

    #[test]
    fn unsigned_and_bool_are_plain_big_endian() {
        assert_eq!(
            encode_one(&Datum::UInt32(0x01020304), true),
            vec![0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(encode_one(&Datum::Bool(false), true), vec![0x00]);
        assert_eq!(encode_one(&Datum::Bool(true), true), vec![0x01]);
    }

    #[test]
    fn float_encoding_matches_numeric_order() {
        let values = [
            f64::NEG_INFINITY,
            -1.5,
            -0.0,
            0.0,
            f64::MIN_POSITIVE,
            1.5,
            f64::INFINITY,
        ];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode_one(&Datum::Float64(*v), true))
            .collect();
        for window in encoded.windows(2) {
            assert!(window[0] <= window[1], "float order not preserved");
        }
    }

    #[test]
    fn var_len_escaping() {
        // Last column: verbatim.
        assert_eq!(
            encode_one(&Datum::Binary(vec![0x00, 0x61]), true),
            vec![0x00, 0x61]
        );
        // Non-last: zeros escaped, terminator appended.
        assert_eq!(
            encode_one(&Datum::Binary(vec![0x00, 0x61]), false),
            vec![0x00, 0x01, 0x61, 0x00, 0x00]
        );
        assert_eq!(encode_one(&Datum::String("".into()), false), vec![0x00, 0x00]);
    }

    #[test]
    fn int_order_preserved() {
        let values = [i32::MIN, -1, 0, 1, i32::MAX];
        let encoded: Vec<Vec<u8>> = values
            .iter()
            .map(|v| encode_one(&Datum::Int32(*v), true))
            .collect();
        for window in encoded.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    fn two_col_schema(a: DataType, b: DataType) -> Schema {
        Schema::new(
            vec![
                ColumnSchema::new("a", 0, a, false),
                ColumnSchema::new("b", 1, b, false),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn range_key_round_trip() {
        let schema = two_col_schema(DataType::String, DataType::Int32);
        let mut row = schema.new_partial_row();
        row.set(0, Datum::String("a\0b".into())).unwrap();
        row.set(1, Datum::Int32(-5)).unwrap();

        let key = encode_range_key(&row, &[0, 1]).unwrap();
        assert_eq!(
            key,
            vec![0x61, 0x00, 0x01, 0x62, 0x00, 0x00, 0x7f, 0xff, 0xff, 0xfb]
        );

        let decoded = decode_range_key(&schema, &[0, 1], &key).unwrap();
        assert_eq!(decoded.get(0), Some(&Datum::String("a\0b".into())));
        assert_eq!(decoded.get(1), Some(&Datum::Int32(-5)));
    }

    #[test]
    fn decode_rejects_malformed_keys() {
        let schema = two_col_schema(DataType::String, DataType::Int32);
        // Unterminated string column.
        assert!(decode_range_key(&schema, &[0, 1], &[0x61]).is_err());
        // Truncated int column.
        assert!(decode_range_key(&schema, &[0, 1], &[0x61, 0x00, 0x00, 0x80]).is_err());
        // Trailing bytes.
        let mut key = vec![0x61, 0x00, 0x00];
        key.extend_from_slice(&[0x80, 0, 0, 0]);
        key.push(0xff);
        assert!(decode_range_key(&schema, &[0, 1], &key).is_err());
    }

    #[test]
    fn encode_min_increment_decode_is_successor() {
        let schema = Schema::new(
            vec![ColumnSchema::new("k", 0, DataType::Int32, false)],
            1,
        )
        .unwrap();
        let mut row = schema.new_partial_row();
        row.set_min(0).unwrap();
        let min_key = encode_range_key(&row, &[0]).unwrap();

        assert!(increment_key(&mut row, &[0]).unwrap());
        let next_key = encode_range_key(&row, &[0]).unwrap();
        assert!(min_key < next_key);

        let decoded = decode_range_key(&schema, &[0], &next_key).unwrap();
        assert_eq!(decoded.get(0), Some(&Datum::Int32(i32::MIN + 1)));
    }

    #[test]
    fn increment_key_carries_left() {
        let schema = two_col_schema(DataType::Int32, DataType::Int32);
        let mut row = schema.new_partial_row();
        row.set(0, Datum::Int32(3)).unwrap();
        row.set(1, Datum::Int32(i32::MAX)).unwrap();

        assert!(increment_key(&mut row, &[0, 1]).unwrap());
        assert_eq!(row.get(0), Some(&Datum::Int32(4)));
        assert_eq!(row.get(1), Some(&Datum::Int32(i32::MIN)));
    }

    #[test]
    fn increment_key_overflows_at_front() {
        let schema = two_col_schema(DataType::Int32, DataType::Int32);
        let mut row = schema.new_partial_row();
        row.set(0, Datum::Int32(i32::MAX)).unwrap();
        row.set(1, Datum::Int32(i32::MAX)).unwrap();

        assert!(!increment_key(&mut row, &[0, 1]).unwrap());
        assert_eq!(row.get(0), Some(&Datum::Int32(i32::MIN)));
        assert_eq!(row.get(1), Some(&Datum::Int32(i32::MIN)));
    }

    #[test]
    fn hash_bucket_is_big_endian() {
        let mut buf = Vec::new();
        encode_hash_bucket(&mut buf, 3);
        encode_hash_bucket(&mut buf, 0x0102_0304);
        assert_eq!(buf, vec![0, 0, 0, 3, 0x01, 0x02, 0x03, 0x04]);
    }
}
