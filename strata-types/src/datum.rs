//! Untyped scalar values plus the raw-format codec and key-order primitives
//! the partition pruner builds on.
//!
//! A [`Datum`] captures one column value before it is folded into an encoded
//! partition key. The "raw" representation handled here is the row wire
//! format (little-endian fixed-width numerics, verbatim bytes for var-len
//! columns); the lexicographically-ordered key encoding lives in
//! `strata-client` because it depends on the column's position in the range
//! schema.

use std::cmp::Ordering;

use strata_result::{Error, Result};

/// Physical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Bool,
    Float32,
    Float64,
    String,
    Binary,
}

impl DataType {
    /// Byte width of the raw representation, or `None` for var-len types.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Bool => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => Some(8),
            DataType::String | DataType::Binary => None,
        }
    }

    /// Whether values of this type have a variable-length representation.
    #[inline]
    pub fn is_var_len(&self) -> bool {
        self.width().is_none()
    }

    /// The minimum value of the type.
    ///
    /// This is the value range-partition columns are filled with when a
    /// predicate push-down leaves them unconstrained: numeric minimum,
    /// `false`, negative infinity, or the empty byte string.
    pub fn min_datum(&self) -> Datum {
        match self {
            DataType::Int8 => Datum::Int8(i8::MIN),
            DataType::Int16 => Datum::Int16(i16::MIN),
            DataType::Int32 => Datum::Int32(i32::MIN),
            DataType::Int64 => Datum::Int64(i64::MIN),
            DataType::UInt8 => Datum::UInt8(0),
            DataType::UInt16 => Datum::UInt16(0),
            DataType::UInt32 => Datum::UInt32(0),
            DataType::UInt64 => Datum::UInt64(0),
            DataType::Bool => Datum::Bool(false),
            DataType::Float32 => Datum::Float32(f32::NEG_INFINITY),
            DataType::Float64 => Datum::Float64(f64::NEG_INFINITY),
            DataType::String => Datum::String(String::new()),
            DataType::Binary => Datum::Binary(Vec::new()),
        }
    }

    /// Lowercase type name, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Bool => "bool",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::String => "string",
            DataType::Binary => "binary",
        }
    }
}

macro_rules! decode_fixed {
    ($variant:ident, $t:ty, $bytes:expr, $ty_name:expr) => {{
        let arr: [u8; size_of::<$t>()] = $bytes
            .try_into()
            .map_err(|_| raw_len_error($ty_name, $bytes.len()))?;
        Datum::$variant(<$t>::from_le_bytes(arr))
    }};
}

macro_rules! increment_int {
    ($v:expr, $t:ty) => {{
        if *$v == <$t>::MAX {
            *$v = <$t>::MIN;
            false
        } else {
            *$v += 1;
            true
        }
    }};
}

fn raw_len_error(ty: &'static str, got: usize) -> Error {
    Error::invalid_argument(format!("invalid raw value length {got} for {ty} column"))
}

/// A single typed column value.
///
/// Values are carried in their native representation; the key-ordered byte
/// encoding is applied only when a value is written into a partition key.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    Float32(f32),
    Float64(f64),
    String(String),
    Binary(Vec<u8>),
}

impl Datum {
    /// The physical type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::Int8(_) => DataType::Int8,
            Datum::Int16(_) => DataType::Int16,
            Datum::Int32(_) => DataType::Int32,
            Datum::Int64(_) => DataType::Int64,
            Datum::UInt8(_) => DataType::UInt8,
            Datum::UInt16(_) => DataType::UInt16,
            Datum::UInt32(_) => DataType::UInt32,
            Datum::UInt64(_) => DataType::UInt64,
            Datum::Bool(_) => DataType::Bool,
            Datum::Float32(_) => DataType::Float32,
            Datum::Float64(_) => DataType::Float64,
            Datum::String(_) => DataType::String,
            Datum::Binary(_) => DataType::Binary,
        }
    }

    /// Decode a value from its raw (row wire format) representation.
    ///
    /// Fixed-width numerics are little-endian, booleans one byte, and
    /// var-len columns are the verbatim bytes. Length mismatches and invalid
    /// UTF-8 for string columns are rejected.
    pub fn from_raw(data_type: DataType, bytes: &[u8]) -> Result<Datum> {
        let datum = match data_type {
            DataType::Int8 => decode_fixed!(Int8, i8, bytes, "int8"),
            DataType::Int16 => decode_fixed!(Int16, i16, bytes, "int16"),
            DataType::Int32 => decode_fixed!(Int32, i32, bytes, "int32"),
            DataType::Int64 => decode_fixed!(Int64, i64, bytes, "int64"),
            DataType::UInt8 => decode_fixed!(UInt8, u8, bytes, "uint8"),
            DataType::UInt16 => decode_fixed!(UInt16, u16, bytes, "uint16"),
            DataType::UInt32 => decode_fixed!(UInt32, u32, bytes, "uint32"),
            DataType::UInt64 => decode_fixed!(UInt64, u64, bytes, "uint64"),
            DataType::Float32 => decode_fixed!(Float32, f32, bytes, "float32"),
            DataType::Float64 => decode_fixed!(Float64, f64, bytes, "float64"),
            DataType::Bool => match bytes {
                [0] => Datum::Bool(false),
                [_] => Datum::Bool(true),
                _ => return Err(raw_len_error("bool", bytes.len())),
            },
            DataType::String => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| Error::invalid_argument(format!("invalid utf-8: {e}")))?;
                Datum::String(s.to_string())
            }
            DataType::Binary => Datum::Binary(bytes.to_vec()),
        };
        Ok(datum)
    }

    /// Encode this value into its raw (row wire format) representation.
    pub fn to_raw(&self) -> Vec<u8> {
        match self {
            Datum::Int8(v) => v.to_le_bytes().to_vec(),
            Datum::Int16(v) => v.to_le_bytes().to_vec(),
            Datum::Int32(v) => v.to_le_bytes().to_vec(),
            Datum::Int64(v) => v.to_le_bytes().to_vec(),
            Datum::UInt8(v) => v.to_le_bytes().to_vec(),
            Datum::UInt16(v) => v.to_le_bytes().to_vec(),
            Datum::UInt32(v) => v.to_le_bytes().to_vec(),
            Datum::UInt64(v) => v.to_le_bytes().to_vec(),
            Datum::Bool(v) => vec![u8::from(*v)],
            Datum::Float32(v) => v.to_le_bytes().to_vec(),
            Datum::Float64(v) => v.to_le_bytes().to_vec(),
            Datum::String(v) => v.as_bytes().to_vec(),
            Datum::Binary(v) => v.clone(),
        }
    }

    /// Step this value to its successor in key order.
    ///
    /// Fixed-width numerics advance by one unit, wrapping to the type
    /// minimum on overflow; booleans flip `false` to `true`; floats step to
    /// the next representable value, wrapping from positive infinity to
    /// negative infinity; var-len values append a `0x00` byte, the smallest
    /// string strictly greater than the current one.
    ///
    /// Returns `true` iff the step did not overflow. On overflow the value
    /// is left at the type minimum so that a caller can carry into the
    /// preceding key column.
    pub fn increment(&mut self) -> bool {
        match self {
            Datum::Int8(v) => increment_int!(v, i8),
            Datum::Int16(v) => increment_int!(v, i16),
            Datum::Int32(v) => increment_int!(v, i32),
            Datum::Int64(v) => increment_int!(v, i64),
            Datum::UInt8(v) => increment_int!(v, u8),
            Datum::UInt16(v) => increment_int!(v, u16),
            Datum::UInt32(v) => increment_int!(v, u32),
            Datum::UInt64(v) => increment_int!(v, u64),
            Datum::Bool(v) => {
                let overflowed = *v;
                *v = !*v;
                !overflowed
            }
            Datum::Float32(v) => {
                if *v == f32::INFINITY {
                    *v = f32::NEG_INFINITY;
                    false
                } else {
                    *v = v.next_up();
                    true
                }
            }
            Datum::Float64(v) => {
                if *v == f64::INFINITY {
                    *v = f64::NEG_INFINITY;
                    false
                } else {
                    *v = v.next_up();
                    true
                }
            }
            Datum::String(v) => {
                v.push('\0');
                true
            }
            Datum::Binary(v) => {
                v.push(0);
                true
            }
        }
    }

    /// Whether this value is the minimum of its type.
    pub fn is_min(&self) -> bool {
        *self == self.data_type().min_datum()
    }

    /// Total order over values of the same type, matching the order of the
    /// encoded key bytes. Values of different types order by type, which
    /// only serves to make sorting mixed lists deterministic.
    pub fn total_cmp(&self, other: &Datum) -> Ordering {
        match (self, other) {
            (Datum::Int8(a), Datum::Int8(b)) => a.cmp(b),
            (Datum::Int16(a), Datum::Int16(b)) => a.cmp(b),
            (Datum::Int32(a), Datum::Int32(b)) => a.cmp(b),
            (Datum::Int64(a), Datum::Int64(b)) => a.cmp(b),
            (Datum::UInt8(a), Datum::UInt8(b)) => a.cmp(b),
            (Datum::UInt16(a), Datum::UInt16(b)) => a.cmp(b),
            (Datum::UInt32(a), Datum::UInt32(b)) => a.cmp(b),
            (Datum::UInt64(a), Datum::UInt64(b)) => a.cmp(b),
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Float32(a), Datum::Float32(b)) => a.total_cmp(b),
            (Datum::Float64(a), Datum::Float64(b)) => a.total_cmp(b),
            (Datum::String(a), Datum::String(b)) => a.cmp(b),
            (Datum::Binary(a), Datum::Binary(b)) => a.cmp(b),
            (a, b) => type_rank(a).cmp(&type_rank(b)),
        }
    }
}

fn type_rank(datum: &Datum) -> u8 {
    match datum {
        Datum::Int8(_) => 0,
        Datum::Int16(_) => 1,
        Datum::Int32(_) => 2,
        Datum::Int64(_) => 3,
        Datum::UInt8(_) => 4,
        Datum::UInt16(_) => 5,
        Datum::UInt32(_) => 6,
        Datum::UInt64(_) => 7,
        Datum::Bool(_) => 8,
        Datum::Float32(_) => 9,
        Datum::Float64(_) => 10,
        Datum::String(_) => 11,
        Datum::Binary(_) => 12,
    }
}

macro_rules! impl_from_for_datum {
    ($($variant:ident => $t:ty),* $(,)?) => {
        $(
            impl From<$t> for Datum {
                fn from(v: $t) -> Self {
                    Datum::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_datum!(
    Int8 => i8,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    UInt8 => u8,
    UInt16 => u16,
    UInt32 => u32,
    UInt64 => u64,
    Bool => bool,
    Float32 => f32,
    Float64 => f64,
    String => String,
    Binary => Vec<u8>,
);

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::String(v.to_string())
    }
}
