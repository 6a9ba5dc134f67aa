//! Canonical CBOR encoding for deterministic content hashing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Floats always encoded as 64-bit IEEE doubles (fixed-width rule)
//!
//! The canonical encoding is critical: structurally equal certificate
//! content must produce identical bytes (and thus identical hashes)
//! regardless of field insertion order or platform. Certificate content
//! carries floats (coordinates, pH, quantities), so unlike a pure-integer
//! protocol the encoder accepts them; non-finite values are rejected
//! because NaN payloads are not portable across encoders.

use ciborium::value::Value;
use serde::Serialize;
use thiserror::Error;

use crate::crypto::ContentHash;

/// Errors from canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("cannot canonically encode non-finite float")]
    NonFiniteFloat,

    #[error("duplicate map key in canonical encoding")]
    DuplicateMapKey,

    #[error("unsupported value in canonical encoding: {0}")]
    Unsupported(&'static str),

    #[error("value does not serialize: {0}")]
    Serialize(String),
}

/// Encode any serializable value to canonical CBOR bytes.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value = Value::serialized(value).map_err(|e| CanonicalError::Serialize(e.to_string()))?;
    let mut buf = Vec::new();
    encode_value(&mut buf, &value)?;
    Ok(buf)
}

/// Encode any serializable value canonically and hash the result.
///
/// This is the content-hash primitive: two values that are structurally
/// equal hash identically, whatever order their map entries were built in.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<ContentHash, CanonicalError> {
    Ok(ContentHash::hash(&canonical_bytes(value)?))
}

/// Recursively encode a CBOR value.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), CanonicalError> {
    match value {
        Value::Integer(i) => {
            encode_integer(buf, *i);
            Ok(())
        }
        Value::Bytes(b) => {
            encode_bytes(buf, b);
            Ok(())
        }
        Value::Text(s) => {
            encode_text(buf, s);
            Ok(())
        }
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => {
            buf.push(if *b { 0xf5 } else { 0xf4 });
            Ok(())
        }
        Value::Null => {
            buf.push(0xf6);
            Ok(())
        }
        Value::Float(f) => encode_float(buf, *f),
        Value::Tag(..) => Err(CanonicalError::Unsupported("tag")),
        _ => Err(CanonicalError::Unsupported("unknown value type")),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        // Major type 0: unsigned integer
        encode_uint(buf, 0, n as u64);
    } else {
        // Major type 1: negative integer
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CanonicalError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison. RFC 8949 forbids
/// duplicate keys; sorted adjacency makes the check direct.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CanonicalError> {
    // Encode all keys first to sort by encoded bytes
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    // Sort by encoded key bytes (lexicographic)
    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    for pair in key_value_pairs.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(CanonicalError::DuplicateMapKey);
        }
    }

    // Write map header
    encode_uint(buf, 5, key_value_pairs.len() as u64);

    // Write sorted key-value pairs
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value)?;
    }
    Ok(())
}

/// Encode a float (major type 7, always 64-bit).
///
/// RFC 8949 deterministic encoding permits a fixed-width profile; a single
/// width avoids the shortest-representation search and keeps the byte
/// layout obvious to external reimplementations.
fn encode_float(buf: &mut Vec<u8>, f: f64) -> Result<(), CanonicalError> {
    if !f.is_finite() {
        return Err(CanonicalError::NonFiniteFloat);
    }
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_be_bytes());
    Ok(())
}
