//! Typed key-value payload container with a self-describing TLV wire form.
//!
//! `Container` replaces the type-erased `Any`-downcast pattern with a tagged
//! sum type over a fixed value set, per the re-architecture guidance: every
//! accessor that might target an incompatible variant returns [`Result`]
//! rather than panicking.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::error::{ConduitError, Result};

/// A single typed value stored in a [`Container`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Container(Box<Container>),
}

#[repr(u8)]
enum Tag {
    Bool = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    F32 = 9,
    F64 = 10,
    String = 11,
    Bytes = 12,
    Container = 13,
}

impl TryFrom<u8> for Tag {
    type Error = ConduitError;
    fn try_from(b: u8) -> Result<Self> {
        Ok(match b {
            0 => Tag::Bool,
            1 => Tag::I8,
            2 => Tag::I16,
            3 => Tag::I32,
            4 => Tag::I64,
            5 => Tag::U8,
            6 => Tag::U16,
            7 => Tag::U32,
            8 => Tag::U64,
            9 => Tag::F32,
            10 => Tag::F64,
            11 => Tag::String,
            12 => Tag::Bytes,
            13 => Tag::Container,
            other => {
                return Err(ConduitError::serialization_error(format!(
                    "unknown value tag {other}"
                )))
            }
        })
    }
}

impl Value {
    fn tag(&self) -> Tag {
        match self {
            Value::Bool(_) => Tag::Bool,
            Value::I8(_) => Tag::I8,
            Value::I16(_) => Tag::I16,
            Value::I32(_) => Tag::I32,
            Value::I64(_) => Tag::I64,
            Value::U8(_) => Tag::U8,
            Value::U16(_) => Tag::U16,
            Value::U32(_) => Tag::U32,
            Value::U64(_) => Tag::U64,
            Value::F32(_) => Tag::F32,
            Value::F64(_) => Tag::F64,
            Value::String(_) => Tag::String,
            Value::Bytes(_) => Tag::Bytes,
            Value::Container(_) => Tag::Container,
        }
    }

    /// Widen this value to `i64`, with documented truncation for
    /// out-of-range floats and unsigned values above `i64::MAX`.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Bool(b) => Ok(*b as i64),
            Value::I8(v) => Ok(*v as i64),
            Value::I16(v) => Ok(*v as i64),
            Value::I32(v) => Ok(*v as i64),
            Value::I64(v) => Ok(*v),
            Value::U8(v) => Ok(*v as i64),
            Value::U16(v) => Ok(*v as i64),
            Value::U32(v) => Ok(*v as i64),
            Value::U64(v) => Ok(*v as i64),
            Value::F32(v) => Ok(*v as i64),
            Value::F64(v) => Ok(*v as i64),
            other => Err(ConduitError::invalid_message(format!(
                "value is not numeric: {other:?}"
            ))),
        }
    }

    /// Widen this value to `f64`.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::F32(v) => Ok(*v as f64),
            Value::F64(v) => Ok(*v),
            other => other.as_i64().map(|i| i as f64),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s.as_str()),
            other => Err(ConduitError::invalid_message(format!(
                "value is not a string: {other:?}"
            ))),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(ConduitError::invalid_message(format!(
                "value is not a bool: {other:?}"
            ))),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b.as_slice()),
            other => Err(ConduitError::invalid_message(format!(
                "value is not bytes: {other:?}"
            ))),
        }
    }

    pub fn as_container(&self) -> Result<&Container> {
        match self {
            Value::Container(c) => Ok(c),
            other => Err(ConduitError::invalid_message(format!(
                "value is not a container: {other:?}"
            ))),
        }
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        match self {
            Value::Bool(b) => out.push(*b as u8),
            Value::I8(v) => out.push(*v as u8),
            Value::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::U8(v) => out.push(*v),
            Value::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::String(s) => out.extend_from_slice(s.as_bytes()),
            Value::Bytes(b) => out.extend_from_slice(b),
            Value::Container(c) => out.extend_from_slice(&c.serialize()),
        }
    }

    fn decode_payload(tag: Tag, payload: &[u8]) -> Result<Self> {
        fn need(payload: &[u8], n: usize) -> Result<()> {
            if payload.len() < n {
                Err(ConduitError::serialization_error("truncated value payload"))
            } else {
                Ok(())
            }
        }
        Ok(match tag {
            Tag::Bool => {
                need(payload, 1)?;
                Value::Bool(payload[0] != 0)
            }
            Tag::I8 => {
                need(payload, 1)?;
                Value::I8(payload[0] as i8)
            }
            Tag::I16 => {
                need(payload, 2)?;
                Value::I16(i16::from_le_bytes(payload[0..2].try_into().unwrap()))
            }
            Tag::I32 => {
                need(payload, 4)?;
                Value::I32(i32::from_le_bytes(payload[0..4].try_into().unwrap()))
            }
            Tag::I64 => {
                need(payload, 8)?;
                Value::I64(i64::from_le_bytes(payload[0..8].try_into().unwrap()))
            }
            Tag::U8 => {
                need(payload, 1)?;
                Value::U8(payload[0])
            }
            Tag::U16 => {
                need(payload, 2)?;
                Value::U16(u16::from_le_bytes(payload[0..2].try_into().unwrap()))
            }
            Tag::U32 => {
                need(payload, 4)?;
                Value::U32(u32::from_le_bytes(payload[0..4].try_into().unwrap()))
            }
            Tag::U64 => {
                need(payload, 8)?;
                Value::U64(u64::from_le_bytes(payload[0..8].try_into().unwrap()))
            }
            Tag::F32 => {
                need(payload, 4)?;
                Value::F32(f32::from_le_bytes(payload[0..4].try_into().unwrap()))
            }
            Tag::F64 => {
                need(payload, 8)?;
                Value::F64(f64::from_le_bytes(payload[0..8].try_into().unwrap()))
            }
            Tag::String => Value::String(
                String::from_utf8(payload.to_vec())
                    .map_err(|e| ConduitError::serialization_error(e.to_string()))?,
            ),
            Tag::Bytes => Value::Bytes(payload.to_vec()),
            Tag::Container => Value::Container(Box::new(Container::deserialize(payload)?)),
        })
    }
}

macro_rules! impl_from_numeric {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_numeric!(bool, Bool);
impl_from_numeric!(i8, I8);
impl_from_numeric!(i16, I16);
impl_from_numeric!(i32, I32);
impl_from_numeric!(i64, I64);
impl_from_numeric!(u8, U8);
impl_from_numeric!(u16, U16);
impl_from_numeric!(u32, U32);
impl_from_numeric!(u64, U64);
impl_from_numeric!(f32, F32);
impl_from_numeric!(f64, F64);

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Ordered mapping from string names to [`Value`]s.
///
/// Iteration order matches insertion order (a `BTreeMap` keyed by name would
/// reorder entries alphabetically; a `Vec<(String, Value)>` with
/// linear lookup is used instead, matching the "ordered mapping" contract
/// literally rather than approximating it).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    entries: Vec<(String, Value)>,
}

impl Container {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or overwrite a named value, returning `self` for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.require(name)?.as_i64()
    }

    pub fn get_f64(&self, name: &str) -> Result<f64> {
        self.require(name)?.as_f64()
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        self.require(name)?.as_str().map(|s| s.to_string())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.require(name)?.as_bool()
    }

    pub fn get_bytes(&self, name: &str) -> Result<&[u8]> {
        self.require(name)?.as_bytes()
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| ConduitError::invalid_message(format!("missing field: {name}")))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Serialize to the self-describing TLV wire form:
    /// `[type:1B][name-len:2B][name:UTF-8][payload-len:4B][payload]` per
    /// entry, little-endian, preceded by a 4-byte entry count header.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for (name, value) in &self.entries {
            out.push(value.tag() as u8);
            let name_bytes = name.as_bytes();
            out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
            out.extend_from_slice(name_bytes);
            let mut payload = Vec::new();
            value.encode_payload(&mut payload);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&payload);
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        let read = |cursor: &mut usize, n: usize| -> Result<&[u8]> {
            if bytes.len() < *cursor + n {
                return Err(ConduitError::serialization_error("truncated container"));
            }
            let slice = &bytes[*cursor..*cursor + n];
            *cursor += n;
            Ok(slice)
        };

        let count = u32::from_le_bytes(read(&mut cursor, 4)?.try_into().unwrap());
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let tag = Tag::try_from(read(&mut cursor, 1)?[0])?;
            let name_len = u16::from_le_bytes(read(&mut cursor, 2)?.try_into().unwrap()) as usize;
            let name = String::from_utf8(read(&mut cursor, name_len)?.to_vec())
                .map_err(|e| ConduitError::serialization_error(e.to_string()))?;
            let payload_len = u32::from_le_bytes(read(&mut cursor, 4)?.try_into().unwrap()) as usize;
            let payload = read(&mut cursor, payload_len)?;
            let value = Value::decode_payload(tag, payload)?;
            entries.push((name, value));
        }
        Ok(Container { entries })
    }

    /// Merge named results keyed by an identifier, used by the chord
    /// pattern to aggregate parallel task outputs into one container.
    pub fn from_keyed(results: BTreeMap<String, Container>) -> Self {
        let mut merged = Container::new();
        for (key, container) in results {
            merged.set(key, Value::Container(Box::new(container)));
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_scalar_values() {
        let c = Container::new()
            .with("flag", true)
            .with("count", 42i64)
            .with("ratio", 3.5f64)
            .with("name", "conduit")
            .with("blob", vec![1u8, 2, 3]);

        let bytes = c.serialize();
        let restored = Container::deserialize(&bytes).unwrap();
        assert_eq!(c, restored);
    }

    #[test]
    fn round_trip_nested_container() {
        let inner = Container::new().with("x", 1i32);
        let outer = Container::new().with("inner", Value::Container(Box::new(inner.clone())));
        let bytes = outer.serialize();
        let restored = Container::deserialize(&bytes).unwrap();
        assert_eq!(outer, restored);
        assert_eq!(restored.get("inner").unwrap().as_container().unwrap(), &inner);
    }

    #[test]
    fn empty_container_round_trips() {
        let c = Container::new();
        let bytes = c.serialize();
        assert_eq!(Container::deserialize(&bytes).unwrap(), c);
    }

    #[test]
    fn widening_accessors_convert_numeric_types() {
        let c = Container::new().with("n", 7u16);
        assert_eq!(c.get_i64("n").unwrap(), 7);
        assert_eq!(c.get_f64("n").unwrap(), 7.0);
    }

    #[test]
    fn accessor_type_mismatch_is_an_error_not_a_panic() {
        let c = Container::new().with("s", "hello");
        assert!(c.get_i64("s").is_err());
    }

    #[test]
    fn missing_field_is_an_error() {
        let c = Container::new();
        assert!(c.get_string("missing").is_err());
    }

    #[test]
    fn set_overwrites_existing_entry_preserving_position() {
        let mut c = Container::new().with("a", 1i32).with("b", 2i32);
        c.set("a", 99i32);
        assert_eq!(c.get_i64("a").unwrap(), 99);
        assert_eq!(c.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn truncated_payload_is_a_serialization_error() {
        let bytes = vec![1, 0, 0, 0, 11, 1, 0, b'a']; // claims a payload-len field that's missing
        assert!(Container::deserialize(&bytes).is_err());
    }

    #[test]
    fn from_keyed_builds_a_container_of_containers() {
        let mut map = BTreeMap::new();
        map.insert("t1".to_string(), Container::new().with("v", 1i32));
        map.insert("t2".to_string(), Container::new().with("v", 2i32));
        let merged = Container::from_keyed(map);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get("t1").unwrap().as_container().unwrap().get_i64("v").unwrap(),
            1
        );
    }
}
