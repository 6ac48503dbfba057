//! Selective decoding of raw response records.
//!
//! A record only carries the keys that were requested, so every registered
//! slot of a model is a [`FieldState`]: `Unset` when the key is absent, `Null`
//! for an explicit wire `null`, and `Value` otherwise.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::{DecodeError, json_shape};
use crate::types::{FieldDescriptor, FieldType, ModelDescriptor, Queryable};
use crate::RawRecord;

// ---------------------------------------------------------------------------
// FieldState<T> - three-state slot for a decoded field
// ---------------------------------------------------------------------------

/// Presence state of one model field after decoding.
///
/// ```ignore
/// #[derive(Queryable)]
/// struct Game {
///     id: FieldState<i64>,
///     name: FieldState<String>,
/// }
///
/// let game = Game::decode(&record)?;
/// if let Some(name) = game.name.value() { ... }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldState<T> {
    /// The key was not in the payload (not requested, or omitted by the server).
    #[default]
    Unset,
    /// The payload held an explicit `null`.
    Null,
    /// The payload held a value.
    Value(T),
}

impl<T> FieldState<T> {
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldState::Unset)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldState::Null)
    }

    /// Returns `true` if the payload carried a non-null value.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, FieldState::Value(_))
    }

    /// Returns `true` if the key was present, null or not.
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_unset()
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldState::Value(v) => Some(v),
            FieldState::Unset | FieldState::Null => None,
        }
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            FieldState::Value(v) => Some(v),
            FieldState::Unset | FieldState::Null => None,
        }
    }

    #[inline]
    pub fn into_value(self) -> Option<T> {
        match self {
            FieldState::Value(v) => Some(v),
            FieldState::Unset | FieldState::Null => None,
        }
    }

    #[inline]
    pub fn unwrap_or(self, default: T) -> T {
        self.into_value().unwrap_or(default)
    }

    #[inline]
    pub fn unwrap_or_else<F: FnOnce() -> T>(self, f: F) -> T {
        self.into_value().unwrap_or_else(f)
    }

    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FieldState<U> {
        match self {
            FieldState::Unset => FieldState::Unset,
            FieldState::Null => FieldState::Null,
            FieldState::Value(v) => FieldState::Value(f(v)),
        }
    }

    #[inline]
    pub fn as_ref(&self) -> FieldState<&T> {
        match self {
            FieldState::Unset => FieldState::Unset,
            FieldState::Null => FieldState::Null,
            FieldState::Value(v) => FieldState::Value(v),
        }
    }
}

impl<T: Default> FieldState<T> {
    #[inline]
    pub fn unwrap_or_default(self) -> T {
        self.into_value().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for FieldState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldState::Value(v),
            None => FieldState::Null,
        }
    }
}

// Unset and Null both serialize as null; pair with
// `#[serde(skip_serializing_if = "FieldState::is_unset")]` to omit unset slots.
impl<T: Serialize> Serialize for FieldState<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldState::Unset | FieldState::Null => serializer.serialize_none(),
            FieldState::Value(value) => value.serialize(serializer),
        }
    }
}

// Missing field = Unset (via #[serde(default)]), null = Null, present = Value
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldState<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(FieldState::from)
    }
}

// ---------------------------------------------------------------------------
// FromWire - conversion from a present wire value
// ---------------------------------------------------------------------------

/// Shape mismatch reported by [`FromWire::from_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireMismatch {
    pub expected: &'static str,
    pub actual: &'static str,
}

impl WireMismatch {
    pub fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            actual: json_shape(value),
        }
    }
}

/// Types a registered field can hold.
///
/// The associated constants feed the generated [`ModelDescriptor`].
pub trait FromWire: Sized {
    const FIELD_TYPE: FieldType;
    const ELEMENT_TYPE: Option<FieldType> = None;
    /// Name used in type-mismatch errors.
    const EXPECTED: &'static str;

    fn from_wire(value: &Value) -> Result<Self, WireMismatch>;

    /// Check a present value without keeping the result.
    fn validate(value: &Value) -> Result<(), WireMismatch> {
        Self::from_wire(value).map(drop)
    }
}

impl FromWire for String {
    const FIELD_TYPE: FieldType = FieldType::String;
    const EXPECTED: &'static str = "String";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

impl FromWire for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;
    const EXPECTED: &'static str = "bool";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        value.as_bool().ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

macro_rules! impl_integer_from_wire {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromWire for $ty {
                const FIELD_TYPE: FieldType = FieldType::Integer;
                const EXPECTED: &'static str = stringify!($ty);

                fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
                    let converted = if let Some(n) = value.as_i64() {
                        <$ty>::try_from(n).ok()
                    } else if let Some(n) = value.as_u64() {
                        <$ty>::try_from(n).ok()
                    } else {
                        None
                    };
                    converted.ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
                }
            }
        )*
    };
}

impl_integer_from_wire!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromWire for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;
    const EXPECTED: &'static str = "f64";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        value.as_f64().ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

impl FromWire for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float;
    const EXPECTED: &'static str = "f32";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        value
            .as_f64()
            .filter(|n| (f64::from(f32::MIN)..=f64::from(f32::MAX)).contains(n))
            .map(|n| n as f32)
            .ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

/// Unix seconds, or an RFC 3339 string.
impl FromWire for DateTime<Utc> {
    const FIELD_TYPE: FieldType = FieldType::DateTime;
    const EXPECTED: &'static str = "DateTime<Utc>";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|at| at.with_timezone(&Utc)),
            _ => None,
        };
        parsed.ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    const FIELD_TYPE: FieldType = FieldType::Array;
    const ELEMENT_TYPE: Option<FieldType> = Some(T::FIELD_TYPE);
    const EXPECTED: &'static str = "Vec";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        match value {
            Value::Array(items) => items.iter().map(T::from_wire).collect(),
            other => Err(WireMismatch::new(Self::EXPECTED, other)),
        }
    }
}

/// Null elements inside arrays and nested objects.
impl<T: FromWire> FromWire for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const ELEMENT_TYPE: Option<FieldType> = T::ELEMENT_TYPE;
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        match value {
            Value::Null => Ok(None),
            other => T::from_wire(other).map(Some),
        }
    }
}

impl FromWire for Value {
    const FIELD_TYPE: FieldType = FieldType::Any;
    const EXPECTED: &'static str = "Value";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        Ok(value.clone())
    }
}

impl FromWire for serde_json::Map<String, Value> {
    const FIELD_TYPE: FieldType = FieldType::Object;
    const EXPECTED: &'static str = "object";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| WireMismatch::new(Self::EXPECTED, value))
    }
}

/// Decodes any serde type from a wire value, e.g. an expanded sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned> FromWire for Json<T> {
    const FIELD_TYPE: FieldType = FieldType::Any;
    const EXPECTED: &'static str = "Json";

    fn from_wire(value: &Value) -> Result<Self, WireMismatch> {
        T::deserialize(value)
            .map(Json)
            .map_err(|_| WireMismatch::new(Self::EXPECTED, value))
    }
}

// ---------------------------------------------------------------------------
// Record-level decoding
// ---------------------------------------------------------------------------

/// Find `key` in a record. A dotted key that is not present verbatim is
/// followed through nested objects (`cover.image_id`).
pub fn lookup<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(key) {
        return Some(value);
    }
    let mut segments = key.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Decode one slot. Absent → `Unset`, `null` → `Null`.
pub fn decode_field<T: FromWire>(record: &RawRecord, key: &str) -> Result<FieldState<T>, DecodeError> {
    match lookup(record, key) {
        None => Ok(FieldState::Unset),
        Some(Value::Null) => Ok(FieldState::Null),
        Some(value) => T::from_wire(value)
            .map(FieldState::Value)
            .map_err(|mismatch| DecodeError::type_mismatch(key, mismatch.expected, mismatch.actual)),
    }
}

/// Like [`decode_field`], but an explicit `null` is an error.
pub fn decode_required_field<T: FromWire>(record: &RawRecord, key: &str) -> Result<FieldState<T>, DecodeError> {
    match decode_field(record, key)? {
        FieldState::Null => Err(DecodeError::UnexpectedNull { key: key.to_string() }),
        state => Ok(state),
    }
}

/// Decode a sequence of records, stopping at the first failure.
pub fn decode_records<M: Queryable>(records: &[RawRecord]) -> Result<Vec<M>, DecodeError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            M::decode(record).map_err(|source| {
                log::debug!("failed to decode {} record {index}: {source}", M::descriptor().model);
                DecodeError::Record {
                    index,
                    source: Box::new(source),
                }
            })
        })
        .collect()
}

/// Split a raw response body (a JSON array of objects) into records.
pub fn records_from_json(body: &str) -> Result<Vec<RawRecord>, DecodeError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(DecodeError::NotAnObject {
                    index,
                    actual: json_shape(&other),
                }),
            })
            .collect(),
        other => Err(DecodeError::NotAnArray {
            actual: json_shape(&other),
        }),
    }
}

/// Decode a raw response body into models.
pub fn decode_json<M: Queryable>(body: &str) -> Result<Vec<M>, DecodeError> {
    let records = records_from_json(body)?;
    decode_records(&records)
}

// ---------------------------------------------------------------------------
// DecodedRecord - descriptor-driven decoding
// ---------------------------------------------------------------------------

/// A record decoded against a [`ModelDescriptor`] rather than a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    model: &'static str,
    fields: Vec<(&'static str, FieldState<Value>)>,
}

impl DecodedRecord {
    pub fn decode(descriptor: &ModelDescriptor, record: &RawRecord) -> Result<Self, DecodeError> {
        let mut fields = Vec::with_capacity(descriptor.fields.len());
        for field in &descriptor.fields {
            let state = match lookup(record, field.wire_key) {
                None => FieldState::Unset,
                Some(Value::Null) if field.optional => FieldState::Null,
                Some(Value::Null) => {
                    return Err(DecodeError::UnexpectedNull {
                        key: field.wire_key.to_string(),
                    });
                }
                Some(value) => {
                    check_shape(field, value)?;
                    FieldState::Value(value.clone())
                }
            };
            fields.push((field.name, state));
        }
        Ok(Self {
            model: descriptor.model,
            fields,
        })
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    /// State of the field with logical name `name`; `None` if it is not registered.
    pub fn get(&self, name: &str) -> Option<&FieldState<Value>> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, state)| state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldState<Value>)> + '_ {
        self.fields.iter().map(|(name, state)| (*name, state))
    }

    /// Logical names of the fields present in the payload.
    pub fn present(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|(_, state)| state.is_present())
            .map(|(name, _)| *name)
    }
}

// Coarse shape against the declared type, then the field's own conversion.
fn check_shape(field: &FieldDescriptor, value: &Value) -> Result<(), DecodeError> {
    let key = field.wire_key;
    if !field.field_type.accepts(value) {
        return Err(DecodeError::type_mismatch(key, field.field_type.as_str(), json_shape(value)));
    }
    if let (Value::Array(items), Some(element_type)) = (value, field.element_type) {
        if let Some(bad) = items.iter().find(|item| !item.is_null() && !element_type.accepts(item)) {
            return Err(DecodeError::type_mismatch(key, element_type.as_str(), json_shape(bad)));
        }
    }
    (field.validate)(value).map_err(|mismatch| DecodeError::type_mismatch(key, mismatch.expected, mismatch.actual))
}
