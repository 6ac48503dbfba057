use chrono::DateTime;
use serde_json::Value;

use crate::decode::{DecodedRecord, WireMismatch};
use crate::errors::DecodeError;
use crate::field::Field;
use crate::RawRecord;

/// Static metadata emitted by `#[derive(Queryable)]` for one model type.
///
/// Built once per process on first access and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// The Rust type name of the model (e.g., `"Game"`).
    pub model: &'static str,
    /// Endpoint declared with `#[query(endpoint = "...")]`, if any.
    pub endpoint: Option<&'static str>,
    /// Registered fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Look up the wire key for a logical field name.
    pub fn wire_key(&self, name: &str) -> Option<&'static str> {
        self.field(name).map(|field| field.wire_key)
    }

    /// Look up a field descriptor by logical name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a field descriptor by wire key.
    pub fn field_by_wire_key(&self, wire_key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.wire_key == wire_key)
    }

    /// All wire keys in declaration order.
    pub fn wire_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.wire_key)
    }

    /// Decode a record against this descriptor without a concrete model type.
    ///
    /// Present values are checked against the declared [`FieldType`]; absent
    /// keys stay unset.
    pub fn decode_dynamic(&self, record: &RawRecord) -> Result<DecodedRecord, DecodeError> {
        DecodedRecord::decode(self, record)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Logical (Rust) field name.
    pub name: &'static str,
    /// Key used on the wire.
    pub wire_key: &'static str,
    pub field_type: FieldType,
    /// Element type for `Array` fields.
    pub element_type: Option<FieldType>,
    /// When false, an explicit wire `null` is rejected during decoding.
    pub optional: bool,
    /// Exact check of a present value, taken from the slot's [`FromWire`] impl.
    pub validate: fn(&Value) -> Result<(), WireMismatch>,
}

// Equality ignores `validate`.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.wire_key == other.wire_key
            && self.field_type == other.field_type
            && self.element_type == other.element_type
            && self.optional == other.optional
    }
}

impl Eq for FieldDescriptor {}

/// Declared value type of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    DateTime,
    Object,
    #[default]
    Any,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::DateTime => "datetime",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }

    /// Whether a JSON value has a shape this type can be decoded from.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::DateTime => match value {
                Value::String(s) => DateTime::parse_from_rfc3339(s).is_ok(),
                other => other.is_i64(),
            },
            FieldType::Object => matches!(value, Value::Object(_)),
            FieldType::Any => true,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for models registered with querykit.
///
/// This trait is automatically implemented by `#[derive(Queryable)]`.
pub trait Queryable: Sized + 'static {
    /// Generated path struct holding one [`Field`] per struct field.
    type Fields: Copy + 'static;

    /// The model's descriptor, built once per process.
    fn descriptor() -> &'static ModelDescriptor;

    /// Field references for this model.
    fn fields() -> Self::Fields;

    /// Populate a model from a raw record, leaving absent fields unset.
    fn decode(record: &RawRecord) -> Result<Self, DecodeError>;

    /// Resolve a field reference to its wire key.
    fn field_name(field: Field<Self>) -> Option<&'static str> {
        Self::descriptor().wire_key(field.name())
    }
}
