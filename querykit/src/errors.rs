use thiserror::Error;

/// A field reference with no registry entry on its model.
///
/// Not returned as a failure: query construction omits the affected fragment,
/// logs the miss and records it so callers can surface declaration bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("field `{field}` of model `{model}` has no registry entry")]
pub struct RegistryMiss {
    pub model: &'static str,
    pub field: &'static str,
}

impl RegistryMiss {
    pub fn new(model: &'static str, field: &'static str) -> Self {
        Self { model, field }
    }
}

/// Failure to decode a raw record into a model.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A present value does not have a shape compatible with the declared type.
    #[error("field '{key}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A field declared `required` arrived as an explicit `null`.
    #[error("field '{key}' is required but the payload holds null")]
    UnexpectedNull { key: String },

    /// A response body is not a list of records.
    #[error("response is not an array of records (got {actual})")]
    NotAnArray { actual: &'static str },

    /// A response element is not a key-value record.
    #[error("record {index} is not an object (got {actual})")]
    NotAnObject { index: usize, actual: &'static str },

    /// Decoding record `index` of a sequence failed.
    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    /// The response body is not valid JSON.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
            actual,
        }
    }

    /// The wire key involved, if the error concerns a single field.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::TypeMismatch { key, .. } | DecodeError::UnexpectedNull { key } => Some(key),
            DecodeError::Record { source, .. } => source.key(),
            DecodeError::NotAnArray { .. } | DecodeError::NotAnObject { .. } | DecodeError::Json(_) => None,
        }
    }
}

/// Errors raised while loading or applying [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {var} not set")]
    MissingEnv { var: String },
}

/// Top-level error returned by [`Client`](crate::client::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError<E>
where
    E: std::error::Error + 'static,
{
    /// The transport failed; passed through untouched.
    #[error("transport error: {0}")]
    Transport(#[source] E),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Neither the config nor the model declaration names an endpoint.
    #[error("no endpoint configured for model `{model}`")]
    MissingEndpoint { model: &'static str },
}

/// Short name of a JSON value's shape, used in error messages.
pub(crate) fn json_shape(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
