//! querykit core library.
//!
//! Typed queries for a remote tabular API speaking a textual query language
//! (`fields a,b; where x = 1; limit 10;`), and selective decoding of the
//! records it returns.

extern crate self as querykit;

pub mod client;
pub mod config;
pub mod decode;
pub mod errors;
pub mod examples;
pub mod field;
pub mod filter;
pub mod query;
pub mod registry;
pub mod types;
pub mod value;

pub use client::{Client, Fetchable, Transport};
pub use config::{ClientConfig, QueryConfig};
pub use decode::{DecodedRecord, FieldState, FromWire, Json, decode_json, decode_records};
pub use errors::*;
pub use field::Field;
pub use filter::{Filter, Operator};
pub use query::{QueryBuilder, SortOrder};
pub use querykit_macros::Queryable;
pub use registry::{ModelRegistration, get_model_by_endpoint, get_model_by_name, registered_models};
pub use types::{FieldDescriptor, FieldType, ModelDescriptor, Queryable};
pub use value::QueryValue;

// Re-export inventory for registration in the derive macro
pub use inventory;

/// A single response record: wire key → JSON value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
