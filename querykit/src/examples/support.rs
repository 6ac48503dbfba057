use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::RawRecord;
use crate::client::Transport;
use crate::decode::records_from_json;
use crate::errors::DecodeError;

/// Initialise `env_logger` once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Error)]
pub enum MemoryTransportError {
    #[error("no canned response for endpoint `{0}`")]
    UnknownEndpoint(String),
    #[error("request log lock poisoned")]
    Poisoned,
}

/// One recorded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: String,
    pub query: String,
}

/// Transport serving canned records per endpoint and recording every request.
///
/// The query text is not interpreted: each endpoint always returns its full
/// canned record list.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: HashMap<String, Vec<RawRecord>>,
    requests: Mutex<Vec<Request>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a JSON response body for `endpoint`.
    pub fn with_response(mut self, endpoint: impl Into<String>, body: &str) -> Result<Self, DecodeError> {
        let records = records_from_json(body)?;
        self.responses.insert(endpoint.into(), records);
        Ok(self)
    }

    pub fn with_records(mut self, endpoint: impl Into<String>, records: Vec<RawRecord>) -> Self {
        self.responses.insert(endpoint.into(), records);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Result<Vec<Request>, MemoryTransportError> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .map_err(|_| MemoryTransportError::Poisoned)
    }
}

impl Transport for MemoryTransport {
    type Error = MemoryTransportError;

    async fn execute(&self, endpoint: &str, query: &str) -> Result<Vec<RawRecord>, Self::Error> {
        self.requests
            .lock()
            .map_err(|_| MemoryTransportError::Poisoned)?
            .push(Request {
                endpoint: endpoint.to_string(),
                query: query.to_string(),
            });
        self.responses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| MemoryTransportError::UnknownEndpoint(endpoint.to_string()))
    }
}

/// Canned catalog responses shared by the examples.
pub fn catalog_transport() -> Result<MemoryTransport, DecodeError> {
    MemoryTransport::new()
        .with_response(
            "characters",
            r#"[{
                "id": 4102,
                "name": "Geralt of Rivia",
                "akas": ["White Wolf", "Butcher of Blaviken"],
                "country_name": null,
                "mug_shot": 77,
                "games": [1942, 11169],
                "slug": "geralt-of-rivia",
                "created_at": 1500000000
            }]"#,
        )?
        .with_response("character_mug_shots", r#"[{"id": 77, "image_id": "mugshot77"}]"#)?
        .with_response(
            "games",
            r#"[
                {"id": 1942, "name": "The Witcher 3: Wild Hunt", "artworks": [501, 502], "first_release_date": 1431993600},
                {"id": 11169, "name": "Thronebreaker", "artworks": [601]}
            ]"#,
        )?
        .with_response(
            "artworks",
            r#"[
                {"id": 501, "image_id": "ar501", "game": 1942},
                {"id": 502, "image_id": "ar502", "game": 1942},
                {"id": 601, "image_id": "ar601", "game": 11169}
            ]"#,
        )
}
