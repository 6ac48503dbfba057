//! Client seam: build a query, hand it to a transport, decode the result.
//!
//! This module provides:
//! - `Transport` - the one operation the remote API must offer
//! - `Client` - composes query building, execution and selective decoding
//! - `Fetchable` - declares how a model is fetched by id
//!
//! # Example
//! ```ignore
//! let client = Client::new(transport);
//!
//! let games: Vec<Game> = client
//!     .query::<Game>(|q| q.select(|f| [f.name, f.summary]).filter_by(|f| f.id.eq(1)).limit(1))
//!     .await?;
//!
//! let artworks = client.fetch::<Artwork>(&[10, 11]).await?;
//! ```

mod fetch;

pub use fetch::Fetchable;

use std::future::Future;

use crate::config::ClientConfig;
use crate::decode::decode_records;
use crate::errors::ClientError;
use crate::query::QueryBuilder;
use crate::types::Queryable;
use crate::RawRecord;

/// Executes wire queries against the remote API.
///
/// Authentication, retries and caching belong to implementations; the client
/// passes transport errors through untouched.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run `query` against `endpoint` and return the decoded response records.
    fn execute(&self, endpoint: &str, query: &str) -> impl Future<Output = Result<Vec<RawRecord>, Self::Error>> + Send;
}

/// Main entry point for running typed queries.
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    /// Create a client with the default configuration.
    ///
    /// Leaves the process-wide query settings as they are.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
        }
    }

    /// Create a client and install `config`'s query settings.
    ///
    /// Query settings are process-wide: the most recent `with_config` call wins.
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        config.query.install();
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a query for `M`, run it against `M`'s endpoint and decode the records.
    pub async fn query<M: Queryable>(
        &self,
        build: impl FnOnce(QueryBuilder<M>) -> QueryBuilder<M>,
    ) -> Result<Vec<M>, ClientError<T::Error>> {
        let endpoint = self.endpoint_for::<M>()?;
        self.query_at(endpoint, build).await
    }

    /// Like [`query`](Self::query) against an explicit endpoint.
    pub async fn query_at<M: Queryable>(
        &self,
        endpoint: &str,
        build: impl FnOnce(QueryBuilder<M>) -> QueryBuilder<M>,
    ) -> Result<Vec<M>, ClientError<T::Error>> {
        let query = build(QueryBuilder::new());
        self.execute(endpoint, &query).await
    }

    /// Run a prepared builder against `endpoint`.
    pub async fn execute<M: Queryable>(
        &self,
        endpoint: &str,
        query: &QueryBuilder<M>,
    ) -> Result<Vec<M>, ClientError<T::Error>> {
        let text = query.build();
        log::debug!(
            "querying `{endpoint}` for {} ({} clauses)",
            M::descriptor().model,
            query.clauses().len()
        );
        let records = self
            .transport
            .execute(endpoint, &text)
            .await
            .map_err(ClientError::Transport)?;
        log::debug!("`{endpoint}` returned {} records", records.len());
        Ok(decode_records(&records)?)
    }

    /// Fetch the records of `F` whose id is in `ids`.
    ///
    /// No request is made for an empty id list.
    pub async fn fetch<F: Fetchable>(&self, ids: &[i64]) -> Result<Vec<F::Model>, ClientError<T::Error>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let endpoint = self.endpoint_for::<F::Model>()?;
        self.execute(endpoint, &F::fetch_query(ids)).await
    }

    /// Fetch a single record by id.
    pub async fn fetch_one<F: Fetchable>(&self, id: i64) -> Result<Option<F::Model>, ClientError<T::Error>> {
        Ok(self.fetch::<F>(&[id]).await?.into_iter().next())
    }

    fn endpoint_for<M: Queryable>(&self) -> Result<&str, ClientError<T::Error>> {
        self.config.endpoint_for::<M>().ok_or(ClientError::MissingEndpoint {
            model: M::descriptor().model,
        })
    }
}
