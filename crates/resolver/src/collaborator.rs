use crate::error::Result;
use async_trait::async_trait;
use locview_protocol::{ExtractionRequest, QueryRequest, QueryResult};

/// Encrypted-database query engine.
///
/// Rows must be returned in the engine's own order; callers treat that order
/// as the display order and never re-sort.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult>;
}

/// Bundle/archive extraction engine. The payload shape depends on the kind.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value>;
}
