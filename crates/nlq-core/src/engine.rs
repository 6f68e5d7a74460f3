//! Query engine: validate, plan, dispatch and paginate.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::EngineError;
use crate::plan::Plan;
use crate::planner::Planner;
use crate::query::{CallResult, Dispatcher, PagingOptions};
use crate::registry::SchemaRegistry;
use crate::request::{QueryRequest, ValidatedQuery};

/// Pagination block echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Requested page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Requested offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Offset of the next page, present only when both limit and offset were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}

impl Pagination {
    /// Build the block for a validated query, or `None` without paging options.
    pub fn from_query(query: &ValidatedQuery) -> Option<Self> {
        if query.limit.is_none() && query.offset.is_none() {
            return None;
        }

        let next_offset = match (query.limit, query.offset) {
            (Some(limit), Some(offset)) => Some(offset.saturating_add(limit)),
            _ => None,
        };

        Some(Self {
            limit: query.limit,
            offset: query.offset,
            next_offset,
        })
    }
}

/// Answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// The plan that was executed.
    pub plan: Plan,
    /// One result per planned call, in plan order.
    pub results: Vec<CallResult>,
    /// Paging echo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Wires the planner, the dispatcher and the registry together.
#[derive(Clone)]
pub struct QueryEngine {
    planner: Planner,
    dispatcher: Dispatcher,
    registry: Arc<SchemaRegistry>,
}

impl QueryEngine {
    /// Create a new engine.
    pub fn new(planner: Planner, dispatcher: Dispatcher, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            planner,
            dispatcher,
            registry,
        }
    }

    /// The schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Answer a query request.
    ///
    /// Validation failures stop before planning; planning failures stop
    /// before any source is contacted.
    #[instrument(skip_all)]
    pub async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, EngineError> {
        let query = request.validate()?;

        let plan = self
            .planner
            .plan(&query.question, &self.registry)
            .await
            .map_err(EngineError::Planning)?;

        let paging = PagingOptions::new(query.limit, query.offset).with_question(&query.question);
        let results = self
            .dispatcher
            .execute(&plan, &paging)
            .await
            .map_err(EngineError::Dispatch)?;

        info!(
            calls = plan.len(),
            limit = ?query.limit,
            offset = ?query.offset,
            top = ?paging.top(),
            "Query answered"
        );

        Ok(QueryResponse {
            plan,
            results,
            pagination: Pagination::from_query(&query),
        })
    }
}
