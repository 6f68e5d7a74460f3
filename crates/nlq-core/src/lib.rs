//! NLQ Core - question planning, result caching and concurrent dispatch.
//!
//! This crate turns a natural-language question into a plan of calls
//! against registered data sources and executes the plan concurrently.
//! The text generator and the data source are collaborators behind the
//! [`TextGenerator`] and [`SourceClient`] traits; concrete HTTP
//! implementations live in `nlq-client`.

pub mod engine;
pub mod error;
pub mod plan;
pub mod planner;
pub mod query;
pub mod registry;
pub mod request;
pub mod source;

pub use engine::{Pagination, QueryEngine, QueryResponse};
pub use error::{
    DispatchError, EngineError, GenerationError, PlanningError, RegistryError, SourceError,
    ValidationError,
};
pub use plan::{CallSpec, Plan};
pub use planner::{Planner, TextGenerator};
pub use query::{
    CacheKey, CacheStats, CallResult, Dispatcher, DispatcherConfig, PagingOptions, ResultCache,
    RetryPolicy, TenantParam,
};
pub use registry::{CollectionSchema, SchemaRegistry, SourceSchema};
pub use request::{QueryRequest, ValidatedQuery};
pub use source::{Row, RowSet, SourceClient, SourceRequest};
