//! Plan execution: request parameters, retry, caching and concurrent dispatch.

mod cache;
mod dispatcher;
mod envelope;
mod params;
mod retry;

pub use cache::{CacheKey, CacheStats, ResultCache, DEFAULT_TTL};
pub use dispatcher::{CallResult, Dispatcher, DispatcherConfig};
pub use envelope::unwrap_rows;
pub use params::{
    detect_first_n, materialize, PagingOptions, TenantParam, DEFAULT_TENANT_PARAM, FILTER_PARAM,
    SELECT_PARAM, SKIP_PARAM, TOP_PARAM,
};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
