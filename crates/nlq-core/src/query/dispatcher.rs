//! Concurrent dispatcher for plans.
//!
//! Every call of a plan runs as its own task. Each task consults the shared
//! result cache, fetches with retry on a miss, unwraps the response envelope
//! and stores the rows. Results are reassembled by plan position, so output
//! order never depends on completion order.
//!
//! A batch is all-or-nothing: the first call that fails for good aborts the
//! remaining tasks and fails the whole dispatch.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::cache::{CacheKey, ResultCache};
use super::envelope::unwrap_rows;
use super::params::{materialize, PagingOptions, TenantParam};
use super::retry::RetryPolicy;
use crate::error::{DispatchError, SourceError};
use crate::plan::{CallSpec, Plan};
use crate::source::{RowSet, SourceClient, SourceRequest};

/// A call paired with the rows it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    /// The planned call.
    pub call: CallSpec,
    /// Rows returned for the call.
    pub data: RowSet,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Tenant parameter added to every request.
    pub tenant: Option<TenantParam>,
    /// Retry policy for cache misses.
    pub retry: RetryPolicy,
}

impl DispatcherConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tenant parameter to every request.
    pub fn with_tenant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tenant = Some(TenantParam::new(name, value));
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Executes plans against a data source.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn SourceClient>,
    cache: Arc<ResultCache>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher over a source client and a shared cache.
    pub fn new(client: Arc<dyn SourceClient>, cache: Arc<ResultCache>) -> Self {
        Self {
            client,
            cache,
            config: DispatcherConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// The shared result cache.
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// The configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Build the request a call would send.
    pub fn request_for(&self, call: &CallSpec, paging: &PagingOptions) -> SourceRequest {
        materialize(call, paging, self.config.tenant.as_ref())
    }

    /// Execute every call of a plan concurrently.
    ///
    /// Position `i` of the output corresponds to position `i` of the plan.
    pub async fn execute(
        &self,
        plan: &Plan,
        paging: &PagingOptions,
    ) -> Result<Vec<CallResult>, DispatchError> {
        let mut tasks = JoinSet::new();

        for (index, call) in plan.iter().enumerate() {
            let request = self.request_for(call, paging);
            let client = Arc::clone(&self.client);
            let cache = Arc::clone(&self.cache);
            let retry = self.config.retry.clone();

            tasks.spawn(async move {
                let outcome = fetch_rows(client.as_ref(), &cache, &retry, &request).await;
                (index, request, outcome)
            });
        }

        let mut slots: Vec<Option<RowSet>> = vec![None; plan.len()];

        while let Some(joined) = tasks.join_next().await {
            let (index, request, outcome) =
                joined.map_err(|e| DispatchError::Task(e.to_string()))?;

            match outcome {
                Ok(rows) => slots[index] = Some(rows),
                Err(err) => {
                    error!(
                        source = %request.source,
                        collection = %request.collection,
                        error = %err,
                        "Call failed, aborting batch"
                    );
                    tasks.abort_all();
                    return Err(err.into());
                }
            }
        }

        let results = plan
            .iter()
            .zip(slots)
            .map(|(call, rows)| {
                rows.map(|data| CallResult {
                    call: call.clone(),
                    data,
                })
                .ok_or_else(|| DispatchError::Task("call finished without a result".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(calls = results.len(), "Plan dispatched");
        Ok(results)
    }
}

/// Fetch one call's rows through the cache.
async fn fetch_rows(
    client: &dyn SourceClient,
    cache: &ResultCache,
    retry: &RetryPolicy,
    request: &SourceRequest,
) -> Result<RowSet, SourceError> {
    let key = CacheKey::for_request(request);

    if let Some(rows) = cache.get(&key) {
        debug!(
            source = %request.source,
            collection = %request.collection,
            params = ?request.params,
            "Cache hit"
        );
        return Ok(rows);
    }

    let payload = retry.run(|_| client.fetch(request)).await?;
    let rows = unwrap_rows(payload)?;

    cache.put(key, rows.clone());
    debug!(
        source = %request.source,
        collection = %request.collection,
        params = ?request.params,
        rows = rows.len(),
        "Cache set"
    );

    Ok(rows)
}
