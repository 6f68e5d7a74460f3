//! Request parameter materialization and paging.

use std::sync::LazyLock;

use regex::Regex;

use crate::plan::CallSpec;
use crate::source::SourceRequest;

/// Filter predicate parameter.
pub const FILTER_PARAM: &str = "$filter";
/// Projection parameter.
pub const SELECT_PARAM: &str = "$select";
/// Page size parameter.
pub const TOP_PARAM: &str = "$top";
/// Page offset parameter.
pub const SKIP_PARAM: &str = "$skip";
/// Default name of the tenant/client parameter.
pub const DEFAULT_TENANT_PARAM: &str = "sap-client";

static FIRST_N: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfirst\s+(\d+)\b").expect("first-n pattern is valid"));

/// Find a "first N" phrase in a question.
///
/// Returns `None` when there is no such phrase or N is zero.
pub fn detect_first_n(question: &str) -> Option<u64> {
    FIRST_N
        .captures(question)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// Paging applied uniformly to every call of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingOptions {
    /// Explicit page size.
    pub limit: Option<u64>,
    /// Explicit offset.
    pub offset: Option<u64>,
    /// Page size detected from the question.
    pub first_n: Option<u64>,
}

impl PagingOptions {
    /// Create paging from explicit options.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit,
            offset,
            first_n: None,
        }
    }

    /// Detect a "first N" page size from the question when no limit is set.
    pub fn with_question(mut self, question: &str) -> Self {
        if self.limit.is_none() {
            self.first_n = detect_first_n(question);
        }
        self
    }

    /// Page size to request: the explicit limit, else the detected one.
    pub fn top(&self) -> Option<u64> {
        self.limit.or(self.first_n)
    }
}

/// Tenant or client identifier sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

impl TenantParam {
    /// Create a tenant parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build the request for a call.
///
/// The tenant parameter is always present when configured; filter and
/// selection only when the call sets them.
pub fn materialize(
    call: &CallSpec,
    paging: &PagingOptions,
    tenant: Option<&TenantParam>,
) -> SourceRequest {
    let mut request = SourceRequest::new(call.source.clone(), call.collection.clone());

    if let Some(tenant) = tenant {
        request = request.with_param(tenant.name.clone(), tenant.value.clone());
    }
    if let Some(filter) = call.filter_expr() {
        request = request.with_param(FILTER_PARAM, filter);
    }
    if let Some(fields) = call.selection() {
        request = request.with_param(SELECT_PARAM, fields.join(","));
    }
    if let Some(top) = paging.top() {
        request = request.with_param(TOP_PARAM, top.to_string());
    }
    if let Some(offset) = paging.offset {
        request = request.with_param(SKIP_PARAM, offset.to_string());
    }

    request
}
