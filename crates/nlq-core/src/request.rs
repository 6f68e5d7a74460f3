//! Inbound query requests and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// A query request as received from a caller.
///
/// `limit` and `offset` are kept as raw JSON so that numeric strings such as
/// `"5"` are accepted alongside numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The natural-language question.
    #[serde(default)]
    pub question: Option<String>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
    /// Page offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,
}

impl QueryRequest {
    /// Create a request for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            limit: None,
            offset: None,
        }
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Set the page offset.
    pub fn with_offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<ValidatedQuery, ValidationError> {
        let question = self
            .question
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or(ValidationError::MissingQuestion)?;

        let limit = match &self.limit {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                parse_integer(value)
                    .filter(|n| *n >= 1)
                    .ok_or(ValidationError::InvalidLimit)?,
            ),
        };

        let offset = match &self.offset {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_integer(value).ok_or(ValidationError::InvalidOffset)?),
        };

        Ok(ValidatedQuery {
            question: question.to_string(),
            limit,
            offset,
        })
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// The question as received; never blank.
    pub question: String,
    /// Positive page size.
    pub limit: Option<u64>,
    /// Non-negative offset.
    pub offset: Option<u64>,
}

/// Parse a non-negative integer given as a JSON number or numeric string.
fn parse_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
