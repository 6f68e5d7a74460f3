//! Call specs and plans.

use serde::{Deserialize, Deserializer, Serialize};

/// One planned query against a source collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSpec {
    /// Target data source.
    #[serde(alias = "service")]
    pub source: String,
    /// Collection (entity set) within the source.
    #[serde(alias = "entity")]
    pub collection: String,
    /// Source-specific predicate; empty means no filter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter: String,
    /// Fields to project; empty means all fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub select: Vec<String>,
}

impl CallSpec {
    /// Create an unfiltered call over all fields.
    pub fn new(source: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            collection: collection.into(),
            filter: String::new(),
            select: Vec::new(),
        }
    }

    /// Set the filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the projected fields.
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The filter expression, if one is set.
    pub fn filter_expr(&self) -> Option<&str> {
        let filter = self.filter.trim();
        (!filter.is_empty()).then_some(filter)
    }

    /// The projected fields, if a projection is set.
    pub fn selection(&self) -> Option<&[String]> {
        (!self.select.is_empty()).then_some(self.select.as_slice())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered call specs produced for one question.
///
/// Order is significant: results are paired with calls by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    calls: Vec<CallSpec>,
}

impl Plan {
    /// Create a plan from calls in order.
    pub fn new(calls: Vec<CallSpec>) -> Self {
        Self { calls }
    }

    /// Calls in plan order.
    pub fn calls(&self) -> &[CallSpec] {
        &self.calls
    }

    /// Iterate over calls in plan order.
    pub fn iter(&self) -> std::slice::Iter<'_, CallSpec> {
        self.calls.iter()
    }

    /// Number of calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Check if the plan has no calls.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Consume the plan, returning its calls.
    pub fn into_calls(self) -> Vec<CallSpec> {
        self.calls
    }
}

impl From<Vec<CallSpec>> for Plan {
    fn from(calls: Vec<CallSpec>) -> Self {
        Self::new(calls)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a CallSpec;
    type IntoIter = std::slice::Iter<'a, CallSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
