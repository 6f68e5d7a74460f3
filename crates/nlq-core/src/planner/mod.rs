//! Question planner.
//!
//! The planner describes the registry to a text-generation collaborator,
//! asks it for a JSON array of call specs and parses the answer into a
//! [`Plan`]. The generator is called exactly once per question; a malformed
//! answer is a planning failure, not a reason to ask again.

mod extract;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::{GenerationError, PlanningError};
use crate::plan::Plan;
use crate::registry::SchemaRegistry;

pub use extract::{extract_json_array, parse_plan, strip_fences};
pub use prompt::{build_prompt, describe_sources};

/// Text-generation collaborator used by the planner.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate raw text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model name, for logging.
    fn model_name(&self) -> &str;
}

/// Turns questions into plans.
#[derive(Clone)]
pub struct Planner {
    generator: Arc<dyn TextGenerator>,
    validate_calls: bool,
}

impl Planner {
    /// Create a planner backed by a text generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            validate_calls: false,
        }
    }

    /// Reject plans naming a source or collection missing from the registry.
    ///
    /// Off by default: unknown names otherwise surface when the call is
    /// dispatched.
    pub fn with_registry_validation(mut self, enabled: bool) -> Self {
        self.validate_calls = enabled;
        self
    }

    /// Plan the calls needed to answer `question`.
    pub async fn plan(
        &self,
        question: &str,
        registry: &SchemaRegistry,
    ) -> Result<Plan, PlanningError> {
        let prompt = build_prompt(question, registry);
        debug!(model = self.generator.model_name(), %prompt, "Planning prompt");

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            error!(model = self.generator.model_name(), error = %e, "Text generation failed");
            PlanningError::from(e)
        })?;
        debug!(raw = %raw, "Raw planner output");

        let plan = parse_plan(&raw).map_err(|e| {
            error!(error = %e, raw = %raw, "Failed to parse planner output");
            e
        })?;

        if self.validate_calls {
            if let Some(call) = plan
                .iter()
                .find(|c| !registry.contains(&c.source, &c.collection))
            {
                return Err(PlanningError::UnknownCollection {
                    source_name: call.source.clone(),
                    collection: call.collection.clone(),
                });
            }
        }

        info!(calls = plan.len(), "Planned calls");
        Ok(plan)
    }
}
