//! Extraction of a plan from free-form model output.
//!
//! Model output is not guaranteed to be bare JSON. Fence markers are stripped
//! and the text between the first `[` and the last `]` is parsed; anything
//! around it is discarded.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::PlanningError;
use crate::plan::{CallSpec, Plan};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("fence pattern is valid"));

/// Remove code-fence markers (with any language tag) and surrounding whitespace.
pub fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "").trim().to_string()
}

/// Slice the outermost bracketed array out of model output.
pub fn extract_json_array(raw: &str) -> Result<String, PlanningError> {
    let cleaned = strip_fences(raw);
    let start = cleaned.find('[').ok_or(PlanningError::NoJsonArray)?;
    let end = cleaned.rfind(']').ok_or(PlanningError::NoJsonArray)?;
    if end < start {
        return Err(PlanningError::NoJsonArray);
    }
    Ok(cleaned[start..=end].to_string())
}

/// Parse model output into a plan, preserving the order of its calls.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanningError> {
    let array = extract_json_array(raw)?;
    let entries: Vec<Value> =
        serde_json::from_str(&array).map_err(|e| PlanningError::InvalidJson(e.to_string()))?;

    let calls = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_call(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan::new(calls))
}

fn parse_call(index: usize, entry: Value) -> Result<CallSpec, PlanningError> {
    if !entry.is_object() {
        return Err(PlanningError::InvalidPlan(format!(
            "entry {} is not an object",
            index
        )));
    }

    let call: CallSpec = serde_json::from_value(entry)
        .map_err(|e| PlanningError::InvalidPlan(format!("entry {}: {}", index, e)))?;

    if call.source.trim().is_empty() || call.collection.trim().is_empty() {
        return Err(PlanningError::InvalidPlan(format!(
            "entry {} has an empty source or collection",
            index
        )));
    }

    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BARE: &str = r#"[{"source":"Z_SALESORDER_SRV","collection":"I_SalesOrder","filter":"NetAmount gt 1000","select":["SalesOrder","NetAmount"]}]"#;

    fn expected() -> Plan {
        Plan::from(vec![CallSpec::new("Z_SALESORDER_SRV", "I_SalesOrder")
            .with_filter("NetAmount gt 1000")
            .with_select(["SalesOrder", "NetAmount"])])
    }

    #[test]
    fn test_bare_array() {
        assert_eq!(parse_plan(BARE).unwrap(), expected());
    }

    #[test]
    fn test_fenced_array_with_commentary() {
        let raw = format!(
            "Sure! Here is the plan you asked for:\n```json\n{}\n```\nLet me know if you need more.",
            BARE
        );
        assert_eq!(extract_json_array(&raw).unwrap(), BARE);
        assert_eq!(parse_plan(&raw).unwrap(), expected());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = format!("```\n{}\n```", BARE);
        assert_eq!(parse_plan(&raw).unwrap(), expected());
    }

    #[test]
    fn test_order_is_preserved() {
        let raw = r#"[
            {"source": "B", "collection": "Second"},
            {"source": "A", "collection": "First"},
            {"source": "C", "collection": "Third"}
        ]"#;
        let plan = parse_plan(raw).unwrap();
        let collections: Vec<&str> = plan.iter().map(|c| c.collection.as_str()).collect();
        assert_eq!(collections, vec!["Second", "First", "Third"]);
    }

    #[test]
    fn test_empty_array_is_an_empty_plan() {
        assert!(parse_plan("[]").unwrap().is_empty());
    }

    #[test]
    fn test_no_array() {
        let err = parse_plan("I could not find any matching service.").unwrap_err();
        assert!(matches!(err, PlanningError::NoJsonArray));
    }

    #[test]
    fn test_closing_bracket_before_opening() {
        let err = parse_plan("] nothing here [").unwrap_err();
        assert!(matches!(err, PlanningError::NoJsonArray));
    }

    #[test]
    fn test_invalid_json_slice() {
        let err = parse_plan(r#"[{"source": "A", "collection": }]"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidJson(_)));
    }

    #[test]
    fn test_entry_not_an_object() {
        let err = parse_plan(r#"["Z_SALESORDER_SRV"]"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidPlan(msg) if msg.contains("entry 0")));
    }

    #[test]
    fn test_missing_collection() {
        let err = parse_plan(r#"[{"source": "A"}]"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidPlan(_)));
    }

    #[test]
    fn test_empty_source() {
        let err = parse_plan(r#"[{"source": " ", "collection": "C"}]"#).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidPlan(_)));
    }

    #[test]
    fn test_missing_filter_and_select_default() {
        let plan = parse_plan(r#"[{"service": "A", "entity": "C"}]"#).unwrap();
        assert_eq!(plan.calls(), [CallSpec::new("A", "C")]);
    }
}
