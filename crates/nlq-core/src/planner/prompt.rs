//! Prompt construction for the planner.

use crate::registry::SchemaRegistry;

const PROMPT_HEADER: &str = "You have access to these OData services and their entity sets:\n";

const PROMPT_EXAMPLES: &str = r#"
Below are examples of valid JSON-only responses.

Example 1 - simple select:
Input question: "Show me all customers with country = 'US'"
Output:
[
  {
    "source": "Z_CUSTOMER_SRV",
    "collection": "CustomerSet",
    "filter": "Country eq 'US'",
    "select": ["CustomerID", "Name", "Country"]
  }
]

Example 2 - several services:
Input question: "Get sales orders above 1000 and corresponding invoices"
Output:
[
  {
    "source": "Z_SALESORDER_SRV",
    "collection": "I_SalesOrder",
    "filter": "NetAmount gt 1000",
    "select": ["SalesOrder", "NetAmount", "CustomerID"]
  },
  {
    "source": "Z_BILLINGDOCBASIC_SRV",
    "collection": "BillingDocumentBasicSet",
    "filter": "NetAmount gt 1000",
    "select": ["BillingDocument", "NetAmount", "SalesOrderID"]
  }
]

Now, given the user's question, return only a JSON array of objects with keys:
  - "source": the OData service name
  - "collection": the entity set
  - "filter": the $filter expression or an empty string
  - "select": an array of field names

Do not wrap the array in markdown or code fences and do not output any other text.
"#;

/// Describe every source and its collection names, one line per source.
///
/// Field names are left out to keep the prompt bounded.
pub fn describe_sources(registry: &SchemaRegistry) -> String {
    registry
        .sources()
        .map(|source| {
            let collections: Vec<&str> = source.collection_names().collect();
            format!("- {}: Entities({})", source.name, collections.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full planning prompt for a question.
pub fn build_prompt(question: &str, registry: &SchemaRegistry) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEADER.len() + PROMPT_EXAMPLES.len() + 256);
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(&describe_sources(registry));
    prompt.push('\n');
    prompt.push_str(PROMPT_EXAMPLES);
    prompt.push_str(&format!("\nUser question: \"{}\"\n", question));
    prompt
}
