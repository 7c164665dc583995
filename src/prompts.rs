//! Prompt construction for the three generation modes
//!
//! Each builder returns the prompt text together with the response schema the
//! gateway forwards to the provider's structured-output mechanism. Builders are
//! pure: identical inputs always produce identical prompts. Inputs are embedded
//! verbatim; callers are responsible for rejecting empty fields.

use serde::Serialize;
use serde_json::{json, Value};

use crate::strategy::Strategy;

/// A prompt and the JSON shape the model is asked to answer with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    /// Text sent to the model.
    pub text: String,
    /// Response schema in the provider's dialect (`OBJECT`, `ARRAY`, `STRING`).
    pub schema: Value,
}

/// Build the prompt for a single reply with analysis.
pub fn build_single_prompt(message: &str, context: &str, strategy: Strategy) -> Prompt {
    let text = format!(
        "{}\n\nGenerate a JSON response with 'reply' (string) and 'analysis' (string) fields. \
         The analysis should explain how the strategy was applied.",
        preamble(message, context, strategy)
    );

    Prompt {
        text,
        schema: object_schema(&[("reply", string_schema()), ("analysis", string_schema())]),
    }
}

/// Build the prompt for three stylistic variations.
///
/// The schema describes an array; the count of three is requested in the text only.
pub fn build_variations_prompt(message: &str, context: &str, strategy: Strategy) -> Prompt {
    let text = format!(
        "{}\n\nGenerate a JSON response with a 'variations' field. 'variations' should be an \
         array of 3 objects, each with 'title' (e.g., \"Variation 1: More Formal\") and 'reply' \
         (string) fields.",
        preamble(message, context, strategy)
    );

    let variation = object_schema(&[("title", string_schema()), ("reply", string_schema())]);

    Prompt {
        text,
        schema: object_schema(&[("variations", array_schema(variation))]),
    }
}

/// Build the prompt comparing three model-selected strategies.
pub fn build_comparison_prompt(message: &str, context: &str) -> Prompt {
    let catalog = Strategy::all()
        .iter()
        .map(|s| format!("{}: {}", s.id(), s.instruction()))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "{}\n\nSTRATEGIES:\n{}\n\nGenerate a JSON response with a 'comparison' field. \
         'comparison' should be an array of 3 objects, each representing a *different*, \
         *relevant* strategy for the context. Each object must have 'strategyName' (string), \
         'reply' (string), and 'analysis' (string, explaining pros/cons of using that strategy). \
         Also include a 'bestStrategy' (string) field with the name of the recommended strategy \
         from the three.",
        inputs(message, context),
        catalog
    );

    let item = object_schema(&[
        ("strategyName", string_schema()),
        ("reply", string_schema()),
        ("analysis", string_schema()),
    ]);

    Prompt {
        text,
        schema: object_schema(&[
            ("comparison", array_schema(item)),
            ("bestStrategy", string_schema()),
        ]),
    }
}

fn inputs(message: &str, context: &str) -> String {
    format!(
        "INCOMING MESSAGE:\n\"{}\"\n\nCONTEXT & GOAL:\n\"{}\"",
        message, context
    )
}

fn preamble(message: &str, context: &str, strategy: Strategy) -> String {
    format!(
        "{}\n\nSTRATEGY: {}\n{}",
        inputs(message, context),
        strategy.id(),
        strategy.instruction()
    )
}

fn string_schema() -> Value {
    json!({ "type": "STRING" })
}

fn array_schema(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// Object schema where every listed property is required.
fn object_schema(fields: &[(&str, Value)]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}
