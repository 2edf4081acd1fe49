//! Text extraction from loosely-shaped JSON generate responses.
//!
//! REST backends disagree on where the generated text lives. Rather than
//! probing at runtime, the known layouts are listed as an ordered table of
//! [`ExtractionRule`]s; the first rule that matches wins, and the whole body
//! is stringified when none does.

use serde_json::{Map, Value};

/// A value layout a rule accepts under its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A JSON string, returned as-is.
    Text,
    /// A non-empty array. Yields the first element's `text` field when the
    /// element is an object carrying one, otherwise the element itself.
    FirstElement,
}

impl Shape {
    fn extract(self, value: &Value) -> Option<String> {
        match self {
            Shape::Text => value.as_str().map(str::to_string),
            Shape::FirstElement => {
                let first = value.as_array()?.first()?;
                // A present but non-string `text` is rendered as JSON (`null` -> "null").
                let text = first.as_object().and_then(|obj| obj.get("text"));
                Some(stringify(text.unwrap_or(first)))
            }
        }
    }
}

const TEXT_OR_LIST: &[Shape] = &[Shape::Text, Shape::FirstElement];

/// One entry of the extraction table: a top-level key and the shapes
/// accepted under it, tried in order.
#[derive(Clone, Copy, Debug)]
pub struct ExtractionRule {
    pub key: &'static str,
    pub shapes: &'static [Shape],
}

impl ExtractionRule {
    const fn text_or_list(key: &'static str) -> Self {
        Self {
            key,
            shapes: TEXT_OR_LIST,
        }
    }

    /// Apply the rule to a response object.
    ///
    /// `None` when the key is absent or its value has none of the
    /// accepted shapes (e.g. an empty array), so the next rule gets a turn.
    pub fn apply(&self, body: &Map<String, Value>) -> Option<String> {
        let value = body.get(self.key)?;
        self.shapes.iter().find_map(|shape| shape.extract(value))
    }
}

/// Known response layouts, in priority order.
pub static RESPONSE_RULES: &[ExtractionRule] = &[
    ExtractionRule::text_or_list("text"),
    ExtractionRule::text_or_list("output"),
    ExtractionRule::text_or_list("outputs"),
    ExtractionRule::text_or_list("choices"),
    ExtractionRule::text_or_list("generations"),
];

/// Extract the generated text from a parsed response body.
pub fn extract_text(body: &Value) -> String {
    body.as_object()
        .and_then(|obj| RESPONSE_RULES.iter().find_map(|rule| rule.apply(obj)))
        .unwrap_or_else(|| stringify(body))
}

/// Render a JSON value as text; strings lose their quotes.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
