// Shared prompt/schema utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file builds the structured-output schemas Gemini accepts (OpenAPI subset).

use serde_json::{json, Map, Value};

/// Scalar types accepted in a response schema.
#[derive(Debug, Clone, Copy)]
pub enum SchemaType {
    String,
    Number,
}

impl SchemaType {
    fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "STRING",
            SchemaType::Number => "NUMBER",
        }
    }
}

/// A required property of an object schema.
pub struct SchemaField {
    pub name: &'static str,
    pub kind: SchemaType,
    pub description: &'static str,
}

/// Builds an OBJECT schema where every listed field is required.
pub fn required_object_schema(fields: &[SchemaField]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(
            field.name.to_string(),
            json!({
                "type": field.kind.as_str(),
                "description": field.description,
            }),
        );
    }
    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}
