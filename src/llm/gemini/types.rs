//! Wire shapes for the `generateContent` endpoint.

use crate::advice::schema::FieldKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    #[must_use]
    pub fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    #[must_use]
    pub fn inline_data(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Raw base64 of the image bytes; any data-URL prefix was stripped during
    /// payload normalization.
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

/// Translate a declared field shape into the endpoint's response-schema JSON.
#[must_use]
pub fn response_schema_json(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::String => serde_json::json!({"type": "STRING"}),
        FieldKind::Number => serde_json::json!({"type": "NUMBER"}),
        FieldKind::Boolean => serde_json::json!({"type": "BOOLEAN"}),
        FieldKind::Array(item) => serde_json::json!({
            "type": "ARRAY",
            "items": response_schema_json(item),
        }),
        FieldKind::Object(fields) => {
            let properties: serde_json::Map<String, Value> = fields
                .iter()
                .map(|field| (field.name.to_string(), response_schema_json(&field.kind)))
                .collect();
            let ordering: Vec<&str> = fields.iter().map(|field| field.name).collect();
            serde_json::json!({
                "type": "OBJECT",
                "properties": properties,
                "propertyOrdering": ordering,
            })
        }
    }
}

// ── Response side ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: String,
    #[allow(dead_code)] // Present on the wire; the numeric code is what we classify on
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Content, GenerateContentRequest, GenerationConfig, Part, response_schema_json};
    use crate::advice::schema::{FieldKind, FieldSpec};

    #[test]
    fn request_serializes_camel_case_and_skips_absent_fields() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::text("hello".into())],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: 0.4,
                max_output_tokens: 8192,
                response_mime_type: "application/json",
                response_schema: response_schema_json(&FieldKind::object([FieldSpec::new(
                    "verdict",
                    FieldKind::String,
                )])),
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(!json.contains("systemInstruction"));
        assert!(!json.contains("inlineData"));
    }

    #[test]
    fn inline_data_part_serializes_mime_and_payload() {
        let part = Part::inline_data("image/png".into(), "QUJD".into());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["inlineData"]["data"], "QUJD");
    }

    #[test]
    fn response_schema_nests_arrays_and_objects() {
        let kind = FieldKind::object([
            FieldSpec::new("flagged", FieldKind::Boolean),
            FieldSpec::new(
                "markers",
                FieldKind::array(FieldKind::object([FieldSpec::new(
                    "value",
                    FieldKind::Number,
                )])),
            ),
        ]);
        let schema = response_schema_json(&kind);
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["flagged"]["type"], "BOOLEAN");
        assert_eq!(schema["properties"]["markers"]["type"], "ARRAY");
        assert_eq!(
            schema["properties"]["markers"]["items"]["properties"]["value"]["type"],
            "NUMBER"
        );
        assert_eq!(schema["propertyOrdering"][0], "flagged");
        assert_eq!(schema["propertyOrdering"][1], "markers");
    }
}
