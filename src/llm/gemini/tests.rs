use super::*;
use crate::advice::payload::AdvicePayload;
use crate::advice::prompt::assemble;
use crate::advice::schema::get_schema;
use crate::advice::types::AdviceType;
use crate::media::ImagePayload;

fn client() -> GeminiClient {
    GeminiClient::with_base_url(Some("test-key"), "gemini-2.0-flash", None)
}

#[test]
fn request_url_prefixes_bare_model_names() {
    let url = client().request_url("test-key");
    assert_eq!(
        url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=test-key"
    );
}

#[test]
fn request_url_keeps_prefixed_model_names() {
    let c = GeminiClient::with_base_url(Some("k"), "models/gemini-2.0-flash", None);
    assert!(c.request_url("k").contains("/v1beta/models/gemini-2.0-flash:"));
    assert!(!c.request_url("k").contains("models/models/"));
}

#[test]
fn custom_base_url_trims_trailing_slash() {
    let c = GeminiClient::with_base_url(Some("k"), "m", Some("http://127.0.0.1:9/"));
    assert!(c.request_url("k").starts_with("http://127.0.0.1:9/v1beta/"));
}

#[test]
fn empty_explicit_key_is_ignored() {
    let c = GeminiClient::with_base_url(Some("   "), "m", None);
    // Whitespace keys fall back to env resolution; either way no literal
    // whitespace key survives.
    assert_ne!(c.api_key.as_deref(), Some("   "));
}

#[test]
fn build_request_carries_schema_constraint_and_system_instruction() {
    let payload = AdvicePayload::MacroTargets {
        profile: crate::advice::payload::ClientProfile {
            name: None,
            age: 28,
            sex: None,
            weight_kg: 70.0,
            height_cm: None,
            tier: crate::identity::Tier::Beginner,
            allergens: vec![],
            goal: "fat loss".into(),
        },
        activity_level: "sedentary".into(),
    };
    let request = assemble(&payload, None).unwrap();
    let schema = get_schema(AdviceType::MacroTargets).unwrap();

    let wire = client().build_request(&request, schema);
    let json = serde_json::to_value(&wire).unwrap();

    assert_eq!(
        json["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(
        json["generationConfig"]["responseSchema"]["type"],
        "OBJECT"
    );
    assert!(json["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("coach"));
    assert_eq!(json["contents"][0]["role"], "user");
}

#[test]
fn build_request_embeds_image_as_inline_data() {
    let payload = AdvicePayload::BloodworkExtraction { notes: None };
    let image = ImagePayload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]);
    let request = assemble(&payload, Some(image)).unwrap();
    let schema = get_schema(AdviceType::BloodworkExtraction).unwrap();

    let wire = client().build_request(&request, schema);
    let json = serde_json::to_value(&wire).unwrap();

    let parts = json["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], "/9j/");
}

fn response_from(json: &str) -> GenerateContentResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn extract_text_concatenates_parts() {
    let response = response_from(
        r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}, "finishReason": "STOP"}]}"#,
    );
    assert_eq!(
        GeminiClient::extract_text(&response).unwrap(),
        "{\"a\":\n1}"
    );
}

#[test]
fn safety_finish_reason_is_a_content_refusal() {
    let response = response_from(
        r#"{"candidates": [{"content": {"parts": []}, "finishReason": "SAFETY"}]}"#,
    );
    let err = GeminiClient::extract_text(&response).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::ContentRefusal { reason } if reason == "SAFETY"
    ));
}

#[test]
fn prompt_block_is_a_content_refusal() {
    let response = response_from(r#"{"promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}}"#);
    let err = GeminiClient::extract_text(&response).unwrap_err();
    assert!(matches!(err, GenerateError::ContentRefusal { .. }));
}

#[test]
fn embedded_error_body_is_an_endpoint_error() {
    let response =
        response_from(r#"{"error": {"code": 400, "message": "bad field", "status": "INVALID"}}"#);
    let err = GeminiClient::extract_text(&response).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Endpoint { status: 400, .. }
    ));
}

#[test]
fn missing_candidates_is_an_endpoint_error() {
    let response = response_from("{}");
    assert!(matches!(
        GeminiClient::extract_text(&response).unwrap_err(),
        GenerateError::Endpoint { .. }
    ));
}

#[test]
fn truncate_message_caps_long_bodies() {
    let long = "x".repeat(500);
    let truncated = truncate_message(&long);
    assert!(truncated.chars().count() <= 201);
    assert!(truncated.ends_with('…'));
    assert_eq!(truncate_message("short"), "short");
}
