use std::cell::Cell;
use std::time::Duration;

use serde_json::json;

use email_detection::ai::endpoint::MockEndpoint;
use email_detection::ai::text_channel::PLACEHOLDER;
use email_detection::ai::vision_channel::{
    FAILED_SUMMARY, analyze_screens, build_instruction, fallback_visual, parse_vision_response,
};
use email_detection::email::email_model::EmailCategory;

use crate::common::builders::{
    FailingRenderer, StaticRenderer, screen, three_screens, vision_body, vision_envelope, vision_record,
};

mod common;

// ============================================================================
// Sequential per-screen analysis
// ============================================================================

#[tokio::test]
async fn failure_of_second_screen_only_affects_second_screen() {
    let endpoint = MockEndpoint::new()
        .with_image_response("1:1", &vision_body("1:1", "welcome_email", 0.85))
        .with_image_failure("1:2", "timeout")
        .with_image_response("1:3", &vision_body("1:3", "password_reset", 0.8));
    let screens = three_screens();

    let output = analyze_screens(&endpoint, &StaticRenderer, &screens, || true).await;

    assert_eq!(output.len(), 3);

    let second = &output["1:2"];
    assert!(second.is_fallback());
    assert_eq!(second.value().design_summary, FAILED_SUMMARY);
    assert_eq!(second.value().confidence, 0.3);
    assert_eq!(second.value().category, EmailCategory::GenericTransactional);

    let first = output["1:1"].analyzed().unwrap();
    assert_eq!(first.category, EmailCategory::WelcomeEmail);
    assert_eq!(first.confidence, 0.85);
    assert!(first.image.as_deref().unwrap().starts_with("data:image/png;base64,"));

    let third = output["1:3"].analyzed().unwrap();
    assert_eq!(third.category, EmailCategory::PasswordReset);
}

#[tokio::test]
async fn calls_are_sequential_in_scan_order() {
    let endpoint = MockEndpoint::new()
        .with_image_response("1:1", &vision_body("1:1", "welcome_email", 0.9))
        .with_image_response("1:2", &vision_body("1:2", "order_confirmation", 0.9))
        .with_image_response("1:3", &vision_body("1:3", "password_reset", 0.9))
        .with_delay(Duration::from_millis(5));

    analyze_screens(&endpoint, &StaticRenderer, &three_screens(), || true).await;

    assert_eq!(endpoint.calls(), vec!["image:1:1", "image:1:2", "image:1:3"]);
    assert_eq!(endpoint.max_concurrent_calls(), 1);
}

#[tokio::test]
async fn render_failure_falls_back_without_calling_endpoint() {
    let endpoint = MockEndpoint::new()
        .with_image_response("1:1", &vision_body("1:1", "welcome_email", 0.9))
        .with_image_response("1:3", &vision_body("1:3", "password_reset", 0.9));
    let renderer = FailingRenderer {
        failing: vec!["1:2".into()],
    };

    let output = analyze_screens(&endpoint, &renderer, &three_screens(), || true).await;

    assert!(output["1:2"].is_fallback());
    assert!(output["1:1"].analyzed().is_some());
    assert_eq!(endpoint.calls(), vec!["image:1:1", "image:1:3"]);
}

#[tokio::test]
async fn stops_when_told_to() {
    let endpoint = MockEndpoint::new()
        .with_image_response("1:1", &vision_body("1:1", "welcome_email", 0.9))
        .with_image_response("1:2", &vision_body("1:2", "order_confirmation", 0.9));
    let remaining = Cell::new(1u32);

    let output = analyze_screens(&endpoint, &StaticRenderer, &three_screens(), || {
        let left = remaining.get();
        remaining.set(left.saturating_sub(1));
        left > 0
    })
    .await;

    assert_eq!(output.len(), 1);
    assert_eq!(endpoint.calls(), vec!["image:1:1"]);
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn bare_object_is_parsed() {
    let raw = format!("Here is the analysis:\n{}", vision_body("1:1", "invoice", 0.75));
    let analysis = parse_vision_response(&raw, "1:1").unwrap();

    assert_eq!(analysis.category, EmailCategory::Invoice);
    assert_eq!(analysis.design_summary, "Design of 1:1");
    assert_eq!(analysis.key_elements, vec!["Primary button"]);
    assert_eq!(analysis.confidence, 0.75);
    assert!(analysis.image.is_none());
}

#[test]
fn envelope_uses_matching_frame() {
    let raw = json!({
        "analyses": [
            {"frameId": "other", "suggestedEmailType": "invoice"},
            {"frameId": "1:2", "suggestedEmailType": "abandoned_cart", "confidence": 0.6}
        ]
    })
    .to_string();

    let analysis = parse_vision_response(&raw, "1:2").unwrap();
    assert_eq!(analysis.category, EmailCategory::AbandonedCart);
    assert_eq!(analysis.screen_id, "1:2");
}

#[test]
fn envelope_without_matching_frame_is_an_error() {
    let raw = vision_envelope(vec![
        vision_record("1:1", "welcome_email", 0.9),
        vision_record("1:3", "password_reset", 0.9),
    ]);
    assert!(parse_vision_response(&raw, "1:2").is_err());
}

#[tokio::test]
async fn answer_for_another_frame_falls_back() {
    let endpoint = MockEndpoint::new()
        .with_image_response("1:1", &vision_envelope(vec![vision_record("1:1", "welcome_email", 0.9)]))
        .with_image_response("1:2", &vision_envelope(vec![vision_record("1:1", "welcome_email", 0.9)]));
    let screens = vec![screen("1:1", "Sign Up"), screen("1:2", "Checkout")];

    let output = analyze_screens(&endpoint, &StaticRenderer, &screens, || true).await;

    assert_eq!(output["1:1"].analyzed().unwrap().category, EmailCategory::WelcomeEmail);
    assert!(output["1:2"].is_fallback());
    assert_eq!(output["1:2"].value().screen_id, "1:2");
}

#[test]
fn missing_fields_get_defaults() {
    let analysis = parse_vision_response(r#"{"confidence": 3}"#, "1:1").unwrap();

    assert_eq!(analysis.design_summary, PLACEHOLDER);
    assert_eq!(analysis.user_flow_purpose, PLACEHOLDER);
    assert_eq!(analysis.email_context, PLACEHOLDER);
    assert!(analysis.key_elements.is_empty());
    assert_eq!(analysis.category, EmailCategory::GenericTransactional);
    assert_eq!(analysis.confidence, 1.0);
}

#[test]
fn no_object_is_an_error() {
    assert!(parse_vision_response("nothing to see", "1:1").is_err());
    assert!(parse_vision_response(r#"{"analyses": []}"#, "1:1").is_err());
}

#[test]
fn fallback_is_fixed() {
    let fb = fallback_visual("1:9");
    assert_eq!(fb.screen_id, "1:9");
    assert_eq!(fb.design_summary, "Analysis failed");
    assert_eq!(fb.confidence, 0.3);
    assert_eq!(fb.category, EmailCategory::GenericTransactional);
}

#[test]
fn instruction_asks_for_single_object() {
    let prompt = build_instruction(&screen("1:1", "Sign Up"));
    assert!(prompt.contains("\"Sign Up\""));
    assert!(prompt.contains("JSON object"));
    assert!(prompt.contains("welcome_email"));
}
