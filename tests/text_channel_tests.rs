use serde_json::json;

use email_detection::ai::endpoint::MockEndpoint;
use email_detection::ai::json_extract::{find_json_array, find_json_object};
use email_detection::ai::text_channel::{
    DEFAULT_CONFIDENCE, FAILED_REASONING, FALLBACK_CONFIDENCE, PLACEHOLDER, analyze_screens,
    build_instruction, build_request, parse_text_response, truncate_content,
};
use email_detection::email::email_model::{ChannelResult, EmailCategory};
use email_detection::screen::screen_model::ScreenContent;

use crate::common::builders::{child, screen, screen_with_text, text_body, text_record, three_screens};

mod common;

// ============================================================================
// JSON location
// ============================================================================

#[test]
fn finds_array_inside_prose_and_fences() {
    let raw = "Sure! Here you go:\n```json\n[{\"a\": 1}, {\"b\": [2, 3]}]\n```\nDone.";
    assert_eq!(find_json_array(raw), Some("[{\"a\": 1}, {\"b\": [2, 3]}]"));
}

#[test]
fn brackets_inside_strings_do_not_break_balance() {
    let raw = r#"[{"reasoning": "uses ] and [ freely"}] trailing ]"#;
    assert_eq!(find_json_array(raw), Some(r#"[{"reasoning": "uses ] and [ freely"}]"#));
}

#[test]
fn unbalanced_input_has_no_array() {
    assert_eq!(find_json_array("[1, 2"), None);
    assert_eq!(find_json_array("no json here"), None);
}

#[test]
fn stray_opener_before_the_array_is_skipped() {
    let raw = "see [note 1 for details\n[{\"frameId\": \"1:1\"}]";
    assert_eq!(find_json_array(raw), Some("[{\"frameId\": \"1:1\"}]"));
}

#[test]
fn long_run_of_unbalanced_openers_still_finds_array() {
    let raw = format!("{}[1, 2]", "[".repeat(10_000));
    assert_eq!(find_json_array(&raw), Some("[1, 2]"));
}

#[test]
fn finds_first_object() {
    let raw = r#"result: {"x": {"y": 1}} and {"z": 2}"#;
    assert_eq!(find_json_object(raw), Some(r#"{"x": {"y": 1}}"#));
}

// ============================================================================
// Request and prompt
// ============================================================================

#[test]
fn content_is_truncated_with_markers() {
    let content = ScreenContent {
        text_content: (0..13).map(|i| format!("line {}", i)).collect(),
        child_nodes: (0..8).map(|i| child(&format!("node {}", i))).collect(),
        ..Default::default()
    };

    let truncated = truncate_content(&content);
    assert_eq!(truncated.text_content.len(), 11);
    assert_eq!(truncated.text_content[9], "line 9");
    assert_eq!(truncated.text_content[10], "... (3 more)");
    assert_eq!(truncated.child_nodes.len(), 6);
    assert_eq!(truncated.child_nodes[5].name, "... (3 more)");
}

#[test]
fn short_content_is_untouched() {
    let content = ScreenContent {
        text_content: vec!["a".into(), "b".into()],
        child_nodes: vec![child("Header")],
        ..Default::default()
    };
    assert_eq!(truncate_content(&content), content);
}

#[test]
fn request_matches_wire_contract() {
    let screens = vec![screen_with_text("1:1", "Sign Up", &["Create account"])];
    let value = serde_json::to_value(build_request(&screens)).unwrap();

    assert_eq!(value["frames"][0]["id"], "1:1");
    assert_eq!(value["frames"][0]["name"], "Sign Up");
    assert_eq!(value["frames"][0]["textContent"][0], "Create account");
    assert!(value["frames"][0]["childNodes"].is_array());
    assert_eq!(value["frames"][0]["dimensions"]["width"], 375.0);
}

#[test]
fn instruction_names_every_screen_and_category() {
    let request = build_request(&three_screens());
    let prompt = build_instruction(&request);

    for name in ["Sign Up", "Checkout", "Reset Password"] {
        assert!(prompt.contains(name), "missing {}", name);
    }
    for category in EmailCategory::ALL {
        assert!(prompt.contains(category.as_str()), "missing {}", category);
    }
    assert!(prompt.contains("JSON array"));
}

// ============================================================================
// Response parsing
// ============================================================================

#[test]
fn records_are_joined_by_id_not_position() {
    let screens = three_screens();
    let raw = text_body(vec![
        text_record("1:3", "password_reset", "Reset", 0.8),
        text_record("1:1", "welcome_email", "Welcome", 0.7),
    ]);

    let output = parse_text_response(&raw, &screens).unwrap();
    assert_eq!(output.len(), 2);
    assert_eq!(output["1:3"].value().category, EmailCategory::PasswordReset);
    assert_eq!(output["1:1"].value().suggested_name, "Welcome");
    assert!(!output.contains_key("1:2"));
}

#[test]
fn duplicates_keep_first_and_unknown_ids_are_dropped() {
    let screens = three_screens();
    let raw = text_body(vec![
        text_record("1:1", "welcome_email", "First", 0.7),
        text_record("1:1", "invoice", "Second", 0.9),
        text_record("9:9", "invoice", "Stranger", 0.9),
    ]);

    let output = parse_text_response(&raw, &screens).unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output["1:1"].value().suggested_name, "First");
}

#[test]
fn missing_and_malformed_fields_get_defaults() {
    let screens = vec![screen("1:1", "Thing")];
    let raw = json!([{
        "frameId": "1:1",
        "detectedPurpose": 42,
        "suggestedEmailType": "carrier_pigeon",
        "confidence": "high",
        "suggestedVariables": ["ok", 7, null]
    }])
    .to_string();

    let output = parse_text_response(&raw, &screens).unwrap();
    let analysis = output["1:1"].analyzed().unwrap();
    assert_eq!(analysis.detected_purpose, PLACEHOLDER);
    assert_eq!(analysis.category, EmailCategory::GenericTransactional);
    assert_eq!(analysis.suggested_name, "Transactional Email");
    assert_eq!(analysis.confidence, DEFAULT_CONFIDENCE);
    assert_eq!(analysis.reasoning, PLACEHOLDER);
    assert_eq!(analysis.suggested_variables, vec!["ok"]);
}

#[test]
fn confidence_is_clamped() {
    let screens = vec![screen("1:1", "A"), screen("1:2", "B")];
    let raw = text_body(vec![
        text_record("1:1", "invoice", "Invoice", 1.7),
        text_record("1:2", "invoice", "Invoice", -0.2),
    ]);

    let output = parse_text_response(&raw, &screens).unwrap();
    assert_eq!(output["1:1"].value().confidence, 1.0);
    assert_eq!(output["1:2"].value().confidence, 0.0);
}

#[test]
fn category_casing_is_tolerated() {
    let screens = vec![screen("1:1", "A")];
    let raw = text_body(vec![text_record("1:1", "Order Confirmation", "Order", 0.8)]);

    let output = parse_text_response(&raw, &screens).unwrap();
    assert_eq!(output["1:1"].value().category, EmailCategory::OrderConfirmation);
}

#[test]
fn records_for_no_requested_screen_are_a_parse_error() {
    let raw = text_body(vec![text_record("9:9", "invoice", "Stranger", 0.9)]);
    assert!(parse_text_response(&raw, &three_screens()).is_err());
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(parse_text_response("<html>502 Bad Gateway</html>", &three_screens()).is_err());
    assert!(parse_text_response("[not json at all]", &three_screens()).is_err());
}

// ============================================================================
// Channel behavior against the mock endpoint
// ============================================================================

#[tokio::test]
async fn garbage_response_gives_every_screen_the_stub() {
    let endpoint = MockEndpoint::new().with_text_response("I'm sorry, I cannot help with that.");
    let screens = three_screens();

    let output = analyze_screens(&endpoint, &screens).await;

    assert_eq!(output.len(), 3);
    for s in &screens {
        let result = &output[&s.id];
        assert!(result.is_fallback());
        assert_eq!(result.value().confidence, FALLBACK_CONFIDENCE);
        assert_eq!(result.value().category, EmailCategory::GenericTransactional);
        assert_eq!(result.value().reasoning, FAILED_REASONING);
    }
}

#[tokio::test]
async fn single_object_reply_gives_every_screen_the_stub() {
    // the first array in the reply is a field, not the record list
    let reply = json!({
        "frameId": "1:1",
        "suggestedVariables": ["user_name"],
        "suggestedEmailType": "welcome_email"
    })
    .to_string();
    let endpoint = MockEndpoint::new().with_text_response(&reply);

    let output = analyze_screens(&endpoint, &three_screens()).await;

    assert_eq!(output.len(), 3);
    assert!(output.values().all(ChannelResult::is_fallback));
}

#[tokio::test]
async fn network_failure_gives_every_screen_the_stub() {
    let endpoint = MockEndpoint::new().with_text_failure("connection refused");
    let output = analyze_screens(&endpoint, &three_screens()).await;

    assert_eq!(output.len(), 3);
    assert!(output.values().all(ChannelResult::is_fallback));
}

#[tokio::test]
async fn whole_batch_is_one_call() {
    let raw = text_body(vec![text_record("1:2", "order_confirmation", "Order", 0.9)]);
    let endpoint = MockEndpoint::new().with_text_response(&raw);

    let output = analyze_screens(&endpoint, &three_screens()).await;

    assert_eq!(endpoint.calls(), vec!["text"]);
    assert_eq!(output.len(), 1);
    assert!(output["1:2"].analyzed().is_some());
}

#[tokio::test]
async fn empty_batch_makes_no_call() {
    let endpoint = MockEndpoint::new();
    let output = analyze_screens(&endpoint, &[]).await;

    assert!(output.is_empty());
    assert!(endpoint.calls().is_empty());
}
