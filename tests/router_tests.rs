mod common;

use common::{body, doc, input};
use formfill::resolve::generative::{FailingCompletion, MockCompletion};
use formfill::store::templates::MemoryStore;
use formfill::{Document, Router};
use serde_json::{json, Value};

fn router_with(response: &str) -> Router {
    Router::new(
        Box::new(MemoryStore::new()),
        Box::new(MockCompletion {
            response: response.to_string(),
        }),
    )
    .expect("router construction seeds the store")
}

fn page() -> Document {
    doc(body(vec![
        input("text", "firstName"),
        input("email", "email"),
    ]))
}

// =========================================================================
// Action vocabulary
// =========================================================================

#[test]
fn detect_forms_reports_the_field_count() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "detectForms" }));
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["count"], json!(2));
    assert_eq!(response["message"], json!("Found 2 fillable fields"));
}

#[test]
fn fill_form_uses_the_selected_template_by_default() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "fillForm" }));
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["filledCount"], json!(2));
    assert_eq!(response["totalFields"], json!(2));
    assert_eq!(response["usedFallback"], json!(false));
}

#[test]
fn fill_form_with_an_unknown_template_fails_cleanly() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(
        &mut doc,
        json!({ "action": "fillForm", "templateId": "missing" }),
    );
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["error"], json!("Template 'missing' not found"));
    assert!(doc.writes().is_empty(), "Nothing is written on failure");
}

#[test]
fn fill_form_with_ai_uses_the_generative_values() {
    let mut router = router_with(r#"["Grace", "grace@example.com"]"#);
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "fillFormWithAI" }));
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["filledCount"], json!(2));
    assert_eq!(response["usedFallback"], json!(false));
}

#[test]
fn fill_form_with_ai_falls_back_to_the_selected_template() {
    let mut router = Router::new(Box::new(MemoryStore::new()), Box::new(FailingCompletion))
        .expect("router construction");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "fillFormWithAI" }));
    assert_eq!(response["success"], json!(true));
    assert_eq!(
        response["usedFallback"],
        json!(true),
        "Backend failure engages the template fallback"
    );
    assert_eq!(response["filledCount"], json!(2));
}

#[test]
fn template_actions_round_trip_through_the_store() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "getTemplates" }));
    assert_eq!(response["success"], json!(true));
    let templates = response["templates"]
        .as_object()
        .expect("templates is an object");
    assert_eq!(templates.len(), 3, "The defaults are seeded on construction");

    let response = router.handle(
        &mut doc,
        json!({
            "action": "saveTemplate",
            "templateId": "custom",
            "template": {
                "name": "Custom",
                "description": "Hand-made",
                "data": { "email": "me@example.com" },
            },
        }),
    );
    assert_eq!(response["success"], json!(true));

    let response = router.handle(&mut doc, json!({ "action": "getTemplates" }));
    assert!(response["templates"]["custom"]["name"] == json!("Custom"));

    let response = router.handle(
        &mut doc,
        json!({ "action": "deleteTemplate", "templateId": "custom" }),
    );
    assert_eq!(response["success"], json!(true));

    let response = router.handle(&mut doc, json!({ "action": "getTemplates" }));
    assert!(response["templates"]["custom"].is_null());
}

#[test]
fn settings_updates_merge_over_the_current_values() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "getSettings" }));
    assert_eq!(
        response["settings"]["selectedTemplate"],
        json!("qa_profile"),
        "Defaults start from the QA profile"
    );

    let response = router.handle(
        &mut doc,
        json!({
            "action": "updateSettings",
            "settings": { "selectedTemplate": "dummy_profile" },
        }),
    );
    assert_eq!(response["success"], json!(true));

    let response = router.handle(&mut doc, json!({ "action": "getSettings" }));
    assert_eq!(response["settings"]["selectedTemplate"], json!("dummy_profile"));
    assert!(
        response["settings"]["geminiEndpoint"]
            .as_str()
            .expect("endpoint survives the merge")
            .contains("generativelanguage"),
        "Untouched settings keep their values"
    );
}

// =========================================================================
// Envelope handling
// =========================================================================

#[test]
fn unknown_actions_get_the_canonical_error() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "explodePage" }));
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["error"], json!("Unknown action"));
}

#[test]
fn correlation_ids_are_echoed_into_the_response() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "detectForms", "id": 42 }));
    assert_eq!(response["id"], json!(42));

    let response = router.handle(&mut doc, json!({ "action": "explodePage", "id": 43 }));
    assert_eq!(response["id"], json!(43), "Failures echo the id too");
}

#[test]
fn requests_without_an_action_are_rejected_as_malformed() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "templateId": "qa_profile" }));
    assert_eq!(response["success"], json!(false));
    let error = response["error"].as_str().expect("error message");
    assert!(error.starts_with("Malformed request:"));
}

#[test]
fn missing_parameters_are_reported_per_action() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(&mut doc, json!({ "action": "deleteTemplate" }));
    assert_eq!(response["success"], json!(false));
    let error = response["error"].as_str().expect("error message");
    assert!(error.contains("templateId"));
}

#[test]
fn save_template_rejects_malformed_template_payloads() {
    let mut router = router_with("[]");
    let mut doc = page();

    let response = router.handle(
        &mut doc,
        json!({
            "action": "saveTemplate",
            "templateId": "broken",
            "template": { "name": 42 },
        }),
    );
    assert_eq!(response["success"], json!(false));

    let response: Value = router.handle(&mut doc, json!({ "action": "getTemplates" }));
    assert!(
        response["templates"]["broken"].is_null(),
        "Nothing is committed on a rejected save"
    );
}
