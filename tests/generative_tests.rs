mod common;

use common::{body, doc, input, labeled, select};
use formfill::resolve::generative::{
    build_prompt, parse_values, GeminiBackend, GenerationParams, GenerativeSource, MockCompletion,
    TextCompletion,
};
use formfill::{detect, FillError, PageContext, ResolvedValue, ValueSource};
use serde_json::json;

// =========================================================================
// Response parsing
// =========================================================================

#[test]
fn parses_a_clean_json_array() {
    let values = parse_values(r#"["Alice", "alice@example.com", "true"]"#)
        .expect("clean array parses");
    assert_eq!(values, vec!["Alice", "alice@example.com", "true"]);
}

#[test]
fn parses_an_array_wrapped_in_markdown_and_prose() {
    let text = "Sure! Here are the values:\n```json\n[\"Bob\", \"42\"]\n```\nLet me know.";
    let values = parse_values(text).expect("wrapped array parses");
    assert_eq!(values, vec!["Bob", "42"]);
}

#[test]
fn non_string_array_entries_are_stringified() {
    let values = parse_values(r#"[1, true, "x"]"#).expect("mixed array parses");
    assert_eq!(values, vec!["1", "true", "x"]);
}

#[test]
fn falls_back_to_line_recovery_when_no_array_is_present() {
    let text = "# values follow\nAlice Smith\n\"alice@example.com\",\n\n// done\n";
    let values = parse_values(text).expect("line recovery succeeds");
    assert_eq!(values, vec!["Alice Smith", "alice@example.com"]);
}

#[test]
fn rejects_a_response_with_nothing_recoverable() {
    let err = parse_values("   \n\n# only comments\n// here\n").unwrap_err();
    assert!(matches!(err, FillError::MalformedResponse(_)));
}

// =========================================================================
// Prompt construction
// =========================================================================

#[test]
fn prompt_carries_field_metadata_and_page_context() {
    let doc = doc(body(vec![
        json!({ "tag": "h1", "text": "Job Application" }),
        labeled("Full name", "fn", json!({
            "tag": "input",
            "attrs": { "type": "text", "name": "fullName", "required": "" },
        })),
        select("country", &[("", "Pick one"), ("id", "Indonesia")]),
    ]));
    let fields = detect(&doc);
    let page = PageContext::from_document(&doc);

    let prompt = build_prompt(&fields, &page);
    assert!(prompt.contains("1. Full name"));
    assert!(prompt.contains("Required: Yes"));
    assert!(prompt.contains("Options: Pick one, Indonesia"));
    assert!(prompt.contains("Page title: Example Form"));
    assert!(prompt.contains("Form context: Job Application"));
    assert!(prompt.contains("JSON array"));
}

// =========================================================================
// Resolution semantics
// =========================================================================

fn resolve_with(response: &str, root: serde_json::Value) -> Vec<Option<ResolvedValue>> {
    let doc = doc(root);
    let fields = detect(&doc);
    let page = PageContext::from_document(&doc);
    let backend = MockCompletion {
        response: response.to_string(),
    };
    let mut source = GenerativeSource::new(&backend);
    source.resolve(&fields, &page).expect("mock resolution")
}

#[test]
fn short_value_lists_fill_a_prefix_and_leave_the_rest_absent() {
    let values = resolve_with(
        r#"["Alice", "alice@example.com"]"#,
        body(vec![
            input("text", "name"),
            input("email", "email"),
            input("tel", "phone"),
        ]),
    );

    assert_eq!(values.len(), 3, "Result length always matches the field list");
    assert_eq!(values[0], Some(ResolvedValue::Text("Alice".into())));
    assert_eq!(
        values[1],
        Some(ResolvedValue::Text("alice@example.com".into()))
    );
    assert_eq!(values[2], None, "Unmatched tail stays absent");
}

#[test]
fn checkbox_values_are_parsed_as_booleans() {
    let values = resolve_with(
        r#"["yes", "nope"]"#,
        body(vec![
            input("checkbox", "terms"),
            input("checkbox", "newsletter"),
        ]),
    );

    assert_eq!(values[0], Some(ResolvedValue::Checked(true)));
    assert_eq!(
        values[1],
        Some(ResolvedValue::Checked(false)),
        "Anything outside the truthy set is false"
    );
}

#[test]
fn backend_errors_propagate_to_the_caller() {
    let doc = doc(body(vec![input("text", "name")]));
    let fields = detect(&doc);
    let page = PageContext::from_document(&doc);

    struct Refusing;
    impl TextCompletion for Refusing {
        fn complete(&self, _: &str, _: &GenerationParams) -> Result<String, FillError> {
            Err(FillError::Http {
                status: 429,
                message: "quota exceeded".into(),
            })
        }
    }

    let backend = Refusing;
    let mut source = GenerativeSource::new(&backend);
    let err = source.resolve(&fields, &page).unwrap_err();
    assert!(matches!(err, FillError::Http { status: 429, .. }));
}

// =========================================================================
// Backend preconditions
// =========================================================================

#[test]
fn gemini_backend_refuses_to_send_without_an_api_key() {
    let backend = GeminiBackend::new("https://example.invalid/generate", "");
    let err = backend
        .complete("prompt", &GenerationParams::default())
        .unwrap_err();
    assert!(matches!(err, FillError::MissingCredential));
}

#[test]
fn default_generation_params_match_the_documented_config() {
    let params = GenerationParams::default();
    assert_eq!(params.temperature, 0.7);
    assert_eq!(params.top_k, 40);
    assert_eq!(params.top_p, 0.95);
    assert_eq!(params.max_output_tokens, 2048);
}
