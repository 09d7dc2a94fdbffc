mod common;

use common::{body, doc, input, labeled, select};
use formfill::{detect, FieldKind};
use serde_json::json;

// =========================================================================
// Candidate selection and document order
// =========================================================================

#[test]
fn detects_fields_in_document_order_with_dense_indices() {
    let doc = doc(body(vec![
        input("text", "firstName"),
        input("email", "email"),
        json!({ "tag": "textarea", "attrs": { "name": "bio" } }),
        select("country", &[("id", "Indonesia"), ("us", "United States")]),
        input("checkbox", "subscribe"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 5, "All five controls are fillable");

    let kinds: Vec<FieldKind> = fields.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Text,
            FieldKind::Email,
            FieldKind::Textarea,
            FieldKind::Select,
            FieldKind::Checkbox,
        ],
        "Kinds follow document order"
    );

    for (i, field) in fields.iter().enumerate() {
        assert_eq!(field.index, i, "Indices are dense 0..N-1");
    }
}

#[test]
fn detects_contenteditable_elements() {
    let doc = doc(body(vec![json!({
        "tag": "div",
        "attrs": { "contenteditable": "true", "name": "notes" },
    })]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind, FieldKind::ContentEditable);
}

#[test]
fn every_classified_candidate_yields_a_descriptor() {
    let doc = doc(body(vec![
        input("text", "a"),
        input("email", "b"),
        input("tel", "c"),
        input("number", "d"),
        input("date", "e"),
        input("password", "f"),
        input("url", "g"),
        input("search", "h"),
        input("checkbox", "i"),
        json!({ "tag": "input", "attrs": { "type": "radio", "name": "j" } }),
        select("k", &[("1", "One")]),
        json!({ "tag": "textarea", "attrs": { "name": "l" } }),
        json!({ "tag": "div", "attrs": { "contenteditable": "true" } }),
        json!({ "tag": "button", "text": "not a field" }),
        json!({ "tag": "div", "text": "not a field either" }),
    ]));

    let fields = detect(&doc);
    assert_eq!(
        fields.len(),
        13,
        "Every element with a field kind gets a descriptor, nothing else does"
    );
}

#[test]
fn unknown_input_types_fall_back_to_text() {
    let doc = doc(body(vec![input("color", "favorite")]));
    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind, FieldKind::Text);
}

// =========================================================================
// Eligibility rules
// =========================================================================

#[test]
fn skips_elements_without_layout() {
    let doc = doc(body(vec![
        json!({ "tag": "input", "attrs": { "type": "text", "name": "hidden" }, "hasLayout": false }),
        input("text", "visible"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "visible");
}

#[test]
fn inline_display_overrides_missing_layout() {
    let doc = doc(body(vec![
        json!({
            "tag": "input",
            "attrs": { "type": "text", "name": "shown" },
            "hasLayout": false,
            "display": "block",
        }),
        json!({
            "tag": "input",
            "attrs": { "type": "text", "name": "noneAtAll" },
            "hasLayout": false,
            "display": "none",
        }),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1, "display:block rescues, display:none does not");
    assert_eq!(fields[0].name, "shown");
}

#[test]
fn skips_disabled_and_readonly_elements() {
    let doc = doc(body(vec![
        json!({ "tag": "input", "attrs": { "type": "text", "name": "off" }, "disabled": true }),
        json!({ "tag": "input", "attrs": { "type": "text", "name": "frozen" }, "readOnly": true }),
        input("text", "open"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "open");
}

#[test]
fn skips_non_fillable_input_types() {
    let doc = doc(body(vec![
        input("hidden", "state"),
        input("submit", "go"),
        input("button", "cancel"),
        input("text", "kept"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "kept");
}

#[test]
fn excludes_sensitive_fields_by_identity_tokens() {
    let doc = doc(body(vec![
        input("text", "csrf_token"),
        json!({ "tag": "input", "attrs": { "type": "text", "id": "captcha-answer" } }),
        json!({ "tag": "input", "attrs": { "type": "text", "class": "viewstate-field" } }),
        json!({ "tag": "input", "attrs": { "type": "text", "placeholder": "System code" } }),
        input("text", "username"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1, "Only the non-sensitive field survives");
    assert_eq!(fields[0].name, "username");
}

#[test]
fn excludes_fields_inside_page_chrome() {
    let doc = doc(body(vec![
        json!({
            "tag": "nav",
            "attrs": { "role": "navigation" },
            "children": [input("text", "navSearch")],
        }),
        json!({
            "tag": "div",
            "attrs": { "class": "extension-toolbar" },
            "children": [input("text", "toolbarInput")],
        }),
        input("text", "pageField"),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "pageField");
}

// =========================================================================
// Label resolution priority
// =========================================================================

#[test]
fn label_for_wins_over_placeholder_and_preceding_text() {
    let doc = doc(body(vec![
        json!({ "tag": "p", "text": "Some preceding paragraph" }),
        labeled(
            "Work Email",
            "work-email",
            json!({ "tag": "input", "attrs": { "type": "email", "placeholder": "you@work.com" } }),
        ),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields[0].label, "Work Email");
}

#[test]
fn enclosing_label_used_when_no_for_match() {
    let doc = doc(body(vec![json!({
        "tag": "label",
        "text": "Remember me",
        "children": [input("checkbox", "remember")],
    })]));

    let fields = detect(&doc);
    assert_eq!(fields[0].label, "Remember me");
}

#[test]
fn aria_labelledby_resolves_to_target_text() {
    let doc = doc(body(vec![
        json!({ "tag": "span", "attrs": { "id": "phone-label" }, "text": "Phone number" }),
        json!({
            "tag": "div",
            "children": [json!({
                "tag": "input",
                "attrs": { "type": "tel", "aria-labelledby": "phone-label" },
            })],
        }),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields[0].label, "Phone number");
}

#[test]
fn preceding_sibling_text_is_the_last_resort() {
    let doc = doc(body(vec![json!({
        "tag": "div",
        "children": [
            json!({ "tag": "span", "text": "Your city" }),
            input("text", "city"),
        ],
    })]));

    let fields = detect(&doc);
    assert_eq!(fields[0].label, "Your city");
}

#[test]
fn display_label_falls_back_through_placeholder_and_name() {
    let doc = doc(body(vec![
        json!({ "tag": "input", "attrs": { "type": "text", "placeholder": "Street address" } }),
        input("text", "zipCode"),
        json!({ "tag": "input", "attrs": { "type": "text" } }),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields[0].display_label(), "Street address");
    assert_eq!(fields[1].display_label(), "zipCode");
    assert_eq!(fields[2].display_label(), "Field 3", "Positional fallback");
}

// =========================================================================
// Options, radio groups, constraints
// =========================================================================

#[test]
fn select_options_are_extracted_in_order() {
    let doc = doc(body(vec![select(
        "country",
        &[("", "Choose..."), ("id", "Indonesia"), ("us", "United States")],
    )]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 1);
    let options = &fields[0].options;
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].text, "Choose...");
    assert_eq!(options[1].value, "id");
    assert_eq!(options[2].text, "United States");
}

#[test]
fn radio_group_collects_members_by_name() {
    let doc = doc(body(vec![
        labeled("Male", "g-m", json!({ "tag": "input", "attrs": { "type": "radio", "name": "gender", "value": "male" } })),
        labeled("Female", "g-f", json!({ "tag": "input", "attrs": { "type": "radio", "name": "gender", "value": "female" } })),
    ]));

    let fields = detect(&doc);
    assert_eq!(fields.len(), 2, "Each member gets its own descriptor");
    for field in &fields {
        assert_eq!(field.options.len(), 2, "Both members appear as options");
        assert_eq!(field.options[0].text, "Male");
        assert_eq!(field.options[1].value, "female");
    }
}

#[test]
fn unnamed_radio_is_a_group_of_one() {
    let doc = doc(body(vec![json!({
        "tag": "input", "attrs": { "type": "radio" },
    })]));

    let fields = detect(&doc);
    assert_eq!(fields[0].options.len(), 1);
    assert_eq!(fields[0].options[0].value, "on", "Missing value defaults to 'on'");
}

#[test]
fn constraints_are_captured_from_attributes() {
    let doc = doc(body(vec![json!({
        "tag": "input",
        "attrs": {
            "type": "text",
            "name": "code",
            "required": "",
            "maxlength": "10",
            "minlength": "2",
            "pattern": "[A-Z]+",
        },
    })]));

    let fields = detect(&doc);
    let c = &fields[0].constraints;
    assert!(c.required);
    assert_eq!(c.max_length, Some(10));
    assert_eq!(c.min_length, Some(2));
    assert_eq!(c.pattern.as_deref(), Some("[A-Z]+"));
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn detection_is_deterministic_for_the_same_snapshot() {
    let doc = doc(body(vec![
        labeled("First name", "fn", input("text", "firstName")),
        input("email", "email"),
        select("country", &[("id", "Indonesia")]),
    ]));

    let first = detect(&doc);
    let second = detect(&doc);

    let first_ids: Vec<(usize, String)> = first
        .iter()
        .map(|f| (f.index, f.fingerprint.clone()))
        .collect();
    let second_ids: Vec<(usize, String)> = second
        .iter()
        .map(|f| (f.index, f.fingerprint.clone()))
        .collect();
    assert_eq!(first_ids, second_ids, "Same snapshot, same descriptors");
}
