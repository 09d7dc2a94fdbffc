#![allow(dead_code)]

use formfill::Document;
use serde_json::{json, Value};

/// Wrap a root node into the snapshot shape the extractor emits.
pub fn snapshot(root: Value) -> Value {
    json!({
        "url": "https://example.com/form",
        "title": "Example Form",
        "root": root,
    })
}

/// Build a document from a root node. Panics on malformed fixtures.
pub fn doc(root: Value) -> Document {
    Document::from_value(snapshot(root)).expect("fixture snapshot should parse")
}

/// A body element wrapping the given children.
pub fn body(children: Vec<Value>) -> Value {
    json!({ "tag": "body", "children": children })
}

/// A plain input with a type and a name.
pub fn input(input_type: &str, name: &str) -> Value {
    json!({ "tag": "input", "attrs": { "type": input_type, "name": name } })
}

/// A `label[for]` + field pair inside a div.
pub fn labeled(label: &str, id: &str, mut field: Value) -> Value {
    field["attrs"]["id"] = json!(id);
    json!({
        "tag": "div",
        "children": [
            { "tag": "label", "attrs": { "for": id }, "text": label },
            field,
        ],
    })
}

/// A select with (value, text) options.
pub fn select(name: &str, options: &[(&str, &str)]) -> Value {
    let options: Vec<Value> = options
        .iter()
        .map(|(value, text)| {
            json!({ "tag": "option", "attrs": { "value": value }, "text": text })
        })
        .collect();
    json!({
        "tag": "select",
        "attrs": { "name": name },
        "children": options,
    })
}
