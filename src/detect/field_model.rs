use serde::{Deserialize, Serialize};

use crate::dom::node::{DomNode, NodeId};

/// Closed classification of a fillable element. The filler dispatches on
/// this tag rather than on raw DOM shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Password,
    Url,
    Search,
    Checkbox,
    Radio,
    Select,
    Textarea,
    ContentEditable,
}

impl FieldKind {
    /// Classify a DOM node. Returns `None` for tags that are not form
    /// elements at all (those never reach the eligibility filter).
    pub fn from_node(node: &DomNode) -> Option<FieldKind> {
        match node.tag.as_str() {
            "textarea" => Some(FieldKind::Textarea),
            "select" => Some(FieldKind::Select),
            "input" => Some(match node.input_type().unwrap_or("text") {
                "email" => FieldKind::Email,
                "tel" => FieldKind::Tel,
                "number" => FieldKind::Number,
                "date" | "datetime-local" => FieldKind::Date,
                "password" => FieldKind::Password,
                "url" => FieldKind::Url,
                "search" => FieldKind::Search,
                "checkbox" => FieldKind::Checkbox,
                "radio" => FieldKind::Radio,
                // Unrecognized input types take the plain value write path
                _ => FieldKind::Text,
            }),
            _ if node.is_content_editable() => Some(FieldKind::ContentEditable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Password => "password",
            FieldKind::Url => "url",
            FieldKind::Search => "search",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::Textarea => "textarea",
            FieldKind::ContentEditable => "contenteditable",
        }
    }
}

/// Validation constraints captured from the element's attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConstraints {
    pub required: bool,
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
    pub pattern: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub step: Option<String>,
}

/// One choice of a select or radio group, with the arena node that backs it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
    pub node: NodeId,
}

/// One eligible element, with everything the resolver and filler need.
/// `index` is dense 0..N-1 within a detection pass and is the sole join
/// key against an externally-sourced ordered value list.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub index: usize,
    pub node: NodeId,
    pub kind: FieldKind,
    pub name: String,
    pub placeholder: String,
    /// name + id + class + placeholder, lower-cased, for keyword matching.
    pub identity_tokens: String,
    /// Best-effort human label (label[for] > enclosing label >
    /// aria-labelledby > nearest preceding text).
    pub label: String,
    /// Stable hash of the field's identity, used in traces and write ops.
    pub fingerprint: String,
    pub constraints: FieldConstraints,
    /// Ordered options for select/radio kinds; empty otherwise.
    pub options: Vec<FieldOption>,
    /// Value at detection time (informational only).
    pub current_value: String,
    /// Surrounding text, as extra context for the generative prompt.
    pub nearby_text: String,
}

impl FieldDescriptor {
    /// Display label for prompts and reports: label, else placeholder,
    /// else name, else a positional fallback.
    pub fn display_label(&self) -> String {
        if !self.label.is_empty() {
            self.label.clone()
        } else if !self.placeholder.is_empty() {
            self.placeholder.clone()
        } else if !self.name.is_empty() {
            self.name.clone()
        } else {
            format!("Field {}", self.index + 1)
        }
    }
}
