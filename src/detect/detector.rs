use crate::detect::field_model::{FieldConstraints, FieldDescriptor, FieldKind, FieldOption};
use crate::detect::label::resolve_label;
use crate::dom::document::Document;
use crate::dom::node::{DomNode, NodeId};

/// Identity-token substrings that mark a field as security-relevant or
/// part of browser/extension infrastructure. Hard deny, not scored: any
/// match excludes the element.
pub const SENSITIVE_MARKERS: [&str; 9] = [
    "captcha",
    "csrf",
    "token",
    "antiforgery",
    "viewstate",
    "extension",
    "chrome",
    "browser",
    "system",
];

/// ARIA roles that flag a container as page chrome rather than content.
const CHROME_ROLES: [&str; 3] = ["banner", "navigation", "search"];

/// Class/id substrings that flag a container as browser or extension UI.
const CHROME_MARKERS: [&str; 3] = ["extension", "chrome", "browser"];

/// Scan the document and produce one descriptor per eligible element,
/// in document order. Reads only; a single live snapshot per pass.
/// Candidacy is classification: an element is a candidate exactly when
/// it has a field kind, so extraction is total.
pub fn detect(doc: &Document) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    for id in doc.ids() {
        let Some(kind) = FieldKind::from_node(doc.node(id)) else {
            continue;
        };
        if !is_fillable(doc, id) {
            continue;
        }
        fields.push(extract_descriptor(doc, id, kind, fields.len()));
    }
    fields
}

/// The five eligibility rules, applied in order, short-circuiting on the
/// first failure.
fn is_fillable(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);

    // 1. Must be laid out, or explicitly not display:none.
    if !node.is_laid_out() {
        return false;
    }

    // 2. Must be interactable.
    if node.disabled || node.read_only {
        return false;
    }

    // 3. Non-fillable input types.
    if matches!(node.input_type(), Some("hidden") | Some("submit") | Some("button")) {
        return false;
    }

    // 4. Sensitive/system field markers in the identity tokens.
    let tokens = identity_tokens(node);
    if SENSITIVE_MARKERS.iter().any(|m| tokens.contains(m)) {
        return false;
    }

    // 5. Must not sit inside browser/extension chrome.
    for ancestor in doc.ancestors(id) {
        let container = doc.node(ancestor);
        if container
            .role()
            .is_some_and(|r| CHROME_ROLES.contains(&r))
        {
            return false;
        }
        let container_tokens = format!("{} {}", container.class_name(), container.html_id())
            .to_lowercase();
        if CHROME_MARKERS.iter().any(|m| container_tokens.contains(m)) {
            return false;
        }
    }

    true
}

fn identity_tokens(node: &DomNode) -> String {
    format!(
        "{} {} {} {}",
        node.name(),
        node.html_id(),
        node.class_name(),
        node.placeholder()
    )
    .to_lowercase()
}

fn extract_descriptor(
    doc: &Document,
    id: NodeId,
    kind: FieldKind,
    index: usize,
) -> FieldDescriptor {
    let node = doc.node(id);
    let tokens = identity_tokens(node);
    let label = resolve_label(doc, id);
    let fingerprint = field_fingerprint(index, &node.tag, &tokens, &label);

    let options = match kind {
        FieldKind::Select => select_options(doc, id),
        FieldKind::Radio => radio_group(doc, id),
        _ => Vec::new(),
    };

    FieldDescriptor {
        index,
        node: id,
        kind,
        name: node.name().to_string(),
        placeholder: node.placeholder().to_string(),
        identity_tokens: tokens,
        label,
        fingerprint,
        constraints: extract_constraints(node),
        options,
        current_value: node.value.clone(),
        nearby_text: nearby_text(doc, id),
    }
}

fn extract_constraints(node: &DomNode) -> FieldConstraints {
    FieldConstraints {
        required: node.attrs.contains_key("required"),
        max_length: node
            .attr("maxlength")
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0),
        min_length: node
            .attr("minlength")
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0),
        pattern: node.attr("pattern").map(str::to_string),
        min: node.attr("min").map(str::to_string),
        max: node.attr("max").map(str::to_string),
        step: node.attr("step").map(str::to_string),
    }
}

/// Every `option` under a select, in insertion order.
fn select_options(doc: &Document, select: NodeId) -> Vec<FieldOption> {
    doc.descendants(select)
        .into_iter()
        .filter(|&id| doc.node(id).tag == "option")
        .map(|id| FieldOption {
            value: doc.option_value(id).unwrap_or_default(),
            text: doc.text_content(id),
            selected: doc.node(id).selected,
            node: id,
        })
        .collect()
}

/// Every radio input sharing this element's `name`, document-wide, each
/// labelled with the same resolution procedure as the field itself.
fn radio_group(doc: &Document, member: NodeId) -> Vec<FieldOption> {
    let name = doc.node(member).name().to_string();
    let group: Vec<NodeId> = if name.is_empty() {
        vec![member]
    } else {
        doc.ids()
            .filter(|&id| {
                let node = doc.node(id);
                node.tag == "input"
                    && node.input_type() == Some("radio")
                    && node.name() == name
            })
            .collect()
    };

    group
        .into_iter()
        .map(|id| {
            let value = doc
                .node(id)
                .attr("value")
                .unwrap_or("on")
                .to_string();
            let label = resolve_label(doc, id);
            FieldOption {
                text: if label.is_empty() { value.clone() } else { label },
                value,
                selected: doc.node(id).checked,
                node: id,
            }
        })
        .collect()
}

/// Parent text minus the element's own value, truncated, as prompt context.
fn nearby_text(doc: &Document, id: NodeId) -> String {
    let Some(parent) = doc.node(id).parent else {
        return String::new();
    };
    let mut text = doc.text_content(parent);
    let value = &doc.node(id).value;
    if !value.is_empty() {
        text = text.replacen(value.as_str(), "", 1);
    }
    text.trim().chars().take(100).collect()
}

/// Stable identity hash of a detected field, carried through traces and
/// write ops so a fill can be correlated back to the element it touched.
pub fn field_fingerprint(index: usize, tag: &str, tokens: &str, label: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(format!("{}|{}|{}|{}", index, tag, tokens, label).as_bytes());
    format!("{:x}", hasher.finalize())
}
