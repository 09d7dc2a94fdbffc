use crate::dom::document::Document;
use crate::dom::node::NodeId;

/// Resolve the human label of a form element. Strict priority order,
/// first non-empty wins:
///
/// 1. `label[for=<id>]` matching the element's id
/// 2. nearest enclosing `label` ancestor (own value text stripped)
/// 3. the `aria-labelledby` target's text
/// 4. nearest preceding sibling text, else the parent's preceding sibling
pub fn resolve_label(doc: &Document, id: NodeId) -> String {
    label_for_target(doc, id)
        .or_else(|| enclosing_label(doc, id))
        .or_else(|| aria_labelledby(doc, id))
        .or_else(|| preceding_text(doc, id))
        .unwrap_or_default()
}

fn label_for_target(doc: &Document, id: NodeId) -> Option<String> {
    let html_id = doc.node(id).html_id();
    if html_id.is_empty() {
        return None;
    }
    doc.ids()
        .find(|&candidate| {
            let node = doc.node(candidate);
            node.tag == "label" && node.attr("for") == Some(html_id)
        })
        .map(|label| doc.text_content(label))
        .filter(|text| !text.is_empty())
}

fn enclosing_label(doc: &Document, id: NodeId) -> Option<String> {
    let ancestor = doc
        .ancestors(id)
        .into_iter()
        .find(|&a| doc.node(a).tag == "label")?;

    let mut text = doc.text_content(ancestor);
    // Strip the element's own value so a prefilled field doesn't echo
    // its value back as the label.
    let value = &doc.node(id).value;
    if !value.is_empty() {
        text = text.replacen(value.as_str(), "", 1);
    }
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn aria_labelledby(doc: &Document, id: NodeId) -> Option<String> {
    let target = doc.node(id).attr("aria-labelledby")?;
    let label = doc.by_html_id(target)?;
    let text = doc.text_content(label);
    (!text.is_empty()).then_some(text)
}

fn preceding_text(doc: &Document, id: NodeId) -> Option<String> {
    // Walk the element's own preceding siblings, nearest first.
    for sibling in doc.preceding_siblings(id) {
        let text = doc.text_content(sibling);
        if !text.is_empty() {
            return Some(text);
        }
    }

    // Fall back to the parent's immediately preceding sibling.
    let parent = doc.node(id).parent?;
    let previous = doc.preceding_siblings(parent).into_iter().next()?;
    let text = doc.text_content(previous);
    (!text.is_empty()).then_some(text)
}
