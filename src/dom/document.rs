use serde::Serialize;
use serde_json::Value;

use crate::dom::node::{DomNode, NodeId, RawNode};
use crate::error::FillError;

/// How synthetic events can be constructed against the hosting page.
/// `Legacy` is the fallback creation path with identical semantics;
/// `Unavailable` means dispatch is skipped (logged, never fatal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventApi {
    Standard,
    Legacy,
    Unavailable,
}

/// One mutation performed by the filler, keyed by the field fingerprint.
/// The page bridge replays these against the live page in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WriteOp {
    SetValue { fingerprint: String, value: String },
    SetChecked { fingerprint: String, checked: bool },
    SelectOption { fingerprint: String, value: String },
    SetContent { fingerprint: String, value: String },
    DispatchEvents { fingerprint: String, events: Vec<String> },
}

/// An arena-backed DOM snapshot. Nodes are stored in pre-order, so
/// iterating ids walks the document top to bottom.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: Option<String>,
    pub title: String,
    nodes: Vec<DomNode>,
    event_api: EventApi,
    write_log: Vec<WriteOp>,
}

impl Document {
    /// Build a document from an extracted snapshot: `{url, title, root}`.
    pub fn from_value(value: Value) -> Result<Document, FillError> {
        let url = value
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string);
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let root = value
            .get("root")
            .cloned()
            .ok_or_else(|| FillError::Snapshot("missing 'root' node".into()))?;

        let raw: RawNode = serde_json::from_value(root).map_err(|e| FillError::JsonParse {
            context: "snapshot root".into(),
            source: e,
        })?;

        let mut nodes = Vec::new();
        flatten(raw, None, &mut nodes);

        Ok(Document {
            url,
            title,
            nodes,
            event_api: EventApi::Standard,
            write_log: Vec::new(),
        })
    }

    pub fn from_str(snapshot: &str) -> Result<Document, FillError> {
        let value: Value = serde_json::from_str(snapshot).map_err(|e| FillError::JsonParse {
            context: "snapshot".into(),
            source: e,
        })?;
        Document::from_value(value)
    }

    pub fn with_event_api(mut self, api: EventApi) -> Document {
        self.event_api = api;
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First node whose `id` attribute matches (non-empty ids only).
    pub fn by_html_id(&self, html_id: &str) -> Option<NodeId> {
        if html_id.is_empty() {
            return None;
        }
        self.ids().find(|&id| self.node(id).html_id() == html_id)
    }

    /// Parent chain, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.node(parent).parent;
        }
        out
    }

    /// Preceding siblings of a node, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.node(id).parent else {
            return Vec::new();
        };
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&c| c == id).unwrap_or(0);
        siblings[..pos].iter().rev().copied().collect()
    }

    /// Subtree of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// Concatenated text of a node and its subtree, whitespace-collapsed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &self.node(id).text {
            if !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
        for child in self.descendants(id) {
            if let Some(text) = &self.node(child).text {
                if !text.trim().is_empty() {
                    parts.push(text.trim().to_string());
                }
            }
        }
        parts.join(" ")
    }

    /// Top page headings (h1-h3), used as form context for the prompt.
    pub fn headings(&self) -> Vec<String> {
        self.ids()
            .filter(|&id| matches!(self.node(id).tag.as_str(), "h1" | "h2" | "h3"))
            .map(|id| self.text_content(id))
            .filter(|t| !t.is_empty())
            .take(3)
            .collect()
    }

    /// Mutations performed so far, in order.
    pub fn writes(&self) -> &[WriteOp] {
        &self.write_log
    }

    // ------------------------------------------------------------------
    // Mutation (filler write strategies)
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, id: NodeId, value: &str, fingerprint: &str) {
        self.nodes[id.0].value = value.to_string();
        self.write_log.push(WriteOp::SetValue {
            fingerprint: fingerprint.to_string(),
            value: value.to_string(),
        });
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool, fingerprint: &str) {
        self.nodes[id.0].checked = checked;
        self.write_log.push(WriteOp::SetChecked {
            fingerprint: fingerprint.to_string(),
            checked,
        });
    }

    /// Uncheck a radio group member without logging a write op; the live
    /// page unchecks siblings natively when one member is checked.
    pub(crate) fn clear_checked(&mut self, id: NodeId) {
        self.nodes[id.0].checked = false;
    }

    /// Mark one option of a select as chosen and sync the select's value.
    pub fn select_option(&mut self, select: NodeId, option: NodeId, fingerprint: &str) {
        let value = self
            .option_value(option)
            .unwrap_or_default();
        for child in self.descendants(select) {
            if self.node(child).tag == "option" {
                self.nodes[child.0].selected = child == option;
            }
        }
        self.nodes[select.0].value = value.clone();
        self.write_log.push(WriteOp::SelectOption {
            fingerprint: fingerprint.to_string(),
            value,
        });
    }

    /// An option's submit value: its `value` attribute, else its text.
    pub fn option_value(&self, option: NodeId) -> Option<String> {
        let node = self.node(option);
        match node.attr("value") {
            Some(v) => Some(v.to_string()),
            None => Some(self.text_content(option)),
        }
    }

    pub fn set_content(&mut self, id: NodeId, value: &str, fingerprint: &str) {
        self.nodes[id.0].text = Some(value.to_string());
        self.write_log.push(WriteOp::SetContent {
            fingerprint: fingerprint.to_string(),
            value: value.to_string(),
        });
    }

    /// Dispatch the synthetic event sequence on a node. The legacy path is
    /// semantically identical to the standard one; an unavailable event API
    /// logs and continues, never fails the write.
    pub fn dispatch_events(&mut self, id: NodeId, events: &[&str], fingerprint: &str) {
        match self.event_api {
            EventApi::Standard | EventApi::Legacy => {
                for event in events {
                    self.nodes[id.0].dispatched_events.push((*event).to_string());
                }
                self.write_log.push(WriteOp::DispatchEvents {
                    fingerprint: fingerprint.to_string(),
                    events: events.iter().map(|e| (*e).to_string()).collect(),
                });
            }
            EventApi::Unavailable => {
                eprintln!(
                    "formfill: event API unavailable, skipping events for field {}",
                    fingerprint
                );
            }
        }
    }
}

fn flatten(raw: RawNode, parent: Option<NodeId>, nodes: &mut Vec<DomNode>) -> NodeId {
    let id = NodeId(nodes.len());
    let RawNode {
        tag,
        attrs,
        text,
        value,
        checked,
        selected,
        disabled,
        read_only,
        has_layout,
        display,
        children,
    } = raw;

    nodes.push(DomNode {
        id,
        parent,
        children: Vec::new(),
        tag,
        attrs,
        text,
        value: value.unwrap_or_default(),
        checked,
        selected,
        disabled,
        read_only,
        has_layout,
        display,
        dispatched_events: Vec::new(),
    });

    let child_ids: Vec<NodeId> = children
        .into_iter()
        .map(|child| flatten(child, Some(id), nodes))
        .collect();
    nodes[id.0].children = child_ids;
    id
}
