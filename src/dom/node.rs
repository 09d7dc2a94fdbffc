use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index of a node in its `Document` arena. Node ids follow document
/// (pre-order) order, so comparing ids compares document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// One node of the snapshot tree as emitted by the page extractor
/// (one JSON object per element, children nested).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Whether the element had a rendered box (an offset parent) at capture time.
    #[serde(default = "default_true")]
    pub has_layout: bool,
    /// Inline `style.display` override, when one was set on the element itself.
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

fn default_true() -> bool {
    true
}

/// A live node in the document arena. Shared by the detector (reads)
/// and the filler (writes) through its `NodeId`.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub text: Option<String>,
    pub value: String,
    pub checked: bool,
    pub selected: bool,
    pub disabled: bool,
    pub read_only: bool,
    pub has_layout: bool,
    pub display: Option<String>,
    /// Synthetic events dispatched on this node, in dispatch order.
    pub dispatched_events: Vec<String>,
}

impl DomNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn html_id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.attr("name").unwrap_or("")
    }

    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    pub fn placeholder(&self) -> &str {
        self.attr("placeholder").unwrap_or("")
    }

    pub fn input_type(&self) -> Option<&str> {
        self.attr("type")
    }

    pub fn role(&self) -> Option<&str> {
        self.attr("role")
    }

    pub fn is_content_editable(&self) -> bool {
        self.attr("contenteditable") == Some("true")
    }

    /// Visible per the eligibility contract: has a rendered box, or carries
    /// an explicit inline display override that is not `none`.
    pub fn is_laid_out(&self) -> bool {
        if self.has_layout {
            return true;
        }
        self.display.as_deref().is_some_and(|d| d != "none")
    }
}
