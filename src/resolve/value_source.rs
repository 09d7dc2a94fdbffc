use crate::detect::field_model::FieldDescriptor;
use crate::dom::document::Document;
use crate::error::FillError;

/// A value the resolver picked for one field. `PickOne` is the template
/// strategy's radio contract: the filler, not the resolver, makes the
/// concrete group pick.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Text(String),
    Checked(bool),
    PickOne,
}

impl ResolvedValue {
    /// Blank values are skipped by the filler without counting as errors.
    pub fn is_blank(&self) -> bool {
        matches!(self, ResolvedValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> String {
        match self {
            ResolvedValue::Text(s) => s.clone(),
            ResolvedValue::Checked(b) => b.to_string(),
            ResolvedValue::PickOne => String::new(),
        }
    }
}

/// Page-level context handed to value sources alongside the field list.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub headings: Vec<String>,
}

impl PageContext {
    pub fn from_document(doc: &Document) -> PageContext {
        PageContext {
            title: doc.title.clone(),
            url: doc.url.clone().unwrap_or_default(),
            headings: doc.headings(),
        }
    }

    /// Short form-context line for the generative prompt.
    pub fn form_context(&self) -> String {
        if !self.headings.is_empty() {
            self.headings.join(", ")
        } else if !self.title.is_empty() {
            self.title.clone()
        } else {
            "General form".to_string()
        }
    }
}

/// One strategy for turning a detected field list into values. The result
/// always has the same length as the input; `None` means the field is
/// left untouched.
pub trait ValueSource {
    fn name(&self) -> &'static str;

    fn resolve(
        &mut self,
        fields: &[FieldDescriptor],
        page: &PageContext,
    ) -> Result<Vec<Option<ResolvedValue>>, FillError>;
}

/// Truthy string forms accepted for checkbox state.
pub fn parse_boolean(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "on" | "checked" | "selected"
    )
}
