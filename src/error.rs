use std::fmt;

#[derive(Debug)]
pub enum FillError {
    /// File read/write failed (snapshot, template store, config)
    Io { context: String, source: std::io::Error },

    /// JSON parsing failed (snapshot, template import, bridge response)
    JsonParse { context: String, source: serde_json::Error },

    /// Snapshot had an unexpected structure
    Snapshot(String),

    /// Detection found nothing fillable; aborted before any mutation
    NoFieldsFound,

    /// Fill requested with a template id that is not in the store
    TemplateNotFound(String),

    /// Fill requested without a template id and no selected template
    NoTemplateSelected,

    /// Generative backend has no API key configured
    MissingCredential,

    /// Generative backend returned a non-2xx status
    Http { status: u16, message: String },

    /// Network or persistence channel failure
    Transport { context: String, message: String },

    /// Generative response could not be parsed, even via line recovery
    MalformedResponse(String),

    /// A single field write failed
    Write { field: String, message: String },

    /// Page bridge subprocess reported failure
    Session { command: String, message: String },
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::Io { context, source } => {
                write!(f, "I/O error ({}): {}", context, source)
            }
            FillError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            FillError::Snapshot(msg) => {
                write!(f, "Unexpected snapshot structure: {}", msg)
            }
            FillError::NoFieldsFound => {
                write!(f, "No fillable form fields found on this page")
            }
            FillError::TemplateNotFound(id) => {
                write!(f, "Template '{}' not found", id)
            }
            FillError::NoTemplateSelected => {
                write!(f, "No template selected")
            }
            FillError::MissingCredential => {
                write!(f, "No API key configured for the generative backend")
            }
            FillError::Http { status, message } => {
                write!(f, "API request failed: {} {}", status, message)
            }
            FillError::Transport { context, message } => {
                write!(f, "Transport failure ({}): {}", context, message)
            }
            FillError::MalformedResponse(detail) => {
                write!(f, "Could not parse generative response: {}", detail)
            }
            FillError::Write { field, message } => {
                write!(f, "Failed to write field '{}': {}", field, message)
            }
            FillError::Session { command, message } => {
                write!(f, "Page bridge '{}' failed: {}", command, message)
            }
        }
    }
}

impl std::error::Error for FillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FillError::Io { source, .. } => Some(source),
            FillError::JsonParse { source, .. } => Some(source),
            _ => None,
        }
    }
}
