use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::detect::detector::detect;
use crate::dom::document::Document;
use crate::error::FillError;
use crate::fill::filler::{run_fill, FillReport};
use crate::fill::policy::policy_from_seed;
use crate::resolve::generative::{GenerativeSource, TextCompletion, DEFAULT_GEMINI_ENDPOINT};
use crate::resolve::template::TemplateSource;
use crate::resolve::value_source::ValueSource;
use crate::store::templates::{ensure_seeded, Template, TemplateStore};
use crate::trace::logger::TraceLogger;

/// A decoded request: an action name, an optional correlation id echoed
/// back in the response, and whatever extra parameters the action takes.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Persistent user settings carried by the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub selected_template: String,
    pub gemini_endpoint: String,
    pub gemini_api_key: String,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            selected_template: "qa_profile".to_string(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_api_key: String::new(),
            seed: None,
        }
    }
}

/// Serial dispatcher for the action vocabulary. Owns the template store,
/// the completion backend, and the settings; handles one request at a
/// time against one document.
pub struct Router {
    store: Box<dyn TemplateStore>,
    completion: Box<dyn TextCompletion>,
    settings: Settings,
    tracer: TraceLogger,
}

impl Router {
    /// Build a router and seed default templates into an empty store.
    pub fn new(
        mut store: Box<dyn TemplateStore>,
        completion: Box<dyn TextCompletion>,
    ) -> Result<Router, FillError> {
        ensure_seeded(store.as_mut())?;
        Ok(Router {
            store,
            completion,
            settings: Settings::default(),
            tracer: TraceLogger::disabled(),
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Router {
        self.settings = settings;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Router {
        self.tracer = tracer;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one request. Never panics and never returns transport-level
    /// errors: every outcome is a JSON response with a `success` flag,
    /// and the request's correlation id, when present, is echoed back.
    pub fn handle(&mut self, doc: &mut Document, request: Value) -> Value {
        let envelope: Envelope = match serde_json::from_value(request) {
            Ok(envelope) => envelope,
            Err(e) => {
                return json!({
                    "success": false,
                    "error": format!("Malformed request: {}", e),
                });
            }
        };

        let id = envelope.id;
        let mut response = match self.dispatch(doc, &envelope) {
            Ok(response) => response,
            Err(e) => json!({ "success": false, "error": e.to_string() }),
        };

        if let (Some(id), Some(obj)) = (id, response.as_object_mut()) {
            obj.insert("id".to_string(), json!(id));
        }
        response
    }

    fn dispatch(&mut self, doc: &mut Document, envelope: &Envelope) -> Result<Value, FillError> {
        match envelope.action.as_str() {
            "detectForms" => {
                let count = detect(doc).len();
                Ok(json!({
                    "success": true,
                    "count": count,
                    "message": format!("Found {} fillable fields", count),
                }))
            }
            "fillForm" => {
                let template = self.selected_template(envelope)?;
                let mut source =
                    TemplateSource::new(template, policy_from_seed(self.settings.seed));
                let mut policy = policy_from_seed(self.settings.seed);
                let report = run_fill(doc, &mut source, None, policy.as_mut(), &self.tracer)?;
                Ok(report_response(&report))
            }
            "fillFormWithAI" => {
                let mut source = GenerativeSource::new(self.completion.as_ref());
                let mut fallback = self
                    .store
                    .get(&self.settings.selected_template)?
                    .map(|t| TemplateSource::new(t, policy_from_seed(self.settings.seed)));
                let mut policy = policy_from_seed(self.settings.seed);
                let report = run_fill(
                    doc,
                    &mut source,
                    fallback.as_mut().map(|f| f as &mut dyn ValueSource),
                    policy.as_mut(),
                    &self.tracer,
                )?;
                Ok(report_response(&report))
            }
            "getTemplates" => {
                let templates = self.store.get_all()?;
                Ok(json!({
                    "success": true,
                    "templates": serde_json::to_value(templates).unwrap_or(Value::Null),
                }))
            }
            "saveTemplate" => {
                let id = required_str(envelope, "templateId")?;
                let template = envelope.payload.get("template").cloned().ok_or_else(|| {
                    FillError::Session {
                        command: "saveTemplate".to_string(),
                        message: "missing 'template' parameter".to_string(),
                    }
                })?;
                let template: Template =
                    serde_json::from_value(template).map_err(|e| FillError::Session {
                        command: "saveTemplate".to_string(),
                        message: format!("invalid template: {}", e),
                    })?;
                self.store.set(&id, template)?;
                Ok(json!({ "success": true }))
            }
            "deleteTemplate" => {
                let id = required_str(envelope, "templateId")?;
                self.store.delete(&id)?;
                Ok(json!({ "success": true }))
            }
            "getSettings" => Ok(json!({
                "success": true,
                "settings": serde_json::to_value(&self.settings).unwrap_or(Value::Null),
            })),
            "updateSettings" => {
                let updates = envelope
                    .payload
                    .get("settings")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(|| envelope.payload.clone());
                self.settings = merge_settings(&self.settings, updates)?;
                Ok(json!({
                    "success": true,
                    "settings": serde_json::to_value(&self.settings).unwrap_or(Value::Null),
                }))
            }
            _ => Ok(json!({ "success": false, "error": "Unknown action" })),
        }
    }

    fn selected_template(&self, envelope: &Envelope) -> Result<Template, FillError> {
        let id = envelope
            .payload
            .get("templateId")
            .and_then(Value::as_str)
            .unwrap_or(&self.settings.selected_template)
            .to_string();
        if id.is_empty() {
            return Err(FillError::NoTemplateSelected);
        }
        self.store
            .get(&id)?
            .ok_or(FillError::TemplateNotFound(id))
    }
}

fn report_response(report: &FillReport) -> Value {
    let mut response = serde_json::to_value(report).unwrap_or(Value::Null);
    if let Some(obj) = response.as_object_mut() {
        obj.insert("success".to_string(), json!(true));
    }
    response
}

fn required_str(envelope: &Envelope, key: &str) -> Result<String, FillError> {
    envelope
        .payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FillError::Session {
            command: envelope.action.clone(),
            message: format!("missing '{}' parameter", key),
        })
}

/// Apply a partial settings object over the current one, key by key.
fn merge_settings(current: &Settings, updates: Map<String, Value>) -> Result<Settings, FillError> {
    let mut merged = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in updates {
        merged.insert(key, value);
    }
    serde_json::from_value(Value::Object(merged)).map_err(|e| FillError::Session {
        command: "updateSettings".to_string(),
        message: format!("invalid settings: {}", e),
    })
}
