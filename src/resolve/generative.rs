use serde::Serialize;
use serde_json::Value;

use crate::detect::field_model::{FieldDescriptor, FieldKind};
use crate::error::FillError;
use crate::resolve::value_source::{parse_boolean, PageContext, ResolvedValue, ValueSource};

pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> GenerationParams {
        GenerationParams {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// A text completion backend. The router owns one behind this trait so
/// tests can swap the network out for canned responses.
pub trait TextCompletion {
    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, FillError>;
}

/// Gemini `generateContent` over blocking HTTP.
pub struct GeminiBackend {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, api_key: &str) -> GeminiBackend {
        GeminiBackend {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl TextCompletion for GeminiBackend {
    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, FillError> {
        if self.api_key.is_empty() {
            return Err(FillError::MissingCredential);
        }

        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": params,
        });

        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&body)
            .send()
            .map_err(|e| FillError::Transport {
                context: "sending completion request".into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(FillError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().map_err(|e| FillError::Transport {
            context: "reading completion response".into(),
            message: e.to_string(),
        })?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                FillError::MalformedResponse("response carried no candidate text".into())
            })
    }
}

/// Canned backend for tests.
pub struct MockCompletion {
    pub response: String,
}

impl TextCompletion for MockCompletion {
    fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, FillError> {
        Ok(self.response.clone())
    }
}

/// Backend that always fails, for exercising the fallback path.
pub struct FailingCompletion;

impl TextCompletion for FailingCompletion {
    fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, FillError> {
        Err(FillError::Transport {
            context: "sending completion request".into(),
            message: "connection refused".into(),
        })
    }
}

/// Resolves values by asking a completion backend for one value per
/// field. A short result fills a prefix; the rest stay `None`.
pub struct GenerativeSource<'a> {
    backend: &'a dyn TextCompletion,
    params: GenerationParams,
}

impl<'a> GenerativeSource<'a> {
    pub fn new(backend: &'a dyn TextCompletion) -> GenerativeSource<'a> {
        GenerativeSource {
            backend,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> GenerativeSource<'a> {
        self.params = params;
        self
    }
}

impl ValueSource for GenerativeSource<'_> {
    fn name(&self) -> &'static str {
        "generative"
    }

    fn resolve(
        &mut self,
        fields: &[FieldDescriptor],
        page: &PageContext,
    ) -> Result<Vec<Option<ResolvedValue>>, FillError> {
        let prompt = build_prompt(fields, page);
        let text = self.backend.complete(&prompt, &self.params)?;
        let values = parse_values(&text)?;

        let mut resolved: Vec<Option<ResolvedValue>> = fields
            .iter()
            .zip(values)
            .map(|(field, value)| {
                // A blank value means the model declined the field; skip it
                // before any kind conversion, checkboxes included.
                if value.trim().is_empty() {
                    return None;
                }
                Some(match field.kind {
                    FieldKind::Checkbox => ResolvedValue::Checked(parse_boolean(&value)),
                    _ => ResolvedValue::Text(value),
                })
            })
            .collect();
        resolved.resize(fields.len(), None);
        Ok(resolved)
    }
}

/// One numbered block per field, then page context, then the output
/// contract. Kept close to what the model was observed to follow.
pub fn build_prompt(fields: &[FieldDescriptor], page: &PageContext) -> String {
    let mut prompt = String::from(
        "Generate realistic sample values for the following form fields. \
         Values must be plausible and consistent with each other.\n\n",
    );

    for field in fields {
        prompt.push_str(&format!("{}. {}\n", field.index + 1, field.display_label()));
        prompt.push_str(&format!("   Type: {}\n", field.kind.as_str()));
        if !field.name.is_empty() {
            prompt.push_str(&format!("   Name: {}\n", field.name));
        }
        prompt.push_str(&format!(
            "   Placeholder: {}\n",
            if field.placeholder.is_empty() {
                "None"
            } else {
                &field.placeholder
            }
        ));
        prompt.push_str(&format!(
            "   Required: {}\n",
            if field.constraints.required { "Yes" } else { "No" }
        ));
        if !field.options.is_empty() {
            let options: Vec<&str> = field.options.iter().map(|o| o.text.as_str()).collect();
            prompt.push_str(&format!("   Options: {}\n", options.join(", ")));
        }
        if let Some(max) = field.constraints.max_length {
            prompt.push_str(&format!("   Max Length: {}\n", max));
        }
        if !field.nearby_text.is_empty() {
            prompt.push_str(&format!("   Context: {}\n", field.nearby_text));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("Page title: {}\n", page.title));
    prompt.push_str(&format!("Page URL: {}\n", page.url));
    prompt.push_str(&format!("Form context: {}\n\n", page.form_context()));
    prompt.push_str(
        "Return ONLY a JSON array of string values, one per field, in order. \
         No explanations, no markdown.",
    );
    prompt
}

/// Pull a value list out of whatever the model returned. First choice is
/// the bracketed JSON array anywhere in the text; models that ignore the
/// format get a line-per-value salvage pass instead.
pub fn parse_values(text: &str) -> Result<Vec<String>, FillError> {
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(values) = serde_json::from_str::<Vec<Value>>(&text[start..=end]) {
                return Ok(values
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect());
            }
        }
    }

    let values: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with('#'))
        .map(|line| {
            line.trim_end_matches(',')
                .trim_matches('"')
                .to_string()
        })
        .collect();

    if values.is_empty() {
        return Err(FillError::MalformedResponse(
            "no values could be recovered from the response".into(),
        ));
    }
    Ok(values)
}
