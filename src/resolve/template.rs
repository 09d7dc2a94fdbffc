use crate::detect::field_model::{FieldDescriptor, FieldKind};
use crate::error::FillError;
use crate::fill::policy::SelectionPolicy;
use crate::resolve::value_source::{PageContext, ResolvedValue, ValueSource};
use crate::store::templates::Template;

/// Ordered keyword rules for free-text kinds. First match wins, so the
/// compound rules (`first name`, `last name`) come before the bare
/// `name` rule. Age is deliberately absent: it only applies to number
/// fields, where "page" and "language" cannot shadow it.
const KEYWORD_RULES: [(&[&str], &str); 20] = [
    (&["email"], "email"),
    (&["first", "name"], "firstName"),
    (&["last", "name"], "lastName"),
    (&["phone"], "phone"),
    (&["tel"], "phone"),
    (&["birth"], "birthDate"),
    (&["address"], "address"),
    (&["city"], "city"),
    (&["country"], "country"),
    (&["company"], "company"),
    (&["position"], "jobTitle"),
    (&["job"], "jobTitle"),
    (&["zip"], "zipCode"),
    (&["postal"], "zipCode"),
    (&["salary"], "salary"),
    (&["password"], "password"),
    (&["description"], "description"),
    (&["bio"], "description"),
    (&["comment"], "comment"),
    (&["name"], "fullName"),
];

/// Resolves every field from a fixed data template. Total by contract:
/// never errors, never returns `None`, so it can always stand in as the
/// fallback strategy.
pub struct TemplateSource {
    template: Template,
    policy: Box<dyn SelectionPolicy>,
}

impl TemplateSource {
    pub fn new(template: Template, policy: Box<dyn SelectionPolicy>) -> TemplateSource {
        TemplateSource { template, policy }
    }

    fn default_value(&self) -> String {
        self.template
            .data
            .get("default")
            .or_else(|| self.template.data.get("fullName"))
            .cloned()
            .unwrap_or_else(|| "Sample Data".to_string())
    }

    fn lookup(&self, key: &str) -> String {
        self.template
            .data
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.default_value())
    }

    fn resolve_field(&mut self, field: &FieldDescriptor) -> ResolvedValue {
        let haystack = format!("{} {}", field.label, field.identity_tokens).to_lowercase();

        match field.kind {
            FieldKind::Checkbox => ResolvedValue::Checked(self.policy.checkbox_state()),
            FieldKind::Radio => ResolvedValue::PickOne,
            FieldKind::Email => ResolvedValue::Text(self.lookup("email")),
            FieldKind::Tel => ResolvedValue::Text(self.lookup("phone")),
            FieldKind::Date => ResolvedValue::Text(self.lookup("birthDate")),
            FieldKind::Password => ResolvedValue::Text(self.lookup("password")),
            FieldKind::Number => {
                let key = if haystack.contains("age") {
                    "age"
                } else if haystack.contains("salary") {
                    "salary"
                } else {
                    return ResolvedValue::Text(self.default_value());
                };
                ResolvedValue::Text(self.lookup(key))
            }
            FieldKind::Textarea => {
                let key = if haystack.contains("address") {
                    "fullAddress"
                } else if haystack.contains("description") || haystack.contains("bio") {
                    "description"
                } else if haystack.contains("comment") {
                    "comment"
                } else if self.template.data.contains_key("description") {
                    "description"
                } else {
                    return ResolvedValue::Text(self.default_value());
                };
                ResolvedValue::Text(self.lookup(key))
            }
            _ => ResolvedValue::Text(self.keyword_value(&haystack)),
        }
    }

    fn keyword_value(&self, haystack: &str) -> String {
        for (keywords, key) in KEYWORD_RULES {
            if keywords.iter().all(|k| haystack.contains(k)) {
                return self.lookup(key);
            }
        }
        self.default_value()
    }
}

impl ValueSource for TemplateSource {
    fn name(&self) -> &'static str {
        "template"
    }

    fn resolve(
        &mut self,
        fields: &[FieldDescriptor],
        _page: &PageContext,
    ) -> Result<Vec<Option<ResolvedValue>>, FillError> {
        Ok(fields
            .iter()
            .map(|field| Some(self.resolve_field(field)))
            .collect())
    }
}
