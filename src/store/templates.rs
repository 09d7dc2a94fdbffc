use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::FillError;

/// A named, user-visible fill data bundle. Values round-trip through
/// plain JSON so export/import preserves structure exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub data: BTreeMap<String, String>,
}

impl Template {
    pub fn new(name: &str, description: &str, data: &[(&str, &str)]) -> Template {
        Template {
            name: name.to_string(),
            description: description.to_string(),
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// External persistence contract for templates. Keys are user-chosen or
/// generated ids; values are plain serializable structures.
pub trait TemplateStore {
    fn get_all(&self) -> Result<BTreeMap<String, Template>, FillError>;
    fn get(&self, id: &str) -> Result<Option<Template>, FillError>;
    fn set(&mut self, id: &str, template: Template) -> Result<(), FillError>;
    fn delete(&mut self, id: &str) -> Result<(), FillError>;
}

/// In-memory store, used in tests and as the router default.
#[derive(Debug, Default)]
pub struct MemoryStore {
    templates: BTreeMap<String, Template>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl TemplateStore for MemoryStore {
    fn get_all(&self) -> Result<BTreeMap<String, Template>, FillError> {
        Ok(self.templates.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Template>, FillError> {
        Ok(self.templates.get(id).cloned())
    }

    fn set(&mut self, id: &str, template: Template) -> Result<(), FillError> {
        self.templates.insert(id.to_string(), template);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), FillError> {
        self.templates.remove(id);
        Ok(())
    }
}

/// JSON-file-backed store. Loads once on open, writes through on every
/// mutation; nothing is committed on failure.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    templates: BTreeMap<String, Template>,
}

impl FileStore {
    pub fn open(path: &str) -> Result<FileStore, FillError> {
        let path = PathBuf::from(path);
        let templates = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| FillError::Io {
                context: format!("reading template store {}", path.display()),
                source: e,
            })?;
            serde_json::from_str(&content).map_err(|e| FillError::JsonParse {
                context: format!("template store {}", path.display()),
                source: e,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(FileStore { path, templates })
    }

    fn persist(&self) -> Result<(), FillError> {
        let content = serde_json::to_string_pretty(&self.templates).map_err(|e| {
            FillError::JsonParse {
                context: "serializing template store".into(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, content).map_err(|e| FillError::Io {
            context: format!("writing template store {}", self.path.display()),
            source: e,
        })
    }
}

impl TemplateStore for FileStore {
    fn get_all(&self) -> Result<BTreeMap<String, Template>, FillError> {
        Ok(self.templates.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Template>, FillError> {
        Ok(self.templates.get(id).cloned())
    }

    fn set(&mut self, id: &str, template: Template) -> Result<(), FillError> {
        self.templates.insert(id.to_string(), template);
        self.persist()
    }

    fn delete(&mut self, id: &str) -> Result<(), FillError> {
        self.templates.remove(id);
        self.persist()
    }
}

/// Seed the default templates into an empty store. Idempotent: a store
/// that already has templates is left untouched. Returns whether seeding
/// happened.
pub fn ensure_seeded(store: &mut dyn TemplateStore) -> Result<bool, FillError> {
    if !store.get_all()?.is_empty() {
        return Ok(false);
    }
    for (id, template) in default_templates() {
        store.set(&id, template)?;
    }
    Ok(true)
}

/// Export the whole store as pretty JSON.
pub fn export_json(store: &dyn TemplateStore) -> Result<String, FillError> {
    serde_json::to_string_pretty(&store.get_all()?).map_err(|e| FillError::JsonParse {
        context: "exporting templates".into(),
        source: e,
    })
}

/// Import a JSON export, overwriting templates with matching ids.
/// Returns how many templates were imported.
pub fn import_json(store: &mut dyn TemplateStore, json: &str) -> Result<usize, FillError> {
    let imported: BTreeMap<String, Template> =
        serde_json::from_str(json).map_err(|e| FillError::JsonParse {
            context: "importing templates".into(),
            source: e,
        })?;
    let count = imported.len();
    for (id, template) in imported {
        store.set(&id, template)?;
    }
    Ok(count)
}

/// The three seed profiles installed on first run.
pub fn default_templates() -> BTreeMap<String, Template> {
    let mut templates = BTreeMap::new();

    templates.insert(
        "qa_profile".to_string(),
        Template::new(
            "QA Tester Profile",
            "Data for QA testing",
            &[
                ("firstName", "Ahmad"),
                ("lastName", "Tester"),
                ("fullName", "Ahmad Tester"),
                ("email", "ahmad.tester@qa.com"),
                ("phone", "081234567890"),
                ("birthDate", "1990-05-15"),
                ("age", "33"),
                ("address", "Jl. Testing No. 123"),
                ("city", "Jakarta"),
                ("country", "Indonesia"),
                ("company", "QA Testing Corp"),
                ("jobTitle", "Senior QA Engineer"),
                ("salary", "8000000"),
                ("password", "TestPass123!"),
                (
                    "fullAddress",
                    "Jl. Testing No. 123, RT/RW 01/02, Kelurahan Testing, Kecamatan QA, Jakarta Selatan 12345",
                ),
                (
                    "description",
                    "This is a description used for QA testing. Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
                ),
                (
                    "comment",
                    "Testing comment for form validation and application functionality.",
                ),
            ],
        ),
    );

    templates.insert(
        "user_profile".to_string(),
        Template::new(
            "Regular User Profile",
            "Ordinary user data",
            &[
                ("firstName", "Budi"),
                ("lastName", "Santoso"),
                ("fullName", "Budi Santoso"),
                ("email", "budi.santoso@gmail.com"),
                ("phone", "087654321098"),
                ("birthDate", "1985-12-20"),
                ("age", "38"),
                ("address", "Jl. Mawar No. 45"),
                ("city", "Bandung"),
                ("country", "Indonesia"),
                ("company", "PT. Teknologi Maju"),
                ("jobTitle", "Software Developer"),
                ("salary", "12000000"),
                ("password", "UserPass456!"),
                (
                    "fullAddress",
                    "Jl. Mawar No. 45, RT/RW 03/04, Kelurahan Sukajadi, Kecamatan Coblong, Bandung 40132",
                ),
                (
                    "description",
                    "An experienced developer building web and mobile applications.",
                ),
                (
                    "comment",
                    "Interested in new technology and always eager to learn.",
                ),
            ],
        ),
    );

    templates.insert(
        "dummy_profile".to_string(),
        Template::new(
            "Dummy Data Profile",
            "Dummy data for testing",
            &[
                ("firstName", "John"),
                ("lastName", "Doe"),
                ("fullName", "John Doe"),
                ("email", "john.doe@example.com"),
                ("phone", "555-0123"),
                ("birthDate", "1995-01-01"),
                ("age", "29"),
                ("address", "123 Main Street"),
                ("city", "New York"),
                ("country", "United States"),
                ("company", "Example Corp"),
                ("jobTitle", "Test Manager"),
                ("salary", "75000"),
                ("password", "DummyPass789!"),
                (
                    "fullAddress",
                    "123 Main Street, Apt 4B, Manhattan, New York, NY 10001, United States",
                ),
                (
                    "description",
                    "This is a dummy profile created for testing purposes. All information is fictional.",
                ),
                (
                    "comment",
                    "This is a sample comment for testing form submissions and validations.",
                ),
            ],
        ),
    );

    templates
}
