use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "formfill",
    version,
    about = "Form field detection and filling engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Gemini API endpoint
    #[arg(long, global = true)]
    pub gemini_endpoint: Option<String>,

    /// Gemini API key (falls back to config file, then GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub gemini_api_key: Option<String>,

    /// Path to the template store JSON file
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Path to config file (default: formfill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect fillable fields and print their descriptors
    Detect {
        /// Path to a page snapshot JSON file
        #[arg(long)]
        snapshot: Option<String>,

        /// URL to open in a live page session instead
        #[arg(long)]
        url: Option<String>,
    },

    /// Fill a page from a data template
    Fill {
        /// Path to a page snapshot JSON file
        #[arg(long)]
        snapshot: Option<String>,

        /// URL to open in a live page session instead
        #[arg(long)]
        url: Option<String>,

        /// Template id to fill from
        #[arg(long)]
        template: Option<String>,

        /// Write the recorded write-op log to this file
        #[arg(short, long)]
        out: Option<String>,

        /// Seed for randomized checkbox/option picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Fill a page with AI-generated values, template fallback
    FillAi {
        /// Path to a page snapshot JSON file
        #[arg(long)]
        snapshot: Option<String>,

        /// URL to open in a live page session instead
        #[arg(long)]
        url: Option<String>,

        /// Fallback template id
        #[arg(long)]
        template: Option<String>,

        /// Write the recorded write-op log to this file
        #[arg(short, long)]
        out: Option<String>,

        /// Seed for randomized checkbox/option picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage the template store
    Templates {
        /// Export all templates as JSON to this file (- for stdout)
        #[arg(long)]
        export: Option<String>,

        /// Import templates from a JSON export file
        #[arg(long)]
        import: Option<String>,

        /// Delete a template by id
        #[arg(long)]
        delete: Option<String>,
    },

    /// Serve the action vocabulary over stdin/stdout (one JSON per line)
    Route {
        /// Path to a page snapshot JSON file
        #[arg(long)]
        snapshot: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `formfill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_STORE_PATH: &str = "formfill-templates.json";
pub const TRACE_PATH: &str = "formfill_trace.jsonl";

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("formfill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Resolve the API key: CLI > config > env > empty (backend then refuses).
pub fn resolve_api_key(cli_key: Option<&str>, config: &AppConfig) -> String {
    cli_key
        .map(str::to_string)
        .or_else(|| config.gemini.api_key.clone())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default()
}
