use std::io::BufRead;

use crate::cli::config::{resolve_api_key, AppConfig, DEFAULT_STORE_PATH, TRACE_PATH};
use crate::detect::detector::detect;
use crate::dom::document::Document;
use crate::error::FillError;
use crate::fill::filler::{run_fill, FillReport};
use crate::fill::policy::policy_from_seed;
use crate::message::router::{Router, Settings};
use crate::page::bridge::PageSession;
use crate::resolve::generative::{GeminiBackend, GenerativeSource, DEFAULT_GEMINI_ENDPOINT};
use crate::resolve::template::TemplateSource;
use crate::resolve::value_source::ValueSource;
use crate::store::templates::{ensure_seeded, export_json, import_json, FileStore, TemplateStore};
use crate::trace::logger::TraceLogger;

/// Node script that holds a live page open for snapshot/apply sessions.
const PAGE_SERVER_SCRIPT: &str = "node/page_server.js";

// ============================================================================
// detect subcommand
// ============================================================================

pub fn cmd_detect(
    snapshot: Option<&str>,
    url: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let (doc, session) = load_page(snapshot, url)?;
    let fields = detect(&doc);

    println!("Detected {} fillable fields", fields.len());
    for field in &fields {
        println!(
            "  [{}] {} ({})",
            field.index,
            field.display_label(),
            field.kind.as_str()
        );
        if verbose > 0 {
            if !field.name.is_empty() {
                println!("      name: {}", field.name);
            }
            if field.constraints.required {
                println!("      required");
            }
            if !field.options.is_empty() {
                println!("      options: {}", field.options.len());
            }
            println!("      fingerprint: {}", field.fingerprint);
        }
    }

    if let Some(mut session) = session {
        session.quit()?;
    }
    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

pub fn cmd_fill(
    snapshot: Option<&str>,
    url: Option<&str>,
    template_id: Option<&str>,
    out: Option<&str>,
    seed: Option<u64>,
    store_path: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut doc, session) = load_page(snapshot, url)?;
    let store = open_store(store_path, config)?;

    let template_id = template_id.unwrap_or("qa_profile");
    let template = store
        .get(template_id)?
        .ok_or_else(|| FillError::TemplateNotFound(template_id.to_string()))?;

    let seed = seed.or(config.fill.seed);
    let tracer = TraceLogger::new(TRACE_PATH);
    let mut source = TemplateSource::new(template, policy_from_seed(seed));
    let mut policy = policy_from_seed(seed);

    let report = run_fill(&mut doc, &mut source, None, policy.as_mut(), &tracer)?;
    finish_fill(&mut doc, session, &report, out, verbose)
}

// ============================================================================
// fill-ai subcommand
// ============================================================================

pub fn cmd_fill_ai(
    snapshot: Option<&str>,
    url: Option<&str>,
    template_id: Option<&str>,
    out: Option<&str>,
    seed: Option<u64>,
    store_path: Option<&str>,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut doc, session) = load_page(snapshot, url)?;
    let store = open_store(store_path, config)?;

    let endpoint = endpoint
        .or(config.gemini.endpoint.as_deref())
        .unwrap_or(DEFAULT_GEMINI_ENDPOINT);
    let backend = GeminiBackend::new(endpoint, &resolve_api_key(api_key, config));

    let seed = seed.or(config.fill.seed);
    let template_id = template_id.unwrap_or("qa_profile");
    let mut fallback = store
        .get(template_id)?
        .map(|t| TemplateSource::new(t, policy_from_seed(seed)));

    let tracer = TraceLogger::new(TRACE_PATH);
    let mut source = GenerativeSource::new(&backend);
    let mut policy = policy_from_seed(seed);

    let report = run_fill(
        &mut doc,
        &mut source,
        fallback.as_mut().map(|f| f as &mut dyn ValueSource),
        policy.as_mut(),
        &tracer,
    )?;
    finish_fill(&mut doc, session, &report, out, verbose)
}

// ============================================================================
// templates subcommand
// ============================================================================

pub fn cmd_templates(
    export: Option<&str>,
    import: Option<&str>,
    delete: Option<&str>,
    store_path: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(store_path, config)?;

    if let Some(id) = delete {
        store.delete(id)?;
        println!("Deleted template '{}'", id);
    }

    if let Some(path) = import {
        let content = std::fs::read_to_string(path)?;
        let count = import_json(&mut store, &content)?;
        println!("Imported {} templates", count);
    }

    if let Some(path) = export {
        let json = export_json(&store)?;
        if path == "-" {
            println!("{}", json);
        } else {
            std::fs::write(path, &json)?;
            println!("Exported templates to {}", path);
        }
    }

    if export.is_none() && import.is_none() && delete.is_none() {
        for (id, template) in store.get_all()? {
            println!("  {}  {}", id, template.name);
        }
    }

    Ok(())
}

// ============================================================================
// route subcommand
// ============================================================================

/// Serve the action vocabulary over stdin/stdout, one JSON request and
/// one JSON response per line, against a fixed page snapshot.
pub fn cmd_route(
    snapshot: &str,
    store_path: Option<&str>,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(snapshot)?;
    let mut doc = Document::from_str(&content)?;

    let store = open_store(store_path, config)?;
    let endpoint = endpoint
        .or(config.gemini.endpoint.as_deref())
        .unwrap_or(DEFAULT_GEMINI_ENDPOINT);
    let api_key = resolve_api_key(api_key, config);
    let backend = GeminiBackend::new(endpoint, &api_key);

    let settings = Settings {
        gemini_endpoint: endpoint.to_string(),
        gemini_api_key: api_key,
        seed: config.fill.seed,
        ..Settings::default()
    };

    let mut router = Router::new(Box::new(store), Box::new(backend))?
        .with_settings(settings)
        .with_tracer(TraceLogger::new(TRACE_PATH));

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str(&line) {
            Ok(request) => router.handle(&mut doc, request),
            Err(e) => serde_json::json!({
                "success": false,
                "error": format!("Malformed request: {}", e),
            }),
        };
        println!("{}", response);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Load the page to work on: a snapshot file, or a live session when a
/// URL is given. The session rides along so write ops can be replayed.
fn load_page(
    snapshot: Option<&str>,
    url: Option<&str>,
) -> Result<(Document, Option<PageSession>), Box<dyn std::error::Error>> {
    match (snapshot, url) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)?;
            Ok((Document::from_str(&content)?, None))
        }
        (None, Some(url)) => {
            let mut session = PageSession::launch(PAGE_SERVER_SCRIPT)?;
            session.navigate(url)?;
            let doc = session.snapshot()?;
            Ok((doc, Some(session)))
        }
        (None, None) => Err("either --snapshot or --url is required".into()),
    }
}

/// Open (and seed, if empty) the template store.
fn open_store(
    store_path: Option<&str>,
    config: &AppConfig,
) -> Result<FileStore, Box<dyn std::error::Error>> {
    let path = store_path
        .or(config.store.path.as_deref())
        .unwrap_or(DEFAULT_STORE_PATH);
    let mut store = FileStore::open(path)?;
    ensure_seeded(&mut store)?;
    Ok(store)
}

/// Print the report, replay writes to the live session if any, and dump
/// the write-op log when requested.
fn finish_fill(
    doc: &mut Document,
    session: Option<PageSession>,
    report: &FillReport,
    out: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Filled {}/{} fields{}",
        report.filled_count,
        report.total_fields,
        if report.used_fallback {
            " (template fallback)"
        } else {
            ""
        }
    );
    for failure in &report.errors {
        eprintln!("  field '{}': {}", failure.label, failure.message);
    }
    if verbose > 0 {
        eprintln!("  {} write ops recorded", doc.writes().len());
    }

    if let Some(mut session) = session {
        session.apply(doc.writes())?;
        session.quit()?;
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(doc.writes())?;
        std::fs::write(path, json)?;
    }
    Ok(())
}
