use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::trace::event::TraceEvent;

/// JSONL sink for fill trace events, one event per line. Logging is
/// best-effort: every failure warns on stderr and the fill carries on.
pub struct TraceLogger {
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl TraceLogger {
    /// Append to a trace file. A path that cannot be opened downgrades
    /// the logger to disabled with a warning.
    pub fn new(path: &str) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => TraceLogger::to_sink(Box::new(file)),
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                TraceLogger::disabled()
            }
        }
    }

    /// Log into an arbitrary writer; tests use this to capture events
    /// in memory.
    pub fn to_sink(sink: Box<dyn Write + Send>) -> Self {
        TraceLogger {
            sink: Some(Mutex::new(sink)),
        }
    }

    /// A logger that drops everything. Used in tests and the router
    /// default.
    pub fn disabled() -> Self {
        TraceLogger { sink: None }
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return; // tracing disabled
        };

        let outcome = serde_json::to_string(event)
            .map_err(|e| format!("failed to serialize trace event: {}", e))
            .and_then(|json| match sink.lock() {
                Ok(mut writer) => writeln!(writer, "{}", json)
                    .map_err(|e| format!("failed to write trace event: {}", e)),
                Err(e) => Err(format!("trace sink lock poisoned: {}", e)),
            });

        if let Err(warning) = outcome {
            eprintln!("Warning: {}", warning);
        }
    }
}
