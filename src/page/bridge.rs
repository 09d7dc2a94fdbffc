use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::document::{Document, WriteOp};
use crate::error::FillError;

/// Request sent to the page server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PageRequest {
    Navigate { cmd: &'static str, url: String },
    Snapshot { cmd: &'static str },
    Apply { cmd: &'static str, ops: Vec<WriteOp> },
    Quit { cmd: &'static str },
}

impl PageRequest {
    pub fn navigate(url: &str) -> Self {
        PageRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        PageRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn apply(ops: &[WriteOp]) -> Self {
        PageRequest::Apply {
            cmd: "apply",
            ops: ops.to_vec(),
        }
    }

    pub fn quit() -> Self {
        PageRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the page server over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct PageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent live-page session backed by page_server.js.
///
/// Spawns a long-lived Node.js process holding a browser page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
/// Snapshots come back as the same JSON shape `Document` parses, and
/// write ops recorded by the filler are replayed with `apply`.
pub struct PageSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl PageSession {
    /// Launch a session by spawning the page server script.
    pub fn launch(script: &str) -> Result<Self, FillError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FillError::Io {
                context: format!("spawning {}", script),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| FillError::Session {
            command: "launch".into(),
            message: "failed to capture page server stdin".into(),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| FillError::Session {
            command: "launch".into(),
            message: "failed to capture page server stdout".into(),
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader.read_line(&mut line).map_err(|e| FillError::Io {
            context: "reading page server ready signal".into(),
            source: e,
        })?;

        let response: PageResponse =
            serde_json::from_str(line.trim()).map_err(|e| FillError::JsonParse {
                context: "page server ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(FillError::Session {
                command: "launch".into(),
                message: "did not receive ready signal from page server".into(),
            });
        }

        Ok(PageSession {
            child,
            stdin,
            reader,
        })
    }

    /// Send a request and read the response line.
    fn send(&mut self, request: &PageRequest) -> Result<PageResponse, FillError> {
        let json = serde_json::to_string(request).map_err(|e| FillError::JsonParse {
            context: "serializing page request".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| FillError::Io {
            context: "writing to page server stdin".into(),
            source: e,
        })?;
        self.stdin.flush().map_err(|e| FillError::Io {
            context: "flushing page server stdin".into(),
            source: e,
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| FillError::Io {
            context: "reading from page server stdout".into(),
            source: e,
        })?;

        if line.trim().is_empty() {
            return Err(FillError::Session {
                command: "send".into(),
                message: "empty response from page server (process may have died)".into(),
            });
        }

        serde_json::from_str(line.trim()).map_err(|e| FillError::JsonParse {
            context: "page server response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &PageRequest, command: &str) -> Result<PageResponse, FillError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(FillError::Session {
                command: command.into(),
                message: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Navigate the page to a URL.
    pub fn navigate(&mut self, url: &str) -> Result<(), FillError> {
        self.send_ok(&PageRequest::navigate(url), "navigate")?;
        Ok(())
    }

    /// Take a DOM snapshot of the current page.
    pub fn snapshot(&mut self) -> Result<Document, FillError> {
        let response = self.send_ok(&PageRequest::snapshot(), "snapshot")?;
        let data = response.data.ok_or_else(|| FillError::Session {
            command: "snapshot".into(),
            message: "no data in snapshot response".into(),
        })?;
        Document::from_value(data)
    }

    /// Replay a write-op log against the live page, in order.
    pub fn apply(&mut self, ops: &[WriteOp]) -> Result<(), FillError> {
        if ops.is_empty() {
            return Ok(());
        }
        self.send_ok(&PageRequest::apply(ops), "apply")?;
        Ok(())
    }

    /// Quit the page session.
    pub fn quit(&mut self) -> Result<(), FillError> {
        // Best-effort quit, the process may already be gone
        let _ = self.send(&PageRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}
