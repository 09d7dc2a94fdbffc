use serde::Serialize;

/// One line of the fill trace. Serialized as JSONL, one event per line,
/// tagged by the `event` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    PhaseChanged {
        phase: String,
    },
    DetectionCompleted {
        field_count: usize,
    },
    ResolutionFailed {
        source: String,
        error: String,
    },
    FallbackEngaged {
        fallback: String,
    },
    FieldWritten {
        index: usize,
        kind: String,
        fingerprint: String,
    },
    FieldSkipped {
        index: usize,
        reason: String,
    },
    FillCompleted {
        filled_count: usize,
        total_fields: usize,
        used_fallback: bool,
    },
}
