use serde::Serialize;

use crate::detect::detector::detect;
use crate::detect::field_model::{FieldDescriptor, FieldKind};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::FillError;
use crate::fill::policy::SelectionPolicy;
use crate::resolve::value_source::{parse_boolean, PageContext, ResolvedValue, ValueSource};
use crate::trace::event::TraceEvent;
use crate::trace::logger::TraceLogger;

/// Event sequence dispatched after every successful write, in order, so
/// framework listeners observe the change the way they would a user edit.
pub const WRITE_EVENTS: [&str; 3] = ["input", "change", "blur"];

/// The fill pipeline's phases. A run moves through them strictly forward;
/// the only branch is the one fallback resolution inside `Resolving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPhase {
    Idle,
    Detecting,
    Resolving,
    Writing,
    Reporting,
}

impl FillPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillPhase::Idle => "idle",
            FillPhase::Detecting => "detecting",
            FillPhase::Resolving => "resolving",
            FillPhase::Writing => "writing",
            FillPhase::Reporting => "reporting",
        }
    }
}

/// One field the writer could not fill. Recorded, never fatal.
#[derive(Debug, Clone, Serialize)]
pub struct FieldFailure {
    pub index: usize,
    pub label: String,
    pub message: String,
}

/// Outcome of a fill run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub filled_count: usize,
    pub total_fields: usize,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldFailure>,
}

/// Run the whole pipeline: detect, resolve, write, report. When the
/// primary source fails and a fallback is supplied, resolution retries
/// once with the fallback and the report says so; a second failure
/// propagates.
pub fn run_fill(
    doc: &mut Document,
    source: &mut dyn ValueSource,
    mut fallback: Option<&mut dyn ValueSource>,
    policy: &mut dyn SelectionPolicy,
    tracer: &TraceLogger,
) -> Result<FillReport, FillError> {
    let phase = |p: FillPhase| TraceEvent::PhaseChanged {
        phase: p.as_str().to_string(),
    };

    tracer.log(&phase(FillPhase::Detecting));
    let fields = detect(doc);
    tracer.log(&TraceEvent::DetectionCompleted {
        field_count: fields.len(),
    });
    if fields.is_empty() {
        return Err(FillError::NoFieldsFound);
    }

    tracer.log(&phase(FillPhase::Resolving));
    let page = PageContext::from_document(doc);
    let mut used_fallback = false;
    let values = match source.resolve(&fields, &page) {
        Ok(values) => values,
        Err(e) => match fallback.as_deref_mut() {
            Some(fb) => {
                tracer.log(&TraceEvent::ResolutionFailed {
                    source: source.name().to_string(),
                    error: e.to_string(),
                });
                tracer.log(&TraceEvent::FallbackEngaged {
                    fallback: fb.name().to_string(),
                });
                used_fallback = true;
                fb.resolve(&fields, &page)?
            }
            None => return Err(e),
        },
    };

    tracer.log(&phase(FillPhase::Writing));
    let mut filled_count = 0;
    let mut errors = Vec::new();
    for (field, value) in fields.iter().zip(values) {
        let Some(value) = value else {
            tracer.log(&TraceEvent::FieldSkipped {
                index: field.index,
                reason: "no value resolved".to_string(),
            });
            continue;
        };
        if value.is_blank() {
            tracer.log(&TraceEvent::FieldSkipped {
                index: field.index,
                reason: "blank value".to_string(),
            });
            continue;
        }

        match write_field(doc, field, &value, policy) {
            Ok(Some(target)) => {
                doc.dispatch_events(target, &WRITE_EVENTS, &field.fingerprint);
                tracer.log(&TraceEvent::FieldWritten {
                    index: field.index,
                    kind: field.kind.as_str().to_string(),
                    fingerprint: field.fingerprint.clone(),
                });
                filled_count += 1;
            }
            Ok(None) => {
                tracer.log(&TraceEvent::FieldSkipped {
                    index: field.index,
                    reason: "no matching option".to_string(),
                });
            }
            Err(e) => {
                errors.push(FieldFailure {
                    index: field.index,
                    label: field.display_label(),
                    message: e.to_string(),
                });
            }
        }
    }

    tracer.log(&phase(FillPhase::Reporting));
    let report = FillReport {
        filled_count,
        total_fields: fields.len(),
        used_fallback,
        errors,
    };
    tracer.log(&TraceEvent::FillCompleted {
        filled_count: report.filled_count,
        total_fields: report.total_fields,
        used_fallback: report.used_fallback,
    });
    Ok(report)
}

/// Apply one resolved value with the kind-appropriate write strategy.
/// Returns the node the write landed on, or `None` when the value names
/// no concrete option and the field is left untouched.
fn write_field(
    doc: &mut Document,
    field: &FieldDescriptor,
    value: &ResolvedValue,
    policy: &mut dyn SelectionPolicy,
) -> Result<Option<NodeId>, FillError> {
    match field.kind {
        FieldKind::Checkbox => {
            let checked = match value {
                ResolvedValue::Checked(b) => *b,
                ResolvedValue::Text(t) => parse_boolean(t),
                ResolvedValue::PickOne => policy.checkbox_state(),
            };
            doc.set_checked(field.node, checked, &field.fingerprint);
            Ok(Some(field.node))
        }
        FieldKind::Radio => write_radio(doc, field, value, policy),
        FieldKind::Select => write_select(doc, field, value, policy),
        FieldKind::ContentEditable => {
            doc.set_content(field.node, &value.as_text(), &field.fingerprint);
            Ok(Some(field.node))
        }
        _ => {
            doc.set_value(field.node, &value.as_text(), &field.fingerprint);
            Ok(Some(field.node))
        }
    }
}

/// Check one member of a radio group. `PickOne` delegates the choice to
/// the policy; a text value must match a member's label or value, and a
/// miss leaves the whole group untouched.
fn write_radio(
    doc: &mut Document,
    field: &FieldDescriptor,
    value: &ResolvedValue,
    policy: &mut dyn SelectionPolicy,
) -> Result<Option<NodeId>, FillError> {
    if field.options.is_empty() {
        return Err(FillError::Write {
            field: field.display_label(),
            message: "radio group has no members".to_string(),
        });
    }

    let pick = match value {
        ResolvedValue::PickOne => Some(policy.pick_index(field.options.len())),
        other => {
            let needle = other.as_text().trim().to_lowercase();
            if needle.is_empty() {
                None
            } else {
                field.options.iter().position(|o| {
                    o.text.to_lowercase().contains(&needle)
                        || o.value.to_lowercase().contains(&needle)
                })
            }
        }
    };

    let Some(pick) = pick else {
        return Ok(None);
    };

    let target = field.options[pick].node;
    doc.set_checked(target, true, &field.fingerprint);
    for option in &field.options {
        if option.node != target {
            doc.clear_checked(option.node);
        }
    }
    Ok(Some(target))
}

/// Choose a select option: exact value match first, then substring match
/// in either direction against option text and value, then the first
/// non-placeholder option when the select has more than one.
fn write_select(
    doc: &mut Document,
    field: &FieldDescriptor,
    value: &ResolvedValue,
    policy: &mut dyn SelectionPolicy,
) -> Result<Option<NodeId>, FillError> {
    if field.options.is_empty() {
        return Err(FillError::Write {
            field: field.display_label(),
            message: "select has no options".to_string(),
        });
    }

    let needle = value.as_text().trim().to_lowercase();

    let exact = field
        .options
        .iter()
        .position(|o| !needle.is_empty() && o.value.to_lowercase() == needle);

    let fuzzy = || {
        field.options.iter().position(|o| {
            let text = o.text.trim().to_lowercase();
            let val = o.value.trim().to_lowercase();
            if needle.is_empty() {
                return false;
            }
            (!text.is_empty() && (text.contains(&needle) || needle.contains(&text)))
                || (!val.is_empty() && (val.contains(&needle) || needle.contains(&val)))
        })
    };

    let pick = match exact.or_else(fuzzy) {
        Some(pick) => pick,
        // Index 0 is conventionally the placeholder, so skip past it.
        None if field.options.len() > 1 => 1 + policy.pick_index(field.options.len() - 1),
        None => return Ok(None),
    };

    doc.select_option(field.node, field.options[pick].node, &field.fingerprint);
    Ok(Some(field.node))
}
