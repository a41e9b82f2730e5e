//! Consistency checks over an event log.

use std::collections::BTreeMap;
use std::fmt;

use yard_core::{EntityId, EventKind, InstructionId, SimTime};

use crate::EventRecord;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Warning,
    Error,
}

/// One finding, optionally pinned to an event by sequence number.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub seq:      Option<u64>,
    pub message:  String,
}

impl Diagnostic {
    fn error(seq: u64, message: String) -> Self {
        Self { severity: Severity::Error, seq: Some(seq), message }
    }

    fn warning(seq: u64, message: String) -> Self {
        Self { severity: Severity::Warning, seq: Some(seq), message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error   => "error",
        };
        match self.seq {
            Some(seq) => write!(f, "{level} at event #{seq}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Pluggable log validation.
pub trait Validator {
    fn name(&self) -> &str;

    fn validate(&self, events: &[EventRecord]) -> Vec<Diagnostic>;
}

/// `true` if no diagnostic is an error.
pub fn is_clean(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().all(|d| d.severity < Severity::Error)
}

/// Default validator.
///
/// Errors: a timestamp earlier than its predecessor, an arrival without a
/// target, a completion earlier than an arrival of the same entity for the
/// same instruction.  Warnings: unrecognised event types, sequence numbers
/// that do not match log position.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogValidator;

impl Validator for LogValidator {
    fn name(&self) -> &str {
        "log"
    }

    fn validate(&self, events: &[EventRecord]) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        let mut latest_arrival: BTreeMap<(&EntityId, &InstructionId), SimTime> = BTreeMap::new();
        for e in events.iter().filter(|e| e.kind.is_arrival()) {
            let t = latest_arrival.entry((&e.entity_id, &e.instruction_id)).or_insert(e.timestamp);
            *t = (*t).max(e.timestamp);
        }

        let mut previous: Option<SimTime> = None;
        for (i, e) in events.iter().enumerate() {
            if e.seq != i as u64 {
                out.push(Diagnostic::warning(e.seq, format!("sequence number at position {i}")));
            }
            if let Some(prev) = previous {
                if e.timestamp < prev {
                    out.push(Diagnostic::error(e.seq, format!("timestamp {} earlier than {prev}", e.timestamp)));
                }
            }
            previous = Some(e.timestamp);

            if e.kind == EventKind::Unrecognized {
                out.push(Diagnostic::warning(e.seq, "unrecognised event type".into()));
            } else if e.kind.is_arrival() && e.target_position.is_none() {
                out.push(Diagnostic::error(e.seq, format!("{} for {} has no target", e.kind, e.entity_id)));
            } else if e.kind.is_completion() {
                if let Some(arrival) = latest_arrival.get(&(&e.entity_id, &e.instruction_id)) {
                    if e.timestamp < *arrival {
                        out.push(Diagnostic::error(
                            e.seq,
                            format!(
                                "{} completes {} at {} before arriving at {arrival}",
                                e.entity_id, e.instruction_id, e.timestamp
                            ),
                        ));
                    }
                }
            }
        }
        out
    }
}
