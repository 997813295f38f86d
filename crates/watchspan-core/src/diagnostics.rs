//! Structured reporting for failures the tracker recovers from.
//!
//! The tracker never surfaces persistence failures to its caller. It falls
//! back to in-memory state and hands a [`Diagnostic`] to the injected
//! [`DiagnosticSink`] so the host can observe what happened.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Which store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageOp {
    Load,
    Save,
    Remove,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOp::Load => f.write_str("load"),
            StorageOp::Save => f.write_str("save"),
            StorageOp::Remove => f.write_str("remove"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Persisted value was unparsable or did not match the record schema.
    /// The tracker started from empty progress.
    MalformedRecord { key: String, message: String },
    /// The store rejected an operation. Progress continues in memory.
    StorageUnavailable {
        key: String,
        op: StorageOp,
        message: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecord { key, message } => {
                write!(f, "malformed progress record under '{key}': {message}")
            }
            Diagnostic::StorageUnavailable { key, op, message } => {
                write!(f, "storage {op} failed for '{key}': {message}")
            }
        }
    }
}

/// Receiver for recovered failures.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Keeps every diagnostic in memory. Clones share the same buffer, so a host
/// can hand one clone to a tracker and read from the other.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    seen: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.seen.borrow_mut().push(diagnostic);
    }
}
