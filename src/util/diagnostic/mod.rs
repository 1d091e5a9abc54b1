//! Diagnostics
//!
//! A stage reports the first error it meets as a message plus a byte
//! position. This module turns that pair into a [`Diagnostic`] and renders
//! it against the [`SourceFile`](crate::util::span::SourceFile) it came from.

pub mod emitter;

use serde::Serialize;

pub use emitter::{DiagnosticEmitter, JsonEmitter, TextEmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stage that produced the message
    pub stage: &'static str,
    pub message: String,
    /// Byte offset into the source unit
    pub position: Option<u32>,
}

impl Diagnostic {
    pub fn error(
        stage: &'static str,
        message: impl Into<String>,
        position: Option<u32>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            stage,
            message: message.into(),
            position,
        }
    }
}
