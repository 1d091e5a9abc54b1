//! JSON 诊断渲染器
//!
//! One object per line, position resolved to line and column.

use std::io;

use serde::Serialize;

use super::DiagnosticEmitter;
use crate::util::diagnostic::Diagnostic;
use crate::util::span::{Position, SourceFile};

#[derive(Debug, Serialize)]
struct JsonDiagnostic<'a> {
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Position>,
}

/// JSON 诊断渲染器
#[derive(Debug, Clone, Default)]
pub struct JsonEmitter {
    pub pretty: bool,
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(
        &self,
        diagnostic: &Diagnostic,
        source: &SourceFile,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        let value = JsonDiagnostic {
            diagnostic,
            file: &source.name,
            location: diagnostic.position.map(|offset| source.position(offset)),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &value)?;
        } else {
            serde_json::to_writer(&mut *out, &value)?;
        }
        writeln!(out)
    }
}
