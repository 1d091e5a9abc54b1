//! 文本诊断渲染器
//!
//! ```text
//! main.cl:2:7: error: expected operator
//!    2 | x = 1 2
//!      |       ^
//! ```

use std::io;

use owo_colors::OwoColorize;

use super::DiagnosticEmitter;
use crate::util::diagnostic::{Diagnostic, Severity};
use crate::util::span::SourceFile;

/// 文本诊断渲染器
#[derive(Debug, Clone)]
pub struct TextEmitter {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否显示源码片段
    pub show_source: bool,
}

impl TextEmitter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            show_source: true,
        }
    }

    fn severity(
        &self,
        severity: Severity,
    ) -> String {
        let label = severity.as_str();
        if !self.use_colors {
            return label.to_string();
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Note => label.cyan().bold().to_string(),
        }
    }

    fn gutter(
        &self,
        text: &str,
    ) -> String {
        if self.use_colors {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for TextEmitter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DiagnosticEmitter for TextEmitter {
    fn emit(
        &self,
        diagnostic: &Diagnostic,
        source: &SourceFile,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        let severity = self.severity(diagnostic.severity);
        let Some(offset) = diagnostic.position else {
            return writeln!(out, "{}: {}: {}", source.name, severity, diagnostic.message);
        };

        let position = source.position(offset);
        writeln!(
            out,
            "{}:{}: {}: {}",
            source.name, position, severity, diagnostic.message
        )?;
        if !self.show_source {
            return Ok(());
        }
        let Some(line) = source.line_text(position.line) else {
            return Ok(());
        };
        let line = String::from_utf8_lossy(line);
        // tabs are kept so the caret lines up with the source
        let padding: String = line
            .chars()
            .take(position.column as usize - 1)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let caret = if self.use_colors {
            "^".red().bold().to_string()
        } else {
            "^".to_string()
        };
        let number = position.line.to_string();
        let blank = " ".repeat(number.len().max(4));
        writeln!(out, "{} {}", self.gutter(&format!("{number:>4} |")), line)?;
        writeln!(out, "{} {}{}", self.gutter(&format!("{blank} |")), padding, caret)
    }
}
