//! 诊断渲染器

pub mod json;
pub mod text;

use std::io;

use crate::util::diagnostic::Diagnostic;
use crate::util::span::SourceFile;

pub use json::JsonEmitter;
pub use text::TextEmitter;

/// 诊断渲染器 trait
pub trait DiagnosticEmitter {
    fn emit(
        &self,
        diagnostic: &Diagnostic,
        source: &SourceFile,
        out: &mut dyn io::Write,
    ) -> io::Result<()>;

    /// 渲染为字符串
    fn render(
        &self,
        diagnostic: &Diagnostic,
        source: &SourceFile,
    ) -> String {
        let mut buffer = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.emit(diagnostic, source, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
