//! Source location tracking

use std::fmt;
use std::path::Path;

/// Source position (1-based line and column, 0-based byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Position {
    pub line: u32,
    /// Counted in characters, not bytes
    pub column: u32,
    pub offset: u32,
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source unit and its line table
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    text: Vec<u8>,
    /// Byte offset of the first byte of every line
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(
        name: impl Into<String>,
        text: impl Into<Vec<u8>>,
    ) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(
                text.iter()
                    .enumerate()
                    .filter(|&(_, &byte)| byte == b'\n')
                    .map(|(i, _)| i as u32 + 1),
            )
            .collect();
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    /// Read a whole file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read(path)?;
        Ok(Self::new(path.display().to_string(), text))
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line and column of a byte offset; offsets past the end clamp to it
    pub fn position(
        &self,
        offset: u32,
    ) -> Position {
        let offset = offset.min(self.text.len() as u32);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        // UTF-8 continuation bytes do not start a column
        let column = self.text[start as usize..offset as usize]
            .iter()
            .filter(|&&byte| byte & 0xc0 != 0x80)
            .count();
        Position {
            line: line as u32,
            column: column as u32 + 1,
            offset,
        }
    }

    /// Bytes of a 1-based line without its line break
    pub fn line_text(
        &self,
        line: u32,
    ) -> Option<&[u8]> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)? as usize;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |&next| next as usize - 1);
        let text = &self.text[start..end];
        Some(text.strip_suffix(b"\r").unwrap_or(text))
    }
}

impl fmt::Display for SourceFile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.name)
    }
}
