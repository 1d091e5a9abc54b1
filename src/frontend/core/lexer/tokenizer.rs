//! Tokenizer state machine
//!
//! One pass over the source bytes with a bounded stack of open scopes. The
//! stack lets a closing `)` be checked against its opener and lets a later
//! `=>` or `->` reclassify an already emitted `(` token.

use smallvec::SmallVec;

use super::keywords;
use super::literals::{
    is_digit, is_first_name_char, is_name_char, scan_character, scan_number, Cursor, NumberError, Scanned,
};
use super::tokens::{AstFlags, AstNode, AstType, Data, StaticBuf};
use super::utf8;
use super::{LexError, LexErrorKind};
use crate::frontend::core::arena::Region;
use crate::frontend::core::names::{NameError, NameTable, MAX_NAME_LEN};
use crate::frontend::core::node_array::{NodeArray, NodeLayout};

/// Alignment of string literals in the statics region
pub const STATIC_ALIGNMENT: usize = 8;

#[derive(Debug, Clone, Copy)]
struct OpenScope {
    kind: AstType,
    index: usize,
    pos: u32,
}

pub struct Tokenizer<'s, 't> {
    src: &'s [u8],
    cur: Cursor<'s>,
    names: &'t mut NameTable,
    statics: &'t mut Region<u8>,
    out: NodeArray,
    scopes: SmallVec<[OpenScope; 16]>,
    scope_limit: usize,
    last_closed: Option<OpenScope>,
    /// Index of the previous token; 0 is the sentinel
    prev: usize,
    /// Byte position just past the previous token
    prev_end: usize,
}

impl<'s, 't> Tokenizer<'s, 't> {
    pub fn new(
        src: &'s [u8],
        names: &'t mut NameTable,
        statics: &'t mut Region<u8>,
        scope_limit: usize,
        capacity: usize,
    ) -> Self {
        Self {
            src,
            cur: Cursor::new(src),
            names,
            statics,
            out: NodeArray::new(NodeLayout::Tokens, capacity),
            scopes: SmallVec::new(),
            scope_limit,
            last_closed: None,
            prev: 0,
            prev_end: 0,
        }
    }

    /// Tokenize the whole unit. On failure every string literal written to
    /// the statics region by this call is rolled back.
    pub fn run(mut self) -> Result<NodeArray, LexError> {
        let mark = self.statics.mark();
        match self.run_inner() {
            Ok(()) => Ok(self.out),
            Err(err) => {
                self.statics.truncate(mark);
                Err(err)
            }
        }
    }

    fn run_inner(&mut self) -> Result<(), LexError> {
        loop {
            let start = self.cur.pos();
            if !self.step(start)? {
                return Ok(());
            }
        }
    }

    fn prev_kind(&self) -> AstType {
        self.out.node(self.prev).map_or(AstType::Terminator, |node| node.kind)
    }

    fn error(
        &self,
        kind: LexErrorKind,
        pos: usize,
    ) -> LexError {
        LexError {
            kind,
            position: pos as u32,
        }
    }

    fn emit(
        &mut self,
        node: AstNode,
    ) {
        #[cfg(feature = "debug")]
        tracing::trace!(kind = %node.kind, pos = node.pos, "token");
        self.prev = self.out.push(node);
        self.prev_end = self.cur.pos();
    }

    fn emit_with_data(
        &mut self,
        node: AstNode,
        data: Data,
    ) {
        #[cfg(feature = "debug")]
        tracing::trace!(kind = %node.kind, pos = node.pos, data = data.as_u64(), "token");
        self.prev = self.out.push_with_data(node, data);
        self.prev_end = self.cur.pos();
    }

    fn open_scope(
        &mut self,
        kind: AstType,
        start: usize,
        flags: AstFlags,
    ) -> Result<(), LexError> {
        if self.scopes.len() >= self.scope_limit {
            return Err(self.error(LexErrorKind::TooManyScopes, start));
        }
        let index = self.out.len();
        self.scopes.push(OpenScope {
            kind,
            index,
            pos: start as u32,
        });
        self.emit(AstNode::new(kind, start as u32).with_flags(flags));
        Ok(())
    }

    fn close_scope(
        &mut self,
        closer: u8,
        accepted: [AstType; 2],
        start: usize,
    ) -> Result<(), LexError> {
        let Some(scope) = self.scopes.pop() else {
            return Err(self.error(LexErrorKind::TooManyClosing(closer as char), start));
        };
        if !accepted.contains(&scope.kind) {
            return Err(self.error(LexErrorKind::Mismatched(closer as char), start));
        }
        self.last_closed = Some(scope);
        self.emit(AstNode::new(AstType::EndScope, start as u32));
        Ok(())
    }

    /// The `(` whose `)` is the previous token, for `=>` and `->`
    fn closed_parenthesis(&self) -> Option<usize> {
        let scope = self.last_closed?;
        let still_open_par = self.out.node(scope.index).is_some_and(|node| node.kind == AstType::OpenPar);
        (self.prev_kind() == AstType::EndScope && still_open_par).then_some(scope.index)
    }

    fn intern(
        &mut self,
        start: usize,
        len: usize,
    ) -> Result<Data, LexError> {
        let src = self.src;
        match self.names.intern(&src[start..start + len]) {
            Ok(id) => Ok(Data::from_name(id)),
            Err(NameError::Arena(err)) => Err(self.error(LexErrorKind::ResourceLimit(err), start)),
            Err(_) => Err(self.error(LexErrorKind::NameTooLong, start)),
        }
    }

    /// Handle one token or skip; returns `false` at end of input
    fn step(
        &mut self,
        start: usize,
    ) -> Result<bool, LexError> {
        let pos = start as u32;
        let c = self.cur.peek();
        match c {
            0 => {
                if let Some(scope) = self.scopes.last() {
                    return Err(self.error(LexErrorKind::UnclosedScope, scope.pos as usize));
                }
                self.emit(AstNode::new(AstType::Terminator, pos));
                return Ok(false);
            }

            b' ' | b'\t' | b'\r' => {
                while matches!(self.cur.peek(), b' ' | b'\t' | b'\r') {
                    self.cur.bump();
                }
            }

            b'\n' => {
                self.cur.bump();
                let prev = self.prev_kind();
                let continues = prev.is_separator()
                    || prev.is_scope_opener()
                    || prev.is_binary()
                    || prev == AstType::DoubleArrow;
                if self.scopes.is_empty() && !continues {
                    self.emit(AstNode::new(AstType::Terminator, pos));
                }
            }

            b'=' => {
                self.cur.bump();
                if self.cur.eat(b'=') {
                    self.emit(AstNode::new(AstType::Equal, pos));
                } else if self.cur.eat(b'>') {
                    let Some(opener) = self.closed_parenthesis() else {
                        return Err(self.error(LexErrorKind::ExpectedParenthesis("=>"), start));
                    };
                    if let Some(node) = self.out.node_mut(opener) {
                        node.kind = AstType::OpenProcedure;
                    }
                    self.emit(AstNode::new(AstType::DoubleArrow, pos));
                } else if self.prev_end == start && self.prev_kind().is_compoundable() {
                    let prev = self.prev;
                    if let Some(node) = self.out.node_mut(prev) {
                        if let Some(compound) = node.kind.to_compound_assign() {
                            node.kind = compound;
                        }
                    }
                    self.prev_end = self.cur.pos();
                } else {
                    self.emit(AstNode::new(AstType::Assign, pos));
                }
            }

            b'+' => self.single(AstType::Add, pos),

            b'-' => {
                self.cur.bump();
                if self.cur.eat(b'>') {
                    let Some(opener) = self.closed_parenthesis() else {
                        return Err(self.error(LexErrorKind::ExpectedParenthesis("->"), start));
                    };
                    if let Some(node) = self.out.node_mut(opener) {
                        node.kind = AstType::OpenProcedureClass;
                    }
                } else {
                    self.emit(AstNode::new(AstType::Subtract, pos));
                }
            }

            b'*' => {
                self.cur.bump();
                let kind = if self.cur.eat(b'*') { AstType::Power } else { AstType::Multiply };
                self.emit(AstNode::new(kind, pos));
            }

            b'/' => {
                self.cur.bump();
                if self.cur.eat(b'/') {
                    while !matches!(self.cur.peek(), 0 | b'\n') {
                        self.cur.bump();
                    }
                } else if self.cur.eat(b'*') {
                    self.skip_block_comment(start)?;
                } else {
                    self.emit(AstNode::new(AstType::Divide, pos));
                }
            }

            b'%' => self.single(AstType::Modulo, pos),

            b'|' => {
                self.cur.bump();
                let kind = if self.cur.eat(b'|') {
                    AstType::LogicOr
                } else if self.cur.eat(b'>') {
                    AstType::Pipe
                } else {
                    AstType::BitOr
                };
                self.emit(AstNode::new(kind, pos));
            }

            b'&' => {
                self.cur.bump();
                let kind = if self.cur.eat(b'&') { AstType::LogicAnd } else { AstType::BitAnd };
                self.emit(AstNode::new(kind, pos));
            }

            b'~' => {
                self.cur.bump();
                let kind = if self.cur.peek() == b'%' && self.cur.peek_at(1) == b'~' {
                    self.cur.advance(2);
                    AstType::Reinterpret
                } else {
                    AstType::Cast
                };
                self.emit(AstNode::new(kind, pos));
            }

            b'<' => {
                self.cur.bump();
                let node = if self.cur.eat(b'=') {
                    AstNode::new(AstType::Greater, pos).with_flags(AstFlags::NEGATE)
                } else if self.cur.eat(b'>') {
                    AstNode::new(AstType::Concat, pos)
                } else if self.cur.eat(b'<') {
                    AstNode::new(AstType::ShiftLeft, pos)
                } else {
                    AstNode::new(AstType::Less, pos)
                };
                self.emit(node);
            }

            b'>' => {
                self.cur.bump();
                let node = if self.cur.eat(b'=') {
                    AstNode::new(AstType::Less, pos).with_flags(AstFlags::NEGATE)
                } else if self.cur.eat(b'>') {
                    AstNode::new(AstType::ShiftRight, pos)
                } else if self.cur.eat(b'<') {
                    AstNode::new(AstType::CrossProduct, pos)
                } else {
                    AstNode::new(AstType::Greater, pos)
                };
                self.emit(node);
            }

            b'!' => {
                self.cur.bump();
                let kind = if self.cur.eat(b'=') {
                    AstType::Equal
                } else if self.cur.eat(b'|') {
                    AstType::LogicOr
                } else if self.cur.eat(b'&') {
                    AstType::LogicAnd
                } else if self.cur.peek() == b'@' && self.cur.peek_at(1) == b'=' {
                    self.cur.advance(2);
                    AstType::Contains
                } else {
                    AstType::LogicNot
                };
                self.emit(AstNode::new(kind, pos).with_flags(AstFlags::NEGATE));
            }

            b'^' => {
                self.cur.bump();
                let node = if self.cur.eat(b'|') {
                    AstNode::new(AstType::BitOr, pos).with_flags(AstFlags::NEGATE)
                } else if self.cur.eat(b'&') {
                    AstNode::new(AstType::BitAnd, pos).with_flags(AstFlags::NEGATE)
                } else {
                    AstNode::new(AstType::BitXor, pos)
                };
                self.emit(node);
            }

            b'(' => {
                self.cur.bump();
                let flags = if self.prev_kind() == AstType::Identifier {
                    AstFlags::DIRECT_NAME
                } else {
                    AstFlags::NONE
                };
                self.open_scope(AstType::OpenPar, start, flags)?;
            }
            b')' => {
                self.cur.bump();
                self.close_scope(b')', [AstType::OpenPar, AstType::GetProcedure], start)?;
            }
            b'{' => {
                self.cur.bump();
                self.open_scope(AstType::OpenBrace, start, AstFlags::NONE)?;
            }
            b'}' => {
                self.cur.bump();
                self.close_scope(b'}', [AstType::OpenBrace, AstType::Initialize], start)?;
            }
            b'[' => {
                self.cur.bump();
                self.open_scope(AstType::Subscript, start, AstFlags::NONE)?;
            }
            b']' => {
                self.cur.bump();
                self.close_scope(b']', [AstType::Subscript, AstType::FieldSubscript], start)?;
            }

            b'@' => {
                self.cur.bump();
                let kind = if self.cur.eat(b'=') { AstType::Contains } else { AstType::SelfValue };
                self.emit(AstNode::new(kind, pos));
            }

            b'#' => self.single(AstType::Pound, pos),

            b'$' => {
                self.cur.bump();
                if is_first_name_char(self.cur.peek()) {
                    let name_start = self.cur.pos();
                    let len = self.cur.name_len();
                    self.check_name_len(len, name_start)?;
                    let data = self.intern(name_start, len)?;
                    self.cur.advance(len);
                    self.emit_with_data(AstNode::new(AstType::NamedInfered, pos).with_count(len as u16), data);
                } else {
                    self.emit(AstNode::new(AstType::Infered, pos));
                }
            }

            b':' => {
                self.cur.bump();
                let flags = if self.cur.eat(b':') {
                    AstFlags::CONSTANT | AstFlags::INITIALIZED
                } else if self.cur.eat(b'=') {
                    AstFlags::INITIALIZED
                } else {
                    AstFlags::CLASS_SPEC
                };
                if self.prev_kind() != AstType::Identifier {
                    return Err(self.error(LexErrorKind::InvalidVariableSyntax, start));
                }
                let prev = self.prev;
                if let Some(node) = self.out.node_mut(prev) {
                    node.kind = AstType::Variable;
                    node.flags = flags;
                }
                self.prev_end = self.cur.pos();
            }

            b',' => self.single(AstType::Comma, pos),

            b';' => {
                self.cur.bump();
                if !matches!(self.prev_kind(), AstType::Semicolon | AstType::Terminator) {
                    self.emit(AstNode::new(AstType::Semicolon, pos));
                }
            }

            b'.' => self.dot(start)?,

            b'\'' => {
                self.cur.bump();
                if self.cur.peek() == b'\'' {
                    self.emit(AstNode::new(AstType::Dereference, pos));
                    return Ok(true);
                }
                let literal_start = self.cur.pos();
                match scan_character(&mut self.cur) {
                    Some(Scanned::Code(code)) if self.cur.eat(b'\'') => {
                        self.emit_with_data(AstNode::new(AstType::Character, pos), Data::from_code(code));
                    }
                    _ => {
                        self.cur.set_pos(literal_start);
                        self.emit(AstNode::new(AstType::Dereference, pos));
                    }
                }
            }

            b'"' => self.string(start)?,

            b'_' if !is_name_char(self.cur.peek_at(1)) => self.single(AstType::Ignored, pos),

            c if is_first_name_char(c) => {
                let len = self.cur.name_len();
                self.check_name_len(len, start)?;
                if let Some(keyword) = keywords::lookup(&self.src[start..start + len]) {
                    self.cur.advance(len);
                    self.emit(AstNode::new(keyword, pos));
                } else {
                    let data = self.intern(start, len)?;
                    self.cur.advance(len);
                    self.emit_with_data(AstNode::new(AstType::Identifier, pos).with_count(len as u16), data);
                }
            }

            c if is_digit(c) => {
                let (kind, data) = scan_number(&mut self.cur).map_err(|err| self.number_error(err, start))?;
                self.emit_with_data(AstNode::new(kind, pos), data);
            }

            _ => return Err(self.error(LexErrorKind::UnrecognizedToken, start)),
        }
        Ok(true)
    }

    fn single(
        &mut self,
        kind: AstType,
        pos: u32,
    ) {
        self.cur.bump();
        self.emit(AstNode::new(kind, pos));
    }

    fn number_error(
        &self,
        err: NumberError,
        start: usize,
    ) -> LexError {
        let kind = match err {
            NumberError::InvalidFloat => LexErrorKind::InvalidFloat,
            NumberError::Invalid => LexErrorKind::InvalidNumber,
        };
        self.error(kind, start)
    }

    fn check_name_len(
        &self,
        len: usize,
        start: usize,
    ) -> Result<(), LexError> {
        if len > MAX_NAME_LEN {
            return Err(self.error(LexErrorKind::NameTooLong, start));
        }
        Ok(())
    }

    fn skip_block_comment(
        &mut self,
        start: usize,
    ) -> Result<(), LexError> {
        let mut depth = 1usize;
        loop {
            match (self.cur.peek(), self.cur.peek_at(1)) {
                (0, _) => return Err(self.error(LexErrorKind::UnfinishedComment, start)),
                (b'*', b'/') => {
                    self.cur.advance(2);
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                (b'/', b'*') => {
                    self.cur.advance(2);
                    depth += 1;
                }
                _ => self.cur.bump(),
            }
        }
    }

    fn dot(
        &mut self,
        start: usize,
    ) -> Result<(), LexError> {
        let pos = start as u32;
        match self.cur.peek_at(1) {
            b'(' => {
                self.cur.advance(2);
                self.open_scope(AstType::GetProcedure, start, AstFlags::NONE)
            }
            b'[' => {
                self.cur.advance(2);
                self.open_scope(AstType::FieldSubscript, start, AstFlags::NONE)
            }
            b'{' => {
                self.cur.advance(2);
                self.open_scope(AstType::Initialize, start, AstFlags::NONE)
            }
            b'.' => {
                self.cur.advance(2);
                let kind = if self.cur.eat(b'.') { AstType::Splat } else { AstType::Range };
                self.emit(AstNode::new(kind, pos));
                Ok(())
            }
            c if is_digit(c) => {
                let (kind, data) = scan_number(&mut self.cur).map_err(|err| self.number_error(err, start))?;
                self.emit_with_data(AstNode::new(kind, pos), data);
                Ok(())
            }
            c if is_first_name_char(c) => {
                self.cur.bump();
                let name_start = self.cur.pos();
                let len = self.cur.name_len();
                self.check_name_len(len, name_start)?;
                let data = self.intern(name_start, len)?;
                self.cur.advance(len);
                self.emit_with_data(AstNode::new(AstType::GetField, pos).with_count(len as u16), data);
                Ok(())
            }
            _ => Err(self.error(LexErrorKind::InvalidDotToken, start)),
        }
    }

    /// String literal: decoded bytes go to the statics region, 8-aligned
    /// and NUL-terminated; the token carries offset and size.
    fn string(
        &mut self,
        start: usize,
    ) -> Result<(), LexError> {
        self.cur.bump();
        let mut bytes = Vec::new();
        loop {
            match self.cur.peek() {
                b'"' => break,
                0 => return Err(self.error(LexErrorKind::UnterminatedString, start)),
                _ => {
                    let char_start = self.cur.pos();
                    let code = match scan_character(&mut self.cur) {
                        Some(Scanned::Code(code)) => code,
                        // the closing quote may follow directly
                        Some(Scanned::Continuation) => continue,
                        None => return Err(self.error(LexErrorKind::InvalidCharacterCode, char_start)),
                    };
                    if utf8::encode(code, &mut bytes).is_none() {
                        return Err(self.error(LexErrorKind::InvalidCharacterCode, char_start));
                    }
                }
            }
        }
        self.cur.bump();

        let offset = self
            .statics
            .alloc(bytes.len() + 1, STATIC_ALIGNMENT)
            .map_err(|err| self.error(LexErrorKind::ResourceLimit(err), start))?;
        self.statics.write(offset, &bytes);
        let buf = StaticBuf {
            offset: offset.0,
            size: bytes.len() as u32,
        };
        self.emit_with_data(AstNode::new(AstType::String, start as u32), Data::from_static(buf));
        Ok(())
    }
}
