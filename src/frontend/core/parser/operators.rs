//! Bounded operator stack

use smallvec::SmallVec;

use super::parser_state::{ParseError, ParseErrorKind};
use crate::frontend::core::lexer::tokens::{AstFlags, AstNode, AstType, Data, ProcHeader};

/// One pending operator or open scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpEntry {
    pub node: AstNode,
    /// Payload re-emitted with the node (`Variable`), the procedure header
    /// being collected (`OpenProcedure`), or the procedure node index of a
    /// procedure body
    pub data: Data,
    /// Output index of the node this entry patches when it closes
    pub at: u32,
}

impl OpEntry {
    pub fn new(node: AstNode) -> Self {
        Self {
            node,
            data: Data::ZERO,
            at: 0,
        }
    }

    pub fn with_data(
        mut self,
        data: Data,
    ) -> Self {
        self.data = data;
        self
    }

    pub fn at(
        mut self,
        index: usize,
    ) -> Self {
        self.at = index as u32;
        self
    }

    #[inline]
    pub fn kind(&self) -> AstType {
        self.node.kind
    }

    pub fn is_root(&self) -> bool {
        self.node.kind == AstType::StartScope && self.node.flags.contains(AstFlags::ROOT)
    }

    pub fn header(&self) -> ProcHeader {
        self.data.as_proc_header()
    }

    pub fn set_header(
        &mut self,
        header: ProcHeader,
    ) {
        self.data = Data::from_proc_header(header);
    }
}

pub struct OperatorStack {
    entries: SmallVec<[OpEntry; 32]>,
    limit: usize,
}

impl OperatorStack {
    /// A stack holding only the root scope
    pub fn new(limit: usize) -> Self {
        let root = AstNode::new(AstType::StartScope, 0).with_flags(AstFlags::ROOT);
        let mut entries = SmallVec::new();
        entries.push(OpEntry::new(root));
        Self {
            entries,
            limit: limit.max(2),
        }
    }

    pub fn push(
        &mut self,
        entry: OpEntry,
    ) -> Result<(), ParseError> {
        if self.entries.len() >= self.limit {
            return Err(ParseError::new(ParseErrorKind::OperatorStackOverflow, entry.node.pos));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Pop a non-root entry
    pub fn pop(&mut self) -> Option<OpEntry> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop()
    }

    pub fn top(&self) -> &OpEntry {
        &self.entries[self.entries.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut OpEntry {
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Entry `depth` places below the top
    pub fn below(
        &self,
        depth: usize,
    ) -> Option<&OpEntry> {
        self.entries.len().checked_sub(depth + 1).map(|index| &self.entries[index])
    }

    pub fn below_mut(
        &mut self,
        depth: usize,
    ) -> Option<&mut OpEntry> {
        let index = self.entries.len().checked_sub(depth + 1)?;
        Some(&mut self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
