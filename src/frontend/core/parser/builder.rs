//! AST output with deferred patches
//!
//! Scopes and procedures are opened first and completed later: the opener
//! records its output index, and closing writes the slot distance to one
//! past the matching `EndScope` into the opener's data slot.

use crate::frontend::core::lexer::tokens::{AstFlags, AstNode, AstType, Data, ProcHeader};
use crate::frontend::core::node_array::{NodeArray, NodeLayout};

pub struct AstBuilder {
    nodes: NodeArray,
}

impl AstBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: NodeArray::new(NodeLayout::Ast, capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node, with `data` when its kind carries a payload
    pub fn emit(
        &mut self,
        node: AstNode,
        data: Data,
    ) -> usize {
        if self.nodes.size_of(node.kind) == 2 {
            self.nodes.push_with_data(node, data)
        } else {
            self.nodes.push(node)
        }
    }

    pub fn emit_node(
        &mut self,
        kind: AstType,
        pos: u32,
    ) -> usize {
        self.nodes.push(AstNode::new(kind, pos))
    }

    /// Open a `StartScope` whose end offset is patched by [`AstBuilder::close_scope`]
    pub fn open_scope(
        &mut self,
        pos: u32,
        flags: AstFlags,
    ) -> usize {
        self.nodes
            .push_with_data(AstNode::new(AstType::StartScope, pos).with_flags(flags), Data::ZERO)
    }

    /// Emit the `EndScope` for the scope opened at `open` and patch it
    pub fn close_scope(
        &mut self,
        open: usize,
        pos: u32,
    ) {
        self.nodes.push(AstNode::new(AstType::EndScope, pos));
        let distance = (self.nodes.len() - open) as u64;
        self.nodes.set_data(open, Data(distance));
    }

    /// Emit a `Procedure` node with an empty header
    pub fn open_procedure(
        &mut self,
        pos: u32,
    ) -> usize {
        self.nodes.push_with_data(
            AstNode::new(AstType::Procedure, pos),
            Data::from_proc_header(ProcHeader::default()),
        )
    }

    pub fn header(
        &self,
        procedure: usize,
    ) -> ProcHeader {
        self.nodes.data(procedure).map(Data::as_proc_header).unwrap_or_default()
    }

    pub fn set_header(
        &mut self,
        procedure: usize,
        header: ProcHeader,
    ) {
        self.nodes.set_data(procedure, Data::from_proc_header(header));
    }

    /// Record where the procedure opened at `procedure` ends
    pub fn close_procedure(
        &mut self,
        procedure: usize,
    ) {
        let mut header = self.header(procedure);
        header.end_offset = (self.nodes.len() - procedure) as u32;
        self.set_header(procedure, header);
    }

    pub fn add_flags(
        &mut self,
        index: usize,
        flags: AstFlags,
    ) {
        if let Some(node) = self.nodes.node_mut(index) {
            node.flags |= flags;
        }
    }

    /// Terminate and hand out the array
    pub fn finish(
        mut self,
        pos: u32,
    ) -> NodeArray {
        self.nodes.push(AstNode::new(AstType::Terminator, pos));
        self.nodes
    }
}
