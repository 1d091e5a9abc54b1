//! Flat arrays of tokens and AST nodes
//!
//! Slot 0 is always a `Terminator` sentinel and a finished array ends with a
//! `Terminator`. A node whose kind carries a payload is followed by exactly
//! one [`Data`] slot, so the array is walked with the static size tables only.

use crate::frontend::core::lexer::tokens::{AstNode, AstType, Data};

/// Which size table governs the array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLayout {
    Tokens,
    Ast,
}

impl NodeLayout {
    #[inline]
    pub fn size_of(
        self,
        kind: AstType,
    ) -> usize {
        match self {
            NodeLayout::Tokens => kind.token_size(),
            NodeLayout::Ast => kind.node_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Node(AstNode),
    Data(Data),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeArray {
    slots: Vec<Slot>,
    layout: NodeLayout,
}

impl NodeArray {
    pub fn new(
        layout: NodeLayout,
        capacity: usize,
    ) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(32));
        slots.push(Slot::Node(AstNode::new(AstType::Terminator, 0)));
        Self { slots, layout }
    }

    pub fn layout(&self) -> NodeLayout {
        self.layout
    }

    /// Number of slots, sentinel included
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when only the sentinel is present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    #[inline]
    pub fn size_of(
        &self,
        kind: AstType,
    ) -> usize {
        self.layout.size_of(kind)
    }

    /// Append a header-only node; returns its index
    pub fn push(
        &mut self,
        node: AstNode,
    ) -> usize {
        debug_assert_eq!(self.size_of(node.kind), 1, "{} needs a data slot", node.kind);
        let index = self.slots.len();
        self.slots.push(Slot::Node(node));
        index
    }

    /// Append a node followed by its data slot; returns the node index
    pub fn push_with_data(
        &mut self,
        node: AstNode,
        data: Data,
    ) -> usize {
        debug_assert_eq!(self.size_of(node.kind), 2, "{} has no data slot", node.kind);
        let index = self.slots.len();
        self.slots.push(Slot::Node(node));
        self.slots.push(Slot::Data(data));
        index
    }

    pub fn node(
        &self,
        index: usize,
    ) -> Option<AstNode> {
        match self.slots.get(index)? {
            Slot::Node(node) => Some(*node),
            Slot::Data(_) => None,
        }
    }

    pub fn node_mut(
        &mut self,
        index: usize,
    ) -> Option<&mut AstNode> {
        match self.slots.get_mut(index)? {
            Slot::Node(node) => Some(node),
            Slot::Data(_) => None,
        }
    }

    /// Payload of the node at `index`, if its kind has one
    pub fn data(
        &self,
        index: usize,
    ) -> Option<Data> {
        let node = self.node(index)?;
        if self.size_of(node.kind) < 2 {
            return None;
        }
        match self.slots.get(index + 1)? {
            Slot::Data(data) => Some(*data),
            Slot::Node(_) => None,
        }
    }

    /// Overwrite the payload of the node at `index`; false if it has none
    pub fn set_data(
        &mut self,
        index: usize,
        data: Data,
    ) -> bool {
        if self.data(index).is_none() {
            return false;
        }
        self.slots[index + 1] = Slot::Data(data);
        true
    }

    /// Whether the array is finished with a `Terminator` node
    pub fn is_terminated(&self) -> bool {
        self.iter()
            .last()
            .is_some_and(|(_, node, _)| node.kind == AstType::Terminator)
    }

    /// Walk nodes after the sentinel as `(index, node, data)`
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter {
            array: self,
            index: 1,
        }
    }

    /// Raw 64-bit words, headers and payloads interleaved
    pub fn to_words(&self) -> Vec<u64> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Node(node) => node.to_u64(),
                Slot::Data(data) => data.as_u64(),
            })
            .collect()
    }

    /// Rebuild an array from [`NodeArray::to_words`] output. Fails on an
    /// unknown kind or a truncated payload.
    pub fn from_words(
        layout: NodeLayout,
        words: &[u64],
    ) -> Option<Self> {
        let mut slots = Vec::with_capacity(words.len());
        let mut index = 0;
        while index < words.len() {
            let node = AstNode::from_u64(words[index])?;
            slots.push(Slot::Node(node));
            if layout.size_of(node.kind) == 2 {
                slots.push(Slot::Data(Data(*words.get(index + 1)?)));
            }
            index += layout.size_of(node.kind);
        }
        match slots.first() {
            Some(Slot::Node(node)) if node.kind == AstType::Terminator => Some(Self { slots, layout }),
            _ => None,
        }
    }
}

pub struct NodeIter<'a> {
    array: &'a NodeArray,
    index: usize,
}

impl Iterator for NodeIter<'_> {
    type Item = (usize, AstNode, Option<Data>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let node = self.array.node(index)?;
        self.index += self.array.size_of(node.kind);
        Some((index, node, self.array.data(index)))
    }
}
