//! Operator-precedence parser
//!
//! Two states alternate: expecting a value and expecting an operator. Values
//! go straight to the output; prefix operators, infix operators and scope
//! openers wait on the operator stack until something binding less tightly
//! arrives (see `PRECS_LEFT` / `PRECS_RIGHT`).

use super::builder::AstBuilder;
use super::operators::{OpEntry, OperatorStack};
use super::parser_state::{ParseError, ParseErrorKind, ParserState};
use crate::frontend::core::lexer::tokens::{AstFlags, AstNode, AstType, Data, ProcHeader};
use crate::frontend::core::node_array::NodeArray;

/// Largest parameter count a procedure header can hold
pub const MAX_PARAM_COUNT: u16 = u8::MAX as u16;

enum Step {
    Value,
    Operator,
    CloseScope { pos: u32 },
    Finish,
}

pub struct Parser<'t> {
    tokens: ParserState<'t>,
    out: AstBuilder,
    ops: OperatorStack,
}

impl<'t> Parser<'t> {
    pub fn new(
        tokens: &'t NodeArray,
        operator_limit: usize,
    ) -> Self {
        Self {
            tokens: ParserState::new(tokens),
            out: AstBuilder::new(tokens.len()),
            ops: OperatorStack::new(operator_limit),
        }
    }

    pub fn run(mut self) -> Result<NodeArray, ParseError> {
        let mut step = Step::Value;
        loop {
            step = match step {
                Step::Value => self.expect_value()?,
                Step::Operator => self.expect_operator()?,
                Step::CloseScope { pos } => self.close_scope(pos)?,
                Step::Finish => return self.finish(),
            };
        }
    }

    fn push(
        &mut self,
        entry: OpEntry,
    ) -> Result<(), ParseError> {
        self.ops.push(entry)
    }

    fn push_node(
        &mut self,
        node: AstNode,
    ) -> Result<(), ParseError> {
        self.ops.push(OpEntry::new(node))
    }

    fn next_is_closing(&self) -> bool {
        self.tokens.at(AstType::EndScope)
    }

    fn expect_value(&mut self) -> Result<Step, ParseError> {
        let (mut curr, data) = self.tokens.bump()?;
        let err = |kind| Err(ParseError::new(kind, curr.pos));

        match curr.kind {
            AstType::Terminator if self.tokens.at_end() => Ok(Step::Finish),

            AstType::EndScope => {
                let before = self.tokens.before_last();
                if !matches!(
                    before,
                    AstType::Comma | AstType::Semicolon | AstType::Terminator | AstType::OpenBrace
                ) {
                    return err(ParseErrorKind::ExpectedValue);
                }
                if before == AstType::Comma {
                    let top = self.ops.top_mut();
                    top.node.count = top.node.count.saturating_sub(1);
                }
                self.tokens.rewind();
                Ok(Step::Operator)
            }

            AstType::Unsigned | AstType::Float32 | AstType::Float64 | AstType::Character | AstType::String => {
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::Identifier => {
                if self.ops.top().kind() == AstType::OpenProcedure {
                    curr.kind = AstType::Variable;
                }
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::NamedInfered => {
                let top = self.ops.top_mut();
                if top.kind() != AstType::OpenProcedure {
                    return err(ParseErrorKind::InferedOutOfContext);
                }
                let mut header = top.header();
                header.infered = match header.infered.checked_add(1) {
                    Some(infered) => infered,
                    None => return err(ParseErrorKind::TooManyInfered),
                };
                top.set_header(header);
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::GetField => {
                curr.kind = AstType::EnumLiteral;
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::Infered | AstType::Ignored | AstType::SelfValue | AstType::Pound => {
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::LogicNot | AstType::BitNot | AstType::Splat => {
                self.push_node(curr)?;
                Ok(Step::Value)
            }
            AstType::Add | AstType::Subtract | AstType::Multiply | AstType::Power | AstType::BitXor => {
                curr.kind = match curr.kind {
                    AstType::Add => AstType::Plus,
                    AstType::Subtract => AstType::Minus,
                    AstType::Multiply => AstType::Pointer,
                    AstType::Power => AstType::DoublePointer,
                    _ => AstType::BitNot,
                };
                self.push_node(curr)?;
                Ok(Step::Value)
            }

            AstType::Return | AstType::Defer | AstType::Try | AstType::Assert => {
                let bare = self
                    .tokens
                    .peek_kind()
                    .is_none_or(|next| next.is_separator() || next == AstType::EndScope);
                if bare {
                    self.out.emit(curr.with_count(0), data);
                    Ok(Step::Operator)
                } else {
                    self.push_node(curr.with_count(1))?;
                    Ok(Step::Value)
                }
            }

            AstType::Variable => {
                let context = self.ops.top().kind();
                if !matches!(context, AstType::OpenProcedure | AstType::With | AstType::StartScope) {
                    return err(ParseErrorKind::VariableContext);
                }
                self.push(OpEntry::new(curr).with_data(data))?;
                Ok(Step::Value)
            }

            AstType::OpenBrace => {
                if self.tokens.skip(AstType::EndScope)? {
                    self.out.emit_node(AstType::Initializer, curr.pos);
                    return Ok(Step::Operator);
                }
                let open = self.out.open_scope(curr.pos, AstFlags::NONE);
                let scope = AstNode::new(AstType::StartScope, curr.pos);
                self.push(OpEntry::new(scope).at(open))?;
                Ok(Step::Value)
            }

            AstType::OpenPar => {
                if self.next_is_closing() {
                    return err(ParseErrorKind::MissingExpression);
                }
                self.push_node(curr.with_count(0))?;
                Ok(Step::Value)
            }

            AstType::OpenProcedureClass => {
                if self.tokens.skip(AstType::EndScope)? {
                    curr.kind = AstType::ProcedureClass;
                    self.push_node(curr.with_count(0))?;
                } else {
                    self.push_node(curr.with_count(1))?;
                }
                Ok(Step::Value)
            }

            AstType::OpenProcedure => {
                let procedure = self.out.open_procedure(curr.pos);
                if self.tokens.skip(AstType::EndScope)? {
                    self.open_body(procedure, curr.pos)?;
                } else {
                    let entry = OpEntry::new(curr.with_count(1))
                        .with_data(Data::from_proc_header(ProcHeader::default()))
                        .at(procedure);
                    self.push(entry)?;
                }
                Ok(Step::Value)
            }

            AstType::Subscript => {
                if self.tokens.skip(AstType::EndScope)? {
                    curr.kind = AstType::SpanClass;
                    self.push_node(curr)?;
                } else {
                    curr.kind = AstType::OpenArrayClass;
                    self.push_node(curr.with_count(1))?;
                }
                Ok(Step::Value)
            }

            AstType::With => {
                let open = self.out.open_scope(curr.pos, AstFlags::WITH);
                self.push(OpEntry::new(curr).at(open))?;
                Ok(Step::Value)
            }

            kind if kind.is_keyword() => err(ParseErrorKind::UnsupportedKeyword(kind)),

            _ => err(ParseErrorKind::ExpectedValue),
        }
    }

    /// After the parameter list: expect `=>`, emit the body scope and push
    /// the procedure operator that closes it.
    fn open_body(
        &mut self,
        procedure: usize,
        pos: u32,
    ) -> Result<(), ParseError> {
        if !self.tokens.skip(AstType::DoubleArrow)? {
            return Err(ParseError::new(ParseErrorKind::ExpectedArrow, pos));
        }
        let body = self.out.open_scope(pos, AstFlags::NONE);
        let entry = OpEntry::new(AstNode::new(AstType::Procedure, pos))
            .with_data(Data(procedure as u64))
            .at(body);
        self.push(entry)
    }

    /// Emit an operator leaving the stack
    fn pop_into_output(
        &mut self,
        head: OpEntry,
        pos: u32,
    ) {
        match head.kind() {
            AstType::Procedure => {
                let body_pos = head.node.pos;
                self.out.emit(AstNode::new(AstType::Return, body_pos).with_count(1), Data::ZERO);
                self.out.close_scope(head.at as usize, body_pos);
                self.out.close_procedure(head.data.as_u64() as usize);
            }
            AstType::With => self.out.close_scope(head.at as usize, pos),
            _ => {
                self.out.emit(head.node, head.data);
            }
        }
    }

    fn expect_operator(&mut self) -> Result<Step, ParseError> {
        let (mut curr, data) = self.tokens.bump()?;
        let err = |kind| Err(ParseError::new(kind, curr.pos));

        if curr.kind.left() == u8::MAX {
            return err(ParseErrorKind::ExpectedOperator);
        }

        while self.ops.top().kind().right() >= curr.kind.left() {
            let Some(head) = self.ops.pop() else {
                break;
            };
            self.pop_into_output(head, curr.pos);
        }

        if curr.kind.is_binary() {
            if curr.kind == AstType::Assign && self.assign_to_declaration(curr)? {
                return Ok(Step::Value);
            }
            self.push_node(curr)?;
            return Ok(Step::Value);
        }

        match curr.kind {
            AstType::Terminator if self.tokens.at_end() => Ok(Step::Finish),
            AstType::Terminator | AstType::Semicolon => Ok(Step::Value),

            AstType::Comma => {
                let top = self.ops.top_mut();
                if top.is_root() {
                    return err(ParseErrorKind::UnexpectedComma);
                }
                top.node.count = match top.node.count.checked_add(1) {
                    Some(count) => count,
                    None => return err(ParseErrorKind::TooManyElements),
                };
                Ok(Step::Value)
            }

            AstType::OpenBrace => {
                let procedure = self.ops.top().data.as_u64() as usize;
                let top = self.ops.top_mut();
                match top.kind() {
                    AstType::Procedure => {
                        top.node.kind = AstType::StartScope;
                        top.node.flags |= AstFlags::PROC_BODY;
                        self.out.add_flags(procedure, AstFlags::RETURN_SPEC);
                        self.out.emit_node(AstType::ReturnClass, curr.pos);
                        Ok(Step::Value)
                    }
                    AstType::With => {
                        top.node.kind = AstType::StartScope;
                        top.node.flags |= AstFlags::WITH;
                        Ok(Step::Value)
                    }
                    _ => err(ParseErrorKind::NothingToOpen),
                }
            }

            AstType::Dereference => {
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }
            AstType::GetField => {
                self.out.emit(curr, data);
                Ok(Step::Operator)
            }

            AstType::OpenPar | AstType::GetProcedure | AstType::Initialize => {
                if curr.kind == AstType::OpenPar {
                    curr.kind = AstType::Call;
                }
                if self.tokens.skip(AstType::EndScope)? {
                    self.out.emit(curr.with_count(0), data);
                    return Ok(Step::Operator);
                }
                self.push_node(curr.with_count(1))?;
                Ok(Step::Value)
            }

            AstType::Subscript => {
                if self.tokens.skip(AstType::EndScope)? {
                    curr.kind = AstType::Span;
                    self.out.emit(curr, data);
                    return Ok(Step::Operator);
                }
                self.push_node(curr.with_count(1))?;
                Ok(Step::Value)
            }

            AstType::FieldSubscript => {
                if self.next_is_closing() {
                    return err(ParseErrorKind::MissingFieldArgument);
                }
                self.push_node(curr.with_count(1))?;
                Ok(Step::Value)
            }

            AstType::EndScope => Ok(Step::CloseScope { pos: curr.pos }),

            kind => err(ParseErrorKind::UnhandledToken(kind)),
        }
    }

    /// `name: class = value` and `name :: value = ...`. Inside a parameter
    /// list the assignment becomes a default value; elsewhere it folds into
    /// the declaration. Returns false for a plain assignment.
    fn assign_to_declaration(
        &mut self,
        curr: AstNode,
    ) -> Result<bool, ParseError> {
        let top = *self.ops.top();
        let declares = top.kind() == AstType::Variable
            && top.node.flags.intersects(AstFlags::CLASS_SPEC | AstFlags::CONSTANT);
        if !declares {
            return Ok(false);
        }

        let in_params = self.ops.below(1).is_some_and(|entry| entry.kind() == AstType::OpenProcedure);
        if !in_params {
            self.ops.top_mut().node.flags |= AstFlags::CLASS_SPEC | AstFlags::INITIALIZED;
            return Ok(true);
        }

        self.out.emit(top.node, top.data);
        if let Some(params) = self.ops.below_mut(1) {
            let mut header = params.header();
            header.defaults = header
                .defaults
                .checked_add(1)
                .ok_or(ParseError::new(ParseErrorKind::TooManyDefaults, curr.pos))?;
            params.set_header(header);
        }
        *self.ops.top_mut() = OpEntry::new(AstNode::new(AstType::DefaultParam, curr.pos));
        Ok(true)
    }

    fn close_scope(
        &mut self,
        pos: u32,
    ) -> Result<Step, ParseError> {
        let Some(scope) = self.ops.pop() else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedClosing, pos));
        };
        let err = |kind| Err(ParseError::new(kind, scope.node.pos));

        match scope.kind() {
            AstType::OpenPar => {
                if scope.node.count != 0 {
                    return err(ParseErrorKind::TooManyExpressions);
                }
                Ok(Step::Operator)
            }

            AstType::Call | AstType::GetProcedure | AstType::Subscript | AstType::Initialize => {
                self.out.emit(scope.node, Data::ZERO);
                Ok(Step::Operator)
            }

            AstType::FieldSubscript => {
                if scope.node.count != 1 {
                    return err(ParseErrorKind::FieldSubscriptArity);
                }
                self.out.emit(scope.node, Data::ZERO);
                Ok(Step::Operator)
            }

            AstType::OpenArrayClass => {
                if scope.node.count != 1 {
                    return err(ParseErrorKind::ArrayClassArity);
                }
                let mut node = scope.node;
                node.kind = AstType::ArrayClass;
                self.push_node(node)?;
                Ok(Step::Value)
            }

            AstType::OpenProcedureClass => {
                let mut node = scope.node;
                node.kind = AstType::ProcedureClass;
                self.push_node(node)?;
                Ok(Step::Value)
            }

            AstType::OpenProcedure => {
                let procedure = scope.at as usize;
                if scope.node.count > MAX_PARAM_COUNT {
                    return err(ParseErrorKind::TooManyParameters);
                }
                let mut header = scope.header();
                header.params = scope.node.count as u8;
                self.out.set_header(procedure, header);
                self.open_body(procedure, pos)?;
                Ok(Step::Value)
            }

            AstType::StartScope => {
                self.out.close_scope(scope.at as usize, pos);
                if scope.node.flags.contains(AstFlags::PROC_BODY) {
                    self.out.close_procedure(scope.data.as_u64() as usize);
                }
                Ok(Step::Operator)
            }

            kind => err(ParseErrorKind::UnhandledScope(kind)),
        }
    }

    fn finish(self) -> Result<NodeArray, ParseError> {
        let pos = self.tokens.last_position();
        if !self.ops.top().is_root() {
            return Err(ParseError::new(ParseErrorKind::UnexpectedEndOfFile, pos.saturating_sub(1)));
        }
        Ok(self.out.finish(pos))
    }
}
