//! Compilation session
//!
//! A [`Session`] owns every table the stages write into: names, string
//! statics and classes. Sessions are independent of each other; hosts that
//! share one between threads wrap it in a [`SharedSession`].

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::core::arena::Region;
use super::core::lexer::{self, LexError};
use super::core::names::{NameId, NameTable};
use super::core::node_array::NodeArray;
use super::core::parser::{self, ParseError};
use super::core::type_system::{Class, ClassTable, ClassTableStats};
use super::FrontendError;
use crate::util::config::SessionConfig;

/// Session behind a lock, for multi-threaded hosts
pub type SharedSession = Arc<Mutex<Session>>;

/// Classes every session knows by name
const BUILTIN_CLASSES: [(&str, Class); 17] = [
    ("void", Class::VOID),
    ("bool", Class::BOOL),
    ("class", Class::CLASS),
    ("u8", Class::U8),
    ("u16", Class::U16),
    ("u32", Class::U32),
    ("u64", Class::U64),
    ("i8", Class::I8),
    ("i16", Class::I16),
    ("i32", Class::I32),
    ("i64", Class::I64),
    ("f32", Class::F32),
    ("f64", Class::F64),
    ("usize", Class::USIZE),
    ("isize", Class::ISIZE),
    ("uptr", Class::USIZE),
    ("iptr", Class::ISIZE),
];

/// Tokens and AST of one source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub tokens: NodeArray,
    pub ast: NodeArray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub names: usize,
    pub name_bytes: usize,
    pub name_collisions: u64,
    pub statics_bytes: usize,
    pub classes: ClassTableStats,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    names: NameTable,
    statics: Region<u8>,
    classes: ClassTable,
    builtins: Vec<(NameId, Class)>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let limits = &config.limits;
        let mut names = NameTable::new(limits.name_set_capacity, limits.name_bytes_ceiling);
        let builtins = BUILTIN_CLASSES
            .iter()
            .filter_map(|&(name, class)| Some((names.intern(name.as_bytes()).ok()?, class)))
            .collect();
        let statics = Region::new("statics", 256, limits.statics_ceiling);
        let classes = ClassTable::new(limits.class_set_capacity, limits.class_info_ceiling);
        debug!(
            scope_depth = limits.scope_depth,
            operator_depth = limits.operator_depth,
            "session created"
        );
        Self {
            config,
            names,
            statics,
            classes,
            builtins,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    /// String literal bytes written by the tokenizer
    pub fn statics(&self) -> &Region<u8> {
        &self.statics
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassTable {
        &mut self.classes
    }

    /// Builtin class called `name`
    pub fn class_by_name(
        &self,
        name: NameId,
    ) -> Option<Class> {
        self.builtins
            .iter()
            .find(|&&(builtin, _)| builtin == name)
            .map(|&(_, class)| class)
    }

    pub fn tokenize(
        &mut self,
        source: &[u8],
    ) -> Result<NodeArray, LexError> {
        let limits = &self.config.limits;
        lexer::tokenize(
            source,
            &mut self.names,
            &mut self.statics,
            limits.scope_depth,
            limits.token_capacity,
        )
    }

    pub fn parse(
        &self,
        tokens: &NodeArray,
    ) -> Result<NodeArray, ParseError> {
        parser::parse(tokens, self.config.limits.operator_depth)
    }

    /// Tokenize and parse one source unit
    pub fn compile_unit(
        &mut self,
        source: &[u8],
    ) -> Result<Unit, FrontendError> {
        let tokens = self.tokenize(source)?;
        let ast = self.parse(&tokens)?;
        info!(
            bytes = source.len(),
            tokens = tokens.len(),
            nodes = ast.len(),
            "unit compiled"
        );
        Ok(Unit { tokens, ast })
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            names: self.names.len(),
            name_bytes: self.names.byte_len(),
            name_collisions: self.names.collisions(),
            statics_bytes: self.statics.len(),
            classes: self.classes.stats(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
