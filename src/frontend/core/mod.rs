//! Core algorithm layer
//!
//! Arenas and hash sets at the bottom, then the three stages on top:
//! tokenizer, operator-precedence parser and the class table with its
//! inference and matching rules.

pub mod arena;
pub mod lexer;
pub mod names;
pub mod node_array;
pub mod parser;
pub mod probe;
pub mod type_system;

// Re-export commonly used items
pub use arena::{ArenaError, Extent, Offset, Region};
pub use lexer::{tokenize, AstFlags, AstNode, AstType, Data, LexError, LexErrorKind};
pub use names::{NameError, NameId, NameTable};
pub use node_array::{NodeArray, NodeLayout};
pub use parser::{parse, ParseError, ParseErrorKind};
pub use type_system::{Bindings, Class, ClassKind, ClassTable, TypeError, ValueInfo};
