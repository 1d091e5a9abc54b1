//! Type errors
//!
//! Type errors carry no source position; the caller knows which node it was
//! checking and attaches the position itself.

use thiserror::Error;

use super::class::Class;
use crate::frontend::core::arena::ArenaError;
use crate::frontend::core::names::NameId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("class prefix mismatch")]
    PrefixMismatch,
    #[error("cannot pass const to a non const argument")]
    ConstToNonConst,
    #[error("resulting class has too many prefixes")]
    TooManyPrefixes,
    #[error("class mismatch: expected {expected}, found {found}")]
    ClassMismatch { expected: Class, found: Class },
    #[error("expected {expected} elements, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("array sizes differ: expected {expected}, found {found}")]
    ArraySizeMismatch { expected: u32, found: u32 },
    #[error("value {value} cannot be represented by {target}")]
    ValueOutOfRange { value: i128, target: Class },
    #[error("assigning {source_class} to the narrower {target} is not permitted")]
    NarrowingConversion { source_class: Class, target: Class },
    #[error("enum literal {0:?} does not match any member of the targeted enum")]
    NoMatchingEnumMember(NameId),
    #[error("cannot infer argument from void pointer")]
    InferFromVoidPointer,
    #[error("class cannot be infered from init list or enum literal")]
    InferFromLiteral,
    #[error("inference slot {0} is already bound to something else")]
    ConflictingInference(u8),
    #[error("inference slot {0} is out of range")]
    InvalidSlot(u8),
    #[error("inference slot {0} is not bound")]
    UnboundSlot(u8),
    #[error("infered variable {0} is not a class")]
    NotAClass(u8),
    #[error("expression at node {0} has not been evaluated")]
    UnresolvedExpression(u32),
    #[error("array size must be an unsigned integer")]
    InvalidArraySize,
    #[error("array size cannot be negative")]
    NegativeArraySize,
    #[error("array size cannot be that big")]
    ArraySizeTooLarge,
    #[error("class is too large")]
    ClassTooLarge,
    #[error("too many members: {0}")]
    TooManyMembers(usize),
    #[error("duplicate field {0:?}")]
    DuplicateField(NameId),
    #[error("duplicate enum member {0:?}")]
    DuplicateMember(NameId),
    #[error("enum base must be an integer class, found {0}")]
    InvalidEnumBase(Class),
    #[error("{0} still contains infered or unevaluated parts")]
    NotConcrete(Class),
    #[error("{0} is not a procedure")]
    NotAProcedure(Class),
    #[error(transparent)]
    Arena(#[from] ArenaError),
}
