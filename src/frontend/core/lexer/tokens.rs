//! Token and AST node types
//!
//! Tokens and AST nodes share one 8-byte header ([`AstNode`]) and one kind
//! enum ([`AstType`]). Whether a node is followed by an 8-byte [`Data`] slot
//! depends only on its kind, see [`TOKEN_SIZES`] and [`AST_NODE_SIZES`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::frontend::core::names::NameId;

macro_rules! ast_types {
    ($( $name:ident = ($left:expr, $right:expr, $token:expr, $node:expr, $text:expr) ),* $(,)?) => {
        /// Kind of a token or AST node
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AstType {
            $($name),*
        }

        impl AstType {
            pub const ALL: &'static [AstType] = &[$(AstType::$name),*];
            pub const COUNT: usize = Self::ALL.len();

            /// Printable form used by listings
            pub fn name(self) -> &'static str {
                AST_TYPE_NAMES[self as usize]
            }
        }

        /// Left binding power; 255 marks "expects a value"
        pub static PRECS_LEFT: [u8; AstType::COUNT] = [$($left),*];
        /// Right binding power of an operator sitting on the stack
        pub static PRECS_RIGHT: [u8; AstType::COUNT] = [$($right),*];
        /// Slots per token kind (1 header, 2 header + data)
        pub static TOKEN_SIZES: [u8; AstType::COUNT] = [$($token),*];
        /// Slots per AST node kind
        pub static AST_NODE_SIZES: [u8; AstType::COUNT] = [$($node),*];
        static AST_TYPE_NAMES: [&str; AstType::COUNT] = [$($text),*];
    };
}

ast_types! {
    Terminator         = (5, 0, 1, 1, "terminator"),
    Semicolon          = (5, 0, 1, 1, ";"),
    Comma              = (11, 0, 1, 1, ","),

    Identifier         = (255, 0, 2, 2, "identifier"),
    Variable           = (255, 36, 2, 2, "variable"),
    EnumLiteral        = (255, 0, 2, 2, "enum literal"),
    NamedInfered       = (255, 0, 2, 2, "named infered"),
    Unsigned           = (255, 0, 2, 2, "unsigned"),
    Float32            = (255, 0, 2, 2, "f32"),
    Float64            = (255, 0, 2, 2, "f64"),
    Character          = (255, 0, 2, 2, "character"),
    String             = (255, 0, 2, 2, "string"),
    SelfValue          = (255, 0, 1, 1, "@"),
    Infered            = (255, 0, 1, 1, "$"),
    Ignored            = (255, 0, 1, 1, "_"),
    Initializer        = (255, 0, 1, 1, "{}"),
    Pound              = (255, 0, 1, 1, "#"),
    Nop                = (255, 0, 1, 1, "nop"),
    Error              = (255, 0, 1, 1, "error"),

    Return             = (255, 15, 1, 1, "return"),
    Defer              = (255, 15, 1, 1, "defer"),
    Try                = (255, 15, 1, 1, "try"),
    Assert             = (255, 15, 1, 1, "assert"),
    With               = (255, 10, 1, 1, "with"),
    If                 = (255, 0, 1, 1, "if"),
    Else               = (255, 0, 1, 1, "else"),
    While              = (255, 0, 1, 1, "while"),
    For                = (255, 0, 1, 1, "for"),
    Goto               = (255, 0, 1, 1, "goto"),
    Import             = (255, 0, 1, 1, "import"),

    OpenPar            = (140, 0, 1, 1, "("),
    OpenBrace          = (30, 0, 1, 1, "{"),
    Subscript          = (140, 0, 1, 1, "["),
    GetProcedure       = (140, 0, 1, 1, ".("),
    FieldSubscript     = (140, 0, 1, 1, ".["),
    Initialize         = (130, 0, 1, 1, ".{"),
    OpenProcedure      = (255, 0, 1, 1, "(=>"),
    OpenProcedureClass = (255, 0, 1, 1, "(->"),
    OpenArrayClass     = (255, 0, 1, 1, "[class"),
    Call               = (140, 0, 1, 1, "call"),
    StartScope         = (255, 0, 1, 2, "start scope"),
    EndScope           = (10, 0, 1, 1, "end scope"),

    Dereference        = (140, 0, 1, 1, "'"),
    GetField           = (140, 0, 2, 2, "get field"),
    Span               = (140, 0, 1, 1, "[]"),

    Plus               = (255, 120, 1, 1, "unary +"),
    Minus              = (255, 120, 1, 1, "unary -"),
    LogicNot           = (255, 120, 1, 1, "!"),
    BitNot             = (255, 120, 1, 1, "unary ^"),
    Pointer            = (255, 120, 1, 1, "pointer"),
    DoublePointer      = (255, 120, 1, 1, "double pointer"),
    Splat              = (255, 120, 1, 1, "..."),
    SpanClass          = (255, 132, 1, 1, "span class"),
    ArrayClass         = (255, 132, 1, 1, "array class"),
    ProcedureClass     = (255, 132, 1, 1, "procedure class"),

    Procedure          = (255, 11, 1, 2, "procedure"),
    ReturnClass        = (255, 0, 1, 1, "return class"),
    DefaultParam       = (255, 36, 1, 1, "default param"),
    DoubleArrow        = (255, 0, 1, 1, "=>"),

    Concat             = (54, 54, 1, 1, "<>"),
    Modulo             = (70, 70, 1, 1, "%"),
    Add                = (72, 72, 1, 1, "+"),
    Subtract           = (72, 72, 1, 1, "-"),
    CrossProduct       = (76, 76, 1, 1, "><"),
    Multiply           = (78, 78, 1, 1, "*"),
    Divide             = (78, 78, 1, 1, "/"),
    Power              = (81, 80, 1, 1, "**"),
    BitOr              = (88, 88, 1, 1, "|"),
    BitAnd             = (90, 90, 1, 1, "&"),
    BitXor             = (92, 92, 1, 1, "^"),
    ShiftLeft          = (94, 94, 1, 1, "<<"),
    ShiftRight         = (94, 94, 1, 1, ">>"),
    LogicOr            = (60, 60, 1, 1, "||"),
    LogicAnd           = (62, 62, 1, 1, "&&"),
    Equal              = (64, 64, 1, 1, "=="),
    Less               = (66, 66, 1, 1, "<"),
    Greater            = (66, 66, 1, 1, ">"),
    Contains           = (68, 68, 1, 1, "@="),
    Pipe               = (50, 50, 1, 1, "|>"),
    Range              = (53, 53, 1, 1, ".."),
    Cast               = (99, 98, 1, 1, "~"),
    Reinterpret        = (99, 98, 1, 1, "~%~"),

    Assign             = (41, 40, 1, 1, "="),
    ConcatAssign       = (41, 40, 1, 1, "<>="),
    ModuloAssign       = (41, 40, 1, 1, "%="),
    AddAssign          = (41, 40, 1, 1, "+="),
    SubtractAssign     = (41, 40, 1, 1, "-="),
    CrossProductAssign = (41, 40, 1, 1, "><="),
    MultiplyAssign     = (41, 40, 1, 1, "*="),
    DivideAssign       = (41, 40, 1, 1, "/="),
    PowerAssign        = (41, 40, 1, 1, "**="),
    BitOrAssign        = (41, 40, 1, 1, "|="),
    BitAndAssign       = (41, 40, 1, 1, "&="),
    BitXorAssign       = (41, 40, 1, 1, "^="),
    ShiftLeftAssign    = (41, 40, 1, 1, "<<="),
    ShiftRightAssign   = (41, 40, 1, 1, ">>="),
}

impl AstType {
    pub fn from_u8(value: u8) -> Option<AstType> {
        Self::ALL.get(value as usize).copied()
    }

    #[inline]
    pub fn left(self) -> u8 {
        PRECS_LEFT[self as usize]
    }

    #[inline]
    pub fn right(self) -> u8 {
        PRECS_RIGHT[self as usize]
    }

    #[inline]
    pub fn token_size(self) -> usize {
        TOKEN_SIZES[self as usize] as usize
    }

    #[inline]
    pub fn node_size(self) -> usize {
        AST_NODE_SIZES[self as usize] as usize
    }

    /// Binary operators that have a compound-assignment form
    pub fn is_compoundable(self) -> bool {
        (AstType::Concat..=AstType::ShiftRight).contains(&self)
    }

    /// `+` to `+=` and so on
    pub fn to_compound_assign(self) -> Option<AstType> {
        if !self.is_compoundable() {
            return None;
        }
        let index = self as u8 - AstType::Concat as u8 + AstType::ConcatAssign as u8;
        AstType::from_u8(index)
    }

    /// Infix operators, including assignments
    pub fn is_binary(self) -> bool {
        (AstType::Concat..=AstType::ShiftRightAssign).contains(&self)
    }

    pub fn is_assignment(self) -> bool {
        (AstType::Assign..=AstType::ShiftRightAssign).contains(&self)
    }

    pub fn is_keyword(self) -> bool {
        (AstType::Return..=AstType::Import).contains(&self)
    }

    pub fn is_separator(self) -> bool {
        matches!(self, AstType::Terminator | AstType::Semicolon | AstType::Comma)
    }

    /// Tokens that open a bracketed scope in the token stream
    pub fn is_scope_opener(self) -> bool {
        matches!(
            self,
            AstType::OpenPar
                | AstType::OpenBrace
                | AstType::Subscript
                | AstType::GetProcedure
                | AstType::FieldSubscript
                | AstType::Initialize
                | AstType::OpenProcedure
                | AstType::OpenProcedureClass
        )
    }
}

impl fmt::Display for AstType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AstFlags(pub u8);

impl AstFlags {
    pub const NONE: AstFlags = AstFlags(0);
    /// `!=`, `<=`, `>=`, `!|`, `!&`, `^|`, `^&`, `!@=`
    pub const NEGATE: AstFlags = AstFlags(1 << 0);
    pub const CONSTANT: AstFlags = AstFlags(1 << 1);
    pub const INITIALIZED: AstFlags = AstFlags(1 << 2);
    pub const CLASS_SPEC: AstFlags = AstFlags(1 << 3);
    /// `(` written directly after an identifier
    pub const DIRECT_NAME: AstFlags = AstFlags(1 << 4);
    /// Procedure with an explicit return class
    pub const RETURN_SPEC: AstFlags = AstFlags(1 << 5);
    pub const ROOT: AstFlags = AstFlags(1 << 6);
    /// Scope that is the body of a procedure
    pub const PROC_BODY: AstFlags = AstFlags(1 << 7);
    /// `StartScope` opened by `with`; reuses the `NEGATE` bit
    pub const WITH: AstFlags = AstFlags(1 << 0);

    #[inline]
    pub fn contains(
        self,
        other: AstFlags,
    ) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(
        self,
        other: AstFlags,
    ) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for AstFlags {
    type Output = AstFlags;

    fn bitor(
        self,
        rhs: AstFlags,
    ) -> AstFlags {
        AstFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for AstFlags {
    fn bitor_assign(
        &mut self,
        rhs: AstFlags,
    ) {
        self.0 |= rhs.0;
    }
}

/// 8-byte node header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstNode {
    pub kind: AstType,
    pub flags: AstFlags,
    /// Element count of a list scope, or the byte length of a name
    pub count: u16,
    /// Byte position in the source
    pub pos: u32,
}

impl AstNode {
    pub const fn new(
        kind: AstType,
        pos: u32,
    ) -> Self {
        Self {
            kind,
            flags: AstFlags::NONE,
            count: 0,
            pos,
        }
    }

    pub const fn with_flags(
        mut self,
        flags: AstFlags,
    ) -> Self {
        self.flags = flags;
        self
    }

    pub const fn with_count(
        mut self,
        count: u16,
    ) -> Self {
        self.count = count;
        self
    }

    pub fn to_u64(self) -> u64 {
        self.kind as u64 | (self.flags.0 as u64) << 8 | (self.count as u64) << 16 | (self.pos as u64) << 32
    }

    pub fn from_u64(word: u64) -> Option<Self> {
        Some(Self {
            kind: AstType::from_u8(word as u8)?,
            flags: AstFlags((word >> 8) as u8),
            count: (word >> 16) as u16,
            pos: (word >> 32) as u32,
        })
    }
}

/// Location of a string literal in the statics region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticBuf {
    pub offset: u32,
    pub size: u32,
}

/// Header payload of a `Procedure` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProcHeader {
    /// Slots from the procedure node to one past its closing `EndScope`
    pub end_offset: u32,
    pub params: u8,
    pub infered: u8,
    pub defaults: u8,
}

/// 8-byte literal slot following a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Data(pub u64);

impl Data {
    pub const ZERO: Data = Data(0);

    pub fn from_f32(value: f32) -> Self {
        Data(value.to_bits() as u64)
    }

    pub fn from_f64(value: f64) -> Self {
        Data(value.to_bits())
    }

    pub fn from_name(name: NameId) -> Self {
        Data(name.0 as u64)
    }

    pub fn from_code(code: u32) -> Self {
        Data(code as u64)
    }

    pub fn from_static(buf: StaticBuf) -> Self {
        Data(buf.offset as u64 | (buf.size as u64) << 32)
    }

    pub fn from_proc_header(header: ProcHeader) -> Self {
        Data(
            header.end_offset as u64
                | (header.params as u64) << 32
                | (header.infered as u64) << 40
                | (header.defaults as u64) << 48,
        )
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        f32::from_bits(self.0 as u32)
    }

    pub fn as_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    pub fn as_name(self) -> NameId {
        NameId(self.0 as u32)
    }

    pub fn as_code(self) -> u32 {
        self.0 as u32
    }

    pub fn as_static(self) -> StaticBuf {
        StaticBuf {
            offset: self.0 as u32,
            size: (self.0 >> 32) as u32,
        }
    }

    pub fn as_proc_header(self) -> ProcHeader {
        ProcHeader {
            end_offset: self.0 as u32,
            params: (self.0 >> 32) as u8,
            infered: (self.0 >> 40) as u8,
            defaults: (self.0 >> 48) as u8,
        }
    }

    /// End offset stored by `StartScope` nodes
    pub fn as_end_offset(self) -> u32 {
        self.0 as u32
    }
}
