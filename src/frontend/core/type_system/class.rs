//! Class identities
//!
//! A [`Class`] is a small `Copy` value. Scalars carry their size inline,
//! structural classes carry a [`ClassIndex`] into the class table. The
//! packed 64-bit form from [`Class::to_u64`] is the identity: two classes
//! are the same type exactly when their packed forms are equal.
//!
//! Packed layout, low bits first:
//!
//! | bits   | field                         |
//! |--------|-------------------------------|
//! | 0..6   | tag                           |
//! | 6      | contains an inference slot    |
//! | 7      | needs evaluation              |
//! | 8..32  | prefix chain, 4 bits per link |
//! | 32..64 | tag-specific payload          |

use std::fmt;

use crate::frontend::core::names::NameId;

pub const PTR_SIZE: u32 = 8;
pub const SPAN_SIZE: u32 = 2 * PTR_SIZE;

/// Discriminant of [`ClassKind`] as stored in the packed form
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassTag {
    Void = 0,
    Error,
    Infered,
    Variable,
    Expression,
    Class,
    Bytes,
    Unsigned,
    Integer,
    Bool,
    Float,
    Initlist,
    EnumLiteral,
    Array,
    Tuple,
    ProcPointer,
    Struct,
    Enum,
    Procedure,
    Module,
}

impl ClassTag {
    const ALL: [ClassTag; 20] = [
        ClassTag::Void,
        ClassTag::Error,
        ClassTag::Infered,
        ClassTag::Variable,
        ClassTag::Expression,
        ClassTag::Class,
        ClassTag::Bytes,
        ClassTag::Unsigned,
        ClassTag::Integer,
        ClassTag::Bool,
        ClassTag::Float,
        ClassTag::Initlist,
        ClassTag::EnumLiteral,
        ClassTag::Array,
        ClassTag::Tuple,
        ClassTag::ProcPointer,
        ClassTag::Struct,
        ClassTag::Enum,
        ClassTag::Procedure,
        ClassTag::Module,
    ];

    pub fn from_u8(value: u8) -> Option<ClassTag> {
        Self::ALL.get(value as usize).copied()
    }
}

/// Index of a record in the class table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassIndex(pub u32);

/// Inline size and alignment of a numeric class, both in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scalar {
    pub size: u8,
    pub alignment: u8,
}

impl Scalar {
    pub const fn new(size: u8) -> Self {
        Self {
            size,
            alignment: size,
        }
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.size as u32 * 8
    }

    /// Largest value of an unsigned integer of this width
    pub fn max_unsigned(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }

    /// Largest value of a signed integer of this width
    pub fn max_signed(self) -> i64 {
        (self.max_unsigned() >> 1) as i64
    }

    pub fn min_signed(self) -> i64 {
        -self.max_signed() - 1
    }

    /// Interpret the low `size` bytes of `raw` as a two's complement integer
    pub fn sign_extend(
        self,
        raw: u64,
    ) -> i64 {
        let shift = 64 - self.bits();
        ((raw << shift) as i64) >> shift
    }
}

/// Logical view of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Void,
    Error,
    /// Placeholder bound while matching; slot 0 is anonymous
    Infered(u8),
    /// The class bound to an inference slot
    Variable(u8),
    /// A class given by an expression, evaluated on demand
    Expression(u32),
    /// The class of classes
    Class,
    /// Opaque blob of the given byte size
    Bytes(u32),
    Unsigned(Scalar),
    Integer(Scalar),
    Bool,
    Float(Scalar),
    /// Brace initializer with the given element count
    Initlist(u32),
    EnumLiteral(NameId),
    Array(ClassIndex),
    Tuple(ClassIndex),
    ProcPointer(ClassIndex),
    Struct(ClassIndex),
    Enum(ClassIndex),
    Procedure(ClassIndex),
    Module(u32),
}

impl ClassKind {
    pub fn tag(self) -> ClassTag {
        match self {
            ClassKind::Void => ClassTag::Void,
            ClassKind::Error => ClassTag::Error,
            ClassKind::Infered(_) => ClassTag::Infered,
            ClassKind::Variable(_) => ClassTag::Variable,
            ClassKind::Expression(_) => ClassTag::Expression,
            ClassKind::Class => ClassTag::Class,
            ClassKind::Bytes(_) => ClassTag::Bytes,
            ClassKind::Unsigned(_) => ClassTag::Unsigned,
            ClassKind::Integer(_) => ClassTag::Integer,
            ClassKind::Bool => ClassTag::Bool,
            ClassKind::Float(_) => ClassTag::Float,
            ClassKind::Initlist(_) => ClassTag::Initlist,
            ClassKind::EnumLiteral(_) => ClassTag::EnumLiteral,
            ClassKind::Array(_) => ClassTag::Array,
            ClassKind::Tuple(_) => ClassTag::Tuple,
            ClassKind::ProcPointer(_) => ClassTag::ProcPointer,
            ClassKind::Struct(_) => ClassTag::Struct,
            ClassKind::Enum(_) => ClassTag::Enum,
            ClassKind::Procedure(_) => ClassTag::Procedure,
            ClassKind::Module(_) => ClassTag::Module,
        }
    }

    fn payload(self) -> u32 {
        match self {
            ClassKind::Void | ClassKind::Error | ClassKind::Class | ClassKind::Bool => 0,
            ClassKind::Infered(slot) | ClassKind::Variable(slot) => slot as u32,
            ClassKind::Expression(value)
            | ClassKind::Bytes(value)
            | ClassKind::Initlist(value)
            | ClassKind::Module(value) => value,
            ClassKind::Unsigned(s) | ClassKind::Integer(s) | ClassKind::Float(s) => {
                s.size as u32 | (s.alignment as u32) << 8
            }
            ClassKind::EnumLiteral(name) => name.0,
            ClassKind::Array(index)
            | ClassKind::Tuple(index)
            | ClassKind::ProcPointer(index)
            | ClassKind::Struct(index)
            | ClassKind::Enum(index)
            | ClassKind::Procedure(index) => index.0,
        }
    }

    fn from_parts(
        tag: ClassTag,
        payload: u32,
    ) -> Option<ClassKind> {
        let scalar = || {
            let size = payload as u8;
            let alignment = (payload >> 8) as u8;
            (payload >> 16 == 0 && size != 0).then_some(Scalar { size, alignment })
        };
        let slot = || u8::try_from(payload).ok();
        let unit = |kind| (payload == 0).then_some(kind);
        Some(match tag {
            ClassTag::Void => unit(ClassKind::Void)?,
            ClassTag::Error => unit(ClassKind::Error)?,
            ClassTag::Class => unit(ClassKind::Class)?,
            ClassTag::Bool => unit(ClassKind::Bool)?,
            ClassTag::Infered => ClassKind::Infered(slot()?),
            ClassTag::Variable => ClassKind::Variable(slot()?),
            ClassTag::Expression => ClassKind::Expression(payload),
            ClassTag::Bytes => ClassKind::Bytes(payload),
            ClassTag::Unsigned => ClassKind::Unsigned(scalar()?),
            ClassTag::Integer => ClassKind::Integer(scalar()?),
            ClassTag::Float => ClassKind::Float(scalar()?),
            ClassTag::Initlist => ClassKind::Initlist(payload),
            ClassTag::EnumLiteral => ClassKind::EnumLiteral(NameId(payload)),
            ClassTag::Array => ClassKind::Array(ClassIndex(payload)),
            ClassTag::Tuple => ClassKind::Tuple(ClassIndex(payload)),
            ClassTag::ProcPointer => ClassKind::ProcPointer(ClassIndex(payload)),
            ClassTag::Struct => ClassKind::Struct(ClassIndex(payload)),
            ClassTag::Enum => ClassKind::Enum(ClassIndex(payload)),
            ClassTag::Procedure => ClassKind::Procedure(ClassIndex(payload)),
            ClassTag::Module => ClassKind::Module(payload),
        })
    }
}

/// One link of a prefix chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    Pointer = 1,
    Span = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix {
    pub kind: PrefixKind,
    /// The pointee may not be written through this link
    pub constant: bool,
}

impl Prefix {
    pub const POINTER: Prefix = Prefix {
        kind: PrefixKind::Pointer,
        constant: false,
    };
    pub const SPAN: Prefix = Prefix {
        kind: PrefixKind::Span,
        constant: false,
    };

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    fn nibble(self) -> u32 {
        self.kind as u32 | (self.constant as u32) << 3
    }

    fn from_nibble(nibble: u32) -> Option<Prefix> {
        let kind = match nibble & 0b111 {
            1 => PrefixKind::Pointer,
            2 => PrefixKind::Span,
            _ => return None,
        };
        Some(Prefix {
            kind,
            constant: nibble & 0b1000 != 0,
        })
    }
}

/// Stack of pointer/span links; the outermost link sits in the low nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Prefixes(u32);

impl Prefixes {
    pub const NONE: Prefixes = Prefixes(0);
    pub const MAX: usize = 6;
    const BITS: u32 = 4;

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn from_bits(bits: u32) -> Option<Prefixes> {
        if bits >> (Self::BITS as usize * Self::MAX) != 0 {
            return None;
        }
        let mut rest = bits;
        while rest != 0 {
            Prefix::from_nibble(rest & 0xf)?;
            rest >>= Self::BITS;
        }
        Some(Prefixes(bits))
    }

    pub fn len(self) -> usize {
        (32 - self.0.leading_zeros()).div_ceil(Self::BITS) as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Outermost link
    pub fn first(self) -> Option<Prefix> {
        Prefix::from_nibble(self.0 & 0xf)
    }

    /// Everything under the outermost link
    pub fn rest(self) -> Prefixes {
        Prefixes(self.0 >> Self::BITS)
    }

    /// Add a new outermost link
    pub fn push(
        self,
        prefix: Prefix,
    ) -> Option<Prefixes> {
        if self.len() >= Self::MAX {
            return None;
        }
        Some(Prefixes(self.0 << Self::BITS | prefix.nibble()))
    }

    /// `self` as the outer links around `inner`
    pub fn wrap(
        self,
        inner: Prefixes,
    ) -> Option<Prefixes> {
        if self.len() + inner.len() > Self::MAX {
            return None;
        }
        Some(Prefixes(inner.0 << (Self::BITS as usize * self.len()) | self.0))
    }

    pub fn iter(self) -> impl Iterator<Item = Prefix> {
        std::iter::successors(Some(self), |rest| Some(rest.rest()))
            .take_while(|rest| !rest.is_empty())
            .filter_map(Prefixes::first)
    }
}

/// A canonical class id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Class {
    kind: ClassKind,
    prefixes: Prefixes,
    infered: bool,
    evaled: bool,
}

impl Class {
    pub const VOID: Class = Class::basic(ClassKind::Void);
    pub const ERROR: Class = Class::basic(ClassKind::Error);
    pub const CLASS: Class = Class::basic(ClassKind::Class);
    pub const BOOL: Class = Class::basic(ClassKind::Bool);
    pub const U8: Class = Class::basic(ClassKind::Unsigned(Scalar::new(1)));
    pub const U16: Class = Class::basic(ClassKind::Unsigned(Scalar::new(2)));
    pub const U32: Class = Class::basic(ClassKind::Unsigned(Scalar::new(4)));
    pub const U64: Class = Class::basic(ClassKind::Unsigned(Scalar::new(8)));
    pub const I8: Class = Class::basic(ClassKind::Integer(Scalar::new(1)));
    pub const I16: Class = Class::basic(ClassKind::Integer(Scalar::new(2)));
    pub const I32: Class = Class::basic(ClassKind::Integer(Scalar::new(4)));
    pub const I64: Class = Class::basic(ClassKind::Integer(Scalar::new(8)));
    pub const F32: Class = Class::basic(ClassKind::Float(Scalar::new(4)));
    pub const F64: Class = Class::basic(ClassKind::Float(Scalar::new(8)));
    pub const USIZE: Class = Class::basic(ClassKind::Unsigned(Scalar::new(PTR_SIZE as u8)));
    pub const ISIZE: Class = Class::basic(ClassKind::Integer(Scalar::new(PTR_SIZE as u8)));
    pub const EMPTY_INITLIST: Class = Class::basic(ClassKind::Initlist(0));
    pub const VOID_PTR: Class = Class {
        kind: ClassKind::Void,
        prefixes: Prefixes(PrefixKind::Pointer as u32),
        infered: false,
        evaled: false,
    };

    const fn basic(kind: ClassKind) -> Class {
        Class {
            kind,
            prefixes: Prefixes::NONE,
            infered: false,
            evaled: false,
        }
    }

    /// A class without prefixes; inference and evaluation flags follow the kind
    pub fn new(kind: ClassKind) -> Class {
        Class {
            kind,
            prefixes: Prefixes::NONE,
            infered: matches!(kind, ClassKind::Infered(_)),
            evaled: matches!(kind, ClassKind::Variable(_) | ClassKind::Expression(_)),
        }
    }

    /// A structural class whose flags were computed from its members
    pub(crate) fn structural(
        kind: ClassKind,
        infered: bool,
        evaled: bool,
    ) -> Class {
        Class {
            kind,
            prefixes: Prefixes::NONE,
            infered,
            evaled,
        }
    }

    pub fn infered(slot: u8) -> Class {
        Class::new(ClassKind::Infered(slot))
    }

    pub fn variable(slot: u8) -> Class {
        Class::new(ClassKind::Variable(slot))
    }

    pub fn enum_literal(name: NameId) -> Class {
        Class::new(ClassKind::EnumLiteral(name))
    }

    #[inline]
    pub fn kind(self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub fn tag(self) -> ClassTag {
        self.kind.tag()
    }

    #[inline]
    pub fn prefixes(self) -> Prefixes {
        self.prefixes
    }

    #[inline]
    pub fn is_infered(self) -> bool {
        self.infered
    }

    #[inline]
    pub fn is_evaled(self) -> bool {
        self.evaled
    }

    pub fn is_concrete(self) -> bool {
        !self.infered && !self.evaled
    }

    pub fn is_pointer(self) -> bool {
        self.prefixes.first().is_some_and(|p| p.kind == PrefixKind::Pointer)
    }

    pub fn is_span(self) -> bool {
        self.prefixes.first().is_some_and(|p| p.kind == PrefixKind::Span)
    }

    /// Record index for structural classes
    pub fn index(self) -> Option<ClassIndex> {
        match self.kind {
            ClassKind::Array(index)
            | ClassKind::Tuple(index)
            | ClassKind::ProcPointer(index)
            | ClassKind::Struct(index)
            | ClassKind::Enum(index)
            | ClassKind::Procedure(index) => Some(index),
            _ => None,
        }
    }

    /// Add an outermost pointer or span link; `None` past six links
    pub fn with_prefix(
        self,
        prefix: Prefix,
    ) -> Option<Class> {
        Some(Class {
            prefixes: self.prefixes.push(prefix)?,
            ..self
        })
    }

    /// Drop the outermost link
    pub fn without_prefix(self) -> Class {
        Class {
            prefixes: self.prefixes.rest(),
            ..self
        }
    }

    pub fn with_prefixes(
        self,
        prefixes: Prefixes,
    ) -> Class {
        Class { prefixes, ..self }
    }

    /// The class with its prefix chain removed
    pub fn base(self) -> Class {
        self.with_prefixes(Prefixes::NONE)
    }

    /// `outer` links wrapped around this class' own chain
    pub fn wrapped_in(
        self,
        outer: Prefixes,
    ) -> Option<Class> {
        Some(Class {
            prefixes: outer.wrap(self.prefixes)?,
            ..self
        })
    }

    pub fn pointer_to(self) -> Option<Class> {
        self.with_prefix(Prefix::POINTER)
    }

    pub fn span_of(self) -> Option<Class> {
        self.with_prefix(Prefix::SPAN)
    }

    pub fn to_u64(self) -> u64 {
        self.kind.tag() as u64
            | (self.infered as u64) << 6
            | (self.evaled as u64) << 7
            | (self.prefixes.0 as u64) << 8
            | (self.kind.payload() as u64) << 32
    }

    pub fn from_u64(word: u64) -> Option<Class> {
        let tag = ClassTag::from_u8((word & 0x3f) as u8)?;
        let kind = ClassKind::from_parts(tag, (word >> 32) as u32)?;
        Some(Class {
            kind,
            prefixes: Prefixes::from_bits(((word >> 8) & 0xff_ffff) as u32)?,
            infered: word & 1 << 6 != 0,
            evaled: word & 1 << 7 != 0,
        })
    }
}

/// Hash of a class id, mixed so that nearby ids spread over the table
#[inline]
pub fn class_hash(class: Class) -> u64 {
    let id = class.to_u64();
    id ^ (id << 9)
}

impl fmt::Display for Class {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for prefix in self.prefixes.iter() {
            match (prefix.kind, prefix.constant) {
                (PrefixKind::Pointer, false) => f.write_str("*")?,
                (PrefixKind::Pointer, true) => f.write_str("*const ")?,
                (PrefixKind::Span, false) => f.write_str("[]")?,
                (PrefixKind::Span, true) => f.write_str("[]const ")?,
            }
        }
        match self.kind {
            ClassKind::Void => f.write_str("void"),
            ClassKind::Error => f.write_str("<error>"),
            ClassKind::Infered(0) => f.write_str("$"),
            ClassKind::Infered(slot) => write!(f, "${slot}"),
            ClassKind::Variable(slot) => write!(f, "var{slot}"),
            ClassKind::Expression(node) => write!(f, "expr@{node}"),
            ClassKind::Class => f.write_str("class"),
            ClassKind::Bytes(size) => write!(f, "bytes{size}"),
            ClassKind::Unsigned(s) => write!(f, "u{}", s.bits()),
            ClassKind::Integer(s) => write!(f, "i{}", s.bits()),
            ClassKind::Bool => f.write_str("bool"),
            ClassKind::Float(s) => write!(f, "f{}", s.bits()),
            ClassKind::Initlist(count) => write!(f, "initlist{count}"),
            ClassKind::EnumLiteral(name) => write!(f, ".name{}", name.0),
            ClassKind::Array(index) => write!(f, "array#{}", index.0),
            ClassKind::Tuple(index) => write!(f, "tuple#{}", index.0),
            ClassKind::ProcPointer(index) => write!(f, "proc_pointer#{}", index.0),
            ClassKind::Struct(index) => write!(f, "struct#{}", index.0),
            ClassKind::Enum(index) => write!(f, "enum#{}", index.0),
            ClassKind::Procedure(index) => write!(f, "procedure#{}", index.0),
            ClassKind::Module(id) => write!(f, "module#{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_form_round_trips() {
        let classes = [
            Class::U8,
            Class::I64,
            Class::F32,
            Class::VOID_PTR,
            Class::EMPTY_INITLIST,
            Class::infered(3),
            Class::variable(2),
            Class::enum_literal(NameId(77)),
            Class::U8.span_of().unwrap().pointer_to().unwrap(),
        ];
        for class in classes {
            assert_eq!(Class::from_u64(class.to_u64()), Some(class), "{class}");
        }
    }

    #[test]
    fn test_invalid_words_are_rejected() {
        assert_eq!(Class::from_u64(63), None);
        // Bool carries no payload
        assert_eq!(Class::from_u64(ClassTag::Bool as u64 | 5 << 32), None);
        // prefix nibble 3 is not a link kind
        assert_eq!(Class::from_u64(ClassTag::Void as u64 | 3 << 8), None);
    }

    #[test]
    fn test_prefix_chain_is_outermost_first() {
        let class = Class::U8.span_of().unwrap().pointer_to().unwrap();
        assert!(class.is_pointer());
        assert_eq!(class.prefixes().len(), 2);
        let inner = class.without_prefix();
        assert!(inner.is_span());
        assert_eq!(inner.without_prefix(), Class::U8);
        assert_eq!(class.to_string(), "*[]u8");
    }

    #[test]
    fn test_prefix_chain_is_bounded() {
        let mut class = Class::U8;
        for _ in 0..Prefixes::MAX {
            class = class.pointer_to().unwrap();
        }
        assert_eq!(class.pointer_to(), None);
    }

    #[test]
    fn test_wrap_places_outer_links_first() {
        let outer = Prefixes::NONE.push(Prefix::POINTER).unwrap();
        let wrapped = Class::U8.span_of().unwrap().wrapped_in(outer).unwrap();
        assert_eq!(wrapped, Class::U8.span_of().unwrap().pointer_to().unwrap());
    }

    #[test]
    fn test_scalar_ranges() {
        let byte = Scalar::new(1);
        assert_eq!(byte.max_unsigned(), 255);
        assert_eq!(byte.max_signed(), 127);
        assert_eq!(byte.min_signed(), -128);
        assert_eq!(byte.sign_extend(0xff), -1);
        assert_eq!(Scalar::new(8).max_unsigned(), u64::MAX);
    }

    #[test]
    fn test_flags_follow_kind() {
        assert!(Class::infered(1).is_infered());
        assert!(Class::variable(1).is_evaled());
        assert!(Class::U32.is_concrete());
    }
}
