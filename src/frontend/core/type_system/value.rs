//! Values seen by the matcher and inference slots

use smallvec::SmallVec;
use tracing::trace;

use super::class::{Class, ClassKind};
use super::error::TypeError;

/// Number of inference slots per match; slot 0 is anonymous
pub const MAX_INFERED: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueFlags(pub u8);

impl ValueFlags {
    pub const NONE: ValueFlags = ValueFlags(0);
    /// Known at compile time
    pub const CONSTANT: ValueFlags = ValueFlags(1);
    /// Does not fit the inline payload
    pub const BIG: ValueFlags = ValueFlags(2);
    /// Depends on runtime state
    pub const DEPENDENT: ValueFlags = ValueFlags(4);

    #[inline]
    pub fn contains(
        self,
        other: ValueFlags,
    ) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ValueFlags {
    type Output = ValueFlags;

    fn bitor(
        self,
        rhs: ValueFlags,
    ) -> ValueFlags {
        ValueFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ValueFlags {
    fn bitor_assign(
        &mut self,
        rhs: ValueFlags,
    ) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueData {
    /// Constant bits, zero-extended or sign-extended to 64 bits
    Inline(u64),
    /// Out-of-line constant data and the node producing the value
    Indirect { data: u32, node: u32 },
    /// Every byte is zero
    Zeroed,
}

impl Default for ValueData {
    fn default() -> Self {
        ValueData::Inline(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueInfo {
    pub class: Class,
    pub flags: ValueFlags,
    pub data: ValueData,
}

impl ValueInfo {
    /// Value of a runtime expression
    pub fn runtime(class: Class) -> Self {
        Self {
            class,
            flags: ValueFlags::NONE,
            data: ValueData::default(),
        }
    }

    /// Compile-time constant with inline bits
    pub fn constant(
        class: Class,
        bits: u64,
    ) -> Self {
        Self {
            class,
            flags: ValueFlags::CONSTANT,
            data: ValueData::Inline(bits),
        }
    }

    /// A class used as a value
    pub fn class_value(class: Class) -> Self {
        Self::constant(Class::CLASS, class.to_u64())
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.flags.contains(ValueFlags::CONSTANT)
    }

    pub fn inline_bits(&self) -> Option<u64> {
        match self.data {
            ValueData::Inline(bits) => Some(bits),
            ValueData::Zeroed => Some(0),
            ValueData::Indirect { .. } => None,
        }
    }

    /// The class held by a class-of-classes constant
    pub fn as_class(&self) -> Option<Class> {
        if self.class != Class::CLASS {
            return None;
        }
        Class::from_u64(self.inline_bits()?)
    }
}

/// Inference slots plus the values of already evaluated class expressions
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    slots: [Option<ValueInfo>; MAX_INFERED],
    expressions: SmallVec<[(u32, ValueInfo); 4]>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_slot(slot: u8) -> Result<usize, TypeError> {
        let index = slot as usize;
        if index >= MAX_INFERED {
            return Err(TypeError::InvalidSlot(slot));
        }
        Ok(index)
    }

    /// Bind a slot. Slots are write-once: binding the same value again is
    /// accepted, a different one is a conflict. Slot 0 binds nothing.
    pub fn bind(
        &mut self,
        slot: u8,
        value: ValueInfo,
    ) -> Result<(), TypeError> {
        let index = Self::check_slot(slot)?;
        if index == 0 {
            return Ok(());
        }
        match self.slots[index] {
            Some(bound) if bound == value => Ok(()),
            Some(_) => Err(TypeError::ConflictingInference(slot)),
            None => {
                trace!(slot, class = %value.class, "inference slot bound");
                self.slots[index] = Some(value);
                Ok(())
            }
        }
    }

    pub fn bind_class(
        &mut self,
        slot: u8,
        class: Class,
    ) -> Result<(), TypeError> {
        self.bind(slot, ValueInfo::class_value(class))
    }

    pub fn get(
        &self,
        slot: u8,
    ) -> Option<&ValueInfo> {
        self.slots.get(slot as usize)?.as_ref()
    }

    /// The value bound to `slot`, or an error naming the slot
    pub fn value(
        &self,
        slot: u8,
    ) -> Result<ValueInfo, TypeError> {
        Self::check_slot(slot)?;
        self.get(slot).copied().ok_or(TypeError::UnboundSlot(slot))
    }

    /// The class bound to `slot`
    pub fn class(
        &self,
        slot: u8,
    ) -> Result<Class, TypeError> {
        self.value(slot)?.as_class().ok_or(TypeError::NotAClass(slot))
    }

    pub fn is_bound(
        &self,
        slot: u8,
    ) -> bool {
        self.get(slot).is_some()
    }

    /// Record the value of the class expression at AST node `node`
    pub fn set_expression(
        &mut self,
        node: u32,
        value: ValueInfo,
    ) {
        match self.expressions.iter_mut().find(|(n, _)| *n == node) {
            Some(entry) => entry.1 = value,
            None => self.expressions.push((node, value)),
        }
    }

    pub fn expression(
        &self,
        node: u32,
    ) -> Result<ValueInfo, TypeError> {
        self.expressions
            .iter()
            .find(|(n, _)| *n == node)
            .map(|&(_, value)| value)
            .ok_or(TypeError::UnresolvedExpression(node))
    }

    /// Classes bound so far, by slot
    pub fn bound_classes(&self) -> impl Iterator<Item = (u8, Class)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| Some((slot as u8, value.as_ref()?.as_class()?)))
    }
}

/// Array size carried by a value: unsigned, bool, enum or non-negative integer
pub(crate) fn size_from_value(value: &ValueInfo) -> Result<u64, TypeError> {
    let bits = value.inline_bits().ok_or(TypeError::InvalidArraySize)?;
    match value.class.kind() {
        ClassKind::Integer(scalar) if scalar.sign_extend(bits) < 0 => Err(TypeError::NegativeArraySize),
        ClassKind::Integer(_) | ClassKind::Unsigned(_) | ClassKind::Bool | ClassKind::Enum(_) => Ok(bits),
        _ => Err(TypeError::InvalidArraySize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_is_write_once() {
        let mut bindings = Bindings::new();
        bindings.bind_class(1, Class::U32).unwrap();
        bindings.bind_class(1, Class::U32).unwrap();
        assert_eq!(bindings.bind_class(1, Class::U8), Err(TypeError::ConflictingInference(1)));
        assert_eq!(bindings.class(1), Ok(Class::U32));
    }

    #[test]
    fn test_anonymous_slot_binds_nothing() {
        let mut bindings = Bindings::new();
        bindings.bind_class(0, Class::U32).unwrap();
        bindings.bind_class(0, Class::U8).unwrap();
        assert!(!bindings.is_bound(0));
    }

    #[test]
    fn test_slot_errors() {
        let mut bindings = Bindings::new();
        assert_eq!(bindings.bind_class(16, Class::U8), Err(TypeError::InvalidSlot(16)));
        assert_eq!(bindings.class(2), Err(TypeError::UnboundSlot(2)));
        bindings.bind(2, ValueInfo::constant(Class::USIZE, 4)).unwrap();
        assert_eq!(bindings.class(2), Err(TypeError::NotAClass(2)));
    }

    #[test]
    fn test_size_from_value() {
        assert_eq!(size_from_value(&ValueInfo::constant(Class::U8, 3)), Ok(3));
        assert_eq!(size_from_value(&ValueInfo::constant(Class::I8, 0xff)), Err(TypeError::NegativeArraySize));
        assert_eq!(size_from_value(&ValueInfo::constant(Class::F32, 0)), Err(TypeError::InvalidArraySize));
    }
}
