//! Argument coercion
//!
//! `match_argument` is [`ClassTable::match_class`] plus the implicit
//! numeric conversions. Constants convert whenever the value fits the
//! target. Runtime values only widen.

use tracing::trace;

use super::class::{Class, ClassKind, Scalar};
use super::error::TypeError;
use super::table::ClassTable;
use super::value::{Bindings, ValueData, ValueFlags, ValueInfo};

impl ClassTable {
    /// Convert `value` to `target`, updating its class and constant bits
    pub fn match_argument(
        &mut self,
        value: &mut ValueInfo,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<(), TypeError> {
        let target = self.evaluate(target, bindings)?;
        let source = value.class;
        if source == target {
            return Ok(());
        }

        if source == Class::EMPTY_INITLIST && !target.is_infered() {
            if self.bytesize(target).is_some_and(|size| size <= 8) {
                value.data = ValueData::Inline(0);
            } else {
                value.flags |= ValueFlags::BIG;
                value.data = ValueData::Zeroed;
            }
            value.class = target;
            return Ok(());
        }

        let scalar_target = target.prefixes().is_empty()
            && matches!(
                target.kind(),
                ClassKind::Unsigned(_) | ClassKind::Integer(_) | ClassKind::Float(_) | ClassKind::Enum(_)
            );
        if !scalar_target {
            value.class = self.match_class(source, target, bindings)?;
            return Ok(());
        }
        if !source.prefixes().is_empty() {
            return Err(TypeError::PrefixMismatch);
        }

        let mismatch = TypeError::ClassMismatch {
            expected: target,
            found: source,
        };
        match target.kind() {
            ClassKind::Unsigned(want) => self.to_unsigned(value, want, target).map_err(|e| e.unwrap_or(mismatch))?,
            ClassKind::Integer(want) => self.to_integer(value, want, target).map_err(|e| e.unwrap_or(mismatch))?,
            ClassKind::Float(want) => to_float(value, want, target).map_err(|e| e.unwrap_or(mismatch))?,
            ClassKind::Enum(_) => match source.kind() {
                ClassKind::EnumLiteral(name) => {
                    let bits = self
                        .enum_member_value(target, name)
                        .ok_or(TypeError::NoMatchingEnumMember(name))?;
                    value.data = ValueData::Inline(bits);
                }
                _ => return Err(mismatch),
            },
            _ => return Err(mismatch),
        }
        trace!(%source, %target, "argument converted");
        value.class = target;
        Ok(())
    }

    // Conversions return `Err(None)` for a plain class mismatch.

    fn to_unsigned(
        &self,
        value: &mut ValueInfo,
        want: Scalar,
        target: Class,
    ) -> Result<(), Option<TypeError>> {
        let constant = value.is_constant();
        let bits = value.inline_bits();
        let out_of_range = |value: i128| {
            Some(TypeError::ValueOutOfRange { value, target })
        };
        match (value.class.kind(), constant, bits) {
            (ClassKind::Unsigned(_), true, Some(bits)) => {
                if bits > want.max_unsigned() {
                    return Err(out_of_range(bits as i128));
                }
            }
            (ClassKind::Unsigned(have), _, _) => {
                if have.size > want.size {
                    return Err(Some(narrowing(value.class, target)));
                }
            }
            (ClassKind::Integer(have), true, Some(bits)) => {
                let signed = have.sign_extend(bits);
                if signed < 0 || signed as u64 > want.max_unsigned() {
                    return Err(out_of_range(signed as i128));
                }
                value.data = ValueData::Inline(signed as u64);
            }
            (ClassKind::Bool, _, _) => {}
            (ClassKind::Enum(_), true, Some(bits)) => {
                if bits > want.max_unsigned() {
                    return Err(out_of_range(bits as i128));
                }
            }
            (ClassKind::Enum(_), _, _) => {
                let max_value = self.enum_info(value.class).map_or(0, |info| info.max_value);
                if max_value > want.max_unsigned() {
                    return Err(Some(narrowing(value.class, target)));
                }
            }
            _ => return Err(None),
        }
        Ok(())
    }

    fn to_integer(
        &self,
        value: &mut ValueInfo,
        want: Scalar,
        target: Class,
    ) -> Result<(), Option<TypeError>> {
        let constant = value.is_constant();
        let bits = value.inline_bits();
        let max_signed = want.max_signed() as u64;
        let out_of_range = |value: i128| {
            Some(TypeError::ValueOutOfRange { value, target })
        };
        match (value.class.kind(), constant, bits) {
            (ClassKind::Integer(have), true, Some(bits)) => {
                let signed = have.sign_extend(bits);
                if signed < want.min_signed() || signed > want.max_signed() {
                    return Err(out_of_range(signed as i128));
                }
                value.data = ValueData::Inline(signed as u64);
            }
            (ClassKind::Integer(have), _, _) | (ClassKind::Unsigned(have), false, _) => {
                if have.size > want.size {
                    return Err(Some(narrowing(value.class, target)));
                }
            }
            (ClassKind::Unsigned(_), true, Some(bits)) | (ClassKind::Enum(_), true, Some(bits)) => {
                if bits > max_signed {
                    return Err(out_of_range(bits as i128));
                }
            }
            (ClassKind::Bool, _, _) => {}
            (ClassKind::Enum(_), _, _) => {
                let max_value = self.enum_info(value.class).map_or(0, |info| info.max_value);
                if max_value > max_signed {
                    return Err(Some(narrowing(value.class, target)));
                }
            }
            _ => return Err(None),
        }
        Ok(())
    }
}

fn narrowing(
    source_class: Class,
    target: Class,
) -> TypeError {
    TypeError::NarrowingConversion { source_class, target }
}

fn float_bits(
    value: f64,
    want: Scalar,
) -> u64 {
    if want.size == 4 {
        (value as f32).to_bits() as u64
    } else {
        value.to_bits()
    }
}

fn to_float(
    value: &mut ValueInfo,
    want: Scalar,
    target: Class,
) -> Result<(), Option<TypeError>> {
    let constant = value.is_constant();
    let bits = value.inline_bits();
    let converted = match (value.class.kind(), constant, bits) {
        (ClassKind::Float(have), true, Some(bits)) => {
            let float = if have.size == 4 {
                f32::from_bits(bits as u32) as f64
            } else {
                f64::from_bits(bits)
            };
            float_bits(float, want)
        }
        (ClassKind::Float(have), _, _) => {
            if have.size > want.size {
                return Err(Some(narrowing(value.class, target)));
            }
            return Ok(());
        }
        (ClassKind::Unsigned(_), true, Some(bits)) => float_bits(bits as f64, want),
        (ClassKind::Integer(have), true, Some(bits)) => float_bits(have.sign_extend(bits) as f64, want),
        _ => return Err(None),
    };
    value.data = ValueData::Inline(converted);
    Ok(())
}
