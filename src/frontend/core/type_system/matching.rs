//! Structural class matching
//!
//! `match_class` checks that a value of class `source` can be passed where
//! `target` is expected. Infered parts of the target are bound in the
//! [`Bindings`]; the result is the target with every infered part replaced.
//! Infered aggregates are matched one member at a time, so a later member
//! may read a slot that an earlier member bound. A failed match leaves the
//! bindings as they were.

use smallvec::SmallVec;
use tracing::trace;

use super::class::{Class, ClassKind, PrefixKind};
use super::error::TypeError;
use super::evaluate::resolve_size;
use super::table::{ArraySize, ClassTable, Field};
use super::value::{Bindings, ValueInfo};
use crate::frontend::core::names::NameId;

/// Where the prefix walk stopped
enum Walk {
    /// Every target link matched; the rest of the source remains
    Base(Class),
    /// A void pointer on either side settled the match
    Accepted,
}

/// Infered aggregates keep their deferred members until each one is reached
fn matched_by_member(target: Class) -> bool {
    target.is_infered()
        && matches!(
            target.base().kind(),
            ClassKind::Array(_) | ClassKind::Tuple(_) | ClassKind::ProcPointer(_) | ClassKind::Struct(_)
        )
}

impl ClassTable {
    pub fn match_class(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        if source == target {
            return Ok(target);
        }
        let saved = bindings.clone();
        let result = self.match_inner(source, target, bindings);
        match &result {
            Ok(resolved) => trace!(%source, %target, %resolved, "classes matched"),
            Err(err) => {
                trace!(%source, %target, %err, "class match failed");
                *bindings = saved;
            }
        }
        result
    }

    pub(super) fn match_inner(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        let target = if matched_by_member(target) {
            target
        } else {
            self.evaluate(target, bindings)?
        };
        if source == target {
            return Ok(target);
        }
        let rest = match walk_prefixes(source, target)? {
            Walk::Accepted => return Ok(target),
            Walk::Base(rest) => rest,
        };
        let base = target.base();
        let resolved = match base.kind() {
            ClassKind::Infered(slot) => {
                if matches!(rest.kind(), ClassKind::Initlist(_) | ClassKind::EnumLiteral(_)) {
                    return Err(TypeError::InferFromLiteral);
                }
                bindings.bind_class(slot, rest)?;
                rest
            }
            ClassKind::Array(_) if base.is_infered() => self.match_array(rest, base, bindings)?,
            ClassKind::Tuple(_) if base.is_infered() => self.match_tuple(rest, base, bindings)?,
            ClassKind::ProcPointer(_) if base.is_infered() => self.match_proc_pointer(rest, base, bindings)?,
            ClassKind::Struct(_) if base.is_infered() => self.match_struct(rest, base, bindings)?,
            _ => {
                if !rest.prefixes().is_empty() {
                    return Err(TypeError::PrefixMismatch);
                }
                if rest != base {
                    return Err(TypeError::ClassMismatch {
                        expected: target,
                        found: source,
                    });
                }
                base
            }
        };
        resolved.wrapped_in(target.prefixes()).ok_or(TypeError::TooManyPrefixes)
    }

    /// Match `have` against `want` in order
    fn match_members(
        &mut self,
        have: &[Class],
        want: &[Class],
        bindings: &mut Bindings,
    ) -> Result<SmallVec<[Class; 8]>, TypeError> {
        if have.len() != want.len() {
            return Err(TypeError::ArityMismatch {
                expected: want.len(),
                found: have.len(),
            });
        }
        let mut resolved = SmallVec::with_capacity(want.len());
        for (&member, &expected) in have.iter().zip(want) {
            resolved.push(self.match_inner(member, expected, bindings)?);
        }
        Ok(resolved)
    }

    fn match_array(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        let mismatch = TypeError::ClassMismatch {
            expected: target,
            found: source,
        };
        if !source.prefixes().is_empty() {
            return Err(TypeError::PrefixMismatch);
        }
        let (Some(&have), Some(&want)) = (self.array_info(source), self.array_info(target)) else {
            return Err(mismatch);
        };
        let ArraySize::Fixed(length) = have.size else {
            return Err(TypeError::NotConcrete(source));
        };
        match resolve_size(want.size, bindings)? {
            ArraySize::Infered(slot) => bindings.bind(slot, ValueInfo::constant(Class::USIZE, length as u64))?,
            ArraySize::Fixed(expected) if expected != length => {
                return Err(TypeError::ArraySizeMismatch {
                    expected,
                    found: length,
                })
            }
            _ => {}
        }
        let element = self.match_inner(have.element, want.element, bindings)?;
        if element == want.element && want.size == ArraySize::Fixed(length) {
            return Ok(target);
        }
        self.intern_array(element, ArraySize::Fixed(length))
    }

    fn match_tuple(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        if !source.prefixes().is_empty() {
            return Err(TypeError::PrefixMismatch);
        }
        let (Some(have), Some(want)) = (self.tuple_members(source), self.tuple_members(target)) else {
            return Err(TypeError::ClassMismatch {
                expected: target,
                found: source,
            });
        };
        let have: SmallVec<[Class; 8]> = have.into();
        let want: SmallVec<[Class; 8]> = want.into();
        let resolved = self.match_members(&have, &want, bindings)?;
        if resolved == want {
            return Ok(target);
        }
        self.intern_tuple(&resolved)
    }

    fn match_proc_pointer(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        if !source.prefixes().is_empty() {
            return Err(TypeError::PrefixMismatch);
        }
        let (Some((have, have_ret)), Some((want, want_ret))) =
            (self.proc_pointer_signature(source), self.proc_pointer_signature(target))
        else {
            return Err(TypeError::ClassMismatch {
                expected: target,
                found: source,
            });
        };
        let have: SmallVec<[Class; 8]> = have.into();
        let want: SmallVec<[Class; 8]> = want.into();
        let params = self.match_members(&have, &want, bindings)?;
        let ret = self.match_inner(have_ret, want_ret, bindings)?;
        if params == want && ret == want_ret {
            return Ok(target);
        }
        self.intern_proc_pointer(&params, ret)
    }

    /// Same declaration, fields matched in storage order
    fn match_struct(
        &mut self,
        source: Class,
        target: Class,
        bindings: &mut Bindings,
    ) -> Result<Class, TypeError> {
        let mismatch = TypeError::ClassMismatch {
            expected: target,
            found: source,
        };
        if !source.prefixes().is_empty() {
            return Err(TypeError::PrefixMismatch);
        }
        let (Some(&have), Some(&want)) = (self.struct_info(source), self.struct_info(target)) else {
            return Err(mismatch);
        };
        if have.name != want.name || have.stored != want.stored {
            return Err(mismatch);
        }
        let have_fields: SmallVec<[(usize, NameId, Class); 8]> = self.struct_fields(&have).collect();
        let want_fields: SmallVec<[(usize, NameId, Class); 8]> = self.struct_fields(&want).collect();
        let same_names = have_fields.len() == want_fields.len()
            && have_fields.iter().zip(&want_fields).all(|(h, w)| h.1 == w.1);
        if !same_names {
            return Err(mismatch);
        }

        let mut fields = SmallVec::<[Field; 8]>::with_capacity(want_fields.len());
        let mut changed = false;
        for (&(index, name, member), &(_, _, expected)) in have_fields.iter().zip(&want_fields) {
            let class = self.match_inner(member, expected, bindings)?;
            changed |= class != expected;
            fields.push(Field {
                name,
                class,
                is_static: index >= want.stored as usize,
            });
        }
        if !changed {
            return Ok(target);
        }
        self.intern_struct(want.name, &fields)
    }
}

/// Strip the target's links off the source one at a time
fn walk_prefixes(
    source: Class,
    target: Class,
) -> Result<Walk, TypeError> {
    let links = target.prefixes();
    let mut rest = source;
    for (depth, link) in links.iter().enumerate() {
        let have = rest.prefixes().first().ok_or(TypeError::PrefixMismatch)?;
        if have.kind != link.kind {
            return Err(TypeError::PrefixMismatch);
        }
        if have.constant && !link.constant {
            return Err(TypeError::ConstToNonConst);
        }
        rest = rest.without_prefix();
        if link.kind != PrefixKind::Pointer {
            continue;
        }
        if depth + 1 == links.len() && target.kind() == ClassKind::Void {
            return Ok(Walk::Accepted);
        }
        if rest.prefixes().is_empty() && rest.kind() == ClassKind::Void {
            // nothing to infer from behind an untyped pointer
            if target.is_infered() {
                return Err(TypeError::InferFromVoidPointer);
            }
            return Ok(Walk::Accepted);
        }
    }
    Ok(Walk::Base(rest))
}
