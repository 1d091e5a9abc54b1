//! Evaluation of deferred classes
//!
//! A class flagged `evaled` still contains a [`ClassKind::Variable`] or
//! [`ClassKind::Expression`] somewhere. Evaluation substitutes those from the
//! bindings and re-interns every aggregate on the way up, so the result is
//! the canonical class for the substituted shape.

use smallvec::SmallVec;
use tracing::trace;

use super::class::{Class, ClassKind};
use super::error::TypeError;
use super::table::{ArraySize, ClassTable, Field, ProcedureSignature, ARRAY_SIZE_MAX};
use super::value::{size_from_value, Bindings};
use crate::frontend::core::names::NameId;

impl ClassTable {
    /// Resolve every deferred part of `class` from `bindings`
    pub fn evaluate(
        &mut self,
        class: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        if !class.is_evaled() {
            return Ok(class);
        }
        let outer = class.prefixes();
        let base = class.base();
        let evaluated = match base.kind() {
            ClassKind::Variable(slot) => bindings.class(slot)?,
            ClassKind::Expression(node) => {
                let value = bindings.expression(node)?;
                value.as_class().ok_or(TypeError::ClassMismatch {
                    expected: Class::CLASS,
                    found: value.class,
                })?
            }
            ClassKind::Array(_) => self.evaluate_array(base, bindings)?,
            ClassKind::Tuple(_) => self.evaluate_tuple(base, bindings)?,
            ClassKind::ProcPointer(_) => self.evaluate_proc_pointer(base, bindings)?,
            ClassKind::Struct(_) => self.evaluate_struct(base, bindings)?,
            ClassKind::Procedure(_) => self.evaluate_procedure(base, bindings)?,
            _ => base,
        };
        trace!(from = %class, to = %evaluated, "class evaluated");
        // substituted classes keep their own links inside the ones written
        // around the deferred part
        evaluated.wrapped_in(outer).ok_or(TypeError::TooManyPrefixes)
    }

    fn evaluate_list(
        &mut self,
        classes: &[Class],
        bindings: &Bindings,
    ) -> Result<SmallVec<[Class; 8]>, TypeError> {
        classes.iter().map(|&class| self.evaluate(class, bindings)).collect()
    }

    fn evaluate_array(
        &mut self,
        array: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        let Some(&info) = self.array_info(array) else {
            return Ok(array);
        };
        let size = resolve_size(info.size, bindings)?;
        let element = self.evaluate(info.element, bindings)?;
        self.intern_array(element, size)
    }

    fn evaluate_tuple(
        &mut self,
        tuple: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        let Some(members) = self.tuple_members(tuple) else {
            return Ok(tuple);
        };
        let members: SmallVec<[Class; 8]> = members.into();
        let members = self.evaluate_list(&members, bindings)?;
        self.intern_tuple(&members)
    }

    fn evaluate_proc_pointer(
        &mut self,
        pointer: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        let Some((params, ret)) = self.proc_pointer_signature(pointer) else {
            return Ok(pointer);
        };
        let params: SmallVec<[Class; 8]> = params.into();
        let params = self.evaluate_list(&params, bindings)?;
        let ret = self.evaluate(ret, bindings)?;
        self.intern_proc_pointer(&params, ret)
    }

    fn evaluate_struct(
        &mut self,
        structure: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        let Some(&info) = self.struct_info(structure) else {
            return Ok(structure);
        };
        let fields: SmallVec<[Field; 8]> = self
            .struct_fields(&info)
            .map(|(index, name, class)| Field {
                name,
                class,
                is_static: index >= info.stored as usize,
            })
            .collect();
        let mut evaluated = SmallVec::<[Field; 8]>::with_capacity(fields.len());
        for field in fields {
            evaluated.push(Field {
                class: self.evaluate(field.class, bindings)?,
                ..field
            });
        }
        self.intern_struct(info.name, &evaluated)
    }

    fn evaluate_procedure(
        &mut self,
        procedure: Class,
        bindings: &Bindings,
    ) -> Result<Class, TypeError> {
        let Some(&info) = self.procedure_info(procedure) else {
            return Ok(procedure);
        };
        let params: SmallVec<[(NameId, Class); 8]> = self.procedure_param_list(&info).collect();
        let mut evaluated = SmallVec::<[(NameId, Class); 8]>::with_capacity(params.len());
        for (name, class) in params {
            evaluated.push((name, self.evaluate(class, bindings)?));
        }
        let ret = self.evaluate(info.ret, bindings)?;
        self.intern_procedure(ProcedureSignature {
            name: info.name,
            params: &evaluated,
            ret,
            infered: info.infered,
            defaults: info.defaults,
        })
    }
}

/// Fixed array size for a size read from a slot or an expression; other
/// sizes are returned as they are
pub(super) fn resolve_size(
    size: ArraySize,
    bindings: &Bindings,
) -> Result<ArraySize, TypeError> {
    let value = match size {
        ArraySize::Variable(slot) => bindings.value(slot)?,
        ArraySize::Expression(node) => bindings.expression(node)?,
        size => return Ok(size),
    };
    let length = size_from_value(&value)?;
    if length > ARRAY_SIZE_MAX as u64 {
        return Err(TypeError::ArraySizeTooLarge);
    }
    Ok(ArraySize::Fixed(length as u32))
}
