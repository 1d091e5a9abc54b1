//! Class table
//!
//! Structural classes are hash-consed: every distinct shape gets exactly one
//! record, so comparing two [`Class`] ids compares the shapes. Records live
//! in [`Region`]s and member lists are [`Extent`]s into side regions.
//! Layout is computed when a record is created, unless a member is still
//! infered or unevaluated.

use hashbrown::HashMap;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use super::class::{class_hash, Class, ClassIndex, ClassKind, PTR_SIZE, SPAN_SIZE};
use super::error::TypeError;
use crate::frontend::core::arena::{Extent, Offset, Region};
use crate::frontend::core::names::NameId;
use crate::frontend::core::probe::{Probe, ProbeTable};

/// Largest fixed array length
pub const ARRAY_SIZE_MAX: u32 = u32::MAX - 1;
/// Largest member count of a tuple, struct or parameter list
pub const TUPLE_SIZE_MAX: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Layout {
    pub bytesize: u32,
    pub alignment: u32,
}

impl Layout {
    pub const POINTER: Layout = Layout {
        bytesize: PTR_SIZE,
        alignment: PTR_SIZE,
    };
    pub const SPAN: Layout = Layout {
        bytesize: SPAN_SIZE,
        alignment: PTR_SIZE,
    };
}

/// Element count of an array class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySize {
    Fixed(u32),
    /// Taken from the matched source and bound to a slot
    Infered(u8),
    /// The value bound to a slot
    Variable(u8),
    /// The value of the expression at an AST node
    Expression(u32),
}

impl ArraySize {
    fn key(self) -> u64 {
        match self {
            ArraySize::Fixed(n) => n as u64,
            ArraySize::Infered(slot) => 1 << 32 | slot as u64,
            ArraySize::Variable(slot) => 2 << 32 | slot as u64,
            ArraySize::Expression(node) => 3 << 32 | node as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo {
    pub layout: Option<Layout>,
    pub element: Class,
    pub size: ArraySize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleInfo {
    pub layout: Option<Layout>,
    pub members: Extent,
    pub offsets: Extent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcPointerInfo {
    pub params: Extent,
    pub ret: Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructInfo {
    pub name: NameId,
    pub layout: Option<Layout>,
    /// Stored fields first, then static ones
    pub fields: Extent,
    pub field_names: Extent,
    /// Offsets of the stored fields
    pub offsets: Extent,
    pub stored: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: NameId,
    pub base: Class,
    pub members: Extent,
    pub values: Extent,
    pub max_value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureInfo {
    pub name: NameId,
    pub params: Extent,
    pub param_names: Extent,
    pub ret: Class,
    pub infered: u8,
    pub defaults: u8,
}

/// A class table record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassInfo {
    Array(ArrayInfo),
    Tuple(TupleInfo),
    ProcPointer(ProcPointerInfo),
    Struct(StructInfo),
    Enum(EnumInfo),
    Procedure(ProcedureInfo),
}

/// Field of a struct declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: NameId,
    pub class: Class,
    pub is_static: bool,
}

impl Field {
    pub fn stored(
        name: NameId,
        class: Class,
    ) -> Self {
        Self {
            name,
            class,
            is_static: false,
        }
    }

    pub fn static_field(
        name: NameId,
        class: Class,
    ) -> Self {
        Self {
            name,
            class,
            is_static: true,
        }
    }
}

/// Procedure declaration handed to [`ClassTable::intern_procedure`]
#[derive(Debug, Clone, Copy)]
pub struct ProcedureSignature<'a> {
    pub name: NameId,
    pub params: &'a [(NameId, Class)],
    pub ret: Class,
    pub infered: u8,
    pub defaults: u8,
}

/// Instantiation of a generic procedure, numbered per procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassTableStats {
    pub arrays: usize,
    pub tuples: usize,
    pub proc_pointers: usize,
    pub structs: usize,
    pub enums: usize,
    pub procedures: usize,
    pub instances: usize,
    pub records: usize,
    pub collisions: u64,
}

type InstanceKey = SmallVec<[Class; 4]>;

#[derive(Debug)]
pub struct ClassTable {
    records: Region<ClassInfo>,
    members: Region<Class>,
    offsets: Region<u32>,
    names: Region<NameId>,
    values: Region<u64>,
    arrays: ProbeTable<Class>,
    tuples: ProbeTable<Class>,
    proc_pointers: ProbeTable<Class>,
    structs: ProbeTable<Class>,
    enums: ProbeTable<Class>,
    procedures: ProbeTable<Class>,
    instances: HashMap<ClassIndex, IndexMap<InstanceKey, InstanceId>>,
}

fn align_up(
    size: u32,
    alignment: u32,
) -> Option<u32> {
    let mask = alignment.max(1) - 1;
    Some(size.checked_add(mask)? & !mask)
}

fn list_hash(
    seed: u64,
    classes: impl IntoIterator<Item = Class>,
) -> u64 {
    classes
        .into_iter()
        .fold(seed, |hash, class| hash.rotate_left(5) ^ class_hash(class))
}

impl ClassTable {
    pub fn new(
        set_capacity: usize,
        record_ceiling: usize,
    ) -> Self {
        Self {
            records: Region::new("class records", set_capacity, record_ceiling),
            members: Region::new("class members", set_capacity * 4, record_ceiling),
            offsets: Region::new("member offsets", set_capacity * 4, record_ceiling),
            names: Region::new("member names", set_capacity, record_ceiling),
            values: Region::new("enum values", set_capacity, record_ceiling),
            arrays: ProbeTable::with_capacity(set_capacity),
            tuples: ProbeTable::with_capacity(set_capacity),
            proc_pointers: ProbeTable::with_capacity(set_capacity),
            structs: ProbeTable::with_capacity(set_capacity),
            enums: ProbeTable::with_capacity(set_capacity),
            procedures: ProbeTable::with_capacity(set_capacity),
            instances: HashMap::new(),
        }
    }

    pub fn info(
        &self,
        class: Class,
    ) -> Option<&ClassInfo> {
        self.records.get(Offset(class.index()?.0))
    }

    fn push_record(
        &mut self,
        info: ClassInfo,
    ) -> Result<ClassIndex, TypeError> {
        let offset = self.records.try_push(info)?;
        debug!(index = offset.0, kind = ?std::mem::discriminant(&info), "class record created");
        Ok(ClassIndex(offset.0))
    }

    /// Store a record whose lists live in the side regions. When any step
    /// fails, the lists `build` already wrote are dropped again.
    fn commit_record(
        &mut self,
        build: impl FnOnce(&mut Self) -> Result<ClassInfo, TypeError>,
    ) -> Result<ClassIndex, TypeError> {
        let (members, offsets, names, values) = (
            self.members.mark(),
            self.offsets.mark(),
            self.names.mark(),
            self.values.mark(),
        );
        let result = build(self).and_then(|info| self.push_record(info));
        if result.is_err() {
            self.members.truncate(members);
            self.offsets.truncate(offsets);
            self.names.truncate(names);
            self.values.truncate(values);
        }
        result
    }

    // ---- layout -------------------------------------------------------

    /// Size and alignment, or `None` while the class is not concrete or has
    /// no storage
    pub fn layout(
        &self,
        class: Class,
    ) -> Option<Layout> {
        if class.is_pointer() {
            return Some(Layout::POINTER);
        }
        if class.is_span() {
            return Some(Layout::SPAN);
        }
        match class.kind() {
            ClassKind::Void => Some(Layout {
                bytesize: 0,
                alignment: 1,
            }),
            ClassKind::Class => Some(Layout::POINTER),
            ClassKind::Bool => Some(Layout {
                bytesize: 1,
                alignment: 1,
            }),
            ClassKind::Bytes(size) => Some(Layout {
                bytesize: size,
                alignment: 1,
            }),
            ClassKind::Unsigned(s) | ClassKind::Integer(s) | ClassKind::Float(s) => Some(Layout {
                bytesize: s.size as u32,
                alignment: s.alignment as u32,
            }),
            ClassKind::ProcPointer(_) => Some(Layout::POINTER),
            _ => match self.info(class)? {
                ClassInfo::Array(info) => info.layout,
                ClassInfo::Tuple(info) => info.layout,
                ClassInfo::Struct(info) => info.layout,
                ClassInfo::Enum(info) => self.layout(info.base),
                ClassInfo::ProcPointer(_) | ClassInfo::Procedure(_) => None,
            },
        }
    }

    pub fn bytesize(
        &self,
        class: Class,
    ) -> Option<u32> {
        self.layout(class).map(|layout| layout.bytesize)
    }

    pub fn alignment(
        &self,
        class: Class,
    ) -> Option<u32> {
        self.layout(class).map(|layout| layout.alignment)
    }

    /// Sequential layout of `members`: each member aligned to its own
    /// alignment, the whole padded to the largest one
    fn sequential_layout(
        &self,
        members: &[Class],
        offsets: &mut SmallVec<[u32; 8]>,
    ) -> Result<Option<Layout>, TypeError> {
        let mut bytesize = 0u32;
        let mut alignment = 1u32;
        for &member in members {
            let Some(layout) = self.layout(member) else {
                offsets.clear();
                return Ok(None);
            };
            bytesize = align_up(bytesize, layout.alignment).ok_or(TypeError::ClassTooLarge)?;
            offsets.push(bytesize);
            bytesize = bytesize.checked_add(layout.bytesize).ok_or(TypeError::ClassTooLarge)?;
            alignment = alignment.max(layout.alignment);
        }
        let bytesize = align_up(bytesize, alignment).ok_or(TypeError::ClassTooLarge)?;
        Ok(Some(Layout { bytesize, alignment }))
    }

    // ---- arrays -------------------------------------------------------

    pub fn intern_array(
        &mut self,
        element: Class,
        size: ArraySize,
    ) -> Result<Class, TypeError> {
        if matches!(size, ArraySize::Fixed(n) if n > ARRAY_SIZE_MAX) {
            return Err(TypeError::ArraySizeTooLarge);
        }
        let hash = class_hash(element) ^ size.key().wrapping_mul(9);
        let records = &self.records;
        let probe = self.arrays.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::Array(info)) if info.element == element && info.size == size
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let infered = element.is_infered() || matches!(size, ArraySize::Infered(_));
        let evaled = element.is_evaled() || matches!(size, ArraySize::Variable(_) | ArraySize::Expression(_));
        let layout = match (infered || evaled, size) {
            (false, ArraySize::Fixed(n)) => match self.layout(element) {
                Some(elem) => Some(Layout {
                    bytesize: elem.bytesize.checked_mul(n).ok_or(TypeError::ClassTooLarge)?,
                    alignment: elem.alignment,
                }),
                None => None,
            },
            _ => None,
        };
        let index = self.push_record(ClassInfo::Array(ArrayInfo { layout, element, size }))?;
        let class = Class::structural(ClassKind::Array(index), infered, evaled);
        self.arrays.insert(slot, hash, class);
        Ok(class)
    }

    pub fn array_info(
        &self,
        class: Class,
    ) -> Option<&ArrayInfo> {
        match self.info(class)? {
            ClassInfo::Array(info) => Some(info),
            _ => None,
        }
    }

    // ---- tuples -------------------------------------------------------

    pub fn intern_tuple(
        &mut self,
        members: &[Class],
    ) -> Result<Class, TypeError> {
        if members.len() > TUPLE_SIZE_MAX {
            return Err(TypeError::TooManyMembers(members.len()));
        }
        let hash = list_hash(13421 ^ (members.len() as u64) << 3, members.iter().copied());
        let (records, pool) = (&self.records, &self.members);
        let probe = self.tuples.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::Tuple(info)) if pool.slice(info.members) == members
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let infered = members.iter().any(|m| m.is_infered());
        let evaled = members.iter().any(|m| m.is_evaled());
        let mut offsets = SmallVec::new();
        let layout = if infered || evaled {
            None
        } else {
            self.sequential_layout(members, &mut offsets)?
        };
        let index = self.commit_record(|table| {
            Ok(ClassInfo::Tuple(TupleInfo {
                layout,
                members: table.members.try_extend_from_slice(members)?,
                offsets: table.offsets.try_extend_from_slice(&offsets)?,
            }))
        })?;
        let class = Class::structural(ClassKind::Tuple(index), infered, evaled);
        self.tuples.insert(slot, hash, class);
        Ok(class)
    }

    pub fn tuple_members(
        &self,
        class: Class,
    ) -> Option<&[Class]> {
        match self.info(class)? {
            ClassInfo::Tuple(info) => Some(self.members.slice(info.members)),
            _ => None,
        }
    }

    /// Byte offsets of the members; empty until the layout is known
    pub fn tuple_offsets(
        &self,
        class: Class,
    ) -> Option<&[u32]> {
        match self.info(class)? {
            ClassInfo::Tuple(info) => Some(self.offsets.slice(info.offsets)),
            _ => None,
        }
    }

    // ---- procedure pointers --------------------------------------------

    pub fn intern_proc_pointer(
        &mut self,
        params: &[Class],
        ret: Class,
    ) -> Result<Class, TypeError> {
        if params.len() > TUPLE_SIZE_MAX {
            return Err(TypeError::TooManyMembers(params.len()));
        }
        let hash = list_hash(class_hash(ret), params.iter().copied());
        let (records, pool) = (&self.records, &self.members);
        let probe = self.proc_pointers.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::ProcPointer(info)) if info.ret == ret && pool.slice(info.params) == params
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let infered = ret.is_infered() || params.iter().any(|p| p.is_infered());
        let evaled = ret.is_evaled() || params.iter().any(|p| p.is_evaled());
        let index = self.commit_record(|table| {
            Ok(ClassInfo::ProcPointer(ProcPointerInfo {
                params: table.members.try_extend_from_slice(params)?,
                ret,
            }))
        })?;
        let class = Class::structural(ClassKind::ProcPointer(index), infered, evaled);
        self.proc_pointers.insert(slot, hash, class);
        Ok(class)
    }

    pub fn proc_pointer_signature(
        &self,
        class: Class,
    ) -> Option<(&[Class], Class)> {
        match self.info(class)? {
            ClassInfo::ProcPointer(info) => Some((self.members.slice(info.params), info.ret)),
            _ => None,
        }
    }

    // ---- structs ------------------------------------------------------

    /// Intern a struct declaration. Stored fields are placed before static
    /// ones, keeping declaration order within each group.
    pub fn intern_struct(
        &mut self,
        name: NameId,
        fields: &[Field],
    ) -> Result<Class, TypeError> {
        if fields.len() > TUPLE_SIZE_MAX {
            return Err(TypeError::TooManyMembers(fields.len()));
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|other| other.name == field.name) {
                return Err(TypeError::DuplicateField(field.name));
            }
        }
        let ordered: SmallVec<[Field; 8]> = fields
            .iter()
            .filter(|f| !f.is_static)
            .chain(fields.iter().filter(|f| f.is_static))
            .copied()
            .collect();
        let classes: SmallVec<[Class; 8]> = ordered.iter().map(|f| f.class).collect();
        let field_names: SmallVec<[NameId; 8]> = ordered.iter().map(|f| f.name).collect();
        let stored = fields.iter().filter(|f| !f.is_static).count();

        let hash = list_hash(name.0 as u64 ^ (stored as u64) << 40, classes.iter().copied());
        let (records, pool, name_pool) = (&self.records, &self.members, &self.names);
        let probe = self.structs.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::Struct(info))
                    if info.name == name
                        && info.stored as usize == stored
                        && pool.slice(info.fields) == classes.as_slice()
                        && name_pool.slice(info.field_names) == field_names.as_slice()
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let infered = classes.iter().any(|c| c.is_infered());
        let evaled = classes.iter().any(|c| c.is_evaled());
        let mut offsets = SmallVec::new();
        let layout = if infered || evaled {
            None
        } else {
            self.sequential_layout(&classes[..stored], &mut offsets)?
        };
        let index = self.commit_record(|table| {
            Ok(ClassInfo::Struct(StructInfo {
                name,
                layout,
                fields: table.members.try_extend_from_slice(&classes)?,
                field_names: table.names.try_extend_from_slice(&field_names)?,
                offsets: table.offsets.try_extend_from_slice(&offsets)?,
                stored: stored as u16,
            }))
        })?;
        let class = Class::structural(ClassKind::Struct(index), infered, evaled);
        self.structs.insert(slot, hash, class);
        Ok(class)
    }

    pub fn struct_info(
        &self,
        class: Class,
    ) -> Option<&StructInfo> {
        match self.info(class)? {
            ClassInfo::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// `(position, name, class)` of every field, stored ones first
    pub fn struct_fields<'a>(
        &'a self,
        info: &StructInfo,
    ) -> impl Iterator<Item = (usize, NameId, Class)> + 'a {
        let names = self.names.slice(info.field_names);
        let classes = self.members.slice(info.fields);
        names
            .iter()
            .zip(classes)
            .enumerate()
            .map(|(position, (&name, &class))| (position, name, class))
    }

    /// Class and byte offset of a stored field, or class and `None` for a
    /// static one
    pub fn struct_field(
        &self,
        class: Class,
        field: NameId,
    ) -> Option<(Class, Option<u32>)> {
        let info = self.struct_info(class)?;
        let position = self.names.slice(info.field_names).iter().position(|&n| n == field)?;
        let field_class = self.members.slice(info.fields)[position];
        let offset = if position < info.stored as usize {
            self.offsets.slice(info.offsets).get(position).copied()
        } else {
            None
        };
        Some((field_class, offset))
    }

    // ---- enums --------------------------------------------------------

    pub fn intern_enum(
        &mut self,
        name: NameId,
        base: Class,
        members: &[(NameId, u64)],
    ) -> Result<Class, TypeError> {
        let scalar = match base.kind() {
            ClassKind::Unsigned(s) | ClassKind::Integer(s) if base.prefixes().is_empty() => s,
            _ => return Err(TypeError::InvalidEnumBase(base)),
        };
        for (i, &(member, value)) in members.iter().enumerate() {
            if members[..i].iter().any(|&(other, _)| other == member) {
                return Err(TypeError::DuplicateMember(member));
            }
            // signed bases take their values sign-extended
            let fits = match base.kind() {
                ClassKind::Integer(_) => (scalar.min_signed()..=scalar.max_signed()).contains(&(value as i64)),
                _ => value <= scalar.max_unsigned(),
            };
            if !fits {
                return Err(TypeError::ValueOutOfRange {
                    value: value as i128,
                    target: base,
                });
            }
        }
        let member_names: SmallVec<[NameId; 8]> = members.iter().map(|&(n, _)| n).collect();
        let member_values: SmallVec<[u64; 8]> = members.iter().map(|&(_, v)| v).collect();

        let hash = class_hash(base) ^ (name.0 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let (records, name_pool, value_pool) = (&self.records, &self.names, &self.values);
        let probe = self.enums.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::Enum(info))
                    if info.name == name
                        && info.base == base
                        && name_pool.slice(info.members) == member_names.as_slice()
                        && value_pool.slice(info.values) == member_values.as_slice()
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let index = self.commit_record(|table| {
            Ok(ClassInfo::Enum(EnumInfo {
                name,
                base,
                members: table.names.try_extend_from_slice(&member_names)?,
                values: table.values.try_extend_from_slice(&member_values)?,
                max_value: member_values.iter().copied().max().unwrap_or(0),
            }))
        })?;
        let class = Class::structural(ClassKind::Enum(index), false, false);
        self.enums.insert(slot, hash, class);
        Ok(class)
    }

    pub fn enum_info(
        &self,
        class: Class,
    ) -> Option<&EnumInfo> {
        match self.info(class)? {
            ClassInfo::Enum(info) => Some(info),
            _ => None,
        }
    }

    /// Stored value of the member called `member`
    pub fn enum_member_value(
        &self,
        class: Class,
        member: NameId,
    ) -> Option<u64> {
        let info = self.enum_info(class)?;
        let position = self.names.slice(info.members).iter().position(|&n| n == member)?;
        self.values.slice(info.values).get(position).copied()
    }

    // ---- procedures ---------------------------------------------------

    pub fn intern_procedure(
        &mut self,
        signature: ProcedureSignature<'_>,
    ) -> Result<Class, TypeError> {
        let ProcedureSignature {
            name,
            params,
            ret,
            infered,
            defaults,
        } = signature;
        if params.len() > u8::MAX as usize {
            return Err(TypeError::TooManyMembers(params.len()));
        }
        let classes: SmallVec<[Class; 8]> = params.iter().map(|&(_, c)| c).collect();
        let param_names: SmallVec<[NameId; 8]> = params.iter().map(|&(n, _)| n).collect();

        let hash = list_hash(class_hash(ret) ^ name.0 as u64, classes.iter().copied());
        let (records, pool, name_pool) = (&self.records, &self.members, &self.names);
        let probe = self.procedures.find(hash, |class| {
            matches!(
                class.index().and_then(|index| records.get(Offset(index.0))),
                Some(ClassInfo::Procedure(info))
                    if info.name == name
                        && info.ret == ret
                        && info.infered == infered
                        && info.defaults == defaults
                        && pool.slice(info.params) == classes.as_slice()
                        && name_pool.slice(info.param_names) == param_names.as_slice()
            )
        });
        let slot = match probe {
            Probe::Found(class) => return Ok(class),
            Probe::Vacant(slot) => slot,
        };

        let is_infered = infered != 0 || ret.is_infered() || classes.iter().any(|c| c.is_infered());
        let is_evaled = ret.is_evaled() || classes.iter().any(|c| c.is_evaled());
        let index = self.commit_record(|table| {
            Ok(ClassInfo::Procedure(ProcedureInfo {
                name,
                params: table.members.try_extend_from_slice(&classes)?,
                param_names: table.names.try_extend_from_slice(&param_names)?,
                ret,
                infered,
                defaults,
            }))
        })?;
        let class = Class::structural(ClassKind::Procedure(index), is_infered, is_evaled);
        self.procedures.insert(slot, hash, class);
        Ok(class)
    }

    pub fn procedure_info(
        &self,
        class: Class,
    ) -> Option<&ProcedureInfo> {
        match self.info(class)? {
            ClassInfo::Procedure(info) => Some(info),
            _ => None,
        }
    }

    pub fn procedure_params(
        &self,
        class: Class,
    ) -> Option<&[Class]> {
        self.procedure_info(class).map(|info| self.members.slice(info.params))
    }

    pub fn procedure_param_list<'a>(
        &'a self,
        info: &ProcedureInfo,
    ) -> impl Iterator<Item = (NameId, Class)> + 'a {
        let names = self.names.slice(info.param_names);
        let classes = self.members.slice(info.params);
        names.iter().copied().zip(classes.iter().copied())
    }

    /// Look up or create the instantiation of a generic procedure for the
    /// given concrete classes. Returns the instance and whether it is new.
    pub fn procedure_instance(
        &mut self,
        procedure: Class,
        classes: &[Class],
    ) -> Result<(InstanceId, bool), TypeError> {
        let index = match procedure.kind() {
            ClassKind::Procedure(index) if procedure.prefixes().is_empty() => index,
            _ => return Err(TypeError::NotAProcedure(procedure)),
        };
        if let Some(&class) = classes.iter().find(|c| !c.is_concrete()) {
            return Err(TypeError::NotConcrete(class));
        }
        let instances = self.instances.entry(index).or_default();
        let next = InstanceId(instances.len() as u32);
        match instances.entry(classes.iter().copied().collect()) {
            Entry::Occupied(entry) => Ok((*entry.get(), false)),
            Entry::Vacant(entry) => {
                entry.insert(next);
                debug!(procedure = index.0, instance = next.0, "procedure instance created");
                Ok((next, true))
            }
        }
    }

    pub fn instance_count(
        &self,
        procedure: Class,
    ) -> usize {
        procedure
            .index()
            .and_then(|index| self.instances.get(&index))
            .map_or(0, IndexMap::len)
    }

    // ---- statistics ---------------------------------------------------

    pub fn stats(&self) -> ClassTableStats {
        let sets = [
            &self.arrays,
            &self.tuples,
            &self.proc_pointers,
            &self.structs,
            &self.enums,
            &self.procedures,
        ];
        ClassTableStats {
            arrays: self.arrays.len(),
            tuples: self.tuples.len(),
            proc_pointers: self.proc_pointers.len(),
            structs: self.structs.len(),
            enums: self.enums.len(),
            procedures: self.procedures.len(),
            instances: self.instances.values().map(IndexMap::len).sum(),
            records: self.records.len(),
            collisions: sets.iter().map(|set| set.collisions()).sum(),
        }
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new(64, 1 << 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), Some(0));
        assert_eq!(align_up(1, 4), Some(4));
        assert_eq!(align_up(9, 8), Some(16));
        assert_eq!(align_up(u32::MAX, 8), None);
    }

    #[test]
    fn test_pointer_and_span_layout() {
        let table = ClassTable::default();
        assert_eq!(table.layout(Class::U8.pointer_to().unwrap()), Some(Layout::POINTER));
        assert_eq!(table.bytesize(Class::U8.span_of().unwrap()), Some(16));
        assert_eq!(table.bytesize(Class::U16), Some(2));
        assert_eq!(table.layout(Class::infered(1)), None);
    }

    #[test]
    fn test_record_ceiling() {
        let mut table = ClassTable::new(8, 2);
        table.intern_array(Class::U8, ArraySize::Fixed(1)).unwrap();
        table.intern_array(Class::U8, ArraySize::Fixed(2)).unwrap();
        let err = table.intern_array(Class::U8, ArraySize::Fixed(3)).unwrap_err();
        assert!(matches!(err, TypeError::Arena(_)));
    }

    #[test]
    fn test_failed_record_releases_side_lists() {
        let mut table = ClassTable::new(8, 4);
        let members = [(NameId(1), 0), (NameId(2), 1), (NameId(3), 2)];
        table.intern_enum(NameId(10), Class::U8, &members).unwrap();

        // field classes fit, field names do not
        let fields = [Field::stored(NameId(4), Class::U8), Field::stored(NameId(5), Class::U8)];
        let err = table.intern_struct(NameId(11), &fields).unwrap_err();
        assert!(matches!(err, TypeError::Arena(_)));
        assert_eq!(table.stats().records, 1);

        // the whole member region is still available
        table.intern_tuple(&[Class::U8; 4]).unwrap();
        assert_eq!(table.stats().records, 2);
    }
}
