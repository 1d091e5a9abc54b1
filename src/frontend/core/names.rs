//! Name interner
//!
//! Identifiers are copied once into a length-prefixed byte region; the
//! [`NameId`] is the offset of the first byte. Equal byte strings always
//! resolve to the same id.

use thiserror::Error;

use super::arena::{ArenaError, Region};
use super::probe::{Probe, ProbeTable};

/// Longest name the length prefix can describe
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("empty name")]
    Empty,
    #[error("name of {0} bytes exceeds the limit of 255")]
    TooLong(usize),
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Handle to an interned name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NameId(pub u32);

impl NameId {
    /// Never returned by [`NameTable::intern`]
    pub const NONE: NameId = NameId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// djb2 over raw bytes
#[inline]
pub fn name_hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(5381u64, |h, &c| h.wrapping_mul(33).wrapping_add(c as u64))
}

#[derive(Debug, Clone)]
pub struct NameTable {
    bytes: Region<u8>,
    set: ProbeTable<NameId>,
}

impl NameTable {
    pub fn new(
        set_capacity: usize,
        bytes_ceiling: usize,
    ) -> Self {
        let mut bytes = Region::new("names", set_capacity * 8, bytes_ceiling);
        // offset 0 stays reserved for NameId::NONE
        bytes.push(0);
        Self {
            bytes,
            set: ProbeTable::with_capacity(set_capacity),
        }
    }

    pub fn intern(
        &mut self,
        name: &[u8],
    ) -> Result<NameId, NameError> {
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(name.len()));
        }

        let hash = name_hash(name);
        let bytes = &self.bytes;
        let probe = self.set.find(hash, |id| {
            let start = id.0 as usize;
            let len = bytes.as_slice()[start - 1] as usize;
            &bytes.as_slice()[start..start + len] == name
        });

        match probe {
            Probe::Found(id) => Ok(id),
            Probe::Vacant(slot) => {
                let mark = self.bytes.mark();
                self.bytes.try_push(name.len() as u8)?;
                let extent = match self.bytes.try_extend_from_slice(name) {
                    Ok(extent) => extent,
                    Err(err) => {
                        self.bytes.truncate(mark);
                        return Err(err.into());
                    }
                };
                let id = NameId(extent.offset);
                self.set.insert(slot, hash, id);
                tracing::trace!(id = id.0, "interned name");
                Ok(id)
            }
        }
    }

    /// Bytes of an interned name. [`NameId::NONE`] resolves to an empty
    /// slice; an id outside this table's buffer resolves to `None`.
    pub fn resolve(
        &self,
        id: NameId,
    ) -> Option<&[u8]> {
        if id.is_none() {
            return Some(&[]);
        }
        let bytes = self.bytes.as_slice();
        let start = id.0 as usize;
        let len = *bytes.get(start - 1)? as usize;
        bytes.get(start..start + len)
    }

    /// Lossy text of a name, empty for ids this table never handed out
    pub fn resolve_str(
        &self,
        id: NameId,
    ) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.resolve(id).unwrap_or_default())
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.set.capacity()
    }

    pub fn collisions(&self) -> u64 {
        self.set.collisions()
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new(256, 1 << 24)
    }
}
