//! Append-only regions addressed by 32-bit offsets
//!
//! Every table in the front end stores its records in a [`Region`] and hands
//! out [`Offset`]/[`Extent`] handles instead of references. Growing a region
//! never invalidates a handle, and scratch work is rolled back with
//! [`Region::mark`] / [`Region::truncate`].

use thiserror::Error;

/// Arena errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("region `{region}` exceeded its ceiling of {ceiling} (requested {requested})")]
    CapacityExceeded {
        region: &'static str,
        requested: usize,
        ceiling: usize,
    },
}

/// Relocation-stable offset into a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Offset(pub u32);

impl Offset {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous run of elements inside a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub offset: u32,
    pub len: u32,
}

impl Extent {
    pub const EMPTY: Extent = Extent { offset: 0, len: 0 };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..(self.offset + self.len) as usize
    }
}

/// Saved length of a region, used to roll back scratch allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// Append-only storage with a hard element ceiling
#[derive(Debug, Clone)]
pub struct Region<T> {
    name: &'static str,
    data: Vec<T>,
    ceiling: usize,
}

impl<T> Region<T> {
    /// Create a region; `reserve` elements are allocated eagerly.
    pub fn new(
        name: &'static str,
        reserve: usize,
        ceiling: usize,
    ) -> Self {
        let ceiling = ceiling.min(u32::MAX as usize);
        Self {
            name,
            data: Vec::with_capacity(reserve.min(ceiling)),
            ceiling,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    fn check(
        &self,
        additional: usize,
    ) -> Result<(), ArenaError> {
        let requested = self.data.len().saturating_add(additional);
        if requested > self.ceiling {
            return Err(ArenaError::CapacityExceeded {
                region: self.name,
                requested,
                ceiling: self.ceiling,
            });
        }
        Ok(())
    }

    pub fn try_push(
        &mut self,
        value: T,
    ) -> Result<Offset, ArenaError> {
        self.check(1)?;
        let offset = Offset(self.data.len() as u32);
        self.data.push(value);
        Ok(offset)
    }

    /// Append one element.
    ///
    /// # Panics
    ///
    /// Panics when the region ceiling is reached. Ceilings are configuration
    /// limits of the compiler, not properties of the input.
    pub fn push(
        &mut self,
        value: T,
    ) -> Offset {
        match self.try_push(value) {
            Ok(offset) => offset,
            Err(err) => panic!("{err}"),
        }
    }

    #[inline]
    pub fn get(
        &self,
        offset: Offset,
    ) -> Option<&T> {
        self.data.get(offset.index())
    }

    #[inline]
    pub fn get_mut(
        &mut self,
        offset: Offset,
    ) -> Option<&mut T> {
        self.data.get_mut(offset.index())
    }

    pub fn mark(&self) -> Mark {
        Mark(self.data.len())
    }

    /// Drop everything allocated after `mark`.
    pub fn truncate(
        &mut self,
        mark: Mark,
    ) {
        self.data.truncate(mark.0);
    }

    /// Elements appended since `mark`.
    pub fn since(
        &self,
        mark: Mark,
    ) -> &[T] {
        &self.data[mark.0.min(self.data.len())..]
    }

    pub fn slice(
        &self,
        extent: Extent,
    ) -> &[T] {
        &self.data[extent.range()]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Clone> Region<T> {
    pub fn try_extend_from_slice(
        &mut self,
        values: &[T],
    ) -> Result<Extent, ArenaError> {
        self.check(values.len())?;
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(values);
        Ok(Extent {
            offset,
            len: values.len() as u32,
        })
    }

    /// Append a run of elements.
    ///
    /// # Panics
    ///
    /// Panics when the region ceiling is reached.
    pub fn extend_from_slice(
        &mut self,
        values: &[T],
    ) -> Extent {
        match self.try_extend_from_slice(values) {
            Ok(extent) => extent,
            Err(err) => panic!("{err}"),
        }
    }

    /// Copy the elements since `mark` to the end of the region and return
    /// their new extent. Used to promote scratch work into kept records.
    pub fn copy_since(
        &mut self,
        mark: Mark,
    ) -> Result<Extent, ArenaError> {
        let start = mark.0.min(self.data.len());
        let len = self.data.len() - start;
        self.check(len)?;
        let offset = self.data.len() as u32;
        self.data.extend_from_within(start..start + len);
        Ok(Extent {
            offset,
            len: len as u32,
        })
    }
}

impl Region<u8> {
    /// Bump the cursor to `alignment` (a power of two) and reserve `size`
    /// zeroed bytes.
    pub fn alloc(
        &mut self,
        size: usize,
        alignment: usize,
    ) -> Result<Offset, ArenaError> {
        debug_assert!(alignment.is_power_of_two());
        let start = (self.data.len() + alignment - 1) & !(alignment - 1);
        self.check(start - self.data.len() + size)?;
        self.data.resize(start + size, 0);
        Ok(Offset(start as u32))
    }

    pub fn write(
        &mut self,
        offset: Offset,
        bytes: &[u8],
    ) {
        let start = offset.index();
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn bytes(
        &self,
        offset: Offset,
        len: usize,
    ) -> &[u8] {
        &self.data[offset.index()..offset.index() + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_survive_growth() {
        let mut region: Region<u64> = Region::new("test", 1, 1024);
        let first = region.push(7);
        for i in 0..100 {
            region.push(i);
        }
        assert_eq!(region.get(first), Some(&7));
        assert_eq!(region.len(), 101);
    }

    #[test]
    fn test_ceiling_is_reported() {
        let mut region: Region<u32> = Region::new("tiny", 0, 2);
        region.try_push(1).unwrap();
        region.try_push(2).unwrap();
        let err = region.try_push(3).unwrap_err();
        assert!(matches!(
            err,
            ArenaError::CapacityExceeded {
                region: "tiny",
                requested: 3,
                ceiling: 2
            }
        ));
    }

    #[test]
    #[should_panic(expected = "exceeded its ceiling")]
    fn test_push_past_ceiling_panics() {
        let mut region: Region<u8> = Region::new("tiny", 0, 1);
        region.push(1);
        region.push(2);
    }

    #[test]
    fn test_mark_and_truncate() {
        let mut region: Region<u32> = Region::new("scratch", 4, 64);
        region.push(1);
        let mark = region.mark();
        region.extend_from_slice(&[2, 3, 4]);
        assert_eq!(region.since(mark), &[2, 3, 4]);
        region.truncate(mark);
        assert_eq!(region.as_slice(), &[1]);
    }

    #[test]
    fn test_copy_since_promotes_scratch() {
        let mut region: Region<u32> = Region::new("scratch", 4, 64);
        let mark = region.mark();
        region.extend_from_slice(&[5, 6]);
        let kept = region.copy_since(mark).unwrap();
        assert_eq!(region.slice(kept), &[5, 6]);
        assert_eq!(kept.offset, 2);
    }

    #[test]
    fn test_byte_alloc_alignment() {
        let mut region: Region<u8> = Region::new("statics", 0, 256);
        region.alloc(3, 1).unwrap();
        let offset = region.alloc(8, 8).unwrap();
        assert_eq!(offset, Offset(8));
        assert_eq!(region.len(), 16);
        region.write(offset, b"abc");
        assert_eq!(region.bytes(offset, 4), b"abc\0");
    }
}
