//! Open-addressing hash set shared by the name interner and the class table
//!
//! Entries are `(hash, value)` pairs where `value` is a small handle into
//! some region. Equality beyond the hash is decided by the caller, so the
//! set never has to know how to compare the records themselves.

/// Result of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<T> {
    /// An entry with equal hash and equal payload
    Found(T),
    /// First empty slot on the probe sequence; pass to [`ProbeTable::insert`]
    Vacant(usize),
}

#[derive(Debug, Clone)]
pub struct ProbeTable<T> {
    slots: Vec<Option<(u64, T)>>,
    len: usize,
    collisions: u64,
}

impl<T: Copy> ProbeTable<T> {
    /// `capacity` is rounded up to a power of two (minimum 8).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(8).next_power_of_two();
        Self {
            slots: vec![None; capacity],
            len: 0,
            collisions: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots skipped over by lookups so far
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Walk the triangular probe sequence for `hash`.
    pub fn find(
        &mut self,
        hash: u64,
        mut eq: impl FnMut(T) -> bool,
    ) -> Probe<T> {
        let mask = self.slots.len() - 1;
        let mut index = hash as usize & mask;
        let mut step = 0;
        loop {
            match self.slots[index] {
                None => return Probe::Vacant(index),
                Some((h, value)) if h == hash && eq(value) => return Probe::Found(value),
                Some(_) => self.collisions += 1,
            }
            step += 1;
            index = (index + step) & mask;
        }
    }

    /// Fill a slot returned by [`ProbeTable::find`]. The slot must not have
    /// been invalidated by another insert in between.
    pub fn insert(
        &mut self,
        slot: usize,
        hash: u64,
        value: T,
    ) {
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some((hash, value));
        self.len += 1;
        if 4 * self.len >= 3 * self.slots.len() {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        let old = std::mem::replace(&mut self.slots, vec![None; capacity]);
        let mask = capacity - 1;
        for (hash, value) in old.into_iter().flatten() {
            let mut index = hash as usize & mask;
            let mut step = 0;
            while self.slots[index].is_some() {
                step += 1;
                index = (index + step) & mask;
            }
            self.slots[index] = Some((hash, value));
        }
        tracing::trace!(capacity, len = self.len, "probe table grown");
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter().flatten().map(|&(_, value)| value)
    }
}
