//! Table representations for internal nodes
//!
//! Both kinds map a slot index in `0..2^bits` to an optional child. The
//! sparse kind stores only occupied slots, ordered by slot, and finds a
//! slot's position by counting the bitmap bits below it.

use super::node::Child;

/// Slot-addressed child storage shared by both table kinds
pub(crate) trait Table<K, V> {
    /// Child at `slot`, if occupied
    fn get(&self, slot: usize) -> Option<&Child<K, V>>;

    /// Writable child reference at `slot`; writing through it replaces the child
    fn get_mut(&mut self, slot: usize) -> Option<&mut Child<K, V>>;

    /// Fill an empty `slot`
    fn insert(&mut self, slot: usize, child: Child<K, V>);

    /// Vacate `slot`, returning its child
    fn remove(&mut self, slot: usize) -> Option<Child<K, V>>;

    /// Number of occupied slots
    fn len(&self) -> usize;

    /// First occupied slot at or after `from`
    fn next_entry(&self, from: usize) -> Option<(usize, &Child<K, V>)>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bitmap plus dense child array
#[derive(Clone, Debug)]
pub(crate) struct SparseTable<K, V> {
    bitmap: u64,
    children: Vec<Child<K, V>>,
}

impl<K, V> Default for SparseTable<K, V> {
    fn default() -> Self {
        SparseTable {
            bitmap: 0,
            children: Vec::new(),
        }
    }
}

impl<K, V> SparseTable<K, V> {
    #[inline]
    fn bit(slot: usize) -> u64 {
        debug_assert!(slot < 64);
        1u64 << slot
    }

    /// Dense array position for `slot`: popcount of the bits below it
    #[inline]
    fn position(&self, slot: usize) -> usize {
        (self.bitmap & (Self::bit(slot) - 1)).count_ones() as usize
    }

    #[inline]
    fn occupied(&self, slot: usize) -> bool {
        self.bitmap & Self::bit(slot) != 0
    }

    #[cfg(test)]
    pub(crate) fn bitmap(&self) -> u64 {
        self.bitmap
    }

    /// Consume the table, yielding `(slot, child)` in slot order
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (usize, Child<K, V>)> {
        let mut bitmap = self.bitmap;
        self.children.into_iter().map(move |child| {
            let slot = bitmap.trailing_zeros() as usize;
            bitmap &= bitmap - 1;
            (slot, child)
        })
    }
}

impl<K, V> Table<K, V> for SparseTable<K, V> {
    fn get(&self, slot: usize) -> Option<&Child<K, V>> {
        if !self.occupied(slot) {
            return None;
        }
        Some(&self.children[self.position(slot)])
    }

    fn get_mut(&mut self, slot: usize) -> Option<&mut Child<K, V>> {
        if !self.occupied(slot) {
            return None;
        }
        let pos = self.position(slot);
        Some(&mut self.children[pos])
    }

    fn insert(&mut self, slot: usize, child: Child<K, V>) {
        debug_assert!(!self.occupied(slot), "slot {slot} already occupied");
        let pos = self.position(slot);
        self.bitmap |= Self::bit(slot);
        self.children.insert(pos, child);
    }

    fn remove(&mut self, slot: usize) -> Option<Child<K, V>> {
        if !self.occupied(slot) {
            return None;
        }
        let pos = self.position(slot);
        self.bitmap &= !Self::bit(slot);
        Some(self.children.remove(pos))
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn next_entry(&self, from: usize) -> Option<(usize, &Child<K, V>)> {
        let rest = self.bitmap & u64::MAX.checked_shl(from as u32).unwrap_or(0);
        if rest == 0 {
            return None;
        }
        let slot = rest.trailing_zeros() as usize;
        Some((slot, &self.children[self.position(slot)]))
    }
}

/// Directly indexed array of `2^bits` optional children
#[derive(Clone, Debug)]
pub(crate) struct FixedTable<K, V> {
    slots: Box<[Option<Child<K, V>>]>,
    occupied: usize,
}

impl<K, V> FixedTable<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        FixedTable {
            slots: (0..capacity).map(|_| None).collect(),
            occupied: 0,
        }
    }

    /// Same children, fully allocated
    pub(crate) fn from_sparse(sparse: SparseTable<K, V>, capacity: usize) -> Self {
        let mut table = FixedTable::new(capacity);
        for (slot, child) in sparse.into_entries() {
            table.insert(slot, child);
        }
        table
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<K, V> Table<K, V> for FixedTable<K, V> {
    fn get(&self, slot: usize) -> Option<&Child<K, V>> {
        self.slots[slot].as_ref()
    }

    fn get_mut(&mut self, slot: usize) -> Option<&mut Child<K, V>> {
        self.slots[slot].as_mut()
    }

    fn insert(&mut self, slot: usize, child: Child<K, V>) {
        debug_assert!(self.slots[slot].is_none(), "slot {slot} already occupied");
        if self.slots[slot].replace(child).is_none() {
            self.occupied += 1;
        }
    }

    fn remove(&mut self, slot: usize) -> Option<Child<K, V>> {
        let child = self.slots[slot].take()?;
        self.occupied -= 1;
        Some(child)
    }

    fn len(&self) -> usize {
        self.occupied
    }

    fn next_entry(&self, from: usize) -> Option<(usize, &Child<K, V>)> {
        self.slots
            .get(from..)?
            .iter()
            .enumerate()
            .find_map(|(i, child)| child.as_ref().map(|c| (from + i, c)))
    }
}
