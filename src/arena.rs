//! Slab arena backing the node records of a forest.

use std::iter::FusedIterator;

use crate::NodeIndex;

/// A slab arena addressed by [`NodeIndex`].
///
/// Freed slots are kept on an intrusive free list and reused by later
/// insertions, so indices stay dense under churn. An index is only valid
/// until its slot is removed; accessing a removed slot through the `Index`
/// operators panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena<V> {
    slots: Vec<Slot<V>>,
    free_head: Option<u32>,
    len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<V> {
    Occupied(V),
    Vacant { next_free: Option<u32> },
}

impl<V> Arena<V> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Creates an empty arena with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the arena holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an exclusive upper bound on the valid indices.
    #[inline]
    pub fn upper_bound(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether `index` refers to an occupied slot.
    #[inline]
    pub fn contains(&self, index: NodeIndex) -> bool {
        matches!(self.slots.get(index.index()), Some(Slot::Occupied(_)))
    }

    /// Inserts a value, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: V) -> NodeIndex {
        self.len += 1;

        match self.free_head {
            Some(free) => {
                let index = free as usize;
                let Slot::Vacant { next_free } = self.slots[index] else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free_head = next_free;
                self.slots[index] = Slot::Occupied(value);
                NodeIndex::new(index)
            }
            None => {
                let index = NodeIndex::new(self.slots.len());
                self.slots.push(Slot::Occupied(value));
                index
            }
        }
    }

    /// Removes the value at `index`, returning it if the slot was occupied.
    pub fn remove(&mut self, index: NodeIndex) -> Option<V> {
        let slot = self.slots.get_mut(index.index())?;

        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        let Slot::Occupied(value) = std::mem::replace(slot, vacant) else {
            unreachable!();
        };

        self.free_head = Some(index.index() as u32);
        self.len -= 1;
        Some(value)
    }

    /// Borrows the value at `index`.
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&V> {
        match self.slots.get(index.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Mutably borrows the value at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut V> {
        match self.slots.get_mut(index.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterates over the occupied indices in ascending order.
    pub fn indices(&self) -> Indices<'_, V> {
        Indices {
            slots: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::ops::Index<NodeIndex> for Arena<V> {
    type Output = V;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        self.get(index).expect("invalid node index")
    }
}

impl<V> std::ops::IndexMut<NodeIndex> for Arena<V> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        self.get_mut(index).expect("invalid node index")
    }
}

/// Iterator over the occupied indices of an [`Arena`].
#[derive(Debug, Clone)]
pub struct Indices<'a, V> {
    slots: std::iter::Enumerate<std::slice::Iter<'a, Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Indices<'a, V> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.slots.by_ref() {
            if matches!(slot, Slot::Occupied(_)) {
                self.remaining -= 1;
                return Some(NodeIndex::new(index));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> ExactSizeIterator for Indices<'a, V> {}

impl<'a, V> FusedIterator for Indices<'a, V> {}
