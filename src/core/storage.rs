use std::marker::PhantomData;

use crate::core::{ConstraintId, MobilizedBodyId};

/// Identifier types that index an `Arena`
pub trait ArenaId: Copy {
    /// Builds the id for the given slot
    fn from_index(index: usize) -> Self;

    /// Returns the slot of this id
    fn index(self) -> usize;
}

impl ArenaId for MobilizedBodyId {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl ArenaId for ConstraintId {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only storage whose ids stay valid for the storage's lifetime
#[derive(Debug)]
pub struct Arena<H, T> {
    items: Vec<T>,
    _id: PhantomData<H>,
}

impl<H: ArenaId, T> Arena<H, T> {
    /// Creates a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty arena with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            _id: PhantomData,
        }
    }

    /// Returns the id the next added item will receive
    pub fn next_id(&self) -> H {
        H::from_index(self.items.len())
    }

    /// Adds an item and returns its id
    pub fn add(&mut self, item: T) -> H {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    /// Gets a reference to an item by its id
    pub fn get(&self, id: H) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Gets a mutable reference to an item by its id
    pub fn get_mut(&mut self, id: H) -> Option<&mut T> {
        self.items.get_mut(id.index())
    }

    /// Returns whether the id names an item of this arena
    pub fn contains(&self, id: H) -> bool {
        id.index() < self.items.len()
    }

    /// Returns the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = H> + '_ {
        (0..self.items.len()).map(H::from_index)
    }

    /// Iterates over all items with their ids
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (H::from_index(i), item))
    }
}

impl<H: ArenaId, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order() {
        let mut arena: Arena<MobilizedBodyId, &str> = Arena::new();
        assert_eq!(arena.next_id(), MobilizedBodyId(0));

        let a = arena.add("ground");
        let b = arena.add("pin");

        assert_eq!(a, MobilizedBodyId::GROUND);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.get(b), Some(&"pin"));
        assert!(arena.get(MobilizedBodyId(2)).is_none());
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b]);
    }
}
