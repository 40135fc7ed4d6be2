//! Ownership layer shared by the mobilizer and constraint catalogues.
//!
//! A `Handle` is either empty, the owner of a record, or an alias of a record
//! owned by another handle. The record slot remembers which handle owns it, so
//! ownership can move between handles without copying the record. Dropping
//! the owner releases the record even when aliases are still around; those
//! aliases then report `ReleasedRecord` instead of dangling. Release does not
//! wait for outstanding borrows: the record is marked released at once and
//! freed as soon as no borrow holds it.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{MultibodyError, Result};

/// Records that live behind a `Handle`
pub trait Record {
    /// Entity name used in error messages
    const ENTITY: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HandleKey(u64);

impl HandleKey {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Slot<R> {
    owner: Cell<Option<HandleKey>>,
    released: Cell<bool>,
    record: RefCell<Option<R>>,
}

impl<R> Slot<R> {
    fn release(&self) {
        self.owner.set(None);
        self.released.set(true);
        self.free_released();
    }

    /// Drops a released record unless it is still borrowed
    fn free_released(&self) {
        if self.released.get() {
            if let Ok(mut record) = self.record.try_borrow_mut() {
                record.take();
            }
        }
    }
}

/// A lightweight reference to a shared record with a single designated owner
pub struct Handle<R: Record> {
    key: HandleKey,
    slot: Option<Rc<Slot<R>>>,
}

impl<R: Record> Handle<R> {
    /// Creates a handle with no record
    pub fn empty() -> Self {
        Self {
            key: HandleKey::next(),
            slot: None,
        }
    }

    /// Creates a handle owning a freshly allocated record
    pub(crate) fn owning(record: R) -> Self {
        let key = HandleKey::next();
        Self {
            key,
            slot: Some(Rc::new(Slot {
                owner: Cell::new(Some(key)),
                released: Cell::new(false),
                record: RefCell::new(Some(record)),
            })),
        }
    }

    /// Returns true if this handle has no record
    pub fn is_empty_handle(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns true if the record designates this handle as its owner
    pub fn is_owner_handle(&self) -> bool {
        match &self.slot {
            Some(slot) => slot.owner.get() == Some(self.key),
            None => false,
        }
    }

    /// Returns true if this handle aliases a record its owner already released
    pub fn is_released(&self) -> bool {
        match &self.slot {
            Some(slot) => slot.released.get(),
            None => false,
        }
    }

    /// Returns true if both handles refer to the same record
    pub fn same_record(&self, other: &Self) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Transfers ownership of the record to `new_owner`, which must be empty.
    ///
    /// Afterwards this handle is a non-owning alias of the same record.
    pub fn try_disown(&mut self, new_owner: &mut Self) -> Result<()> {
        if !self.is_owner_handle() {
            return Err(MultibodyError::NotOwner { entity: R::ENTITY });
        }
        if !new_owner.is_empty_handle() {
            return Err(MultibodyError::TargetNotEmpty { entity: R::ENTITY });
        }

        if let Some(slot) = &self.slot {
            slot.owner.set(Some(new_owner.key));
            new_owner.slot = Some(Rc::clone(slot));
        }
        Ok(())
    }

    /// Makes this empty or non-owner handle alias the record of `src`
    pub fn try_assign_from(&mut self, src: &Self) -> Result<()> {
        if self.is_owner_handle() {
            return Err(MultibodyError::ReassignOwner { entity: R::ENTITY });
        }
        self.slot = src.slot.clone();
        Ok(())
    }

    /// Borrows the record for reading
    pub(crate) fn try_read(&self, operation: &'static str) -> Result<Ref<'_, R>> {
        let slot = self.slot.as_ref().ok_or(MultibodyError::EmptyHandle {
            operation,
            entity: R::ENTITY,
        })?;
        if slot.released.get() {
            slot.free_released();
            return Err(MultibodyError::ReleasedRecord { entity: R::ENTITY });
        }
        Ref::filter_map(slot.record.borrow(), Option::as_ref)
            .map_err(|_| MultibodyError::ReleasedRecord { entity: R::ENTITY })
    }

    /// Borrows the record for writing
    pub(crate) fn try_write(&self, operation: &'static str) -> Result<RefMut<'_, R>> {
        let slot = self.slot.as_ref().ok_or(MultibodyError::EmptyHandle {
            operation,
            entity: R::ENTITY,
        })?;
        if slot.released.get() {
            slot.free_released();
            return Err(MultibodyError::ReleasedRecord { entity: R::ENTITY });
        }
        RefMut::filter_map(slot.record.borrow_mut(), Option::as_mut)
            .map_err(|_| MultibodyError::ReleasedRecord { entity: R::ENTITY })
    }
}

impl<R: Record> Default for Handle<R> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Cloning a handle yields a non-owning alias of the same record
impl<R: Record> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Self {
            key: HandleKey::next(),
            slot: self.slot.clone(),
        }
    }
}

impl<R: Record> Drop for Handle<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            if slot.owner.get() == Some(self.key) {
                slot.release();
            } else {
                slot.free_released();
            }
        }
    }
}

impl<R: Record> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_empty_handle() {
            "empty"
        } else if self.is_released() {
            "released"
        } else if self.is_owner_handle() {
            "owner"
        } else {
            "alias"
        };
        f.debug_struct(R::ENTITY)
            .field("handle", &self.key.0)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Dummy(u32);

    impl Record for Dummy {
        const ENTITY: &'static str = "Dummy";
    }

    #[test]
    fn clone_is_a_non_owning_alias() {
        let owner = Handle::owning(Dummy(7));
        let alias = owner.clone();

        assert!(owner.is_owner_handle());
        assert!(!alias.is_owner_handle());
        assert!(owner.same_record(&alias));
        assert_eq!(*alias.try_read("read").unwrap(), Dummy(7));
    }

    #[test]
    fn disown_moves_ownership_without_copying() {
        let mut source = Handle::owning(Dummy(1));
        let mut target = Handle::empty();

        source.try_disown(&mut target).unwrap();

        assert!(target.is_owner_handle());
        assert!(!source.is_owner_handle());
        assert!(source.same_record(&target));

        target.try_write("write").unwrap().0 = 5;
        assert_eq!(source.try_read("read").unwrap().0, 5);
    }

    #[test]
    fn disown_rejects_non_owner_and_non_empty_target() {
        let mut owner = Handle::owning(Dummy(1));
        let mut alias = owner.clone();
        let mut other = Handle::owning(Dummy(2));

        assert_eq!(
            alias.try_disown(&mut Handle::empty()),
            Err(MultibodyError::NotOwner { entity: "Dummy" })
        );
        assert_eq!(
            owner.try_disown(&mut other),
            Err(MultibodyError::TargetNotEmpty { entity: "Dummy" })
        );
        let mut empty: Handle<Dummy> = Handle::empty();
        assert!(empty.try_disown(&mut alias).is_err());
    }

    #[test]
    fn owner_cannot_be_reassigned() {
        let mut owner = Handle::owning(Dummy(1));
        let other = Handle::owning(Dummy(2));
        assert_eq!(
            owner.try_assign_from(&other),
            Err(MultibodyError::ReassignOwner { entity: "Dummy" })
        );

        let mut alias = owner.clone();
        alias.try_assign_from(&other).unwrap();
        assert!(alias.same_record(&other));
    }

    #[test]
    fn dropping_the_owner_releases_the_record() {
        let owner = Handle::owning(Dummy(3));
        let alias = owner.clone();
        drop(owner);

        assert!(alias.is_released());
        assert_eq!(
            alias.try_read("read").err(),
            Some(MultibodyError::ReleasedRecord { entity: "Dummy" })
        );
    }

    #[test]
    fn dropping_a_borrowed_owner_still_releases() {
        let owner = Handle::owning(Dummy(5));
        let alias = owner.clone();
        let guard = alias.try_read("read").unwrap();
        drop(owner);

        assert!(alias.is_released());
        assert!(!alias.is_owner_handle());
        assert_eq!(
            alias.try_read("read").err(),
            Some(MultibodyError::ReleasedRecord { entity: "Dummy" })
        );
        assert_eq!(guard.0, 5);

        drop(guard);
        assert!(alias.try_write("write").is_err());
        assert!(alias.slot.as_ref().unwrap().record.borrow().is_none());
    }

    #[test]
    fn dropping_an_alias_keeps_the_record() {
        let owner = Handle::owning(Dummy(4));
        drop(owner.clone());
        assert_eq!(owner.try_read("read").unwrap().0, 4);
    }

    #[test]
    fn empty_handle_is_not_an_owner() {
        let empty: Handle<Dummy> = Handle::empty();
        assert!(empty.is_empty_handle());
        assert!(!empty.is_owner_handle());
        assert!(matches!(
            empty.try_read("read"),
            Err(MultibodyError::EmptyHandle { .. })
        ));
    }
}
