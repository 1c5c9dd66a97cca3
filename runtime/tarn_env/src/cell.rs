//! Reference-counted value cells.
//!
//! A cell is the storage a binding points at. One cell may be exclusively
//! owned by a single binding (copy semantics) or aliased by several
//! (shared semantics); a write through any alias is visible through all of
//! them. Cells hold values, never frames, so dropping a frame can never form
//! a reference cycle.

// Rc is the intentional implementation detail of CellRef - one environment
// is owned by one execution context, so the count need not be atomic.
#![allow(
    clippy::disallowed_types,
    reason = "Rc is the implementation of CellRef"
)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tarn_value::Value;

use crate::errors::BindingError;

/// Whether a cell's payload may be replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constness {
    /// Payload is frozen; any mutating operation is an error.
    Const,
    /// Payload may be replaced.
    Mutable,
}

impl Constness {
    /// Returns `true` if this is `Const`.
    #[inline]
    pub fn is_const(self) -> bool {
        matches!(self, Constness::Const)
    }
}

/// Payload and constness of one cell.
#[derive(Debug)]
struct CellSlot {
    value: Value,
    constness: Constness,
}

/// Reference-counted handle to one value cell.
///
/// This type wraps `Rc<RefCell<CellSlot>>` and enforces that all cell
/// allocations go through the [`CellRef::owned`] factory method.
///
/// Cloning a `CellRef` (or calling [`CellRef::share`], the same operation
/// under its contract name) produces another handle to the *same* storage.
/// [`CellRef::deep_copy`] produces a new cell with an independent payload.
/// Storage is reclaimed when the last handle drops; callers never track
/// lifetimes manually.
///
/// # Thread Safety
/// `CellRef` is NOT thread-safe. It uses `Rc` internally, which is faster
/// than `Arc` but cannot cross threads. Each environment instance is owned
/// by exactly one execution context, so nothing more is needed.
#[repr(transparent)]
pub struct CellRef(Rc<RefCell<CellSlot>>);

impl CellRef {
    /// Allocate a new independently-owned cell.
    #[inline]
    pub fn owned(value: Value, constness: Constness) -> Self {
        CellRef(Rc::new(RefCell::new(CellSlot { value, constness })))
    }

    /// Produce a new handle to the *same* storage.
    ///
    /// A write through either handle is visible through the other. The
    /// storage's live reference count goes up by one and the payload is
    /// freed only when the last handle drops.
    #[inline]
    pub fn share(&self) -> Self {
        CellRef(Rc::clone(&self.0))
    }

    /// Produce a new cell holding an independent deep copy of the payload.
    ///
    /// Preserves the source's constness; see [`CellRef::deep_copy_with`] to
    /// override it.
    #[inline]
    pub fn deep_copy(&self) -> Self {
        let slot = self.0.borrow();
        CellRef::owned(slot.value.deep_clone(), slot.constness)
    }

    /// Deep copy with an explicit constness for the new cell.
    #[inline]
    pub fn deep_copy_with(&self, constness: Constness) -> Self {
        CellRef::owned(self.0.borrow().value.deep_clone(), constness)
    }

    /// Replace the payload in place.
    ///
    /// Fails with [`BindingError::ConstWrite`] if the cell is const; a
    /// const cell never silently ignores a write.
    #[inline]
    pub fn assign(&self, value: Value) -> Result<(), BindingError> {
        let mut slot = self.0.borrow_mut();
        if slot.constness.is_const() {
            return Err(BindingError::ConstWrite);
        }
        slot.value = value;
        Ok(())
    }

    /// Clone the payload out of the cell.
    #[inline]
    pub fn value(&self) -> Value {
        self.0.borrow().value.clone()
    }

    /// Run `f` against the payload without cloning it.
    #[inline]
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.0.borrow().value)
    }

    /// The cell's constness flag.
    #[inline]
    pub fn constness(&self) -> Constness {
        self.0.borrow().constness
    }

    /// Returns `true` if the cell rejects mutation.
    #[inline]
    pub fn is_const(&self) -> bool {
        self.constness().is_const()
    }

    /// Number of live handles to this cell's storage.
    #[inline]
    pub fn shared_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether two handles refer to the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for CellRef {
    /// Same operation as [`CellRef::share`].
    #[inline]
    fn clone(&self) -> Self {
        self.share()
    }
}

impl PartialEq for CellRef {
    /// Identity comparison: two handles are equal when they refer to the
    /// same storage, matching [`CellRef::ptr_eq`].
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for CellRef {}

impl fmt::Debug for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.0.borrow();
        f.debug_struct("CellRef")
            .field("value", &slot.value)
            .field("constness", &slot.constness)
            .field("refs", &Rc::strong_count(&self.0))
            .finish()
    }
}
