//! Shared heap allocation wrapper.

// Arc is the implementation of Heap<T> - all construction goes through
// Value factory methods.
#![allow(
    clippy::disallowed_types,
    reason = "Arc is the implementation of Heap<T>"
)]

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared heap allocation.
///
/// `Heap<T>` wraps `Arc<T>` with a constructor that is private to the value
/// module, so every heap allocation goes through a `Value` factory method.
/// Cloning a `Heap<T>` shares the allocation; an independent copy requires
/// cloning the payload itself (see `Value::deep_clone`).
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    /// Allocate a new shared payload. Value-module internal.
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        // Pointer equality is a fast path; payload equality decides
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
