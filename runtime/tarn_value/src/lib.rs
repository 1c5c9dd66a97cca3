//! Tarn Value - Runtime values for the Tarn runtime.
//!
//! A [`Value`] is the opaque unit the variable store holds: scalars are
//! inline, strings and buffers live behind the [`Heap`] wrapper, functions
//! are opaque descriptors. Plain `Clone` shares heap payloads;
//! [`Value::deep_clone`] duplicates them, which is what gives the store its
//! copy-assignment semantics.

mod value;

pub use value::{FunctionValue, Heap, ScalarInt, Value};
