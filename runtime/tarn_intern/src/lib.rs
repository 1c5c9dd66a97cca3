//! Tarn Intern - Interned identifiers for the Tarn runtime.
//!
//! Variable lookup is the hottest path in the runtime, so identifiers are
//! interned once and compared as 32-bit integers everywhere else. This crate
//! provides:
//! - [`Name`]: a compact interned identifier (shard + local index)
//! - [`StringInterner`]: a sharded, lock-per-shard intern table
//! - [`SharedInterner`]: a cloneable handle for sharing one table across
//!   independent runtime instances

mod interner;
mod name;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
