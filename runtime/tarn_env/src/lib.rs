//! Tarn Env - Scoped variable storage for the Tarn runtime.
//!
//! Every variable read, write, declaration, and scope exit in the runtime
//! funnels through this crate. The pieces, innermost out:
//!
//! - [`CellRef`]: reference-counted holder for one value, with const/mutable
//!   and shared/owned distinctions
//! - [`ScopeFrame`]: one lexical block's bindings, with a compact or
//!   hash-indexed backing store ([`FrameLayout`])
//! - [`Environment`]: the scope stack and the operation set the evaluator
//!   consumes - declare, find, assign (copy/shared), remove, enter/exit
//! - [`ScopedEnv`]: RAII guard pairing every scope entry with its exit
//!
//! Copy assignment overwrites a binding's payload with an independent deep
//! copy; shared assignment rebinds the name to alias the source cell, so
//! later writes on either side are mutually visible. Const cells reject
//! every mutation with a typed error.
//!
//! One environment instance is owned by one execution context; there is no
//! internal locking. Independent interpreter instances each build their own
//! environment, sharing at most the interner.

mod cell;
mod environment;
pub mod errors;
mod frame;
mod scope_guard;

pub use cell::{CellRef, Constness};
pub use environment::{Environment, EnvironmentBuilder};
pub use errors::{BindingError, EnvError, EnvResult};
pub use frame::{Binding, FrameLayout, ScopeFrame};
pub use scope_guard::ScopedEnv;

// Re-export the types callers hold alongside the environment
pub use tarn_intern::{Name, SharedInterner, StringInterner};
pub use tarn_value::Value;
