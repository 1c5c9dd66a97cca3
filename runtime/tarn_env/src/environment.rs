//! The environment: a stack of scope frames.
//!
//! Index 0 is the global frame and is never popped; it is the only state the
//! environment rests in between top-level statements. Lookups walk frames
//! innermost to outermost. The environment is an explicitly constructed,
//! explicitly owned object - never ambient state - so independent runtime
//! instances coexist freely, sharing at most an interner.

use rustc_hash::FxHashSet;

use tarn_intern::{Name, SharedInterner};
use tarn_value::Value;

use crate::cell::{CellRef, Constness};
use crate::errors::{
    self, duplicate_name, name_not_found, stack_underflow, BindingError, EnvResult,
};
use crate::frame::{FrameLayout, ScopeFrame};

/// Scoped variable storage for one execution context.
///
/// Holds the scope stack and a [`SharedInterner`] handle so diagnostics can
/// resolve names without threading a borrow through every call. One
/// environment is owned and mutated by exactly one execution context; for
/// concurrent interpreters, construct one environment each.
pub struct Environment {
    /// Scope stack; index 0 is the global floor.
    frames: Vec<ScopeFrame>,
    /// Layout used for frames pushed by `enter_scope`.
    local_layout: FrameLayout,
    interner: SharedInterner,
}

impl Environment {
    /// Create an environment with only the global frame.
    ///
    /// Defaults: hash-indexed global frame, compact local frames. Use
    /// [`Environment::builder`] to tune the layouts.
    pub fn new(interner: SharedInterner) -> Self {
        EnvironmentBuilder::new(interner).build()
    }

    /// Start configuring an environment.
    pub fn builder(interner: SharedInterner) -> EnvironmentBuilder {
        EnvironmentBuilder::new(interner)
    }

    /// The interner backing this environment's names.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Current scope depth (1 = global frame only).
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a new empty scope frame. Cannot fail.
    #[inline]
    pub fn enter_scope(&mut self) {
        self.frames.push(ScopeFrame::new(self.local_layout));
        tracing::trace!(depth = self.frames.len(), "enter scope");
    }

    /// Pop and destroy the innermost frame.
    ///
    /// Every binding in the frame is released; cells whose only reference
    /// lived in the frame are reclaimed immediately, while cells shared with
    /// an outer scope survive. Fails with `StackUnderflow` when only the
    /// global frame remains - that is a mismatched enter/exit pairing in the
    /// caller, and the global frame is left untouched.
    pub fn exit_scope(&mut self) -> EnvResult<()> {
        if self.frames.len() == 1 {
            tracing::debug!("scope exit attempted at the global floor");
            return Err(stack_underflow());
        }
        self.frames.pop();
        tracing::trace!(depth = self.frames.len(), "exit scope");
        Ok(())
    }

    /// Declare a variable in the innermost frame with an owned cell.
    ///
    /// Shadowing an outer-scope name is always legal; colliding with a name
    /// already in the innermost frame is `DuplicateName`. Returns the new
    /// cell.
    pub fn declare(
        &mut self,
        name: Name,
        value: Value,
        constness: Constness,
    ) -> EnvResult<CellRef> {
        self.declare_cell(name, CellRef::owned(value, constness))
    }

    /// Bind an existing (possibly shared) cell in the innermost frame.
    ///
    /// This is how call machinery passes parameters by reference: the
    /// caller's cell is bound directly, so writes through the parameter hit
    /// the caller's storage.
    pub fn declare_cell(&mut self, name: Name, cell: CellRef) -> EnvResult<CellRef> {
        match self.innermost_mut().declare(name, cell.share()) {
            Ok(()) => Ok(cell),
            // declare only fails on same-frame collision
            Err(_) => Err(duplicate_name(self.interner.resolve(name))),
        }
    }

    /// Declare a bootstrap binding directly in the global frame.
    ///
    /// Hosts install built-in constants and functions this way before
    /// execution starts, regardless of the current scope depth.
    pub fn declare_global(
        &mut self,
        name: Name,
        value: Value,
        constness: Constness,
    ) -> EnvResult<CellRef> {
        let cell = CellRef::owned(value, constness);
        let Some(global) = self.frames.first_mut() else {
            unreachable!("scope stack always holds the global floor frame")
        };
        match global.declare(name, cell.share()) {
            Ok(()) => Ok(cell),
            Err(_) => Err(duplicate_name(self.interner.resolve(name))),
        }
    }

    /// Find a binding, walking frames innermost to outermost.
    ///
    /// Returns the first match; `None` once the global frame is exhausted.
    /// Absence is not an error at this layer - callers decide how to
    /// surface it.
    #[inline]
    pub fn find(&self, name: Name) -> Option<CellRef> {
        self.frames.iter().rev().find_map(|f| f.lookup(name))
    }

    /// Overwrite a binding's payload with an independent copy of `value`.
    ///
    /// Locates the binding with [`Environment::find`] semantics. After this
    /// call, mutating `value` on the caller's side is not observable through
    /// the binding. Fails with `NameNotFound` or `ConstViolation`.
    pub fn assign_copy(&mut self, name: Name, value: &Value) -> EnvResult<CellRef> {
        let Some(cell) = self.find(name) else {
            return Err(name_not_found(self.interner.resolve(name)));
        };
        match cell.assign(value.deep_clone()) {
            Ok(()) => Ok(cell),
            Err(BindingError::ConstWrite) => {
                Err(errors::const_violation(self.interner.resolve(name)))
            }
            Err(other) => Err(self.unexpected(name, other)),
        }
    }

    /// Rebind a name to alias `source`'s storage directly.
    ///
    /// Same lookup as [`Environment::assign_copy`], but no payload is
    /// copied: after this call, mutating through `source` and through the
    /// binding are the same operation. The rebound binding carries the
    /// source cell's constness. Re-pointing a const binding is a
    /// `ConstViolation`.
    pub fn assign_shared(&mut self, name: Name, source: &CellRef) -> EnvResult<CellRef> {
        let Some(level) = self.frames.iter().rposition(|f| f.contains(name)) else {
            return Err(name_not_found(self.interner.resolve(name)));
        };
        let is_const = self
            .frames
            .get(level)
            .and_then(|f| f.lookup(name))
            .is_some_and(|c| c.is_const());
        if is_const {
            return Err(errors::const_violation(self.interner.resolve(name)));
        }

        let shared = source.share();
        let rebound = self
            .frames
            .get_mut(level)
            .map(|f| f.rebind(name, shared.share()));
        match rebound {
            Some(Ok(())) => Ok(shared),
            // contains() at `level` guarantees the rebind target exists
            _ => Err(self.unexpected(name, BindingError::Missing)),
        }
    }

    /// Remove and return a binding from the innermost frame only.
    ///
    /// Removal from outer frames is disallowed to preserve lexical-scope
    /// discipline; a name bound only in an outer frame yields `None` here
    /// even though `find` would see it.
    pub fn remove_innermost(&mut self, name: Name) -> Option<CellRef> {
        let removed = self.innermost_mut().remove(name);
        if removed.is_some() {
            tracing::trace!(depth = self.frames.len(), "remove binding");
        }
        removed
    }

    /// Borrow the frame at `level` (0 = global). Debug surface.
    pub fn frame(&self, level: usize) -> Option<&ScopeFrame> {
        self.frames.get(level)
    }

    /// Borrow the innermost frame. Debug surface.
    pub fn innermost(&self) -> &ScopeFrame {
        let Some(frame) = self.frames.last() else {
            unreachable!("scope stack always holds the global floor frame")
        };
        frame
    }

    /// Every currently visible binding, innermost first.
    ///
    /// Shadowed outer bindings are suppressed, so each name appears once
    /// with the cell `find` would return. Non-mutating; intended for
    /// reflection and debugging surfaces.
    pub fn snapshot(&self) -> Vec<(Name, CellRef)> {
        let mut seen = FxHashSet::default();
        let mut visible = Vec::new();
        for frame in self.frames.iter().rev() {
            for binding in frame.iter() {
                if seen.insert(binding.name()) {
                    visible.push((binding.name(), binding.cell().share()));
                }
            }
        }
        visible
    }

    /// Pop without underflow reporting; the scope guard's drop path.
    ///
    /// The guard pushed the frame itself, so the pop cannot legitimately
    /// underflow; the floor check keeps a misbehaving caller from tearing
    /// down the global frame during unwind.
    pub(crate) fn pop_scope_floor(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            tracing::trace!(depth = self.frames.len(), "exit scope (guard)");
        }
    }

    #[inline]
    fn innermost_mut(&mut self) -> &mut ScopeFrame {
        let Some(frame) = self.frames.last_mut() else {
            unreachable!("scope stack always holds the global floor frame")
        };
        frame
    }

    /// A frame/cell error that the environment's own checks should have
    /// made impossible. Surfaced as `NameNotFound` rather than panicking;
    /// `debug!` leaves a trail.
    fn unexpected(&self, name: Name, err: BindingError) -> crate::errors::EnvError {
        tracing::debug!(?err, "binding error past environment checks");
        name_not_found(self.interner.resolve(name))
    }
}

/// Builder for the construction-time frame-layout knob.
///
/// Layouts are a pure performance choice with identical observable
/// semantics; the defaults (indexed global, compact locals) fit the usual
/// shape of a program: a large long-lived global frame and small
/// short-lived block frames.
pub struct EnvironmentBuilder {
    interner: SharedInterner,
    global_layout: FrameLayout,
    local_layout: FrameLayout,
}

impl EnvironmentBuilder {
    /// Create a builder with the default layouts.
    pub fn new(interner: SharedInterner) -> Self {
        Self {
            interner,
            global_layout: FrameLayout::Indexed,
            local_layout: FrameLayout::Compact,
        }
    }

    /// Layout for the global frame.
    #[must_use]
    pub fn global_layout(mut self, layout: FrameLayout) -> Self {
        self.global_layout = layout;
        self
    }

    /// Layout for frames pushed by `enter_scope`.
    #[must_use]
    pub fn local_layout(mut self, layout: FrameLayout) -> Self {
        self.local_layout = layout;
        self
    }

    /// Build the environment with its global frame in place.
    pub fn build(self) -> Environment {
        Environment {
            frames: vec![ScopeFrame::new(self.global_layout)],
            local_layout: self.local_layout,
            interner: self.interner,
        }
    }
}
