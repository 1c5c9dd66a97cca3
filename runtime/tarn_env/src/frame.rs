//! Scope frames: one lexical block's bindings.
//!
//! A frame is an ordered container of (name, cell) bindings with a
//! construction-time choice of backing store. Block scopes hold a handful of
//! bindings and scan fastest as a contiguous run; the global frame can hold
//! thousands and wants a hash index. Both layouts expose identical
//! semantics; the choice is purely a performance knob.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use tarn_intern::Name;

use crate::cell::CellRef;
use crate::errors::BindingError;

/// Bindings kept inline before a compact frame spills to the heap.
const INLINE_BINDINGS: usize = 8;

/// One name bound to one cell inside a single frame.
#[derive(Clone, Debug)]
pub struct Binding {
    name: Name,
    cell: CellRef,
}

impl Binding {
    /// The bound name.
    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// The cell this binding points at.
    #[inline]
    pub fn cell(&self) -> &CellRef {
        &self.cell
    }
}

/// Backing store for a frame's bindings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameLayout {
    /// Contiguous bindings, linear scan. Fastest for the small frames
    /// typical of block scopes; no heap allocation below the inline
    /// capacity.
    #[default]
    Compact,
    /// Contiguous bindings plus a hash index. O(1) lookup for large or
    /// long-lived frames such as the global frame.
    Indexed,
}

enum Storage {
    Compact(SmallVec<[Binding; INLINE_BINDINGS]>),
    Indexed {
        entries: Vec<Binding>,
        index: FxHashMap<Name, usize>,
    },
}

/// An ordered container of bindings for one lexical block.
///
/// Names are unique within a frame. Insertion order is preserved in both
/// layouts, so bindings drop in declaration order when the frame is
/// destroyed.
pub struct ScopeFrame {
    storage: Storage,
}

impl ScopeFrame {
    /// Create an empty frame with the given layout.
    pub fn new(layout: FrameLayout) -> Self {
        let storage = match layout {
            FrameLayout::Compact => Storage::Compact(SmallVec::new()),
            FrameLayout::Indexed => Storage::Indexed {
                entries: Vec::new(),
                index: FxHashMap::default(),
            },
        };
        ScopeFrame { storage }
    }

    /// The layout this frame was constructed with.
    pub fn layout(&self) -> FrameLayout {
        match self.storage {
            Storage::Compact(_) => FrameLayout::Compact,
            Storage::Indexed { .. } => FrameLayout::Indexed,
        }
    }

    /// Insert a new binding.
    ///
    /// Fails with [`BindingError::Duplicate`] if the name is already bound
    /// in this frame. Shadowing an *outer* frame's name is the environment's
    /// business, not the frame's.
    pub fn declare(&mut self, name: Name, cell: CellRef) -> Result<(), BindingError> {
        if self.contains(name) {
            return Err(BindingError::Duplicate);
        }
        match &mut self.storage {
            Storage::Compact(bindings) => {
                bindings.push(Binding { name, cell });
            }
            Storage::Indexed { entries, index } => {
                index.insert(name, entries.len());
                entries.push(Binding { name, cell });
            }
        }
        Ok(())
    }

    /// Look up a binding in *this* frame only (no chaining).
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<CellRef> {
        match &self.storage {
            Storage::Compact(bindings) => bindings
                .iter()
                .find(|b| b.name == name)
                .map(|b| b.cell.share()),
            Storage::Indexed { entries, index } => index
                .get(&name)
                .and_then(|&i| entries.get(i))
                .map(|b| b.cell.share()),
        }
    }

    /// Replace the cell attached to an existing name.
    ///
    /// Fails with [`BindingError::Missing`] if the name is not bound here.
    pub fn rebind(&mut self, name: Name, cell: CellRef) -> Result<(), BindingError> {
        match &mut self.storage {
            Storage::Compact(bindings) => {
                match bindings.iter_mut().find(|b| b.name == name) {
                    Some(binding) => {
                        binding.cell = cell;
                        Ok(())
                    }
                    None => Err(BindingError::Missing),
                }
            }
            Storage::Indexed { entries, index } => match index.get(&name) {
                Some(&i) => match entries.get_mut(i) {
                    Some(binding) => {
                        binding.cell = cell;
                        Ok(())
                    }
                    None => Err(BindingError::Missing),
                },
                None => Err(BindingError::Missing),
            },
        }
    }

    /// Detach and return a binding, if present, from this frame only.
    ///
    /// The environment layer restricts removal to the innermost frame; the
    /// frame itself is agnostic.
    pub fn remove(&mut self, name: Name) -> Option<CellRef> {
        match &mut self.storage {
            Storage::Compact(bindings) => {
                let i = bindings.iter().position(|b| b.name == name)?;
                Some(bindings.remove(i).cell)
            }
            Storage::Indexed { entries, index } => {
                let i = index.remove(&name)?;
                let binding = entries.remove(i);
                // Entries after the removed one shifted down by one
                for slot in index.values_mut() {
                    if *slot > i {
                        *slot -= 1;
                    }
                }
                Some(binding.cell)
            }
        }
    }

    /// Whether the name is bound in this frame.
    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        match &self.storage {
            Storage::Compact(bindings) => bindings.iter().any(|b| b.name == name),
            Storage::Indexed { index, .. } => index.contains_key(&name),
        }
    }

    /// Number of bindings in this frame.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Compact(bindings) => bindings.len(),
            Storage::Indexed { entries, .. } => entries.len(),
        }
    }

    /// Whether this frame has no bindings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate bindings in insertion order, without mutating them.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        match &self.storage {
            Storage::Compact(bindings) => bindings.iter(),
            Storage::Indexed { entries, .. } => entries.iter(),
        }
    }
}

impl Default for ScopeFrame {
    fn default() -> Self {
        Self::new(FrameLayout::Compact)
    }
}

impl std::fmt::Debug for ScopeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeFrame")
            .field("layout", &self.layout())
            .field("len", &self.len())
            .finish()
    }
}
