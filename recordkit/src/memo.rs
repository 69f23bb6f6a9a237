//! Per-instance memoization of accessor results.
//!
//! Every record owns a [`MemoCache`] with one [`MemoSlot`] per accessor role
//! (reader or predicate) of each declared field. A slot moves from empty to
//! filled exactly once, on the first successful evaluation, and is never
//! reset:
//!
//! ```text
//! Unevaluated --compute_or_fetch (Ok)--> Evaluated(value)
//!      ^   |
//!      +---+ compute_or_fetch (Err): nothing stored, next call retries
//! ```

use std::fmt;
use std::sync::OnceLock;

use parking_lot::Mutex;

/// A single lazily-filled cache cell.
///
/// Concurrent first accesses are serialized by a per-slot lock, so the thunk
/// passed to [`compute_or_fetch`](Self::compute_or_fetch) runs at most once
/// per successful fill. Reads after the fill are lock-free.
pub struct MemoSlot<T> {
    value: OnceLock<T>,
    init: Mutex<()>,
}

impl<T> MemoSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Return the cached value, computing and storing it on first use.
    ///
    /// The thunk must be deterministic with respect to the record's
    /// attribute map. If it fails, nothing is stored and the error is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Whatever `thunk` returns.
    pub fn compute_or_fetch<E>(&self, thunk: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _guard = self.init.lock();
        // Another thread may have filled the slot while we waited.
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let computed = thunk()?;
        Ok(self.value.get_or_init(|| computed))
    }

    /// The cached value, if the slot has been filled.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Whether the slot has been filled.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> Default for MemoSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for MemoSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Evaluated").field(value).finish(),
            None => f.write_str("Unevaluated"),
        }
    }
}

/// Fixed-size array of memo slots, indexed by slot ordinal.
///
/// The ordinals come from the record's [`Schema`](crate::Schema), which
/// assigns each field a reader slot and a predicate slot at registration time.
pub struct MemoCache<T> {
    slots: Box<[MemoSlot<T>]>,
}

impl<T> MemoCache<T> {
    /// Create a cache with `len` empty slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| MemoSlot::new()).collect(),
        }
    }

    /// The slot at `index`, or `None` when out of range.
    #[inline]
    pub fn slot(&self, index: usize) -> Option<&MemoSlot<T>> {
        self.slots.get(index)
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cache has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that have been filled.
    pub fn evaluated(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_evaluated()).count()
    }
}

impl<T> fmt::Debug for MemoCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("slots", &self.slots.len())
            .field("evaluated", &self.evaluated())
            .finish()
    }
}
