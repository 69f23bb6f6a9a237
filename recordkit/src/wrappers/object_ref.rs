//! Nested record reference with null-object semantics.
//!
//! This module provides [`ObjectRef`], the value returned by object field
//! readers.

use std::fmt;
use std::ops::Deref;

use crate::traits::Record;

/// Borrowed nested record, possibly the null object.
///
/// When an object field's raw value is absent or `null`, the reader still
/// returns an `ObjectRef`: its record is an instance of the wrapped type
/// built over an empty attribute map, and [`is_null`](Self::is_null) reports
/// `true`. Every accessor on that instance reads as absent, so chains like
/// `tweet.user()?.screen_name()` never need an intermediate null check.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the owning record's memo cache
/// * `T` - The wrapped record type, or `dyn Record` for dynamic access
///
/// # Example
///
/// ```ignore
/// let user = tweet.user()?;
///
/// // Chaining through the null object reads as absent.
/// assert!(user.screen_name().is_null() || user.is_present());
///
/// // Branch on presence when it matters.
/// if let Some(user) = user.get() {
///     println!("{}", user.screen_name());
/// }
/// ```
///
/// # Comparison with Option
///
/// | Aspect | `ObjectRef<T>` | `Option<&T>` |
/// |--------|----------------|--------------|
/// | Absent value | Empty `T`, `is_null() == true` | `None` |
/// | Chaining | Direct, through `Deref` | Needs `map`/`and_then` |
/// | Convert | [`get`](Self::get) | - |
pub struct ObjectRef<'a, T: ?Sized> {
    record: &'a T,
    present: bool,
}

impl<'a, T: ?Sized> ObjectRef<'a, T> {
    #[inline]
    pub(crate) fn new(record: &'a T, present: bool) -> Self {
        Self { record, present }
    }

    /// Whether this is the null object.
    #[inline]
    pub fn is_null(&self) -> bool {
        !self.present
    }

    /// Whether the nested value was present.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// The nested record, or `None` for the null object.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.present.then_some(self.record)
    }

    /// The nested record, which is the empty null instance when absent.
    #[inline]
    pub fn record(&self) -> &'a T {
        self.record
    }
}

impl<'a> ObjectRef<'a, dyn Record> {
    /// Downcast a dynamically typed nested record.
    ///
    /// Returns `None` when the nested record is not a `T`.
    pub fn downcast<T: Record>(self) -> Option<ObjectRef<'a, T>> {
        let record = self.record.as_any().downcast_ref::<T>()?;
        Some(ObjectRef::new(record, self.present))
    }
}

impl<T: ?Sized> Clone for ObjectRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ObjectRef<'_, T> {}

impl<T: ?Sized> Deref for ObjectRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.record
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ObjectRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.present {
            self.record.fmt(f)
        } else {
            f.write_str("NullObject")
        }
    }
}
