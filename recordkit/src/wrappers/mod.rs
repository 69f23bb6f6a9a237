//! Typed views over memoized accessor results.
//!
//! # Wrapper Types
//!
//! | Type | Returned by | Holds |
//! |------|-------------|-------|
//! | [`ObjectRef<T>`] | Object field readers | Nested record or the null object |
//! | [`Attr`] | [`indexed_get`](crate::RecordBase::indexed_get) | Any accessor result, typed at runtime |
//!
//! Both borrow from the owning record's memo cache, so they are `Copy` and
//! live as long as the record they were read from.

mod attr;
mod object_ref;

pub use attr::Attr;
pub use object_ref::ObjectRef;
