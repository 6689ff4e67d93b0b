//! Item capability seam for the match counter.
//!
//! The counter needs exactly two things from a candidate item: a stable
//! identity (`Eq + Hash`) for keying hit buckets, and a way to read the
//! text of a named field when scoring or reporting haystacks. Items stay
//! otherwise opaque and are never mutated.

use std::borrow::Cow;
use std::hash::Hash;

/// A candidate item that can be ranked.
///
/// `field_text` reads the *current* value of a named field, so haystack
/// queries made after scanning see live data rather than an add-time
/// snapshot. Fields the item does not have yield `None`; the counter
/// treats those as empty haystacks and never fails on them.
pub trait Matchable: Eq + Hash {
    /// Read the text of a named field, if the item has one.
    ///
    /// Returning [`Cow`] lets implementations hand back a borrowed field
    /// directly or build the value on the fly (e.g. from guarded or
    /// computed state).
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>>;
}

/// Borrowed items are matchable too, so a counter can be built over `&T`
/// without taking ownership of the scanned collection.
impl<T: Matchable> Matchable for &T {
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        (**self).field_text(field)
    }
}
