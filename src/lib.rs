//! matchrank — turns raw metadata search hits into a best-first ranking.
//!
//! A metadata scanner records (item, field, needle) hit events into a
//! [`MatchCounter`]; once scanning completes, the counter aggregates the
//! events into a total order over the matched items using per-field
//! importance, a diminishing-returns penalty for many distinct needles
//! piling onto one field, and needle-to-haystack string distance to break
//! ties in favor of exact matches.
//!
//! The counter does no tokenizing or scanning itself and treats items as
//! opaque identities (see [`Matchable`]). Ranking keys are structured
//! comparable tuples ([`RankKey`]), never raw scalar scores.

pub mod counter;
pub mod matchable;
pub mod ranking;

pub use counter::{CounterError, MatchCounter};
pub use matchable::Matchable;
pub use ranking::{FieldWeights, RankKey};
