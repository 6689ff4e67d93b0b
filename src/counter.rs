//! Hit accumulation and the sort/limit/reverse query surface.
//!
//! A `MatchCounter` is built empty for one search, populated through
//! `add` while the scanner walks item metadata, then queried read-only.
//! Queries never alter accumulated state, and the counter never mutates
//! the items it ranks. No internal locking: population is
//! single-writer-at-a-time by design.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::matchable::Matchable;
use crate::ranking::{canonize, distance, FieldWeights, RankKey};

/// Error type for counter queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CounterError {
    /// Returned by every `matched_*` accessor when no hit was ever
    /// recorded for the item.
    #[error("no matches recorded for item")]
    UnknownItem,
}

/// Per-item hit bucket: a needle multiset per field, plus the insertion
/// sequence used as the final deterministic sort tie-break.
#[derive(Debug, Clone)]
struct HitBucket {
    seq: u64,
    fields: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Accumulates (item, field, needle) hit events and ranks the matched
/// items best-first.
///
/// Items are opaque identities (see [`Matchable`]); the counter holds one
/// bucket per distinct item and a raw event count across all of them.
#[derive(Debug, Clone)]
pub struct MatchCounter<I: Matchable> {
    buckets: HashMap<I, HitBucket>,
    weights: FieldWeights,
    total: u64,
}

impl<I: Matchable> Default for MatchCounter<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Matchable> MatchCounter<I> {
    /// Counter with the built-in field weight table.
    pub fn new() -> Self {
        Self::with_weights(FieldWeights::default())
    }

    /// Counter with a caller-supplied weight table.
    pub fn with_weights(weights: FieldWeights) -> Self {
        MatchCounter {
            buckets: HashMap::new(),
            weights,
            total: 0,
        }
    }

    /// Record one hit: `needle` matched somewhere in `field` of `item`.
    ///
    /// Never fails. Unknown field names are accepted and later weighted
    /// at the table's low default. Each call counts toward `total()`,
    /// duplicates included.
    pub fn add(&mut self, item: I, field: &str, needle: &str) {
        let seq = self.buckets.len() as u64;
        let bucket = self.buckets.entry(item).or_insert_with(|| HitBucket {
            seq,
            fields: BTreeMap::new(),
        });
        *bucket
            .fields
            .entry(field.to_string())
            .or_default()
            .entry(needle.to_string())
            .or_insert(0) += 1;
        self.total += 1;
    }

    /// Total number of hit events recorded — one per `add` call,
    /// independent of deduplication.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct items with at least one recorded hit.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Each distinct item, exactly once, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &I> {
        self.buckets.keys()
    }

    /// Distinct field names with at least one hit for `item`, sorted.
    pub fn matched_keys(&self, item: &I) -> Result<Vec<&str>, CounterError> {
        let bucket = self.buckets.get(item).ok_or(CounterError::UnknownItem)?;
        Ok(bucket.fields.keys().map(String::as_str).collect())
    }

    /// Distinct needles that matched `item` across all fields, sorted.
    pub fn matched_needles(&self, item: &I) -> Result<Vec<&str>, CounterError> {
        let bucket = self.buckets.get(item).ok_or(CounterError::UnknownItem)?;
        let needles: BTreeSet<&str> = bucket
            .fields
            .values()
            .flat_map(|needles| needles.keys().map(String::as_str))
            .collect();
        Ok(needles.into_iter().collect())
    }

    /// Live value of each distinct matched field, read off `item` at
    /// query time — one entry per field, not per hit. Fields the item
    /// cannot produce text for are skipped.
    pub fn matched_haystacks(&self, item: &I) -> Result<Vec<String>, CounterError> {
        let bucket = self.buckets.get(item).ok_or(CounterError::UnknownItem)?;
        Ok(bucket
            .fields
            .keys()
            .filter_map(|field| item.field_text(field))
            .map(Cow::into_owned)
            .collect())
    }

    /// All matched items ranked best-first, or worst-first when
    /// `reverse` is set (the exact reverse of the best-first order).
    pub fn sorted(&self, reverse: bool) -> Vec<&I> {
        self.sort_filtered(None, reverse)
    }

    /// The full ranking restricted to the items in `limit_to`, keeping
    /// the unrestricted relative order. Entries never added to the
    /// counter are silently omitted.
    pub fn sorted_limited(&self, limit_to: &[I], reverse: bool) -> Vec<&I> {
        self.sort_filtered(Some(limit_to), reverse)
    }

    fn sort_filtered(&self, limit_to: Option<&[I]>, reverse: bool) -> Vec<&I> {
        let mut ranked: Vec<(&I, RankKey, u64)> = self
            .buckets
            .iter()
            .filter(|(item, _)| limit_to.map_or(true, |limit| limit.contains(*item)))
            .map(|(item, bucket)| (item, self.rank_key(item, bucket), bucket.seq))
            .collect();
        // best first; insertion order breaks exact key ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        if reverse {
            ranked.reverse();
        }
        ranked.into_iter().map(|(item, _, _)| item).collect()
    }

    /// Fold every matched field of one item into its ranking key.
    /// Haystacks are read live so distances reflect current field text.
    fn rank_key(&self, item: &I, bucket: &HitBucket) -> RankKey {
        let mut weight_score = 0u64;
        let mut total_distance = 0u64;
        let mut fields = Vec::with_capacity(bucket.fields.len());

        for (field, needles) in &bucket.fields {
            let canon = canonize(
                self.weights.weight(field),
                needles.keys().map(String::as_str),
            );
            weight_score += canon.score;
            fields.push(canon);

            let haystack = item.field_text(field).unwrap_or(Cow::Borrowed(""));
            for needle in needles.keys() {
                total_distance += distance(needle, &haystack);
            }
        }

        fields.sort();
        RankKey {
            weight_score,
            closeness: -(total_distance as i64),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::hash::{Hash, Hasher};

    /// Bare-bones item keyed by name; `summary` is interior-mutable so
    /// tests can change it between add and query.
    #[derive(Debug)]
    struct Pkg {
        name: String,
        summary: RefCell<String>,
        url: String,
        description: String,
    }

    impl Pkg {
        fn new(name: &str) -> Self {
            Pkg {
                name: name.to_string(),
                summary: RefCell::new(String::new()),
                url: String::new(),
                description: String::new(),
            }
        }
    }

    impl PartialEq for Pkg {
        fn eq(&self, other: &Self) -> bool {
            self.name == other.name
        }
    }

    impl Eq for Pkg {}

    impl Hash for Pkg {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.name.hash(state);
        }
    }

    impl Matchable for Pkg {
        fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
            match field {
                "name" => Some(Cow::Borrowed(&self.name)),
                "summary" => Some(Cow::Owned(self.summary.borrow().clone())),
                "url" => Some(Cow::Borrowed(&self.url)),
                "description" => Some(Cow::Borrowed(&self.description)),
                _ => None,
            }
        }
    }

    /// Items can be as plain as an integer when no haystack is read back.
    impl Matchable for u32 {
        fn field_text(&self, _field: &str) -> Option<Cow<'_, str>> {
            None
        }
    }

    #[test]
    fn test_total_counts_every_add() {
        let mut counter: MatchCounter<u32> = MatchCounter::new();
        counter.add(3, "summary", "humbert");
        counter.add(3, "url", "humbert");
        counter.add(20, "summary", "humbert");
        assert_eq!(counter.len(), 2);
        assert_eq!(counter.total(), 3);
    }

    #[test]
    fn test_duplicate_needle_counts_in_total_only() {
        let mut counter: MatchCounter<u32> = MatchCounter::new();
        counter.add(1, "summary", "grin");
        counter.add(1, "summary", "grin");
        assert_eq!(counter.total(), 2);
        assert_eq!(counter.matched_needles(&1).unwrap(), vec!["grin"]);
    }

    #[test]
    fn test_matched_accessors() {
        let mut pkg = Pkg::new("humbert");
        pkg.url = "http://humbert.com".to_string();
        *pkg.summary.borrow_mut() =
            "Glimpses of an incomparably more poignant bliss.".to_string();

        let mut counter: MatchCounter<&Pkg> = MatchCounter::new();
        counter.add(&pkg, "summary", "poignant");
        counter.add(&pkg, "url", "humbert");
        counter.add(&pkg, "summary", "humbert");

        assert_eq!(
            counter.matched_needles(&&pkg).unwrap(),
            vec!["humbert", "poignant"]
        );
        assert_eq!(counter.matched_keys(&&pkg).unwrap(), vec!["summary", "url"]);

        let mut haystacks = counter.matched_haystacks(&&pkg).unwrap();
        haystacks.sort();
        assert_eq!(
            haystacks,
            vec![
                "Glimpses of an incomparably more poignant bliss.".to_string(),
                "http://humbert.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_haystacks_read_live_values() {
        let pkg = Pkg::new("wednesday");
        let mut counter: MatchCounter<&Pkg> = MatchCounter::new();
        counter.add(&pkg, "summary", "morning");

        *pkg.summary.borrow_mut() = "changed after the scan".to_string();
        assert_eq!(
            counter.matched_haystacks(&&pkg).unwrap(),
            vec!["changed after the scan".to_string()]
        );
    }

    #[test]
    fn test_unknown_item_errors_uniformly() {
        let counter: MatchCounter<u32> = MatchCounter::new();
        assert_eq!(counter.matched_keys(&7), Err(CounterError::UnknownItem));
        assert_eq!(counter.matched_needles(&7), Err(CounterError::UnknownItem));
        assert_eq!(
            counter.matched_haystacks(&7),
            Err(CounterError::UnknownItem)
        );
    }

    #[test]
    fn test_items_yields_each_item_once() {
        let mut counter: MatchCounter<u32> = MatchCounter::new();
        counter.add(1, "name", "a");
        counter.add(1, "summary", "b");
        counter.add(2, "name", "a");
        let mut seen: Vec<u32> = counter.items().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_empty_counter() {
        let counter: MatchCounter<u32> = MatchCounter::new();
        assert!(counter.is_empty());
        assert_eq!(counter.total(), 0);
        assert!(counter.sorted(false).is_empty());
    }

    #[test]
    fn test_unknown_field_accepted_and_ranked_low() {
        let mut counter: MatchCounter<u32> = MatchCounter::new();
        counter.add(1, "license", "gpl");
        counter.add(2, "description", "gpl");
        // unknown field weighs below every configured field
        assert_eq!(counter.sorted(false), vec![&2, &1]);
    }
}
