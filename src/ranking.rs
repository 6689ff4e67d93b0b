//! Field weighting, diminishing returns, and needle-to-haystack distance.
//!
//! Ranking keys are structured tuples where derived `Ord` gives
//! lexicographic comparison — higher-priority signals always dominate
//! lower ones, and keys are never collapsed into a single scalar.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Scale applied to weight / distinct-needle-count so the integer
/// division keeps the fewer-needles advantage strict.
const WEIGHT_SCALE: u64 = 1000;

/// Built-in weight table for package metadata fields.
/// Relative order is the load-bearing part: description < name < summary < url,
/// with unknown fields below all of them.
static BUILTIN: Lazy<FieldWeights> = Lazy::new(|| {
    let mut table = FieldWeights::new(1);
    table.set("description", 2);
    table.set("name", 4);
    table.set("summary", 6);
    table.set("url", 8);
    table
});

/// Per-field importance table: field name → positive weight.
///
/// Fields absent from the table fall back to `default_weight`, which must
/// sit below every configured weight so unexpected vocabulary never
/// outranks the known fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWeights {
    weights: HashMap<String, u64>,
    default_weight: u64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl FieldWeights {
    /// The built-in package-metadata table.
    pub fn builtin() -> &'static FieldWeights {
        &BUILTIN
    }

    /// Empty table: every field resolves to `default_weight`.
    pub fn new(default_weight: u64) -> Self {
        FieldWeights {
            weights: HashMap::new(),
            default_weight,
        }
    }

    /// Set or override the weight of one field.
    pub fn set(&mut self, field: impl Into<String>, weight: u64) {
        self.weights.insert(field.into(), weight);
    }

    /// Weight for a field; unknown fields get the low default.
    pub fn weight(&self, field: &str) -> u64 {
        self.weights
            .get(field)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// One field's diminishing-returns contribution, canonicalized into a
/// totally ordered key. `score` is scaled weight divided by the distinct
/// needle count; the sorted needle list makes two entries with equal
/// weight and count still compare deterministically by content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonField {
    pub score: u64,
    pub needles: Vec<String>,
}

/// Canonicalize one field's distinct needles against its weight.
/// Holding weight fixed, fewer distinct needles compare strictly better:
/// one tight hit is stronger signal than a pile of loose partial hits.
pub fn canonize<'a, N>(weight: u64, needles: N) -> CanonField
where
    N: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = needles.into_iter().collect();
    let count = distinct.len().max(1) as u64;
    CanonField {
        score: weight * WEIGHT_SCALE / count,
        needles: distinct.into_iter().map(str::to_string).collect(),
    }
}

/// Character-level Levenshtein distance between a needle and the live
/// haystack text. Exact equality is 0; a haystack that merely contains
/// the needle inside longer text scores strictly worse, growing with the
/// amount of surrounding text.
pub fn distance(needle: &str, haystack: &str) -> u64 {
    if needle == haystack {
        return 0;
    }
    let a: Vec<char> = needle.chars().collect();
    let b: Vec<char> = haystack.chars().collect();
    if a.is_empty() {
        return b.len() as u64;
    }
    if b.is_empty() {
        return a.len() as u64;
    }

    let mut prev: Vec<u64> = (0..=b.len() as u64).collect();
    let mut curr = vec![0u64; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i as u64;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Ranking key for one item — derived `Ord` gives lexicographic
/// comparison, all components higher = better.
///
/// Component order (most to least important):
/// 1. `weight_score` — sum over matched fields of weight·SCALE/count
/// 2. `closeness` — negated total needle↔haystack distance
/// 3. `fields` — sorted canonical per-field entries, content tie-break
///
/// Because `weight_score` sums across fields and dominates `closeness`,
/// two imperfect hits in separate fields outweigh one exact hit in a
/// single field; closeness only orders items with equal weight structure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    pub weight_score: u64,
    pub closeness: i64,
    pub fields: Vec<CanonField>,
}
