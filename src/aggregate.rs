//! Frequency and co-occurrence maps built from a collection of papers.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::record::PaperRecord;

/// Entity key → accumulated weight.
///
/// Iteration follows first-insertion order. Ranking relies on that order to
/// break ties; everything else must sort explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap<K: Hash + Eq> {
    entries: IndexMap<K, u64>,
}

impl<K: Hash + Eq> Default for FrequencyMap<K> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> FrequencyMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` to `key`, inserting it with 0 first if unseen.
    pub fn add(&mut self, key: K, weight: u64) {
        let slot = self.entries.entry(key).or_insert(0);
        *slot = slot.saturating_add(weight);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<u64>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }
}

impl<K: Hash + Eq> FromIterator<(K, u64)> for FrequencyMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut map = FrequencyMap::new();
        for (k, v) in iter {
            map.add(k, v);
        }
        map
    }
}

/// Unordered pair of names, stored in lexicographic order so that `(A, B)`
/// and `(B, A)` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Author × venue key used by the sankey flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VenueLink {
    pub author: String,
    pub venue: String,
}

impl fmt::Display for VenueLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.author, self.venue)
    }
}

impl Serialize for VenueLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

///Adds each paper's citation count to every key `key_fn` yields for it.
/// # Example
/// ```
/// use citation_atlas::{PaperRecord, accumulate_citations};
/// let papers = vec![
///     PaperRecord::new("p1", "A;B;C", 10),
///     PaperRecord::new("p2", "B;C", 5),
/// ];
/// let totals = accumulate_citations(&papers, PaperRecord::authors);
/// assert_eq!(totals.get("A"), Some(10));
/// assert_eq!(totals.get("B"), Some(15));
/// assert_eq!(totals.get("C"), Some(15));
/// ```
pub fn accumulate_citations<F, I>(papers: &[PaperRecord], key_fn: F) -> FrequencyMap<String>
where
    F: Fn(&PaperRecord) -> I,
    I: IntoIterator<Item = String>,
{
    let mut totals = FrequencyMap::new();
    for paper in papers {
        for key in key_fn(paper) {
            totals.add(key, paper.citation_count);
        }
    }
    totals
}

///Number of papers each author appears on.
pub fn accumulate_paper_counts(papers: &[PaperRecord]) -> FrequencyMap<String> {
    let mut counts = FrequencyMap::new();
    for paper in papers {
        for author in paper.authors() {
            counts.add(author, 1);
        }
    }
    counts
}

///Counts co-authorships. Every unordered pair of authors on a paper adds one
///to its [`PairKey`]; a pair of identical names is skipped.
pub fn accumulate_cooccurrence(papers: &[PaperRecord]) -> FrequencyMap<PairKey> {
    let mut pairs = FrequencyMap::new();
    for paper in papers {
        let authors = paper.authors();
        for (i, a) in authors.iter().enumerate() {
            for b in &authors[i + 1..] {
                if a != b {
                    pairs.add(PairKey::new(a, b), 1);
                }
            }
        }
    }
    pairs
}

///Counts author × venue appearances. Papers without a venue are skipped.
pub fn accumulate_venue_links(papers: &[PaperRecord]) -> FrequencyMap<VenueLink> {
    let mut links = FrequencyMap::new();
    for paper in papers {
        let Some(venue) = paper.venue.as_deref() else {
            continue;
        };
        for author in paper.authors() {
            links.add(
                VenueLink {
                    author,
                    venue: venue.to_string(),
                },
                1,
            );
        }
    }
    links
}
