//! Deterministic top-N selection.

use std::hash::Hash;

use serde::Serialize;

use crate::aggregate::FrequencyMap;
use crate::record::PaperRecord;

/// One row of a ranking. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry<K> {
    pub key: K,
    pub value: u64,
    pub rank: usize,
}

///Selects the `n` heaviest entries of `freq`, heaviest first.
///
///Equal weights keep the order in which their keys were first inserted into
///the map (`sort_by` is stable). Asking for more entries than exist returns
///all of them.
/// # Example
/// ```
/// use citation_atlas::{FrequencyMap, top_n};
/// let freq: FrequencyMap<String> =
///     [("A".to_string(), 10), ("B".to_string(), 15), ("C".to_string(), 15)].into_iter().collect();
/// let top = top_n(&freq, 2);
/// assert_eq!(top[0].key, "B");
/// assert_eq!(top[1].key, "C");
/// assert_eq!(top[1].rank, 2);
/// ```
pub fn top_n<K>(freq: &FrequencyMap<K>, n: usize) -> Vec<RankedEntry<K>>
where
    K: Hash + Eq + Clone,
{
    if n == 0 {
        return Vec::new();
    }
    let mut sorted: Vec<(&K, u64)> = freq.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (key, value))| RankedEntry {
            key: key.clone(),
            value,
            rank: i + 1,
        })
        .collect()
}

///The `n` most cited papers. Papers without a title or without citations are
///ignored; equal counts keep dataset order.
pub fn top_papers(papers: &[PaperRecord], n: usize) -> Vec<&PaperRecord> {
    let mut ranked: Vec<&PaperRecord> = papers
        .iter()
        .filter(|p| !p.title.is_empty() && p.citation_count > 0)
        .collect();
    ranked.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(entries: &[(&str, u64)]) -> FrequencyMap<String> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn ties_keep_insertion_order() {
        let f = freq(&[("A", 10), ("B", 15), ("C", 15)]);
        let top = top_n(&f, 2);
        assert_eq!(
            top,
            vec![
                RankedEntry { key: "B".to_string(), value: 15, rank: 1 },
                RankedEntry { key: "C".to_string(), value: 15, rank: 2 },
            ]
        );

        let f = freq(&[("C", 15), ("B", 15), ("A", 10)]);
        let keys: Vec<String> = top_n(&f, 3).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["C", "B", "A"]);
    }

    #[test]
    fn length_is_min_of_n_and_len() {
        let f = freq(&[("x", 1), ("y", 3), ("z", 2)]);
        for n in 0..6 {
            let top = top_n(&f, n);
            assert_eq!(top.len(), n.min(f.len()));
            assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
            assert!(top.iter().enumerate().all(|(i, e)| e.rank == i + 1));
        }
        assert!(top_n(&FrequencyMap::<String>::new(), 5).is_empty());
    }

    #[test]
    fn most_cited_papers() {
        let papers = vec![
            PaperRecord::new("a", "", 5).with_title("A"),
            PaperRecord::new("b", "", 50).with_title("B"),
            PaperRecord::new("c", "", 500),
            PaperRecord::new("d", "", 0).with_title("D"),
            PaperRecord::new("e", "", 50).with_title("E"),
        ];
        let ids: Vec<&str> = top_papers(&papers, 3).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "a"]);
    }
}
