//! Venue → paper hierarchy for the citation sunburst.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::error::{AtlasError, Result};
use crate::record::PaperRecord;

/// Bucket name for papers whose venue is unknown.
pub const UNKNOWN_VENUE: &str = "Unknown Venue";

/// Size limits of the sunburst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunburstLimits {
    pub max_venues: usize,
    pub max_papers_per_venue: usize,
    pub max_total_papers: usize,
}

impl Default for SunburstLimits {
    fn default() -> Self {
        Self {
            max_venues: 8,
            max_papers_per_venue: 10,
            max_total_papers: 50,
        }
    }
}

/// One ring segment. The root and venue nodes have no `id`; paper nodes
/// are leaves whose `value` is the citation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunburstNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SunburstNode>,
}

impl SunburstNode {
    fn paper(p: &PaperRecord) -> Self {
        Self {
            name: if p.title.is_empty() {
                p.id.clone()
            } else {
                p.title.clone()
            },
            id: Some(p.id.clone()),
            value: p.citation_count,
            children: Vec::new(),
        }
    }

    fn group(name: &str, children: Vec<SunburstNode>) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            value: children.iter().map(|c| c.value).sum(),
            children,
        }
    }

    /// Whether the paper `id` is a leaf somewhere below this node.
    pub fn contains_paper(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id) || self.children.iter().any(|c| c.contains_paper(id))
    }

    /// Number of paper leaves below this node.
    pub fn paper_count(&self) -> usize {
        if self.id.is_some() {
            1
        } else {
            self.children.iter().map(SunburstNode::paper_count).sum()
        }
    }
}

///Builds the root → venue → paper tree around `main_paper_id`.
///
///Venues are visited from most to least papers and filled greedily within
///`limits`; inside a venue papers go from most to least cited. The main
///paper is always part of the result: when the greedy pass leaves it out it
///is put into its venue's bucket, evicting that bucket's least cited paper
///if the bucket is full.
pub fn build_citation_sunburst(
    papers: &[PaperRecord],
    main_paper_id: &str,
    limits: SunburstLimits,
) -> Result<SunburstNode> {
    let main = papers
        .iter()
        .find(|p| p.id == main_paper_id)
        .ok_or_else(|| AtlasError::UnknownPaper(main_paper_id.to_string()))?;

    let mut groups: IndexMap<&str, Vec<&PaperRecord>> = IndexMap::new();
    for p in papers {
        if let Some(venue) = p.venue.as_deref() {
            groups.entry(venue).or_default().push(p);
        }
    }
    let mut groups: Vec<(&str, Vec<&PaperRecord>)> = groups.into_iter().collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut buckets: Vec<(String, Vec<&PaperRecord>)> = Vec::new();
    let mut placed = 0;
    for (venue, mut members) in groups.into_iter().take(limits.max_venues) {
        if placed >= limits.max_total_papers {
            break;
        }
        members.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
        let take = limits
            .max_papers_per_venue
            .min(limits.max_total_papers - placed);
        members.truncate(take);
        if members.is_empty() {
            continue;
        }
        placed += members.len();
        buckets.push((venue.to_string(), members));
    }

    let included = buckets
        .iter()
        .any(|(_, members)| members.iter().any(|p| p.id == main.id));
    if !included {
        let venue = main.venue.as_deref().unwrap_or(UNKNOWN_VENUE);
        debug!("main paper {} left out by limits, forcing into {venue:?}", main.id);
        match buckets.iter_mut().find(|(name, _)| name == venue) {
            Some((_, members)) => {
                if members.len() >= limits.max_papers_per_venue {
                    // Members are sorted, so the last one is the least cited.
                    members.pop();
                }
                members.push(main);
            }
            None => buckets.push((venue.to_string(), vec![main])),
        }
    }

    let children = buckets
        .into_iter()
        .map(|(venue, members)| {
            SunburstNode::group(&venue, members.into_iter().map(SunburstNode::paper).collect())
        })
        .collect();
    Ok(SunburstNode::group("root", children))
}
