//! Parse → aggregate → select → build, as one pure call.

use clap::ValueEnum;
use serde::Serialize;

use crate::aggregate::{accumulate_citations, accumulate_paper_counts};
use crate::graph::{GraphEdge, GraphNode, NodeKind, build_coauthor_graph, build_venue_sankey};
use crate::record::PaperRecord;
use crate::topn::{RankedEntry, top_n, top_papers};

/// What the ranking is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankMode {
    /// Authors by citation sum; nodes only.
    Citations,
    /// Authors by paper count with their co-author links.
    #[value(name = "coauthor")]
    CoAuthor,
    /// Authors by citation sum with their author → venue flows.
    VenueLinks,
}

/// Payload handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResult {
    pub ranked_list: Vec<RankedEntry<String>>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Restricts the papers a ranking is computed on. Unset fields match
/// everything; set fields must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    pub year: Option<i32>,
    /// Case-insensitive venue name.
    pub venue: Option<String>,
    /// Exact author display name.
    pub author: Option<String>,
    /// Case-insensitive keyword.
    pub keyword: Option<String>,
}

impl PaperFilter {
    pub fn matches(&self, paper: &PaperRecord) -> bool {
        if self.year.is_some() && paper.year != self.year {
            return false;
        }
        if let Some(venue) = &self.venue {
            let same = paper
                .venue
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(venue.trim()));
            if !same {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !paper.authors().iter().any(|a| a == author.trim()) {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !paper
                .keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword.trim()))
            {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == PaperFilter::default()
    }
}

/// Everything a ranking request can vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    pub mode: RankMode,
    pub limit: usize,
    pub filter: PaperFilter,
    /// Rank only over the N most cited papers (after filtering).
    pub paper_limit: Option<usize>,
    /// Keep co-authors without a retained co-author link.
    pub include_isolated: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            mode: RankMode::Citations,
            limit: 10,
            filter: PaperFilter::default(),
            paper_limit: None,
            include_isolated: true,
        }
    }
}

///Ranks `papers` in the given mode. Pure: equal inputs give equal outputs.
/// # Example
/// ```
/// use citation_atlas::{PaperRecord, RankMode, rank};
/// let papers = vec![
///     PaperRecord::new("p1", "A;B;C", 10),
///     PaperRecord::new("p2", "B;C", 5),
/// ];
/// let result = rank(&papers, 2, RankMode::Citations);
/// let keys: Vec<&str> = result.ranked_list.iter().map(|e| e.key.as_str()).collect();
/// assert_eq!(keys, vec!["B", "C"]);
/// ```
pub fn rank(papers: &[PaperRecord], limit: usize, mode: RankMode) -> RankResult {
    rank_papers(papers, limit, mode, true)
}

///Ranks with filtering, paper limit and isolation policy applied.
pub fn rank_with(papers: &[PaperRecord], options: &RankOptions) -> RankResult {
    let selected = select_papers(papers, &options.filter, options.paper_limit);
    rank_papers(&selected, options.limit, options.mode, options.include_isolated)
}

///Papers passing `filter`, optionally reduced to the `paper_limit` most cited.
pub fn select_papers(
    papers: &[PaperRecord],
    filter: &PaperFilter,
    paper_limit: Option<usize>,
) -> Vec<PaperRecord> {
    let filtered: Vec<PaperRecord> = papers
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    match paper_limit {
        Some(n) => top_papers(&filtered, n).into_iter().cloned().collect(),
        None => filtered,
    }
}

/// One row of a most-cited paper list, with the details a paper panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperEntry {
    pub rank: usize,
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub citations: u64,
    pub url: Option<String>,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

///The `limit` most cited papers passing `filter`, with their details.
///
///With an author filter this is the list of that author's papers.
/// # Example
/// ```
/// use citation_atlas::{PaperFilter, PaperRecord, paper_list};
/// let papers = vec![
///     PaperRecord::new("p1", "A;B", 10).with_title("One"),
///     PaperRecord::new("p2", "B", 20).with_title("Two"),
/// ];
/// let filter = PaperFilter { author: Some("A".into()), ..Default::default() };
/// let list = paper_list(&papers, &filter, 5);
/// assert_eq!(list.len(), 1);
/// assert_eq!(list[0].authors, vec!["A", "B"]);
/// ```
pub fn paper_list(papers: &[PaperRecord], filter: &PaperFilter, limit: usize) -> Vec<PaperEntry> {
    let selected = select_papers(papers, filter, None);
    top_papers(&selected, limit)
        .into_iter()
        .enumerate()
        .map(|(i, p)| PaperEntry {
            rank: i + 1,
            id: p.id.clone(),
            title: p.title.clone(),
            authors: p.authors(),
            year: p.year,
            venue: p.venue.clone(),
            citations: p.citation_count,
            url: p.url.clone(),
            doi: p.doi.clone(),
            abstract_text: p.abstract_text.clone(),
        })
        .collect()
}

fn rank_papers(
    papers: &[PaperRecord],
    limit: usize,
    mode: RankMode,
    include_isolated: bool,
) -> RankResult {
    match mode {
        RankMode::Citations => {
            let ranked_list = top_n(&accumulate_citations(papers, PaperRecord::authors), limit);
            let nodes = ranked_list
                .iter()
                .map(|e| GraphNode {
                    id: e.key.clone(),
                    label: e.key.clone(),
                    kind: NodeKind::Author,
                    weight: e.value,
                })
                .collect();
            RankResult {
                ranked_list,
                nodes,
                edges: Vec::new(),
            }
        }
        RankMode::CoAuthor => {
            let ranked_list = top_n(&accumulate_paper_counts(papers), limit);
            let graph = build_coauthor_graph(papers, &keys(&ranked_list), include_isolated);
            RankResult {
                ranked_list,
                nodes: graph.nodes,
                edges: graph.edges,
            }
        }
        RankMode::VenueLinks => {
            let ranked_list = top_n(&accumulate_citations(papers, PaperRecord::authors), limit);
            let graph = build_venue_sankey(papers, &keys(&ranked_list));
            RankResult {
                ranked_list,
                nodes: graph.nodes,
                edges: graph.edges,
            }
        }
    }
}

fn keys(ranked: &[RankedEntry<String>]) -> Vec<String> {
    ranked.iter().map(|e| e.key.clone()).collect()
}
