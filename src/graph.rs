//! Node/edge collections handed to the renderer.
//!
//! Every builder upholds the same invariant: an edge never references a node
//! id that is missing from the node list it is returned with.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::{
    FrequencyMap, accumulate_cooccurrence, accumulate_paper_counts, accumulate_venue_links,
};
use crate::record::{Connection, PaperRecord};
use crate::topn::top_n;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Author,
    Venue,
    Paper,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    /// Display text. Equal to `id` except where ids carry a kind prefix.
    pub label: String,
    pub kind: NodeKind,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    /// True when every edge endpoint is a node of this graph.
    pub fn is_closed(&self) -> bool {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .all(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
    }
}

///Co-author network restricted to `top_authors`.
///
///Nodes follow the order of `top_authors` and carry the author's paper
///count. Edges are co-authorships between two retained authors. With
///`include_isolated` false, authors without any retained co-author are
///dropped.
pub fn build_coauthor_graph(
    papers: &[PaperRecord],
    top_authors: &[String],
    include_isolated: bool,
) -> Graph {
    let retained: HashSet<&str> = top_authors.iter().map(String::as_str).collect();
    let paper_counts = accumulate_paper_counts(papers);

    let edges: Vec<GraphEdge> = accumulate_cooccurrence(papers)
        .iter()
        .filter(|(pair, _)| retained.contains(pair.first()) && retained.contains(pair.second()))
        .map(|(pair, weight)| GraphEdge {
            source: pair.first().to_string(),
            target: pair.second().to_string(),
            weight,
        })
        .collect();

    let connected: HashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    let mut seen = HashSet::new();
    let nodes = top_authors
        .iter()
        .filter(|a| seen.insert(a.as_str()))
        .filter(|a| include_isolated || connected.contains(a.as_str()))
        .map(|a| GraphNode {
            id: a.clone(),
            label: a.clone(),
            kind: NodeKind::Author,
            weight: paper_counts.get(a.as_str()).unwrap_or(0),
        })
        .collect();

    Graph { nodes, edges }
}

/// Node id of an author in the sankey.
pub fn author_node_id(name: &str) -> String {
    format!("A:{name}")
}

/// Node id of a venue in the sankey.
pub fn venue_node_id(name: &str) -> String {
    format!("V:{name}")
}

///Author → venue flows for `top_authors`.
///
///Author and venue ids are prefixed (`A:`/`V:`) so a venue named like an
///author stays a separate node. Nodes appear in first-seen order; a node's
///weight is the sum of its flows.
pub fn build_venue_sankey(papers: &[PaperRecord], top_authors: &[String]) -> Graph {
    let retained: HashSet<&str> = top_authors.iter().map(String::as_str).collect();
    let mut nodes: IndexMap<String, GraphNode> = IndexMap::new();
    let mut edges = Vec::new();

    for (link, weight) in accumulate_venue_links(papers).iter() {
        if !retained.contains(link.author.as_str()) {
            continue;
        }
        let source = author_node_id(&link.author);
        let target = venue_node_id(&link.venue);
        bump_node(&mut nodes, &source, &link.author, NodeKind::Author, weight);
        bump_node(&mut nodes, &target, &link.venue, NodeKind::Venue, weight);
        edges.push(GraphEdge {
            source,
            target,
            weight,
        });
    }

    Graph {
        nodes: nodes.into_values().collect(),
        edges,
    }
}

fn bump_node(
    nodes: &mut IndexMap<String, GraphNode>,
    id: &str,
    label: &str,
    kind: NodeKind,
    weight: u64,
) {
    nodes
        .entry(id.to_string())
        .or_insert_with(|| GraphNode {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            weight: 0,
        })
        .weight += weight;
}

/// Citation network plus the paper it is centred on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationGraph {
    #[serde(flatten)]
    pub graph: Graph,
    /// Most cited retained paper. `None` only for an empty graph.
    pub main_paper: Option<String>,
}

///Citation network of the `limit` most cited papers.
///
///A paper's weight is the number of connections that target it. Only papers
///that appear in some connection and exist in `papers` are candidates.
pub fn build_citation_graph(
    papers: &[PaperRecord],
    connections: &[Connection],
    limit: usize,
) -> CitationGraph {
    let by_id: HashMap<&str, &PaperRecord> = papers.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut in_degree = FrequencyMap::new();
    for c in connections {
        for id in [&c.source, &c.target] {
            if by_id.contains_key(id.as_str()) {
                in_degree.add(id.clone(), 0);
            }
        }
        if by_id.contains_key(c.target.as_str()) {
            in_degree.add(c.target.clone(), 1);
        }
    }

    let ranked = top_n(&in_degree, limit);
    let retained: HashSet<&str> = ranked.iter().map(|e| e.key.as_str()).collect();

    let nodes: Vec<GraphNode> = ranked
        .iter()
        .map(|e| {
            let title = by_id
                .get(e.key.as_str())
                .map(|p| p.title.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| e.key.clone());
            GraphNode {
                id: e.key.clone(),
                label: title,
                kind: NodeKind::Paper,
                weight: e.value,
            }
        })
        .collect();

    let edges = connections
        .iter()
        .filter(|c| retained.contains(c.source.as_str()) && retained.contains(c.target.as_str()))
        .map(|c| GraphEdge {
            source: c.source.clone(),
            target: c.target.clone(),
            weight: 1,
        })
        .collect();

    CitationGraph {
        main_paper: ranked.first().map(|e| e.key.clone()),
        graph: Graph { nodes, edges },
    }
}
