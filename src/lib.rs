#![forbid(unsafe_code)]
//! # citation_atlas
//!
//! Turns a research-publication dataset (papers, authors, venues, citations)
//! into the plain data a chart needs: ranked author and paper lists, co-author
//! networks, author → venue sankey flows, citation networks and venue → paper
//! sunbursts.
//!
//! Layout and drawing are left to whoever consumes the results; this crate
//! only parses, aggregates, ranks and builds nodes and edges.
//!
//! ## Example
//! ```
//! use citation_atlas::{PaperRecord, RankMode, rank};
//!
//! let papers = vec![
//!     PaperRecord::new("p1", "A;B;C", 10),
//!     PaperRecord::new("p2", "B;C", 5),
//! ];
//! let result = rank(&papers, 3, RankMode::CoAuthor);
//! assert_eq!(result.ranked_list[0].key, "B");
//! assert_eq!(result.edges.len(), 3);
//! ```

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod export;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod sunburst;
pub mod topn;

pub use aggregate::{
    FrequencyMap, PairKey, VenueLink, accumulate_citations, accumulate_cooccurrence,
    accumulate_paper_counts, accumulate_venue_links,
};
pub use dataset::{
    RequestSequencer, RequestTicket, Subfield, VenueDirectory, VenueInfo, collect_files,
    find_subfield, load_connections, load_dataset, load_papers, load_subfields,
    subfield_dataset_dir,
};
pub use error::{AtlasError, Result};
pub use export::{
    ExportFormat, csv_safe_cell, export_citation_graph, export_paper_list, export_rank_result,
    export_sunburst, format_citation_text, format_paper_text, format_rank_text,
    format_sunburst_text,
};
pub use graph::{
    CitationGraph, Graph, GraphEdge, GraphNode, NodeKind, build_citation_graph,
    build_coauthor_graph, build_venue_sankey,
};
pub use parser::{coerce_count, normalize_venue, parse_author_list, split_keywords};
pub use pipeline::{
    PaperEntry, PaperFilter, RankMode, RankOptions, RankResult, paper_list, rank, rank_with,
    select_papers,
};
pub use record::{Connection, PaperRecord, RawPaperRow};
pub use sunburst::{SunburstLimits, SunburstNode, UNKNOWN_VENUE, build_citation_sunburst};
pub use topn::{RankedEntry, top_n, top_papers};
