//! Text, CSV/TSV and JSON output of ranking results.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use serde::Serialize;

use crate::dataset::VenueDirectory;
use crate::error::Result;
use crate::graph::{CitationGraph, GraphEdge, GraphNode, NodeKind};
use crate::pipeline::{PaperEntry, RankResult};
use crate::sunburst::SunburstNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

///Guards a cell against spreadsheet formula injection by prefixing a `'`
///when it starts with `=`, `+`, `-`, `@`, tab or carriage return.
/// # Example
/// ```
/// use citation_atlas::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=HYPERLINK(1)"), "'=HYPERLINK(1)");
/// assert_eq!(csv_safe_cell("Ada Lovelace"), "Ada Lovelace");
/// ```
pub fn csv_safe_cell(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS>_<table>.<ext>` inside `dir`.
fn output_path(dir: &Path, stem: &str, table: &str, format: ExportFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{stem}_{stamp}_{table}.{}", format.extension()))
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(content)?;
    Ok(())
}

fn write_table(
    path: &Path,
    format: ExportFormat,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(|c| csv_safe_cell(c)))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, json.as_bytes())
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Author => "author",
        NodeKind::Venue => "venue",
        NodeKind::Paper => "paper",
    }
}

fn export_graph_tables(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    dir: &Path,
    stem: &str,
    format: ExportFormat,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let nodes_path = output_path(dir, stem, "nodes", format);
    let edges_path = output_path(dir, stem, "edges", format);
    if format == ExportFormat::Json {
        write_json(&nodes_path, nodes)?;
        write_json(&edges_path, edges)?;
    } else {
        write_table(
            &nodes_path,
            format,
            &["id", "label", "kind", "weight"],
            nodes.iter().map(|n| {
                vec![
                    n.id.clone(),
                    n.label.clone(),
                    kind_name(n.kind).to_string(),
                    n.weight.to_string(),
                ]
            }),
        )?;
        write_table(
            &edges_path,
            format,
            &["source", "target", "weight"],
            edges
                .iter()
                .map(|e| vec![e.source.clone(), e.target.clone(), e.weight.to_string()]),
        )?;
    }
    written.push(nodes_path);
    written.push(edges_path);
    Ok(())
}

///Writes a ranking as `ranked`, `nodes` and `edges` tables (JSON: one file per
///table). Returns the written paths. `Txt` writes nothing; use
///[`format_rank_text`] instead.
pub fn export_rank_result(
    result: &RankResult,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if format == ExportFormat::Txt {
        return Ok(written);
    }
    let ranked_path = output_path(dir, stem, "ranked", format);
    if format == ExportFormat::Json {
        write_json(&ranked_path, &result.ranked_list)?;
    } else {
        write_table(
            &ranked_path,
            format,
            &["rank", "key", "value"],
            result
                .ranked_list
                .iter()
                .map(|e| vec![e.rank.to_string(), e.key.clone(), e.value.to_string()]),
        )?;
    }
    written.push(ranked_path);
    export_graph_tables(&result.nodes, &result.edges, dir, stem, format, &mut written)?;
    Ok(written)
}

///Writes a citation network as `nodes`/`edges` tables.
pub fn export_citation_graph(
    graph: &CitationGraph,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if format != ExportFormat::Txt {
        export_graph_tables(&graph.graph.nodes, &graph.graph.edges, dir, stem, format, &mut written)?;
    }
    Ok(written)
}

///Writes a sunburst. JSON keeps the tree; CSV/TSV flatten it to
///`venue,paper_id,title,citations` rows.
pub fn export_sunburst(
    tree: &SunburstNode,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let path = output_path(dir, stem, "sunburst", format);
    match format {
        ExportFormat::Txt => return Ok(Vec::new()),
        ExportFormat::Json => write_json(&path, tree)?,
        ExportFormat::Csv | ExportFormat::Tsv => write_table(
            &path,
            format,
            &["venue", "paper_id", "title", "citations"],
            tree.children.iter().flat_map(|venue| {
                venue.children.iter().map(|paper| {
                    vec![
                        venue.name.clone(),
                        paper.id.clone().unwrap_or_default(),
                        paper.name.clone(),
                        paper.value.to_string(),
                    ]
                })
            }),
        )?,
    }
    Ok(vec![path])
}

///Writes a paper list as one `papers` table. Authors are `; `-joined in
///CSV/TSV; JSON keeps them as an array.
pub fn export_paper_list(
    papers: &[PaperEntry],
    dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let path = output_path(dir, stem, "papers", format);
    match format {
        ExportFormat::Txt => return Ok(Vec::new()),
        ExportFormat::Json => write_json(&path, papers)?,
        ExportFormat::Csv | ExportFormat::Tsv => write_table(
            &path,
            format,
            &[
                "rank", "id", "title", "authors", "year", "venue", "citations", "url", "doi",
                "abstract",
            ],
            papers.iter().map(|p| {
                vec![
                    p.rank.to_string(),
                    p.id.clone(),
                    p.title.clone(),
                    p.authors.join("; "),
                    p.year.map(|y| y.to_string()).unwrap_or_default(),
                    p.venue.clone().unwrap_or_default(),
                    p.citations.to_string(),
                    p.url.clone().unwrap_or_default(),
                    p.doi.clone().unwrap_or_default(),
                    p.abstract_text.clone().unwrap_or_default(),
                ]
            }),
        )?,
    }
    Ok(vec![path])
}

///Human-readable paper list.
pub fn format_paper_text(papers: &[PaperEntry]) -> String {
    let mut out = String::new();
    for p in papers {
        let year = p.year.map(|y| format!(" ({y})")).unwrap_or_default();
        let _ = writeln!(out, "{:>4}. {}{} cited {} time(s)", p.rank, p.title, year, p.citations);
        let _ = writeln!(out, "      Authors: {}", p.authors.join(", "));
        if let Some(venue) = &p.venue {
            let _ = writeln!(out, "      Venue: {venue}");
        }
        if let Some(url) = &p.url {
            let _ = writeln!(out, "      {url}");
        }
        if let Some(text) = &p.abstract_text {
            let _ = writeln!(out, "      Abstract: {text}");
        }
    }
    out
}

///Human-readable ranking. Venue nodes are annotated from `venues` if given.
pub fn format_rank_text(result: &RankResult, venues: Option<&VenueDirectory>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ranking:");
    for e in &result.ranked_list {
        let _ = writeln!(out, "{:>4}. {} ({})", e.rank, e.key, e.value);
    }
    if !result.edges.is_empty() {
        let _ = writeln!(out, "\nLinks:");
        for e in &result.edges {
            let _ = writeln!(out, "  {} -> {} ({})", e.source, e.target, e.weight);
        }
    }
    if let Some(venues) = venues {
        let venue_nodes: Vec<&GraphNode> = result
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Venue)
            .collect();
        if !venue_nodes.is_empty() {
            let _ = writeln!(out, "\nVenues:");
            for node in venue_nodes {
                let info = venues.describe(&node.label);
                let _ = writeln!(out, "  {}: {}", info.name, info.info);
                if !info.url.is_empty() {
                    let _ = writeln!(out, "    {}", info.url);
                }
            }
        }
    }
    out
}

///Human-readable citation network.
pub fn format_citation_text(graph: &CitationGraph) -> String {
    let mut out = String::new();
    if let Some(main) = &graph.main_paper {
        let _ = writeln!(out, "Main paper: {main}");
    }
    let _ = writeln!(out, "Papers:");
    for n in &graph.graph.nodes {
        let _ = writeln!(out, "  {} [{}] cited {} time(s)", n.label, n.id, n.weight);
    }
    let _ = writeln!(out, "Citations: {}", graph.graph.edges.len());
    out
}

///Human-readable sunburst.
pub fn format_sunburst_text(tree: &SunburstNode) -> String {
    let mut out = String::new();
    for venue in &tree.children {
        let _ = writeln!(out, "{} ({} citations)", venue.name, venue.value);
        for paper in &venue.children {
            let _ = writeln!(out, "  {} ({})", paper.name, paper.value);
        }
    }
    out
}
