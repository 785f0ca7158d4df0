//! Integration tests for `citation_atlas`.
//
// This suite verifies:
// - Dataset loading (column aliases, sentinels, yearly directories, JSON-ish author lists)
// - Ranking pipeline behavior on loaded data (worked example, determinism, filters)
// - CLI behavior for every chart mode and export format
//
// Notes:
// - CLI tests run the binary with a per-process working directory (no global CWD change).
// - Tests that change global CWD (library-level outputs) are marked #[serial].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use csv::WriterBuilder;
use predicates::prelude::*;
use regex::Regex;
use serde_json::Value as Json;
use serial_test::serial;
use tempfile::tempdir;

use citation_atlas::{
    ExportFormat, PaperFilter, RankMode, RankOptions, SunburstLimits, accumulate_cooccurrence,
    build_citation_sunburst, export_rank_result, load_dataset, rank, rank_with, top_n,
};

// --------------------- helpers ---------------------

/// Create a file with content in a temp dir.
fn write_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let f = dir.child(name);
    f.write_str(content).unwrap();
    f.path().to_path_buf()
}

/// Write a CSV file from a header and rows.
fn write_csv(path: &Path, header: &[&str], rows: &[&[&str]]) {
    let mut wtr = WriterBuilder::new().from_path(path).unwrap();
    wtr.write_record(header).unwrap();
    for row in rows {
        wtr.write_record(*row).unwrap();
    }
    wtr.flush().unwrap();
}

/// Semantic-Scholar style export: `authors`, `citationCount`, `venue`.
fn write_papers(dir: &assert_fs::TempDir, name: &str) -> PathBuf {
    let p = dir.child(name).path().to_path_buf();
    write_csv(
        &p,
        &["paper_id", "title", "authors", "year", "venue", "citationCount", "url"],
        &[
            &["p1", "Deep Things", "A;B;C", "2020", "ICML", "10", "https://x/p1"],
            &["p2", "Wide Things", "B;C", "2021", "NeurIPS", "5", ""],
            &["p3", "Old Things", "D; nan", "2021", "n/a", "", ""],
        ],
    );
    p
}

/// Run CLI successfully with a specific working directory.
fn run_cli_ok_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("citation_atlas").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().success()
}

/// Run CLI expecting failure with a specific working directory.
fn run_cli_fail_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("citation_atlas").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().failure()
}

/// Find an export file that ends with a given suffix (e.g., "_ranked.json").
fn find_with_suffix(dir: &Path, suffix: &str) -> PathBuf {
    for entry in fs::read_dir(dir).unwrap().filter_map(|e| e.ok()) {
        let p = entry.path();
        if let Some(name) = p.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(suffix) {
                return p;
            }
        }
    }
    panic!("No file found ending with {}", suffix);
}

fn load_json(dir: &Path, suffix: &str) -> Json {
    let s = fs::read_to_string(find_with_suffix(dir, suffix)).unwrap();
    serde_json::from_str(&s).expect("valid json")
}

// --------------------- library tests ---------------------

#[test]
fn lib_worked_example() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = td.child("papers.csv").path().to_path_buf();
    write_csv(
        &p,
        &["authors", "citationCount"],
        &[&["A;B;C", "10"], &["B;C", "5"]],
    );
    let papers = load_dataset(&p).unwrap();

    let totals = citation_atlas::accumulate_citations(&papers, |p| p.authors());
    assert_eq!(totals.get("A"), Some(10));
    assert_eq!(totals.get("B"), Some(15));
    assert_eq!(totals.get("C"), Some(15));

    let pairs = accumulate_cooccurrence(&papers);
    let rendered: Vec<(String, u64)> = pairs.iter().map(|(k, v)| (k.to_string(), v)).collect();
    assert_eq!(
        rendered,
        vec![
            ("A|B".to_string(), 1),
            ("A|C".to_string(), 1),
            ("B|C".to_string(), 2)
        ]
    );

    let top = top_n(&totals, 2);
    assert_eq!(top[0].key, "B");
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[1].key, "C");
    assert_eq!(top[1].value, 15);
}

#[test]
fn lib_loads_aliases_and_sentinels() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = td.child("dblp.csv").path().to_path_buf();
    write_csv(
        &p,
        &["id", "title", "author_name", "n_citation", "venue_name", "venue_type", "keyword", "doi"],
        &[
            &["d1", "A book", "Knuth", "900.0", "Addison", "book", "algorithms", ""],
            &["d2", "A paper", "Knuth;nan", "many", " N/A ", "journal", "tex; typesetting", "10.1/x"],
            &["d3", "", "", "3", "SODA", "conference", "", ""],
        ],
    );
    let papers = load_dataset(&p).unwrap();
    assert_eq!(papers.len(), 3);

    assert_eq!(papers[0].citation_count, 900);
    assert_eq!(papers[0].venue, None, "book venues are excluded");
    assert_eq!(papers[1].citation_count, 0, "non-numeric citations coerce to 0");
    assert_eq!(papers[1].venue, None);
    assert_eq!(papers[1].authors(), vec!["Knuth"]);
    assert_eq!(papers[1].keywords, vec!["tex", "typesetting"]);
    assert_eq!(papers[1].doi.as_deref(), Some("10.1/x"));
    assert_eq!(papers[2].venue.as_deref(), Some("SODA"));
    assert!(papers[2].authors().is_empty());
}

#[test]
fn lib_quoted_json_authors() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = td.child("cs_conference_journals.csv").path().to_path_buf();
    write_csv(
        &p,
        &["paperId", "title", "authors", "citationCount", "venue"],
        &[
            &["s1", "T1", "[{'authorId': '1', 'name': 'Ada'}, {'authorId': '2', 'name': 'Alan'}]", "7", "Nature"],
            &["s2", "T2", "[{'authorId': '2', 'name': 'Alan'}]", "3", "Nature"],
        ],
    );
    let papers = load_dataset(&p).unwrap();
    let r = rank(&papers, 5, RankMode::VenueLinks);
    let keys: Vec<&str> = r.ranked_list.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["Alan", "Ada"]);
    let nature = r.nodes.iter().find(|n| n.id == "V:Nature").unwrap();
    assert_eq!(nature.weight, 3);
}

#[test]
fn lib_repr_authors_with_apostrophes_never_become_one_name() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = td.child("cs_conference_journals.csv").path().to_path_buf();
    write_csv(
        &p,
        &["paperId", "title", "authors", "citationCount", "venue"],
        &[
            &["s1", "T1", r#"[{'authorId': '1', 'name': "Sean O'Brien"}, {'authorId': '2', 'name': 'Ada'}]"#, "7", "Nature"],
            &["s2", "T2", "[{'authorId': '3', 'name': 'Trunc", "4", "Nature"],
        ],
    );
    let papers = load_dataset(&p).unwrap();
    assert!(papers[1].authors().is_empty());

    let r = rank(&papers, 10, RankMode::Citations);
    let keys: Vec<&str> = r.ranked_list.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["Sean O'Brien", "Ada"]);
    let coauthors = rank(&papers, 10, RankMode::CoAuthor);
    assert_eq!(coauthors.edges.len(), 1);
    assert!(coauthors.nodes.iter().all(|n| !n.id.starts_with('[')));
}

#[test]
fn lib_yearly_directory_uses_file_names_as_years() {
    let td = assert_fs::TempDir::new().unwrap();
    let trending = td.child("trending");
    trending.create_dir_all().unwrap();
    write_csv(
        &trending.child("2019.csv").path().to_path_buf(),
        &["title", "authors", "citationCount"],
        &[&["Old", "A", "50"]],
    );
    write_csv(
        &trending.child("2020.csv").path().to_path_buf(),
        &["title", "authors", "citationCount"],
        &[&["New", "B", "70"], &["Newer", "A;B", "20"]],
    );
    write_csv(
        &trending.child("connections.csv").path().to_path_buf(),
        &["source", "target"],
        &[&["x", "y"]],
    );

    let papers = load_dataset(trending.path()).unwrap();
    assert_eq!(papers.len(), 3, "connections.csv must not be read as papers");
    assert_eq!(papers[0].year, Some(2019));
    assert_eq!(papers[0].id, "2019:1");

    let options = RankOptions {
        filter: PaperFilter {
            year: Some(2020),
            ..Default::default()
        },
        ..Default::default()
    };
    let r = rank_with(&papers, &options);
    let got: Vec<(&str, u64)> = r.ranked_list.iter().map(|e| (e.key.as_str(), e.value)).collect();
    assert_eq!(got, vec![("B", 90), ("A", 20)]);
}

#[test]
fn lib_rank_is_byte_for_byte_deterministic() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    let papers = load_dataset(&p).unwrap();
    for mode in [RankMode::Citations, RankMode::CoAuthor, RankMode::VenueLinks] {
        let first = serde_json::to_string(&rank(&papers, 10, mode)).unwrap();
        let second = serde_json::to_string(&rank(&papers, 10, mode)).unwrap();
        assert_eq!(first, second);
        let v: Json = serde_json::from_str(&first).unwrap();
        assert!(v.get("rankedList").is_some());
        assert!(v.get("nodes").is_some());
        assert!(v.get("edges").is_some());
    }
}

#[test]
fn lib_sunburst_on_loaded_data_keeps_main_paper() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    let papers = load_dataset(&p).unwrap();
    let limits = SunburstLimits {
        max_venues: 1,
        max_papers_per_venue: 1,
        max_total_papers: 1,
    };
    // p3 has venue "n/a": it lands in the Unknown Venue bucket.
    let tree = build_citation_sunburst(&papers, "p3", limits).unwrap();
    assert!(tree.contains_paper("p3"));
    assert!(tree.children.iter().any(|c| c.name == "Unknown Venue"));
}

#[test]
fn lib_missing_dataset_is_unavailable() {
    let td = tempdir().unwrap();
    let err = load_dataset(&td.path().join("missing.csv")).unwrap_err();
    assert!(err.to_string().contains("Dataset unavailable"));
}

#[test]
#[serial]
fn lib_export_into_current_dir() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    let papers = load_dataset(&p).unwrap();
    let r = rank(&papers, 3, RankMode::CoAuthor);

    std::env::set_current_dir(td.path()).unwrap();
    let written = export_rank_result(&r, Path::new("."), "papers", ExportFormat::Tsv).unwrap();
    assert_eq!(written.len(), 3);

    let re = Regex::new(r"papers_\d{8}_\d{6}_(ranked|nodes|edges)\.tsv$").unwrap();
    let matches = fs::read_dir(td.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| re.is_match(e.file_name().to_string_lossy().as_ref()))
        .count();
    assert_eq!(matches, 3);

    let edges = fs::read_to_string(find_with_suffix(td.path(), "_edges.tsv")).unwrap();
    assert!(edges.starts_with("source\ttarget\tweight"));
}

// --------------------- CLI tests ---------------------

#[test]
fn cli_nonexistent_path_fails() {
    let td = tempdir().unwrap();
    let bad = td.path().join("does_not_exist_here.csv");
    run_cli_fail_in(td.path(), &[bad.to_string_lossy().as_ref()])
        .stderr(predicate::str::contains("Dataset unavailable"));
}

#[test]
fn cli_citations_txt_to_stdout() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_ok_in(td.path(), &[p.to_string_lossy().as_ref(), "--limit", "2"]).stdout(
        predicate::str::contains("1. B (15)")
            .and(predicate::str::contains("2. C (15)"))
            .and(predicate::str::contains("A (10)").not()),
    );
}

#[test]
fn cli_coauthor_export_json() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_ok_in(
        td.path(),
        &[
            p.to_string_lossy().as_ref(),
            "--mode",
            "coauthor",
            "--limit",
            "3",
            "--export-format",
            "json",
        ],
    );

    let re = Regex::new(r"papers_\d{8}_\d{6}_ranked\.json$").unwrap();
    let found = fs::read_dir(td.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| re.is_match(e.file_name().to_string_lossy().as_ref()));
    assert!(found, "Expected papers_*_ranked.json in temp dir");

    let nodes = load_json(td.path(), "_nodes.json");
    let edges = load_json(td.path(), "_edges.json");
    let ids: HashSet<&str> = nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    for e in edges.as_array().unwrap() {
        assert!(ids.contains(e["source"].as_str().unwrap()), "dangling source");
        assert!(ids.contains(e["target"].as_str().unwrap()), "dangling target");
    }
    assert_eq!(nodes[0]["kind"], "author");
}

#[test]
fn cli_venue_links_csv_with_filters() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_ok_in(
        td.path(),
        &[
            p.to_string_lossy().as_ref(),
            "--mode",
            "venue-links",
            "--year",
            "2021",
            "--export-format",
            "csv",
        ],
    );
    let edges = fs::read_to_string(find_with_suffix(td.path(), "_edges.csv")).unwrap();
    assert!(edges.contains("A:B,V:NeurIPS,1"));
    assert!(!edges.contains("ICML"), "2020 paper must be filtered out");
}

#[test]
fn cli_venue_metadata_in_text_output() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    let venues = write_file(
        &td,
        "venues.json",
        r#"{"venues": [{"name": "icml", "url": "https://icml.cc", "info": "Machine learning conference"}]}"#,
    );
    run_cli_ok_in(
        td.path(),
        &[
            p.to_string_lossy().as_ref(),
            "--mode",
            "venue-links",
            "--venues",
            venues.to_string_lossy().as_ref(),
        ],
    )
    .stdout(
        predicate::str::contains("Machine learning conference")
            .and(predicate::str::contains("NeurIPS: No metadata available.")),
    );
}

#[test]
fn cli_citation_network_via_subfield() {
    let td = assert_fs::TempDir::new().unwrap();
    let sec = td.child("data").child("security");
    sec.create_dir_all().unwrap();
    write_csv(
        &sec.child("papers.csv").path().to_path_buf(),
        &["paper_id", "title", "authors", "year", "venue", "url"],
        &[
            &["root", "Spotlight", "Ada; Alan", "2010", "S&P", ""],
            &["r1", "Reference One", "Grace", "2001", "CCS", ""],
            &["r2", "Reference Two", "Alan", "2005", "CCS", ""],
        ],
    );
    write_csv(
        &sec.child("connections.csv").path().to_path_buf(),
        &["source", "target"],
        &[&["root", "r1"], &["root", "r2"], &["r2", "r1"]],
    );
    let taxonomy = write_file(
        &td,
        "subfields.json",
        r#"[{"text": "System Security", "field": ["systems"], "size": 30, "desc": "", "path": "data/security"}]"#,
    );

    run_cli_ok_in(
        td.path(),
        &[
            "--subfields",
            taxonomy.to_string_lossy().as_ref(),
            "--subfield",
            "system security",
            "--mode",
            "citation-network",
            "--limit",
            "2",
        ],
    )
    .stdout(
        predicate::str::contains("Main paper: r1")
            .and(predicate::str::contains("Reference Two [r2] cited 1 time(s)"))
            .and(predicate::str::contains("Citations: 1")),
    );
}

#[test]
fn cli_sunburst_json_contains_main_paper() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_ok_in(
        td.path(),
        &[
            p.to_string_lossy().as_ref(),
            "--mode",
            "sunburst",
            "--main-paper",
            "p2",
            "--max-venues",
            "1",
            "--max-papers-per-venue",
            "1",
            "--max-total-papers",
            "1",
            "--export-format",
            "json",
        ],
    );
    let tree = load_json(td.path(), "_sunburst.json");
    let text = tree.to_string();
    assert!(text.contains("\"id\":\"p2\""), "main paper must be in the tree");
    assert_eq!(tree["name"], "root");
}

#[test]
fn cli_sunburst_unknown_main_paper_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_fail_in(
        td.path(),
        &[p.to_string_lossy().as_ref(), "--mode", "sunburst", "--main-paper", "ghost"],
    )
    .stderr(predicate::str::contains("Unknown paper id: ghost"));
}

#[test]
fn cli_without_dataset_fails() {
    let td = tempdir().unwrap();
    run_cli_fail_in(td.path(), &["--mode", "citations"])
        .stderr(predicate::str::contains("No dataset given"));
}

/// Papers with abstracts, for the paper list chart.
fn write_detailed_papers(dir: &assert_fs::TempDir) -> PathBuf {
    let p = dir.child("most_cited.csv").path().to_path_buf();
    write_csv(
        &p,
        &["paperId", "title", "authors", "year", "venue", "citationCount", "url", "abstract"],
        &[
            &["m1", "Less Cited", "Ada; Alan", "2019", "ICML", "12", "https://x/m1", "First abstract."],
            &["m2", "Most Cited", "Grace", "2020", "NeurIPS", "90", "", "Second abstract."],
            &["m3", "Middle", "Ada", "2021", "", "40", "", ""],
        ],
    );
    p
}

#[test]
fn cli_papers_txt_lists_details() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_detailed_papers(&td);
    let out = run_cli_ok_in(
        td.path(),
        &[p.to_string_lossy().as_ref(), "--mode", "papers", "--limit", "2"],
    )
    .get_output()
    .stdout
    .clone();
    let text = String::from_utf8(out).unwrap();
    let first = text.find("1. Most Cited (2020) cited 90 time(s)").unwrap();
    let second = text.find("2. Middle (2021) cited 40 time(s)").unwrap();
    assert!(first < second);
    assert!(text.contains("Abstract: Second abstract."));
    assert!(!text.contains("Less Cited"));
}

#[test]
fn cli_papers_of_one_author_as_json() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_detailed_papers(&td);
    run_cli_ok_in(
        td.path(),
        &[
            p.to_string_lossy().as_ref(),
            "--mode",
            "papers",
            "--author",
            "Ada",
            "--export-format",
            "json",
        ],
    );
    let list = load_json(td.path(), "_papers.json");
    let list = list.as_array().unwrap();
    let ids: Vec<&str> = list.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["m3", "m1"]);
    assert_eq!(list[1]["authors"], serde_json::json!(["Ada", "Alan"]));
    assert_eq!(list[1]["abstract"], "First abstract.");
    assert_eq!(list[1]["url"], "https://x/m1");
    assert_eq!(list[0]["venue"], Json::Null);
}

#[test]
fn cli_unknown_subfield_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let taxonomy = write_file(
        &td,
        "subfields.json",
        r#"[{"text": "System Security", "field": ["systems"], "path": "data/security"}]"#,
    );
    run_cli_fail_in(
        td.path(),
        &["--subfields", taxonomy.to_string_lossy().as_ref(), "--subfield", "Robotics"],
    )
    .stderr(predicate::str::contains("Unknown subfield: Robotics"));
}

#[test]
fn cli_sunburst_on_empty_selection_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let p = write_papers(&td, "papers.csv");
    run_cli_fail_in(
        td.path(),
        &[p.to_string_lossy().as_ref(), "--mode", "sunburst", "--year", "1990"],
    )
    .stderr(predicate::str::contains("No papers match the selection"));
}
