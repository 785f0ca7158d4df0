//! Dataset loading: paper and connection CSVs, venue and subfield JSON.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{AtlasError, Result};
use crate::record::{Connection, PaperRecord, RawPaperRow, parse_year};

/// File name of the citation edge list inside a subfield directory.
pub const CONNECTIONS_FILE: &str = "connections.csv";
/// File name of the paper list inside a subfield directory.
pub const PAPERS_FILE: &str = "papers.csv";

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| AtlasError::DatasetUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Collects all paper CSV files under `path` (or `path` itself if it is a file).
/// Connection lists are skipped. Results are sorted for stable load order.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .filter(|p| p.file_name().is_none_or(|n| n != CONNECTIONS_FILE))
        .collect();
    files.sort();
    files
}

///Reads one paper CSV. Rows that fail to deserialize are skipped with a
///warning; the rest of the file is still loaded.
pub fn load_papers(path: &Path) -> Result<Vec<PaperRecord>> {
    let file = open(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let fallback_year = parse_year(&stem);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let mut rows = Vec::new();
    for (i, row) in reader.deserialize::<RawPaperRow>().enumerate() {
        match row {
            Ok(row) => rows.push((i + 1, row)),
            Err(e) => warn!("{}: skipping row {}: {e}", path.display(), i + 1),
        }
    }

    let papers: Vec<PaperRecord> = rows
        .into_par_iter()
        .map(|(n, row)| row.normalize(format!("{stem}:{n}"), fallback_year))
        .collect();
    debug!("{}: {} papers", path.display(), papers.len());
    Ok(papers)
}

///Loads every paper CSV under `path`.
pub fn load_dataset(path: &Path) -> Result<Vec<PaperRecord>> {
    if !path.exists() {
        return Err(AtlasError::DatasetUnavailable {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        });
    }
    let files = collect_files(path);
    if files.is_empty() {
        return Err(AtlasError::NoInput(path.to_path_buf()));
    }
    let mut papers = Vec::new();
    for file in &files {
        papers.extend(load_papers(file)?);
    }
    info!("Loaded {} papers from {} file(s)", papers.len(), files.len());
    Ok(papers)
}

///Reads a `source,target` citation list.
pub fn load_connections(path: &Path) -> Result<Vec<Connection>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);
    let mut connections = Vec::new();
    for (i, row) in reader.deserialize::<Connection>().enumerate() {
        match row {
            Ok(c) => connections.push(c),
            Err(e) => warn!("{}: skipping connection {}: {e}", path.display(), i + 1),
        }
    }
    Ok(connections)
}

/// Venue description shown next to a sankey venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Deserialize)]
struct VenueFile {
    venues: Vec<VenueInfo>,
}

/// Venue metadata keyed by trimmed, lowercased name.
#[derive(Debug, Clone, Default)]
pub struct VenueDirectory {
    venues: HashMap<String, VenueInfo>,
}

impl VenueDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let file: VenueFile = serde_json::from_reader(open(path)?)?;
        Ok(Self::from_venues(file.venues))
    }

    pub fn from_venues(venues: impl IntoIterator<Item = VenueInfo>) -> Self {
        let venues = venues
            .into_iter()
            .map(|v| (venue_key(&v.name), v))
            .collect();
        Self { venues }
    }

    pub fn get(&self, name: &str) -> Option<&VenueInfo> {
        self.venues.get(&venue_key(name))
    }

    /// Metadata for `name`, or a placeholder entry when none is known.
    pub fn describe(&self, name: &str) -> VenueInfo {
        self.get(name).cloned().unwrap_or_else(|| VenueInfo {
            name: name.trim().to_string(),
            url: String::new(),
            info: "No metadata available.".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

fn venue_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One entry of the subfield taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    pub text: String,
    #[serde(default)]
    pub field: Vec<String>,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub desc: String,
    /// Directory holding the subfield's `papers.csv` and `connections.csv`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Subfield {
    pub fn is_root(&self) -> bool {
        self.field.iter().any(|f| f == "root")
    }

    /// Dataset directory, resolved against `base`. `None` when the subfield
    /// has no dataset.
    pub fn dataset_dir(&self, base: &Path) -> Option<PathBuf> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| base.join(p))
    }
}

///Reads the subfield taxonomy.
pub fn load_subfields(path: &Path) -> Result<Vec<Subfield>> {
    Ok(serde_json::from_reader(open(path)?)?)
}

///Finds a subfield by its display text (case-insensitive).
pub fn find_subfield<'a>(subfields: &'a [Subfield], text: &str) -> Option<&'a Subfield> {
    subfields
        .iter()
        .find(|s| s.text.eq_ignore_ascii_case(text.trim()))
}

///Dataset directory of the subfield named `name` in the taxonomy at
///`taxonomy`. Subfield paths are relative to the taxonomy file's directory.
pub fn subfield_dataset_dir(taxonomy: &Path, name: &str) -> Result<PathBuf> {
    let subfields = load_subfields(taxonomy)?;
    let subfield = find_subfield(&subfields, name)
        .ok_or_else(|| AtlasError::UnknownSubfield(name.to_string()))?;
    let base = taxonomy.parent().unwrap_or(Path::new("."));
    subfield
        .dataset_dir(base)
        .ok_or_else(|| AtlasError::SubfieldWithoutDataset(subfield.text.clone()))
}

/// Identifies one load request; see [`RequestSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Last-request-wins bookkeeping for reloads triggered by user input.
///
/// Each request takes a ticket before loading. When a load finishes, its
/// result is only applied if no newer ticket has been issued in the meantime,
/// so slow, stale loads can't overwrite fresher ones.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Returns `value` if `ticket` is still the latest request, else drops it.
    pub fn accept<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!("discarding stale result of request {}", ticket.0);
            None
        }
    }
}
