#![forbid(unsafe_code)]
//! # Citation Atlas CLI
//!
//! Command-line front end for the `citation_atlas` crate. Loads a paper
//! dataset (a CSV file or a directory of CSV files) and prints or exports the
//! data behind one chart: top authors, most cited papers, co-author network,
//! author → venue sankey, citation network or venue sunburst.
//!
//! ## Example
//! ```bash
//! cargo run --release -- data/high_citations_all_dblp.csv --mode venue-links --limit 10 --export-format json
//! ```
//!
//! Set `RUST_LOG=debug` for details on skipped rows and parsing fallbacks.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use log::{error, info};

use citation_atlas::{
    AtlasError, ExportFormat, PaperFilter, RankMode, RankOptions, Result, SunburstLimits,
    VenueDirectory, build_citation_graph, build_citation_sunburst, dataset,
    export_citation_graph, export_paper_list, export_rank_result, export_sunburst,
    format_citation_text, format_paper_text, format_rank_text, format_sunburst_text,
    load_connections, load_dataset, paper_list, rank_with, select_papers,
    subfield_dataset_dir, top_papers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Chart {
    /// Top authors by total citations
    Citations,
    /// Most cited papers with authors, venue, url and abstract
    Papers,
    /// Top authors by paper count and their co-author links
    Coauthor,
    /// Top authors by citations and the venues they publish in
    VenueLinks,
    /// Most cited papers of a subfield and the citations between them
    CitationNetwork,
    /// Venue → paper hierarchy around one paper
    Sunburst,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Paper CSV file, or directory of CSV files
    path: Option<PathBuf>,

    /// Chart to compute
    #[arg(long, value_enum, default_value = "citations")]
    mode: Chart,

    /// Number of top entries (authors, or papers for the papers and citation network charts)
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Only use the N most cited papers (after filtering)
    #[arg(long)]
    paper_limit: Option<usize>,

    /// Only papers published in this year
    #[arg(long)]
    year: Option<i32>,

    /// Only papers from this venue (case-insensitive)
    #[arg(long)]
    venue: Option<String>,

    /// Only papers with this author
    #[arg(long)]
    author: Option<String>,

    /// Only papers tagged with this keyword (case-insensitive)
    #[arg(long)]
    keyword: Option<String>,

    /// Drop co-authors without any link to another top author
    #[arg(long, default_value_t = false)]
    drop_isolated: bool,

    /// Citation list for the citation network (default: connections.csv next to the papers)
    #[arg(long)]
    connections: Option<PathBuf>,

    /// Subfield taxonomy JSON; with --subfield, selects the dataset directory
    #[arg(long)]
    subfields: Option<PathBuf>,

    /// Subfield whose dataset should be loaded (requires --subfields)
    #[arg(long, requires = "subfields")]
    subfield: Option<String>,

    /// Venue metadata JSON used to describe venues in text output
    #[arg(long)]
    venues: Option<PathBuf>,

    /// Paper at the centre of the sunburst (default: most cited paper)
    #[arg(long)]
    main_paper: Option<String>,

    /// Maximum number of venues in the sunburst
    #[arg(long, default_value_t = SunburstLimits::default().max_venues)]
    max_venues: usize,

    /// Maximum number of papers per venue in the sunburst
    #[arg(long, default_value_t = SunburstLimits::default().max_papers_per_venue)]
    max_papers_per_venue: usize,

    /// Maximum number of papers in the sunburst
    #[arg(long, default_value_t = SunburstLimits::default().max_total_papers)]
    max_total_papers: usize,

    /// Output format (txt prints to stdout; csv, tsv, json write files)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl Cli {
    fn filter(&self) -> PaperFilter {
        PaperFilter {
            year: self.year,
            venue: self.venue.clone(),
            author: self.author.clone(),
            keyword: self.keyword.clone(),
        }
    }

    fn sunburst_limits(&self) -> SunburstLimits {
        SunburstLimits {
            max_venues: self.max_venues,
            max_papers_per_venue: self.max_papers_per_venue,
            max_total_papers: self.max_total_papers,
        }
    }

    fn rank_options(&self, mode: RankMode) -> RankOptions {
        RankOptions {
            mode,
            limit: self.limit,
            filter: self.filter(),
            paper_limit: self.paper_limit,
            include_isolated: !self.drop_isolated,
        }
    }
}

/// Resolves the dataset location from the positional path or the subfield
/// taxonomy.
fn dataset_path(cli: &Cli) -> Result<PathBuf> {
    if let (Some(taxonomy), Some(name)) = (&cli.subfields, &cli.subfield) {
        return subfield_dataset_dir(taxonomy, name);
    }
    cli.path.clone().ok_or(AtlasError::NoDatasetGiven)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

fn report_written(paths: &[PathBuf]) {
    for p in paths {
        info!("Wrote {}", p.display());
        println!("{}", p.display());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let path = dataset_path(cli)?;
    let papers = load_dataset(&path)?;
    let stem = file_stem(&path);

    match cli.mode {
        Chart::Citations | Chart::Coauthor | Chart::VenueLinks => {
            let mode = match cli.mode {
                Chart::Citations => RankMode::Citations,
                Chart::Coauthor => RankMode::CoAuthor,
                _ => RankMode::VenueLinks,
            };
            let result = rank_with(&papers, &cli.rank_options(mode));
            if cli.export_format == ExportFormat::Txt {
                let venues = match &cli.venues {
                    Some(p) => Some(VenueDirectory::load(p)?),
                    None => None,
                };
                print!("{}", format_rank_text(&result, venues.as_ref()));
            } else {
                let written = export_rank_result(&result, &cli.out_dir, &stem, cli.export_format)?;
                report_written(&written);
            }
        }
        Chart::Papers => {
            let list = paper_list(&papers, &cli.filter(), cli.limit);
            if cli.export_format == ExportFormat::Txt {
                print!("{}", format_paper_text(&list));
            } else {
                let written = export_paper_list(&list, &cli.out_dir, &stem, cli.export_format)?;
                report_written(&written);
            }
        }
        Chart::CitationNetwork => {
            let connections_path = match &cli.connections {
                Some(p) => p.clone(),
                None if path.is_dir() => path.join(dataset::CONNECTIONS_FILE),
                None => path
                    .parent()
                    .unwrap_or(Path::new("."))
                    .join(dataset::CONNECTIONS_FILE),
            };
            let connections = load_connections(&connections_path)?;
            let selected = select_papers(&papers, &cli.filter(), cli.paper_limit);
            let graph = build_citation_graph(&selected, &connections, cli.limit);
            if cli.export_format == ExportFormat::Txt {
                print!("{}", format_citation_text(&graph));
            } else {
                let written = export_citation_graph(&graph, &cli.out_dir, &stem, cli.export_format)?;
                report_written(&written);
            }
        }
        Chart::Sunburst => {
            let selected = select_papers(&papers, &cli.filter(), cli.paper_limit);
            let main_paper = match &cli.main_paper {
                Some(id) => id.clone(),
                None => top_papers(&selected, 1)
                    .first()
                    .map(|p| p.id.clone())
                    .or_else(|| selected.first().map(|p| p.id.clone()))
                    .ok_or(AtlasError::EmptySelection)?,
            };
            let tree = build_citation_sunburst(&selected, &main_paper, cli.sunburst_limits())?;
            if cli.export_format == ExportFormat::Txt {
                print!("{}", format_sunburst_text(&tree));
            } else {
                let written = export_sunburst(&tree, &cli.out_dir, &stem, cli.export_format)?;
                report_written(&written);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}
