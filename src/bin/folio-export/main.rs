//! CLI tool to export a portfolio snapshot.
//!
//! Usage:
//!   folio-export --input portfolio.json [--format html|print|word|folio|json]
//!                [--page <id>] [--nested] [--output <path>] [--config <path>]
//!                [--stats] [--verbose]

mod input;
mod transform;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use foliocraft::portfolio::TreeIndex;
use foliocraft::{BuilderConfig, ExportFormat, ExportMode, PortfolioManager};
use input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Standalone HTML page
    Html,
    /// HTML page that opens the print dialog (save as PDF)
    Print,
    /// Word-compatible .doc
    Word,
    /// Binary Automerge document
    Folio,
    /// JSON document state
    Json,
}

impl OutputFormat {
    fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Html => Some(ExportFormat::Html),
            Self::Print => Some(ExportFormat::Print),
            Self::Word => Some(ExportFormat::Word),
            Self::Folio | Self::Json => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Print => "print.html",
            Self::Word => "doc",
            Self::Folio => "folio",
            Self::Json => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "folio-export",
    about = "Export a portfolio snapshot to HTML, print, Word, binary or JSON",
    version
)]
struct Args {
    /// Input file: browser JSON snapshot, or a binary document (.folio)
    #[arg(short, long)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    format: OutputFormat,

    /// Page to export (defaults to the current page)
    #[arg(short, long)]
    page: Option<String>,

    /// Keep section/layout containers in the exported HTML
    #[arg(long, default_value = "false")]
    nested: bool,

    /// Output file path (defaults to input path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Builder configuration (JSON)
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Print statistics about the document
    #[arg(long, default_value = "false")]
    stats: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "foliocraft=debug,folio_export=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<BuilderConfig> {
    let Some(path) = path else {
        return Ok(BuilderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    BuilderConfig::from_json(&text).context("Failed to parse config")
}

fn load_manager(path: &Path, config: BuilderConfig) -> Result<PortfolioManager> {
    let is_binary = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("folio"));

    if is_binary {
        let bytes = std::fs::read(path).context("Failed to read input file")?;
        let mut manager =
            PortfolioManager::from_bytes(&bytes).context("Failed to load binary document")?;
        manager.set_config(config);
        return Ok(manager);
    }

    let json = std::fs::read_to_string(path).context("Failed to read input file")?;
    let snapshot: InputSnapshot = serde_json::from_str(&json).context("Failed to parse JSON")?;
    let root = transform::into_root(snapshot, &config)?;
    PortfolioManager::from_state(root, config).context("Failed to build document")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // 1. Validate input exists
    let input_path = &args.input;
    if !input_path.exists() {
        anyhow::bail!("Input file does not exist: {}", input_path.display());
    }

    // 2. Load configuration and document
    let config = load_config(args.config.as_deref())?;
    let mut manager = load_manager(input_path, config)?;
    let state = manager.get_state().context("Failed to read document state")?;
    debug!(
        components = state.components.len(),
        pages = state.pages.len(),
        "document loaded"
    );

    // 3. Resolve the page
    let page_id = args
        .page
        .clone()
        .or_else(|| state.current_page_id.clone())
        .unwrap_or_else(|| manager.config().default_page_id.clone());
    let Some(page) = state.page(&page_id) else {
        anyhow::bail!("Page '{}' does not exist", page_id);
    };

    // 4. Produce the output
    let mode = if args.nested {
        ExportMode::Nested
    } else {
        ExportMode::Flat
    };
    let bytes = match args.format.export_format() {
        Some(format) => manager
            .export_page_with(&page_id, format, mode)
            .context("Failed to export page")?
            .body
            .into_bytes(),
        None if args.format == OutputFormat::Folio => manager.save(),
        None => manager
            .export_json()
            .context("Failed to serialize document")?
            .into_bytes(),
    };

    // 5. Determine output path
    let output_path = args.output.clone().unwrap_or_else(|| {
        let mut path = input_path.clone();
        path.set_extension(args.format.extension());
        path
    });
    if output_path == *input_path {
        anyhow::bail!(
            "Refusing to overwrite the input file {}; pass --output",
            input_path.display()
        );
    }

    // 6. Write output
    std::fs::write(&output_path, &bytes).context("Failed to write output file")?;
    info!(path = %output_path.display(), bytes = bytes.len(), "output written");

    // 7. Optional stats
    if args.stats {
        let index = TreeIndex::new(&state.components);
        let on_page = state.components_on_page(&page_id).count();
        let dangling = state
            .components
            .iter()
            .filter_map(|c| c.parent_id.as_deref())
            .filter(|parent| !index.contains(parent))
            .count();
        let created = DateTime::from_timestamp_millis(page.created_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!();
        println!("Export statistics:");
        println!("  Page:       {} ({})", page.name, page.id);
        println!("  Created:    {}", created);
        println!();
        println!("  Pages:      {}", state.pages.len());
        println!("  Layouts:    {}", state.layouts.len());
        println!("  Components: {}", state.components.len());
        println!("  On page:    {}", on_page);
        println!("  Roots:      {}", index.roots(&page_id).len());
        println!("  Dangling:   {}", dangling);
        println!();
        println!("  Output:     {:>10} bytes", bytes.len());
    }

    println!();
    println!(
        "Successfully exported {} → {}",
        input_path.display(),
        output_path.display()
    );

    Ok(())
}
