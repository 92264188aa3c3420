//! Command line front end: one document on save, a full sweep, or render to stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use export_logging::{export_info, LogDestination};
use flatexport_core::OutputFormat;
use flatexport_engine::{DocumentStore, Exporter, JsonFileStore};
use log::LevelFilter;

use crate::settings;

#[derive(Parser)]
#[command(name = "flatexport")]
#[command(author, version, about = "Mirror blog posts into a flat file tree")]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// RON settings file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// JSON dump of document records
    #[arg(long, short = 's', global = true, default_value = "documents.json")]
    store: PathBuf,

    /// Export root, overriding the settings file
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Rewrite every file regardless of timestamps
    #[arg(long, global = true)]
    force: bool,

    /// Body file format, overriding the settings file
    #[arg(long, short = 'f', global = true)]
    format: Option<FormatArg>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// No terminal logging; a `--log-file` still receives the log
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single document
    Export {
        /// Slug of the document
        slug: String,
    },
    /// Export every document in the store
    Sweep,
    /// Print the rendered body of a document instead of writing it
    Render {
        /// Slug of the document
        slug: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    FrontMatter,
    Sectioned,
    Raw,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::FrontMatter => OutputFormat::FrontMatter,
            FormatArg::Sectioned => OutputFormat::Sectioned,
            FormatArg::Raw => OutputFormat::Raw,
        }
    }
}

fn log_destination(quiet: bool, log_file: Option<PathBuf>) -> Option<LogDestination> {
    match (quiet, log_file) {
        (true, Some(path)) => Some(LogDestination::File(path)),
        (true, None) => None,
        (false, Some(path)) => Some(LogDestination::Both(path)),
        (false, None) => Some(LogDestination::Terminal),
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Some(destination) = log_destination(cli.quiet, cli.log_file.clone()) {
        export_logging::initialize(destination, level);
    }

    let mut config = settings::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    config.force |= cli.force;

    let exporter = Exporter::new(config).context("invalid export settings")?;
    let store = JsonFileStore::new(cli.store);

    match cli.command {
        Commands::Export { slug } => {
            let document = store.document(&slug)?;
            let report = exporter
                .export_one(&document)
                .with_context(|| format!("failed to export {slug:?}"))?;
            export_info!(
                "{}: body {}, {} comments written, {} attachments placed",
                report.slug,
                report.body,
                report.comments_written,
                report.attachments.placed()
            );
        }
        Commands::Sweep => {
            let summary = exporter.export_store(&store)?;
            if !summary.failures.is_empty() {
                bail!("{} documents failed to export", summary.failures.len());
            }
        }
        Commands::Render { slug } => {
            let document = store.document(&slug)?;
            print!("{}", exporter.render(&document)?);
        }
    }
    Ok(())
}
