//! Tracked Tables CLI - inspect and reconcile tracked tables stored in a document

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracked_tables::functions::{generate_json_map, make_sql, ColumnDef};
use tracked_tables::prelude::*;
use tracked_tables::{classify, LookupMiss};

#[derive(Parser)]
#[command(name = "tracked")]
#[command(
    author,
    version,
    about = "Inspect and reconcile tracked tables stored in a document"
)]
struct Cli {
    /// Options file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage key for the tracked tables (overrides the options file)
    #[arg(long, global = true)]
    key: Option<String>,

    /// Custom XML namespace for state parts (overrides the options file)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the difference between two header rows
    Diff {
        /// Previous header labels (comma separated)
        #[arg(long, value_delimiter = ',')]
        before: Vec<String>,

        /// Current header labels (comma separated)
        #[arg(long, value_delimiter = ',')]
        after: Vec<String>,
    },

    /// Start tracking a table in a document
    Init {
        /// Document (zip package) holding the state
        document: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Worksheet the table lives on
        #[arg(short, long)]
        sheet: String,

        /// Header range, e.g. A1:C1
        #[arg(short, long)]
        range: String,

        /// Columns as LABEL or LABEL=SOURCE
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Reconcile a tracked table against its current header row
    Apply {
        /// Document (zip package) holding the state
        document: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Current header labels
        #[arg(required = true)]
        labels: Vec<String>,

        /// Change notification type; without it the header is reconciled unconditionally
        #[arg(short, long)]
        event: Option<ChangeType>,

        /// Address reported by the change notification (default: the header range)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Print tracked tables as JSON
    Show {
        /// Document (zip package) holding the state
        document: PathBuf,

        /// Only show this table
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Remove all tracked-table state from a document
    Reset {
        /// Document (zip package) holding the state
        document: PathBuf,
    },

    /// Print a CREATE TABLE statement
    Sql {
        /// Table name
        table: String,

        /// Columns as NAME:TYPE or NAME:TYPE:PRECISION
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Print a JSON column map
    #[command(name = "json-map")]
    JsonMap {
        /// Table name
        table: String,

        /// SQL column names (comma separated)
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,

        /// Document paths (comma separated)
        #[arg(long, value_delimiter = ',')]
        paths: Vec<String>,

        /// SQL types (comma separated)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Precisions (comma separated)
        #[arg(long, value_delimiter = ',')]
        precisions: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&cli)?;

    match cli.command {
        Commands::Diff { before, after } => diff(&before, &after),
        Commands::Init {
            document,
            table,
            sheet,
            range,
            columns,
        } => init(&document, options, &table, &sheet, &range, &columns),
        Commands::Apply {
            document,
            table,
            labels,
            event,
            address,
        } => apply(&document, options, &table, &labels, event, address),
        Commands::Show { document, table } => show(&document, options, table.as_deref()),
        Commands::Reset { document } => reset(&document, options),
        Commands::Sql { table, columns } => sql(&table, &columns),
        Commands::JsonMap {
            table,
            names,
            paths,
            types,
            precisions,
        } => json_map(&table, &names, &paths, &types, &precisions),
    }
}

fn load_options(cli: &Cli) -> Result<TrackerOptions> {
    let mut options = match &cli.config {
        Some(path) => TrackerOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from '{}'", path.display()))?,
        None => TrackerOptions::default(),
    };

    if let Some(key) = &cli.key {
        options.state_key = key.clone();
    }
    if let Some(namespace) = &cli.namespace {
        options.part_namespace = namespace.clone();
    }
    Ok(options)
}

fn open(document: &Path, options: TrackerOptions) -> Result<Tracker<PackageStore>> {
    let store = options.package_store(document);
    Tracker::open(store, options)
        .with_context(|| format!("Failed to load tracked tables from '{}'", document.display()))
}

fn diff(before: &[String], after: &[String]) -> Result<()> {
    let changes = classify(before, after);
    println!("{}", serde_json::to_string_pretty(&changes)?);
    Ok(())
}

fn init(
    document: &Path,
    options: TrackerOptions,
    name: &str,
    sheet: &str,
    range: &str,
    columns: &[String],
) -> Result<()> {
    let columns = columns.iter().map(|c| parse_column(c)).collect();
    let table = TrackedTable::new(name, sheet, range, columns);

    let mut tracker = open(document, options)?;
    tracker
        .track(table)
        .with_context(|| format!("Failed to track table '{}'", name))?;

    eprintln!("Tracking '{}' in '{}'", name, document.display());
    Ok(())
}

fn apply(
    document: &Path,
    options: TrackerOptions,
    name: &str,
    labels: &[String],
    event: Option<ChangeType>,
    address: Option<String>,
) -> Result<()> {
    let mut tracker = open(document, options)?;

    let report = match event {
        Some(change_type) => {
            let range = tracker
                .table(name)
                .map(|t| t.range.clone())
                .with_context(|| format!("Table '{}' is not tracked", name))?;
            let event = TableChangeEvent::new(change_type, address.unwrap_or_else(|| range.clone()));
            let header = HeaderSnapshot::new(range, labels.iter().cloned());

            match tracker.handle_change(name, &event, &header)? {
                Some(report) => report,
                None => {
                    eprintln!("Change at {} does not touch the header", event.address);
                    return Ok(());
                }
            }
        }
        None => tracker.reconcile_header(name, labels)?,
    };

    print_report(&report);
    if report.changed() && !tracker.options().persist_on_change {
        tracker.save()?;
    }
    Ok(())
}

fn show(document: &Path, options: TrackerOptions, name: Option<&str>) -> Result<()> {
    let tracker = open(document, options)?;

    match name {
        Some(name) => {
            let Some(table) = tracker.table(name) else {
                bail!("Table '{}' is not tracked", name);
            };
            println!("{}", serde_json::to_string_pretty(table)?);
        }
        None => println!("{}", tracker.registry().to_json()?),
    }
    Ok(())
}

fn reset(document: &Path, options: TrackerOptions) -> Result<()> {
    let mut tracker = open(document, options)?;
    let count = tracker.registry().len();
    tracker.reset()?;
    eprintln!("Removed {} tracked table(s) from '{}'", count, document.display());
    Ok(())
}

fn sql(table: &str, columns: &[String]) -> Result<()> {
    let columns = columns
        .iter()
        .map(|c| parse_sql_column(c))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", make_sql(table, &columns)?);
    Ok(())
}

fn json_map(
    table: &str,
    names: &[String],
    paths: &[String],
    types: &[String],
    precisions: &[String],
) -> Result<()> {
    println!("{}", generate_json_map(table, names, paths, types, precisions)?);
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    if !report.changed() {
        println!("No changes");
        return;
    }

    for rename in &report.changes.renamed {
        println!("renamed   {} -> {}", rename.before, rename.after);
    }
    for name in &report.inserted {
        println!("inserted  {}", name);
    }
    for column in &report.removed {
        println!("removed   {}", column.name);
    }
    if !report.changes.reordered.is_empty() {
        println!("reordered {}", report.changes.reordered.join(", "));
    }
    for miss in &report.missed {
        match miss {
            LookupMiss::Rename(rename) => {
                println!("skipped   rename of untracked column {}", rename.before)
            }
            LookupMiss::Delete(name) => println!("skipped   deletion of untracked column {}", name),
        }
    }
}

/// Parse `LABEL` or `LABEL=SOURCE`
fn parse_column(spec: &str) -> TrackedColumn {
    match spec.split_once('=') {
        Some((label, source)) if !source.is_empty() => TrackedColumn::bound(label, source),
        Some((label, _)) => TrackedColumn::unbound(label),
        None => TrackedColumn::unbound(spec),
    }
}

/// Parse `NAME:TYPE` or `NAME:TYPE:PRECISION`
fn parse_sql_column(spec: &str) -> Result<ColumnDef> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(data_type), precision) if !name.is_empty() && !data_type.is_empty() => {
            Ok(ColumnDef::new(name, data_type, precision.unwrap_or("")))
        }
        _ => bail!("Invalid column '{}'. Expected NAME:TYPE[:PRECISION]", spec),
    }
}
