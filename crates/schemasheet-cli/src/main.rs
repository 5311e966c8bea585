use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemasheet_catalog::{MySqlReader, SchemaReader, SchemaSnapshot};
use schemasheet_core::{Config, Report, ReportEntry, RunKind};
use schemasheet_csv::{create_unique_dir, CsvWriter};
use schemasheet_sheets::{
    GoogleSheetsClient, RetryPolicy, ServiceAccountAuth, SheetsApi, SheetsUploader, UploadOptions,
    UploadOutcome,
};

const DEFAULT_CONFIG: &str = "schemasheet.toml";

/// schemasheet - MySQL schema documentation as CSV and Google Sheets
#[derive(Parser)]
#[command(name = "schemasheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemasheet.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every table of the database to one CSV per table
    Export {
        /// Base output directory (default: the database name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Abort on the first table that cannot be read
        #[arg(long)]
        fail_fast: bool,

        /// Write a JSON run report
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Upload a CSV directory as a Google spreadsheet
    Import {
        /// Directory of table CSVs (overrides CSV_DIRECTORY)
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Write a JSON run report
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Export { output, fail_fast, report } => {
            export_command(&config, output, fail_fast, report.as_deref(), cli.verbose).await
        }
        Commands::Import { csv_dir, report } => {
            import_command(config, csv_dir, report.as_deref(), cli.verbose).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Config file (explicit, or ./schemasheet.toml when present), then the environment
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(path) = path {
        Config::from_file(path).with_context(|| format!("reading {}", path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    Ok(config.apply_env()?)
}

/// Export command - read the schema and write the CSV tree
async fn export_command(
    config: &Config,
    output: Option<PathBuf>,
    fail_fast: bool,
    report_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    config.database.validate()?;

    if verbose {
        eprintln!("{} {}", "Connecting to".cyan(), config.database.display_target());
    }

    let reader = MySqlReader::connect(&config.database).await?;
    reader.test_connection().await?;

    if verbose {
        eprintln!("{}", "✓ Connection successful".green());
    }

    let base = output
        .or_else(|| config.export.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(&config.database.database));
    let fail_fast = fail_fast || config.export.fail_fast;

    let (dir, report) = run_export(&reader, &base, fail_fast).await?;

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_summary(&report, &format!("CSV files written to {}", dir.display()));

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Read every table and write it under a fresh directory derived from `base`
async fn run_export(
    reader: &dyn SchemaReader,
    base: &Path,
    fail_fast: bool,
) -> Result<(PathBuf, Report)> {
    let snapshot = if fail_fast {
        SchemaSnapshot {
            database: reader.read_database().await?,
            failures: Vec::new(),
        }
    } else {
        reader.read_database_isolated().await?
    };

    let dir = create_unique_dir(base)?;
    let writer = CsvWriter::new(&dir);

    let mut report = Report::new(RunKind::Export).with_target(dir.display().to_string());
    for table in &snapshot.database.tables {
        writer.write_table(table)?;
        report.add_entry(ReportEntry::ok(&table.name, table.columns.len()));
    }
    for failure in &snapshot.failures {
        report.add_entry(ReportEntry::skipped(&failure.table, failure.error.to_string()));
    }

    Ok((dir, report))
}

/// Import command - upload a CSV directory to Google Sheets
async fn import_command(
    mut config: Config,
    csv_dir: Option<PathBuf>,
    report_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if csv_dir.is_some() {
        config.import.csv_directory = csv_dir;
    }
    let import = &config.import;
    let dir = import.require_csv_directory()?.clone();
    let key_file = import.require_key_file()?;
    let share_with = import.require_share_with()?;

    if verbose {
        eprintln!("{} {}", "Loading service account key:".cyan(), key_file.display());
    }

    let auth = ServiceAccountAuth::from_key_file(key_file).await?;
    let api: Arc<dyn SheetsApi> = Arc::new(GoogleSheetsClient::new(Arc::new(auth))?);

    let options = UploadOptions::new(share_with)
        .with_batch_interval(Duration::from_millis(import.batch_interval_ms))
        .with_retry(RetryPolicy::with_max_retries(import.max_retries));

    let (outcome, report) = run_import(api, &dir, options).await?;

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_summary(&report, &format!("Spreadsheet: {}", outcome.url()));

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run_import(
    api: Arc<dyn SheetsApi>,
    dir: &Path,
    options: UploadOptions,
) -> Result<(UploadOutcome, Report)> {
    let outcome = SheetsUploader::new(api, options)
        .upload_directory(dir)
        .await
        .with_context(|| format!("uploading {}", dir.display()))?;

    let mut report = Report::new(RunKind::Import).with_target(outcome.spreadsheet_id.as_str());
    for entry in &outcome.uploaded {
        report.add_entry(ReportEntry::ok(&entry.title, entry.rows).with_sheet_id(entry.sheet_id));
    }
    for skipped in &outcome.skipped {
        report.add_entry(ReportEntry::skipped(&skipped.table, &skipped.reason));
    }

    Ok((outcome, report))
}

/// Print run summary
fn print_summary(report: &Report, destination: &str) {
    let title = match report.kind {
        RunKind::Export => "Schema Export Report",
        RunKind::Import => "Spreadsheet Import Report",
    };

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", title.bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if let Some(target) = &report.target {
        println!("Target: {}", target);
    }
    println!();

    println!("{}", "Summary:".bold());
    println!("  Tables:  {}", report.summary.total);
    println!("  OK:      {}", format!("{}", report.summary.ok).green());
    if report.summary.skipped > 0 {
        println!("  Skipped: {}", format!("{}", report.summary.skipped).red().bold());
    } else {
        println!("  Skipped: {}", format!("{}", report.summary.skipped).green());
    }
    println!();

    if report.has_failures() {
        println!("{}", "Skipped tables:".bold());
        for entry in report.skipped() {
            println!(
                "  [{}] {}: {}",
                "SKIP".red().bold(),
                entry.name,
                entry.message.as_deref().unwrap_or("")
            );
        }
    } else {
        println!("{}", "✓ All tables processed!".green().bold());
    }

    println!();
    println!("{}", destination);
    println!("{}", "=".repeat(60).bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemasheet_catalog::{CatalogError, MockReader};
    use schemasheet_core::{Column, Table};
    use schemasheet_sheets::MockSheetsApi;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from([
            "schemasheet", "--verbose", "export", "--output", "out", "--fail-fast",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Export { output, fail_fast, report } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(output, Some(PathBuf::from("out")));
        assert!(fail_fast);
        assert_eq!(report, None);
    }

    fn reader() -> MockReader {
        MockReader::new("app")
            .with_table(Table::new("users", vec![
                Column::new("id", "int").primary_key(),
                Column::new("email", "varchar(255)").unique(),
            ]))
            .with_table(Table::new("departments", vec![Column::new("id", "int").primary_key()]))
    }

    #[tokio::test]
    async fn export_writes_tree_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("app");

        let (dir, report) = run_export(&reader(), &base, false).await.unwrap();

        assert_eq!(dir, base);
        assert!(dir.join("users.csv").exists());
        assert!(dir.join("departments.csv").exists());
        assert_eq!(report.summary.ok, 2);
        assert!(!report.has_failures());

        assert_eq!(report.target, Some(base.display().to_string()));

        // Second run never overwrites, and the report names the new directory
        let (second, report) = run_export(&reader(), &base, false).await.unwrap();
        assert_eq!(second, tmp.path().join("app_1"));
        assert_eq!(report.target, Some(second.display().to_string()));
    }

    #[tokio::test]
    async fn export_isolates_table_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let reader = reader();
        reader
            .add_error_for_table("ledger", CatalogError::Query("denied".into()))
            .await;

        let (dir, report) = run_export(&reader, &tmp.path().join("app"), false).await.unwrap();

        assert!(report.has_failures());
        let skipped: Vec<_> = report.skipped().map(|e| e.name.as_str()).collect();
        assert_eq!(skipped, ["ledger"]);
        assert!(!dir.join("ledger.csv").exists());
    }

    #[tokio::test]
    async fn export_fail_fast_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("app");
        let reader = reader();
        reader
            .add_error_for_table("ledger", CatalogError::Query("denied".into()))
            .await;

        assert!(run_export(&reader, &base, true).await.is_err());
        assert!(!base.exists());
    }

    #[tokio::test]
    async fn import_reports_sheets() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("app");
        let (dir, _) = run_export(&reader(), &base, false).await.unwrap();

        let api = Arc::new(MockSheetsApi::new());
        let options = UploadOptions::new("docs@example.com").with_batch_interval(Duration::ZERO);
        let (outcome, report) = run_import(api, &dir, options).await.unwrap();

        assert_eq!(outcome.uploaded.len(), 2);
        assert_eq!(report.summary.ok, 2);
        assert!(report.entries.iter().all(|e| e.sheet_id.is_some()));
        assert_eq!(report.target.as_deref(), Some("mock-spreadsheet"));
    }
}
