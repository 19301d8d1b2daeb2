use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use csv::WriterBuilder;
use pdf_table_rows::{
    DEFAULT_TOLERANCE, MatchStrategy, ParseReport, TableDef, TableSpec, extract_table_from_pdf,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdftable",
    version,
    about = "Rebuild a column-aligned table from PDF text positions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the rows of one table and write them as CSV.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON table definition with start, end and columns.
    #[arg(long, conflicts_with_all = ["start", "end", "columns"])]
    definition: Option<PathBuf>,

    /// Regex matching the text where the table starts.
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Regex matching the text where the table ends.
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Regex matching one column header. Repeat in column order.
    #[arg(long = "column")]
    columns: Vec<String>,

    /// Horizontal distance within which a fragment belongs to a column.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Column choice when anchors overlap: first-declared or nearest.
    #[arg(long)]
    strategy: Option<String>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn table_spec(args: &ExtractArgs) -> Result<TableSpec> {
    let mut spec = if let Some(path) = &args.definition {
        TableSpec::from_path(path)
            .with_context(|| format!("failed to read --definition '{}'", path.display()))?
    } else {
        let (Some(start), Some(end)) = (&args.start, &args.end) else {
            bail!("either --definition or --start/--end/--column is required");
        };
        TableSpec {
            start: start.clone(),
            end: end.clone(),
            columns: args.columns.clone(),
            tolerance: DEFAULT_TOLERANCE,
            strategy: MatchStrategy::default(),
        }
    };

    if let Some(tolerance) = args.tolerance {
        spec.tolerance = tolerance;
    }
    if let Some(strategy) = args.strategy.as_deref() {
        spec.strategy = MatchStrategy::from_str(strategy)
            .map_err(|error| anyhow!("invalid --strategy: {error}"))?;
    }

    Ok(spec)
}

fn parse_table_def(args: &ExtractArgs) -> Result<TableDef> {
    let spec = table_spec(args)?;
    spec.build().context("invalid table definition")
}

fn log_report(report: &ParseReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} column={:?}: {}",
                warning.code, warning.page, warning.column, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ParseReport> {
    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character");
    }
    let table = parse_table_def(args)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = WriterBuilder::new()
        .delimiter(args.delimiter as u8)
        .flexible(true)
        .from_writer(sink);

    let mut write_error = None;
    let report = extract_table_from_pdf(&args.input, &table, |cells| {
        if write_error.is_none()
            && let Err(error) = writer.write_record(&cells)
        {
            write_error = Some(error);
        }
    })
    .with_context(|| format!("failed to extract table from '{}'", args.input.display()))?;

    if let Some(error) = write_error {
        return Err(error).context("failed to write CSV record");
    }
    writer.flush().context("failed to flush CSV output")?;

    Ok(report)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_table_rows=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.row_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
