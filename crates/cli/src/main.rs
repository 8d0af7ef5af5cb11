use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use addventure_core::reshape::records_from_value;
use addventure_core::{
    BatchFailure, EpisodeRecord, ExtractConfig, OutputFormat, collect_episode_paths, extract_batch, flatten, index_by,
    key_by, records_to_json, render,
};
use anyhow::Context;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default dump location shared by `extract -o` and `reshape -i`
const DEFAULT_DUMP: &str = "./addventure_meta.json";

/// A progress line is printed after every this many pages
const PROGRESS_INTERVAL: usize = 1000;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Extract and reshape episode metadata from Anime Addventure HTML dumps
#[derive(Parser, Debug)]
#[command(name = "addventure")]
#[command(version)]
#[command(about = "Extract and reshape Anime Addventure episode metadata", long_about = None)]
struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract metadata from episode pages into a JSON list of records
    Extract(ExtractArgs),
    /// Regroup a JSON list of records into indexes
    Reshape(ReshapeArgs),
    /// Print a shell completion script to stdout
    Completions {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Episode pages, or directories to search for `<digits>.html` pages
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Output file, or "-" for stdout
    #[arg(short, long, default_value = DEFAULT_DUMP, value_name = "FILE")]
    output: String,

    /// Don't require the in-page episode ID to match the filename
    #[arg(long)]
    no_doublecheck: bool,

    /// Write JSON without indentation
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct ReshapeArgs {
    /// JSON dump to read, or "-" for stdin
    #[arg(short, long, default_value = DEFAULT_DUMP, value_name = "FILE")]
    infile: String,

    /// Output file, or "-" for stdout
    #[arg(short, long, default_value = "-", value_name = "FILE")]
    outfile: String,

    /// Output format (json, yaml)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Field to sort records by
    #[arg(short, long, default_value = "id", value_name = "FIELD")]
    sort: String,

    #[command(subcommand)]
    operation: ReshapeOp,
}

#[derive(Subcommand, Debug)]
enum ReshapeOp {
    /// Produce a (possibly nested) object mapping keys to records
    KeyBy {
        /// Fields to group by, outermost first
        #[arg(required = true)]
        key: Vec<String>,

        /// Require each key to match exactly one record and don't wrap it in a list
        #[arg(long)]
        is_primary: bool,
    },
    /// Produce a (possibly nested) object mapping keys to record IDs
    IndexBy {
        /// Fields to group by, outermost first
        #[arg(required = true)]
        key: Vec<String>,

        /// Field returned for each matching record
        #[arg(long, default_value = "id", value_name = "FIELD")]
        target: String,

        /// Require each key to match exactly one record and don't wrap it in a list
        #[arg(long)]
        is_primary: bool,
    },
    /// Convert records into a form usable with flat formats like CSV/TSV
    Flatten {
        /// Separator used when joining list fields such as `tags`
        #[arg(long, default_value = "|", value_name = "SEP")]
        tag_separator: String,
    },
}

/// Install the stderr `tracing` subscriber; `RUST_LOG` wins over `-v`/`-q`
fn init_logging(verbose: u8, quiet: u8) {
    let index = (1 + i16::from(verbose) - i16::from(quiet)).clamp(0, LOG_LEVELS.len() as i16 - 1) as usize;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_LEVELS[index]));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
    }
}

fn write_output(path: &str, content: &str) -> anyhow::Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", content).context("Failed to write to stdout")?;
    } else {
        fs::write(path, format!("{}\n", content)).with_context(|| format!("Failed to write to file: {}", path))?;
    }
    Ok(())
}

fn run_extract(args: ExtractArgs, verbose: bool) -> anyhow::Result<()> {
    let config = ExtractConfig::builder().doublecheck_id(!args.no_doublecheck).build();

    if verbose {
        echo::print_step(1, 3, "Collecting episode pages");
    }
    let paths = collect_episode_paths(&args.paths);
    debug!(count = paths.len(), "collected pages");

    if verbose {
        echo::print_step(2, 3, &format!("Extracting metadata from {} pages", paths.len()));
    }
    let mut records: Vec<EpisodeRecord> = Vec::with_capacity(paths.len());
    let mut failures: Vec<BatchFailure> = Vec::new();

    for chunk in paths.chunks(PROGRESS_INTERVAL) {
        let report = extract_batch(chunk, &config);
        records.extend(report.records);
        failures.extend(report.failures);

        if chunk.len() == PROGRESS_INTERVAL {
            echo::print_progress(records.len() + failures.len(), failures.len());
        }
    }

    if verbose {
        echo::print_step(3, 3, "Writing output");
    }
    let json = records_to_json(&records, !args.compact).context("Failed to serialize records")?;
    write_output(&args.output, &json)?;

    echo::print_summary(records.len() + failures.len(), &failures);
    if args.output != "-" {
        echo::print_success(&format!("{} records written to {}", records.len(), args.output));
    }
    Ok(())
}

fn run_reshape(args: ReshapeArgs) -> anyhow::Result<()> {
    let input = read_input(&args.infile)?;
    let value: serde_json::Value =
        serde_json::from_str(&input).with_context(|| format!("Failed to parse JSON from {}", args.infile))?;
    let records = records_from_value(value)?;
    debug!(count = records.len(), "Loaded records");

    let output = match args.operation {
        ReshapeOp::KeyBy { key, is_primary } => render(&key_by(records, &key, is_primary, &args.sort)?, args.format)?,
        ReshapeOp::IndexBy { key, target, is_primary } => {
            render(&index_by(records, &key, &target, is_primary, &args.sort)?, args.format)?
        }
        ReshapeOp::Flatten { tag_separator } => render(&flatten(records, &tag_separator, &args.sort)?, args.format)?,
    };

    write_output(&args.outfile, output.trim_end())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let verbose = cli.verbose > 0;
    if verbose {
        echo::print_banner();
    }

    match cli.command {
        Command::Extract(args) => run_extract(args, verbose),
        Command::Reshape(args) => run_reshape(args),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "addventure", &mut io::stdout());
            Ok(())
        }
    }
}
