//! lipitest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lipitest", version, about = "Round-trip transliteration fidelity harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate systems x scripts over a corpus
    Run {
        /// Corpus file, one line per entry
        #[arg(long, conflicts_with = "text")]
        corpus: Option<PathBuf>,

        /// Corpus given directly (plain lines or an HTML table)
        #[arg(long)]
        text: Option<String>,

        /// Only read the first N lines of the corpus file
        #[arg(long)]
        max_lines: Option<usize>,

        /// Systems to evaluate (comma-separated, default: from config)
        #[arg(long)]
        systems: Option<String>,

        /// Target scripts (comma-separated, default: from config)
        #[arg(long)]
        scripts: Option<String>,

        /// Max lines in flight per run
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, csv, all
        #[arg(long, default_value = "all")]
        format: String,

        /// Keep at most N rows in each HTML diff report
        #[arg(long)]
        max_diffs: Option<usize>,

        /// Print coloured per-line diffs
        #[arg(long, short)]
        verbose: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare an original text with its round-tripped version
    Compare {
        /// Original text file
        original: PathBuf,

        /// Transliterated (round-tripped) text file
        transliterated: PathBuf,

        /// Comparison log path
        #[arg(long, default_value = "comparison_log.txt")]
        log: PathBuf,

        /// Config file path (scoring weights)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Transliterate a file there and back, then compare
    Pipeline {
        /// Source text file
        #[arg(long)]
        input: PathBuf,

        /// System to use
        #[arg(long, default_value = "builtin")]
        system: String,

        /// Intermediate script
        #[arg(long, default_value = "Devanagari")]
        script: String,

        /// Directory for the intermediate, round-trip and log files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Transliterate a file line by line
    Transliterate {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// System to use
        #[arg(long, default_value = "builtin")]
        system: String,

        /// Source script (default: the configured source script)
        #[arg(long)]
        from: Option<String>,

        /// Target script
        #[arg(long)]
        to: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Corpus hygiene tools
    Dataset {
        #[command(subcommand)]
        command: DatasetCommand,
    },

    /// List configured systems and the scripts they support
    ListSystems {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample corpus
    Init,
}

#[derive(Subcommand)]
pub enum DatasetCommand {
    /// Drop repeated lines, keeping the first occurrence
    Dedup {
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Report repeated lines without changing the file
    CheckDuplicates { input: PathBuf },
    /// Report characters outside the IAST alphabet
    CheckIast {
        input: PathBuf,
        /// Also write the flagged lines as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Fix known mis-encodings and stray spacing
    CleanIast {
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lipitest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            corpus,
            text,
            max_lines,
            systems,
            scripts,
            parallelism,
            output,
            format,
            max_diffs,
            verbose,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                corpus,
                text,
                max_lines,
                systems,
                scripts,
                parallelism,
                output,
                format,
                max_diffs,
                verbose,
                config,
            })
            .await
        }
        Commands::Compare {
            original,
            transliterated,
            log,
            config,
        } => commands::compare::execute(original, transliterated, log, config),
        Commands::Pipeline {
            input,
            system,
            script,
            output_dir,
            config,
        } => commands::pipeline::execute(input, system, script, output_dir, config).await,
        Commands::Transliterate {
            input,
            output,
            system,
            from,
            to,
            config,
        } => commands::transliterate::execute(input, output, system, from, to, config).await,
        Commands::Dataset { command } => commands::dataset::execute(command),
        Commands::ListSystems { config } => commands::list_systems::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
