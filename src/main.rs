use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use runtask_watch::classify::classify;
use runtask_watch::config::{self, WatchConfig};
use runtask_watch::context::{install_signal_handlers, RunContext};
use runtask_watch::fetch::{decode_task_stage, FileStageFetcher, HttpStageFetcher, StageFetcher};
use runtask_watch::log::parse_log_level;
use runtask_watch::poller::StagePoller;
use runtask_watch::report::{pending_message, Reporter};
use runtask_watch::resolve::resolve;

const EXIT_FAILED: i32 = 1;
const EXIT_PENDING: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(
    name = "runtask-watch",
    about = "Wait for run tasks on a workflow stage and report their outcome"
)]
struct Cli {
    /// Project root directory, searched for runtask-watch.toml
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Path to config file (defaults to {root}/runtask-watch.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log verbosity level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable colored report output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a task stage until every run task finishes
    Watch {
        /// Task stage ID (e.g., ts-abc123)
        stage_id: String,
        /// API address, overriding remote.address from the config
        #[arg(long, conflicts_with = "file")]
        address: Option<String>,
        /// Read the task stage document from a local file instead of the API
        #[arg(long)]
        file: Option<PathBuf>,
        /// Suppress the progress report; only the exit code and errors remain
        #[arg(short, long)]
        quiet: bool,
    },
    /// Report the outcome of a task stage document once, without polling
    Check {
        /// Path to a task stage JSON document
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match parse_log_level(&cli.log_level) {
        Ok(level) => runtask_watch::log::init(level),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    let config = match load(&cli.root, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let color = config.output.color && !cli.no_color;

    let result = match cli.command {
        Commands::Watch {
            stage_id,
            address,
            file,
            quiet,
        } => handle_watch(&config, &stage_id, address, file, quiet, color).await,
        Commands::Check { file } => handle_check(&config, &file, color),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_FAILED);
        }
    }
}

fn load(root: &Path, config_path: Option<&Path>) -> Result<WatchConfig, String> {
    match config_path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(root),
    }
}

fn make_reporter(config: &WatchConfig, quiet: bool, color: bool) -> Reporter {
    if quiet {
        Reporter::silent(&config.output.title)
    } else {
        Reporter::new(&config.output.title, std::io::stdout(), color)
    }
}

async fn handle_watch(
    config: &WatchConfig,
    stage_id: &str,
    address: Option<String>,
    file: Option<PathBuf>,
    quiet: bool,
    color: bool,
) -> Result<i32, String> {
    let ctx = RunContext::new();
    install_signal_handlers(ctx.clone())?;

    let reporter = make_reporter(config, quiet, color);
    let backoff = config.polling.backoff();

    match file {
        Some(path) => {
            tracing::info!(stage_id, path = %path.display(), "watching task stage file");
            let poller = StagePoller::new(FileStageFetcher::new(&path), backoff, reporter);
            Ok(run_poller(poller, stage_id, &ctx).await)
        }
        None => {
            let address = address.unwrap_or_else(|| config.remote.address.clone());
            let token = config.remote.token();
            if token.is_none() {
                tracing::warn!(
                    env = %config.remote.token_env,
                    "no API token set, requesting anonymously"
                );
            }
            tracing::info!(stage_id, %address, "watching task stage");
            let poller = StagePoller::new(HttpStageFetcher::new(&address, token), backoff, reporter);
            Ok(run_poller(poller, stage_id, &ctx).await)
        }
    }
}

async fn run_poller<F: StageFetcher>(
    mut poller: StagePoller<F>,
    stage_id: &str,
    ctx: &RunContext,
) -> i32 {
    match poller.poll(stage_id, ctx).await {
        Ok(_) => 0,
        Err(e) if e.is_cancellation() => {
            eprintln!("{}", e);
            EXIT_INTERRUPTED
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILED
        }
    }
}

fn handle_check(config: &WatchConfig, path: &Path, color: bool) -> Result<i32, String> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let stage = decode_task_stage(&body).map_err(|e| e.to_string())?;

    let mut reporter = make_reporter(config, false, color);
    reporter.begin();

    let summary = classify(&stage.records);
    if !summary.is_terminal() {
        reporter.pending(&pending_message(&summary));
        reporter.end();
        return Ok(EXIT_PENDING);
    }

    let verdict = resolve(&stage.records, &summary);
    reporter.final_report(&stage.records, &summary, &verdict);
    reporter.end();

    match verdict.into_result() {
        Ok(_) => Ok(0),
        Err(e) => Err(e.to_string()),
    }
}
