//! candlefold CLI - tick-to-candle aggregation for live charts.

use anyhow::Result;
use candlefold_lib::Interval;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod display;
mod logging;

use display::Format;

#[derive(Parser)]
#[command(name = "candlefold")]
#[command(about = "Aggregate kline ticks into OHLCV candles and follow them live", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Where `watch` loads history from.
#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    /// Seeded random walk, no network
    Mock,
    /// The kline HTTP API
    Http,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a kline JSON payload from a file
    Aggregate {
        /// Payload file (API envelope or bare array of kline records)
        input: PathBuf,

        /// Candle interval (e.g. 30s, 1m, 15m, 4h, 1d)
        #[arg(short, long, default_value = "30m")]
        interval: Interval,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Pad the series with placeholder candles up to this length
        #[arg(long, default_value = "0")]
        min_candles: usize,
    },

    /// Fetch history from the kline API and aggregate it
    Fetch {
        /// API base URL
        #[arg(long, default_value = candlefold_lib::DEFAULT_BASE_URL)]
        base_url: String,

        /// Trading pair identifier
        #[arg(long, default_value = "1")]
        pair_id: u32,

        /// Candle interval (e.g. 30s, 1m, 15m, 4h, 1d)
        #[arg(short, long, default_value = "30m")]
        interval: Interval,

        /// Bearer token for the API
        #[arg(long, env = "CANDLEFOLD_TOKEN")]
        token: Option<String>,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Pad the series with placeholder candles up to this length
        #[arg(long, default_value = "0")]
        min_candles: usize,
    },

    /// Run a live session and print every rendered candle as NDJSON
    Watch {
        /// History source. Live ticks are always simulated; with `http` the
        /// simulation starts from the last fetched close
        #[arg(short, long, value_enum, default_value = "mock")]
        source: SourceKind,

        /// Candle interval; overrides the config file
        #[arg(short, long)]
        interval: Option<Interval>,

        /// Stop after this many seconds (runs until Ctrl+C otherwise)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Session config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// API base URL (http source)
        #[arg(long, default_value = candlefold_lib::DEFAULT_BASE_URL)]
        base_url: String,

        /// Trading pair identifier (http source)
        #[arg(long, default_value = "1")]
        pair_id: u32,

        /// Seed for the mock generators
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Leave placeholder candles out of the output
        #[arg(long)]
        skip_placeholders: bool,
    },

    /// List interval presets
    Intervals,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet)?;

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Aggregate {
            input,
            interval,
            output,
            format,
            min_candles,
        } => commands::aggregate::aggregate_file(
            &input,
            interval,
            output.as_deref(),
            format,
            min_candles,
            cli.quiet,
        ),
        Commands::Fetch {
            base_url,
            pair_id,
            interval,
            token,
            output,
            format,
            min_candles,
        } => {
            let mut config = candlefold_lib::ClientConfig::default()
                .with_base_url(base_url)
                .with_pair_id(pair_id);
            if let Some(token) = token {
                config = config.with_auth_token(token);
            }
            commands::fetch::fetch(
                config,
                interval,
                output.as_deref(),
                format,
                min_candles,
                cli.quiet,
            )
            .await
        }
        Commands::Watch {
            source,
            interval,
            duration,
            config,
            base_url,
            pair_id,
            seed,
            skip_placeholders,
        } => {
            let options = commands::watch::WatchOptions {
                http: matches!(source, SourceKind::Http),
                interval,
                duration: duration.map(std::time::Duration::from_secs),
                config,
                base_url,
                pair_id,
                seed,
                skip_placeholders,
            };
            commands::watch::watch(options).await
        }
        Commands::Intervals => {
            commands::intervals::list_intervals();
            Ok(())
        }
    }
}
