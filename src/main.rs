mod commands;
mod context;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use oneonone_core::constants::{
    DEFAULT_HORIZON_DAYS, DEFAULT_LAST_LOOKBACK_DAYS, DEFAULT_REFRESH_LOOKBACK_DAYS,
};
use tracing_subscriber::EnvFilter;

use crate::context::Context;

#[derive(Parser)]
#[command(name = "oneonone")]
#[command(about = "Find, evaluate and schedule one-on-one meetings on Google Calendar")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to ~/.config/oneonone/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// OAuth client credentials downloaded from Google Cloud Console
    #[arg(short, long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Organization CSV file
    #[arg(short, long, global = true)]
    pub org_file: Option<PathBuf>,

    /// Recommendation dataset (JSON)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// IANA time zone, e.g. "Europe/Helsinki"
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google Calendar and check that it can be read
    ValidateAccess,
    /// Show a person from the organization file
    Person {
        /// Username or email
        key: String,
    },
    /// Show the most recent 1:1 with a person
    GetLastByUsername {
        username: String,

        /// How many days back to look
        #[arg(long, default_value_t = DEFAULT_LAST_LOOKBACK_DAYS)]
        days: i64,
    },
    /// Show when the next 1:1 with a person is due
    NextOneOnOne {
        username: String,

        /// How many days back to look
        #[arg(long, default_value_t = DEFAULT_REFRESH_LOOKBACK_DAYS)]
        days: i64,

        /// Ignore the dataset and read the calendar
        #[arg(long)]
        refresh: bool,

        /// Days between 1:1s (overrides cadence_days in config)
        #[arg(long)]
        cadence_days: Option<i64>,
    },
    /// Recompute recommendations for everybody tracked
    RefreshDataset {
        /// How many days back to look
        #[arg(long, default_value_t = DEFAULT_REFRESH_LOOKBACK_DAYS)]
        days: i64,

        /// Days between 1:1s (overrides cadence_days in config)
        #[arg(long)]
        cadence_days: Option<i64>,
    },
    /// List times when both you and a person are free
    FreeSlots {
        username: String,

        /// First day (YYYY-MM-DD, "today" or "tomorrow"; defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Last day, inclusive (defaults to a week from today)
        #[arg(long)]
        to: Option<String>,

        /// Minimum slot length (e.g. "30m", "1h")
        #[arg(long)]
        duration: Option<String>,
    },
    /// Check whether a person is free at a given time
    IsFree {
        username: String,

        /// YYYY-MM-DD, "today" or "tomorrow"
        date: String,

        /// HH:MM (24h)
        time: String,

        /// Meeting length (e.g. "30m", "1h")
        #[arg(long)]
        duration: Option<String>,
    },
    /// Propose 1:1s for everybody who is due
    Recommend {
        /// Recompute the dataset first
        #[arg(long)]
        refresh: bool,

        /// How many days ahead to search
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        days: i64,

        /// Days between 1:1s (used with --refresh)
        #[arg(long)]
        cadence_days: Option<i64>,

        /// Ask to create each proposed meeting
        #[arg(long)]
        confirm: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code of the first typed error in the chain, 1 when there is none.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<oneonone_core::Error>())
        .map(oneonone_core::Error::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(&cli.global)?;

    match cli.command {
        Commands::ValidateAccess => commands::validate_access::run(&ctx).await,
        Commands::Person { key } => commands::person::run(&ctx, &key),
        Commands::GetLastByUsername { username, days } => {
            commands::get_last::run(&ctx, &username, days).await
        }
        Commands::NextOneOnOne {
            username,
            days,
            refresh,
            cadence_days,
        } => commands::next_one_on_one::run(&ctx, &username, days, refresh, cadence_days).await,
        Commands::RefreshDataset { days, cadence_days } => {
            commands::refresh_dataset::run(&ctx, days, cadence_days).await
        }
        Commands::FreeSlots {
            username,
            from,
            to,
            duration,
        } => {
            commands::free_slots::run(
                &ctx,
                &username,
                from.as_deref(),
                to.as_deref(),
                duration.as_deref(),
            )
            .await
        }
        Commands::IsFree {
            username,
            date,
            time,
            duration,
        } => commands::is_free::run(&ctx, &username, &date, &time, duration.as_deref()).await,
        Commands::Recommend {
            refresh,
            days,
            cadence_days,
            confirm,
        } => commands::recommend::run(&ctx, refresh, days, cadence_days, confirm).await,
    }
}
