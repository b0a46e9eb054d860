use clap::Parser;
use resource_tracker::args::{Args, Command};
use resource_tracker::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let config_path = args.common().config().path();

    // This allows for running the program without a portal backend. When
    // RESOURCE_TRACKER_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();
    let today = chrono::Local::now().date_naive();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(config_path, init_args.api_base_url())
            .await?
            .print(),

        Command::Summary(summary_args) => {
            let config = load_config(&args).await?;
            commands::summary(config, mode, summary_args.clone(), today)
                .await?
                .print()
        }

        Command::List(list_args) => {
            let config = load_config(&args).await?;
            commands::list(config, mode, list_args.clone()).await?.print()
        }

        Command::Add(add_args) => {
            let config = load_config(&args).await?;
            commands::add(config, mode, add_args.clone()).await?.print()
        }

        Command::Chart(chart_args) => {
            let config = load_config(&args).await?;
            commands::chart(config, mode, chart_args.clone())
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = load_config(&args).await?;
            commands::export(config, mode, export_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Loads the configuration file, applying a base URL override from the command line.
async fn load_config(args: &Args) -> Result<Config> {
    let config = Config::load(args.common().config().path()).await?;
    match args.common().api_base_url() {
        Some(url) => config.with_api_base_url(url),
        None => Ok(config),
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "resource_tracker",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
