use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tokio::time;

use tidal_keeper::{create_example_config, Keeper, KeeperConfig};

#[derive(Parser, Debug)]
#[command(name = "tidal-keeper")]
#[command(about = "Tidal protocol rebase trigger service")]
struct Args {
    /// Path to keeper configuration file
    #[arg(short, long, default_value = "keeper.toml")]
    config: String,

    /// Override the poll interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Stop after this many iterations
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Probe only - never invoke the state-mutating rebase
    #[arg(long)]
    dry_run: bool,

    /// Write an example configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    if args.init_config {
        create_example_config(&args.config)?;
        log::info!("wrote example configuration to {}", args.config);
        return Ok(());
    }

    let mut config = KeeperConfig::load(&args.config)?;
    if let Some(interval) = args.interval {
        config.poll_interval_secs = interval;
    }

    log::info!("starting tidal keeper");
    log::info!(
        "poll interval: {}s, twap window: {}s, rebase interval: {}s",
        config.poll_interval_secs,
        config.twap_window_secs,
        config.rebase_interval_secs,
    );
    if args.dry_run {
        log::warn!("running in DRY RUN mode - no rebases will be executed");
    }

    let mut keeper = Keeper::new(&config, args.dry_run, unix_now())?;
    log::info!("keeper initialized");

    let mut interval_timer = time::interval(Duration::from_secs(config.poll_interval_secs));
    let mut iteration = 0u64;

    loop {
        interval_timer.tick().await;
        iteration += 1;

        log::debug!("keeper iteration {}", iteration);

        if let Err(error) = keeper.tick(unix_now()) {
            log::error!("error in keeper iteration {}: {}", iteration, error);
            // Keep running; individual iterations may fail
        }

        if iteration % 10 == 0 {
            keeper.log_status(unix_now());
        }

        if let Some(max) = args.iterations {
            if iteration >= max {
                log::info!("completed {} iterations, exiting", max);
                break;
            }
        }
    }

    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
