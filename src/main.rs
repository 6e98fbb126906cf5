use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use appsnap::config::{self, load_config, load_config_from_path};
use appsnap::logging;
use appsnap::output::write_snapshot;
use appsnap::system::aggregate::GroupBy;
use appsnap::system::collector::Collector;
use appsnap::system::sampler::{Sampler, SystemCpuWindow};
use appsnap::watch::{WatchOptions, watch};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "appsnap",
    about = "Sample process CPU and memory usage grouped by application"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between the two CPU reads, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// System CPU window: separate, shared
    #[arg(long)]
    system_cpu: Option<String>,

    /// App grouping key: exact, lowercase
    #[arg(long)]
    group_by: Option<String>,

    /// Application name to group; repeatable, replaces the configured list
    #[arg(long = "app")]
    apps: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Keep sampling on an interval, one JSON document per line.
    #[arg(long, default_value_t = false)]
    watch: bool,

    /// Watch interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop watching after this many snapshots
    #[arg(long)]
    count: Option<usize>,

    /// Log level or filter directive; logs go to stderr
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config =
        tracing::subscriber::with_default(logging::bootstrap_subscriber(), || {
            load_config_for_cli(&cli)
        })?;
    logging::init_tracing(&config.logging.level, config.logging.json)?;

    let settings = config.sampler_settings();
    if settings.settle < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
        warn!(
            settle_ms = settings.settle.as_millis() as u64,
            minimum_ms = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64,
            "settle interval is below the OS CPU accounting resolution; CPU readings will be noisy"
        );
    }

    let pretty = config.output.pretty;
    let mut sampler = Sampler::new(Collector::new(), settings);

    if !cli.watch {
        let snapshot = sampler.sample()?;
        return write_snapshot(stdout().lock(), &snapshot, pretty);
    }

    if config.watch.interval_ms == 0 {
        return Err(eyre!("--interval-ms must be greater than 0"));
    }
    let options = WatchOptions {
        interval: Duration::from_millis(config.watch.interval_ms),
        max_cycles: cli.count,
    };
    watch(sampler, options, |snapshot| {
        write_snapshot(stdout().lock(), snapshot, pretty)
    })
    .await?;
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Result<config::Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ms) = cli.settle_ms {
        config.sampler.settle_ms = ms;
    }
    if let Some(ref window) = cli.system_cpu {
        config.sampler.system_cpu = SystemCpuWindow::parse(window)
            .ok_or_else(|| eyre!("unknown --system-cpu `{window}`; expected separate or shared"))?;
    }
    if let Some(ref key) = cli.group_by {
        config.apps.group_by = GroupBy::parse(key)
            .ok_or_else(|| eyre!("unknown --group-by `{key}`; expected exact or lowercase"))?;
    }
    if !cli.apps.is_empty() {
        config.apps.names = cli.apps.clone();
    }
    if cli.pretty {
        config.output.pretty = true;
    }
    if let Some(ms) = cli.interval_ms {
        config.watch.interval_ms = ms;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}
