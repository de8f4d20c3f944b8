#![warn(rust_2018_idioms)]

use std::str::FromStr;

use anyhow::anyhow;
use flexi_logger::{LogSpecBuilder, Logger, LoggerHandle};
use log::{info, warn, LevelFilter};
use tokio::sync::watch;

use sixtysix_server::{run, settings};

fn main() -> anyhow::Result<()> {
    let settings = settings::load()?;
    let _logger = setup_logger(&settings.logging)?;
    let signal_rx = setup_signal()?;
    let runtime = setup_runtime(&settings.runtime)?;

    // Run the server in its own task so that a panic surfaces as an error.
    let stats = runtime.block_on(async move {
        tokio::spawn(run(settings.server, settings.game, signal_rx)).await
    })??;
    info!(
        "served {} connections, good-bye, world!",
        stats.total_accepted_connections
    );
    Ok(())
}

fn setup_logger(l: &settings::Logging) -> anyhow::Result<LoggerHandle> {
    let level = LevelFilter::from_str(&l.level)
        .map_err(|e| anyhow!("invalid logging level {:?}: {}", l.level, e))?;
    let spec = LogSpecBuilder::new().default(level).build();
    let handle = Logger::with(spec)
        .format(flexi_logger::default_format)
        .start()?;
    Ok(handle)
}

fn setup_signal() -> anyhow::Result<watch::Receiver<bool>> {
    let (signal_tx, signal_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("received interrupt signal");
        signal_tx.send_replace(true);
    })?;
    Ok(signal_rx)
}

fn setup_runtime(r: &settings::Runtime) -> anyhow::Result<tokio::runtime::Runtime> {
    let mut builder = if r.threaded {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.worker_threads(at_least_one("worker_threads", r.worker_threads));
        builder
    } else {
        tokio::runtime::Builder::new_current_thread()
    };
    builder
        .enable_all()
        .max_blocking_threads(at_least_one(
            "max_blocking_threads",
            r.max_blocking_threads,
        ))
        .thread_name(r.thread_name.clone());
    Ok(builder.build()?)
}

fn at_least_one(name: &str, threads: usize) -> usize {
    if threads == 0 {
        warn!("{} must be greater than zero; adjusting to 1", name);
        1
    } else {
        threads
    }
}
