use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::system::sampler::Sampler;
use crate::system::snapshot::Snapshot;
use crate::system::source::ProcessSource;

#[derive(Clone, Copy, Debug)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this many successful snapshots; run until Ctrl-C when `None`.
    pub max_cycles: Option<usize>,
}

/// Sample on a fixed interval with one long-lived sampler, handing every
/// snapshot to `emit`.
///
/// Each cycle runs on the blocking pool because the settle delays sleep the
/// thread. A failed cycle is logged and retried on the next tick; an `emit`
/// error (for example a closed stdout) ends the loop.
///
/// Ctrl-C is only observed while waiting for the next tick. A cycle that has
/// already started always runs to completion and its snapshot is emitted
/// before the loop stops.
pub async fn watch<S, F>(
    mut sampler: Sampler<S>,
    options: WatchOptions,
    mut emit: F,
) -> Result<Sampler<S>>
where
    S: ProcessSource + Send + 'static,
    F: FnMut(&Snapshot) -> Result<()>,
{
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut emitted = 0usize;
    loop {
        if options.max_cycles.is_some_and(|max| emitted >= max) {
            break;
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("interrupted, stopping watch");
                break;
            }
            _ = ticker.tick() => {}
        }

        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = sampler.sample();
            (sampler, result)
        })
        .await
        .map_err(|e| eyre!("sampling task failed: {e}"))?;
        sampler = returned;

        match result {
            Ok(snapshot) => {
                emit(&snapshot)?;
                emitted += 1;
            }
            Err(err) => error!("sampling cycle failed, retrying next tick: {err:#}"),
        }
    }

    Ok(sampler)
}
