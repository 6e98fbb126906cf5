use std::collections::HashMap;
use std::time::Duration;

use color_eyre::Result;
use serde::Deserialize;
use tracing::debug;

use super::aggregate::{AllowList, GroupBy, aggregate};
use super::cache::TrackedHandleCache;
use super::platform;
use super::snapshot::{ProcessSample, Snapshot, SystemStats};
use super::source::{Lookup, ProcessEntry, ProcessHandle, ProcessSource};
use crate::format::{bytes_to_gb, bytes_to_mb};

pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Where the whole-system CPU window comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemCpuWindow {
    /// A second blocking window after measurement.
    #[default]
    Separate,
    /// Armed at baseline and read after the per-process settle delay.
    Shared,
}

impl SystemCpuWindow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "separate" => Some(SystemCpuWindow::Separate),
            "shared" => Some(SystemCpuWindow::Shared),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SamplerSettings {
    pub settle: Duration,
    pub system_cpu: SystemCpuWindow,
    pub allow_list: AllowList,
    pub group_by: GroupBy,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        SamplerSettings {
            settle: DEFAULT_SETTLE,
            system_cpu: SystemCpuWindow::default(),
            allow_list: AllowList::new(platform::default_app_names()),
            group_by: GroupBy::default(),
        }
    }
}

/// Processes captured by the baseline stage, keyed by pid.
#[derive(Debug, Default)]
pub struct Baseline {
    entries: HashMap<u32, ProcessEntry>,
    armed: usize,
}

impl Baseline {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of processes that needed a cold read this time.
    pub fn armed(&self) -> usize {
        self.armed
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessEntry> {
        self.entries.get(&pid)
    }
}

/// Two-phase CPU sampler.
///
/// Owns its process source and the cache of handles whose CPU tracking is
/// already armed. Keep one `Sampler` alive across calls to [`Sampler::sample`]
/// and processes seen last time skip the cold read.
pub struct Sampler<S> {
    source: S,
    cache: TrackedHandleCache,
    settings: SamplerSettings,
    system_cpu_armed: bool,
}

impl<S: ProcessSource> Sampler<S> {
    pub fn new(source: S, settings: SamplerSettings) -> Self {
        Sampler {
            source,
            cache: TrackedHandleCache::new(),
            settings,
            system_cpu_armed: false,
        }
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn cache(&self) -> &TrackedHandleCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Enumerate processes and cold-read every one not already tracked.
    pub fn enumerate_baseline(&mut self) -> Result<Baseline> {
        let _span = tracing::debug_span!("sampler.baseline").entered();

        let entries = self.source.processes()?;
        let fresh: Vec<ProcessHandle> = entries
            .iter()
            .map(|entry| entry.handle)
            .filter(|handle| !self.cache.is_tracked(handle))
            .collect();
        self.source.cold_read(&fresh);

        debug!(
            processes = entries.len(),
            armed = fresh.len(),
            "baseline captured"
        );

        Ok(Baseline {
            entries: entries
                .into_iter()
                .map(|entry| (entry.handle.pid, entry))
                .collect(),
            armed: fresh.len(),
        })
    }

    /// Block for the settle interval so CPU deltas accumulate.
    pub fn settle(&self) {
        if !self.settings.settle.is_zero() {
            std::thread::sleep(self.settings.settle);
        }
    }

    /// Warm-read every baseline process, ordered by pid.
    ///
    /// Processes that exited or became unreadable are skipped. The tracked
    /// cache is replaced with exactly the handles that produced a reading.
    pub fn measure(&mut self, baseline: Baseline) -> Vec<ProcessSample> {
        let _span = tracing::debug_span!("sampler.measure").entered();

        let mut entries: Vec<ProcessEntry> = baseline.entries.into_values().collect();
        entries.sort_unstable_by_key(|entry| entry.handle.pid);
        let handles: Vec<ProcessHandle> = entries.iter().map(|entry| entry.handle).collect();
        let lookups = self.source.warm_read(&handles);

        let mut samples = Vec::with_capacity(entries.len());
        let mut survivors = Vec::with_capacity(entries.len());
        let mut vanished = 0usize;
        let mut denied = 0usize;

        for (entry, lookup) in entries.into_iter().zip(lookups) {
            match lookup {
                Lookup::Ok(reading) => {
                    survivors.push(entry.handle);
                    samples.push(ProcessSample {
                        name: entry.name,
                        pid: entry.handle.pid,
                        cpu_percent: f64::from(reading.cpu_percent),
                        memory_mb: bytes_to_mb(reading.memory_bytes),
                    });
                }
                Lookup::Vanished => vanished += 1,
                Lookup::Denied => denied += 1,
            }
        }

        self.cache.replace(survivors);
        debug!(
            measured = samples.len(),
            vanished, denied, "measurement complete"
        );
        samples
    }

    /// Whole-system CPU percent plus physical memory totals in GiB.
    ///
    /// Unless the window was armed earlier in this run, this blocks for one
    /// more settle interval.
    pub fn system_stats(&mut self) -> SystemStats {
        let _span = tracing::debug_span!("sampler.system_stats").entered();

        if !self.system_cpu_armed {
            self.source.arm_system_cpu();
            self.settle();
        }
        self.system_cpu_armed = false;

        let cpu = self.source.system_cpu_percent();
        let memory = self.source.memory_totals();
        SystemStats {
            total_cpu_usage: f64::from(cpu),
            total_memory_gb: bytes_to_gb(memory.total_bytes),
            used_memory_gb: bytes_to_gb(memory.used_bytes),
        }
    }

    /// One full cycle: baseline, settle, measure, aggregate and system stats.
    pub fn sample(&mut self) -> Result<Snapshot> {
        let _span = tracing::debug_span!("sampler.sample").entered();

        let baseline = self.enumerate_baseline()?;
        if self.settings.system_cpu == SystemCpuWindow::Shared {
            self.source.arm_system_cpu();
            self.system_cpu_armed = true;
        }
        self.settle();

        let samples = self.measure(baseline);
        let apps = aggregate(&samples, &self.settings.allow_list, self.settings.group_by);
        let system_stats = self.system_stats();

        Ok(Snapshot::assemble(apps, samples, system_stats))
    }
}
