#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use appsnap::system::aggregate::{AllowList, GroupBy};
use appsnap::system::sampler::{SamplerSettings, SystemCpuWindow};
use appsnap::system::source::{
    Lookup, MemoryTotals, ProcessEntry, ProcessHandle, ProcessSource, Reading,
};
use color_eyre::Result;
use color_eyre::eyre::bail;

pub const WINDOWS_APPS: [&str; 8] = [
    "chrome.exe",
    "node.exe",
    "code.exe",
    "python.exe",
    "postman.exe",
    "slack.exe",
    "adobe premiere pro.exe",
    "afterfx.exe",
];

/// What a fake handle reports when it is read without having been armed.
pub const UNARMED_CPU: f32 = -1.0;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Processes,
    ColdRead,
    WarmRead,
    ArmSystemCpu,
    SystemCpu,
    MemoryTotals,
}

#[derive(Clone, Debug)]
pub struct FakeProcess {
    pub name: String,
    pub start_time: u64,
    pub memory_bytes: u64,
    pub cpu_percent: f32,
}

/// In-memory process table with per-handle CPU arming.
pub struct FakeSource {
    pub processes: BTreeMap<u32, FakeProcess>,
    pub armed: HashSet<ProcessHandle>,
    pub cold_reads: Vec<Vec<u32>>,
    pub calls: Vec<Call>,
    /// Processes that exit between the baseline and measurement stages.
    pub exit_before_measure: HashSet<u32>,
    pub deny_on_measure: HashSet<u32>,
    /// Number of upcoming enumerations that fail outright.
    pub failing_enumerations: usize,
    pub system_cpu: f32,
    pub memory: MemoryTotals,
    pub last_cold_read: Option<Instant>,
    pub last_warm_read: Option<Instant>,
}

impl Default for FakeSource {
    fn default() -> Self {
        FakeSource {
            processes: BTreeMap::new(),
            armed: HashSet::new(),
            cold_reads: Vec::new(),
            calls: Vec::new(),
            exit_before_measure: HashSet::new(),
            deny_on_measure: HashSet::new(),
            failing_enumerations: 0,
            system_cpu: 12.5,
            memory: MemoryTotals {
                total_bytes: 16 * GIB,
                used_bytes: 8 * GIB + GIB / 4,
            },
            last_cold_read: None,
            last_warm_read: None,
        }
    }
}

impl FakeSource {
    pub fn with(mut self, pid: u32, name: &str, memory_mb: u64, cpu_percent: f32) -> Self {
        self.spawn(pid, name, memory_mb, cpu_percent);
        self
    }

    /// Start a process; a reused pid gets a later start time.
    pub fn spawn(&mut self, pid: u32, name: &str, memory_mb: u64, cpu_percent: f32) {
        let start_time = self
            .processes
            .get(&pid)
            .map(|p| p.start_time + 1)
            .unwrap_or(1_000 + u64::from(pid));
        self.processes.insert(
            pid,
            FakeProcess {
                name: name.to_string(),
                start_time,
                memory_bytes: memory_mb * MIB,
                cpu_percent,
            },
        );
    }

    fn handle(pid: u32, process: &FakeProcess) -> ProcessHandle {
        ProcessHandle {
            pid,
            start_time: process.start_time,
        }
    }
}

impl ProcessSource for FakeSource {
    fn processes(&mut self) -> Result<Vec<ProcessEntry>> {
        self.calls.push(Call::Processes);
        if self.failing_enumerations > 0 {
            self.failing_enumerations -= 1;
            bail!("permission denied reading process table");
        }
        Ok(self
            .processes
            .iter()
            .map(|(&pid, p)| ProcessEntry {
                handle: Self::handle(pid, p),
                name: p.name.clone(),
                memory_bytes: p.memory_bytes,
            })
            .collect())
    }

    fn cold_read(&mut self, handles: &[ProcessHandle]) {
        self.calls.push(Call::ColdRead);
        self.last_cold_read = Some(Instant::now());
        self.cold_reads.push(handles.iter().map(|h| h.pid).collect());
        self.armed.extend(handles.iter().copied());
    }

    fn warm_read(&mut self, handles: &[ProcessHandle]) -> Vec<Lookup<Reading>> {
        self.calls.push(Call::WarmRead);
        self.last_warm_read = Some(Instant::now());

        let mut lookups = Vec::with_capacity(handles.len());
        for handle in handles {
            if self.exit_before_measure.remove(&handle.pid) {
                self.processes.remove(&handle.pid);
                lookups.push(Lookup::Vanished);
                continue;
            }
            if self.deny_on_measure.contains(&handle.pid) {
                lookups.push(Lookup::Denied);
                continue;
            }
            let lookup = match self.processes.get(&handle.pid) {
                Some(p) if p.start_time == handle.start_time => {
                    let cpu_percent = if self.armed.insert(*handle) {
                        UNARMED_CPU
                    } else {
                        p.cpu_percent
                    };
                    Lookup::Ok(Reading {
                        cpu_percent,
                        memory_bytes: p.memory_bytes,
                    })
                }
                _ => Lookup::Vanished,
            };
            lookups.push(lookup);
        }
        lookups
    }

    fn arm_system_cpu(&mut self) {
        self.calls.push(Call::ArmSystemCpu);
    }

    fn system_cpu_percent(&mut self) -> f32 {
        self.calls.push(Call::SystemCpu);
        self.system_cpu
    }

    fn memory_totals(&mut self) -> MemoryTotals {
        self.calls.push(Call::MemoryTotals);
        self.memory
    }
}

pub fn settings(names: &[&str]) -> SamplerSettings {
    SamplerSettings {
        settle: Duration::ZERO,
        system_cpu: SystemCpuWindow::Separate,
        allow_list: AllowList::new(names),
        group_by: GroupBy::Exact,
    }
}

/// The three-process example used across the tests.
pub fn chrome_and_notepad() -> FakeSource {
    FakeSource::default()
        .with(100, "chrome.exe", 40, 5.0)
        .with(101, "chrome.exe", 60, 3.0)
        .with(200, "notepad.exe", 10, 1.0)
}
