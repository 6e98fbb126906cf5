use color_eyre::Result;
use color_eyre::eyre::bail;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use super::platform::{self, ProcessAccess};
use super::source::{Lookup, MemoryTotals, ProcessEntry, ProcessHandle, ProcessSource, Reading};

/// [`ProcessSource`] backed by a long-lived `sysinfo::System`.
///
/// sysinfo keeps the previous CPU times per pid inside `System`, which is what
/// makes cold and warm reads possible: a refresh with CPU enabled stores a
/// baseline, the next one computes usage over the elapsed window.
///
/// Any process refresh moves the per-process time base, but only a CPU refresh
/// moves the global window it is divided by. Enumeration therefore refreshes
/// CPU as well, so tracked processes are measured over the settle delay and
/// not over the whole gap since the previous run.
pub struct Collector {
    sys: System,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Collector { sys: System::new() }
    }
}

fn to_pids(handles: &[ProcessHandle]) -> Vec<Pid> {
    handles.iter().map(|h| Pid::from_u32(h.pid)).collect()
}

impl ProcessSource for Collector {
    fn processes(&mut self) -> Result<Vec<ProcessEntry>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            bail!(
                "process enumeration is not supported on {}",
                std::env::consts::OS
            );
        }

        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );

        let entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                handle: ProcessHandle {
                    pid: pid.as_u32(),
                    start_time: process.start_time(),
                },
                name: process.name().to_string_lossy().to_string(),
                memory_bytes: process.memory(),
            })
            .collect();

        if entries.is_empty() {
            bail!("process table returned no readable processes");
        }
        Ok(entries)
    }

    fn cold_read(&mut self, handles: &[ProcessHandle]) {
        if handles.is_empty() {
            return;
        }
        let pids = to_pids(handles);
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            false,
            ProcessRefreshKind::nothing().with_cpu(),
        );
    }

    fn warm_read(&mut self, handles: &[ProcessHandle]) -> Vec<Lookup<Reading>> {
        if handles.is_empty() {
            return Vec::new();
        }
        let pids = to_pids(handles);
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        handles
            .iter()
            .map(|handle| match self.sys.process(Pid::from_u32(handle.pid)) {
                // A different start time means the pid was reused by a new process.
                Some(process) if process.start_time() == handle.start_time => {
                    Lookup::Ok(Reading {
                        cpu_percent: process.cpu_usage(),
                        memory_bytes: process.memory(),
                    })
                }
                Some(_) => Lookup::Vanished,
                None => match platform::process_access(handle.pid) {
                    ProcessAccess::Denied => Lookup::Denied,
                    ProcessAccess::Accessible | ProcessAccess::Vanished => Lookup::Vanished,
                },
            })
            .collect()
    }

    fn arm_system_cpu(&mut self) {
        self.sys.refresh_cpu_usage();
    }

    fn system_cpu_percent(&mut self) -> f32 {
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage()
    }

    fn memory_totals(&mut self) -> MemoryTotals {
        self.sys.refresh_memory();
        MemoryTotals {
            total_bytes: self.sys.total_memory(),
            used_bytes: self.sys.used_memory(),
        }
    }
}
