use color_eyre::Result;

/// Identity of a running process as seen by a [`ProcessSource`].
///
/// PIDs are reused after exit, so a handle is only considered the same
/// process when both the pid and the start time match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pub pid: u32,
    pub start_time: u64,
}

/// One row of the process table captured during the baseline stage.
#[derive(Clone, Debug)]
pub struct ProcessEntry {
    pub handle: ProcessHandle,
    pub name: String,
    /// Resident memory at enumeration time. Snapshots report the warm
    /// [`Reading`] instead; this is the pre-settle value kept on the baseline.
    pub memory_bytes: u64,
}

/// A warm reading: CPU percent since the previous read on the same handle,
/// plus current resident memory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

/// Outcome of a per-process query. Only `Ok` values reach a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup<T> {
    Ok(T),
    Vanished,
    Denied,
}

impl<T> Lookup<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Lookup::Ok(value) => Some(value),
            Lookup::Vanished | Lookup::Denied => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Access to the OS process table.
///
/// CPU readings are stateful per handle: the first read on a handle (the cold
/// read) only arms delta tracking, and each later read reports average usage
/// since the previous one. Per-core percentages are not normalized, so a
/// process saturating two cores reports about 200.
pub trait ProcessSource {
    /// Enumerate every process the caller can see. Errors only when the table
    /// itself cannot be queried.
    fn processes(&mut self) -> Result<Vec<ProcessEntry>>;

    /// Arm CPU tracking for `handles`. Any value the OS produces is discarded.
    fn cold_read(&mut self, handles: &[ProcessHandle]);

    /// Read CPU since the previous read and current memory, one lookup per
    /// handle in the same order.
    fn warm_read(&mut self, handles: &[ProcessHandle]) -> Vec<Lookup<Reading>>;

    /// Start a whole-system CPU measurement window.
    fn arm_system_cpu(&mut self);

    /// Whole-system CPU percent (0–100) since [`ProcessSource::arm_system_cpu`].
    fn system_cpu_percent(&mut self) -> f32;

    fn memory_totals(&mut self) -> MemoryTotals;
}
