use std::collections::HashMap;

use super::source::ProcessHandle;

/// Handles whose CPU tracking is already armed, keyed by pid.
///
/// Replaced wholesale after every measurement so that exited processes drop
/// out and a pid reused later gets a fresh cold read.
#[derive(Debug, Default)]
pub struct TrackedHandleCache {
    entries: HashMap<u32, ProcessHandle>,
}

impl TrackedHandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `handle` is the same process that was measured last time.
    pub fn is_tracked(&self, handle: &ProcessHandle) -> bool {
        self.entries.get(&handle.pid) == Some(handle)
    }

    pub fn replace<I>(&mut self, handles: I)
    where
        I: IntoIterator<Item = ProcessHandle>,
    {
        self.entries = handles.into_iter().map(|h| (h.pid, h)).collect();
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessHandle> {
        self.entries.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
