/// What the OS says about a process the enumeration no longer reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessAccess {
    Accessible,
    Vanished,
    Denied,
}

pub trait PlatformExtensions {
    /// Lowercased executable names grouped into apps when no list is configured.
    fn default_app_names() -> &'static [&'static str];
    fn process_access(pid: u32) -> ProcessAccess;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn default_app_names() -> Vec<String> {
    platform_impl::Platform::default_app_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn process_access(pid: u32) -> ProcessAccess {
    platform_impl::Platform::process_access(pid)
}
