use super::{PlatformExtensions, ProcessAccess};

pub struct Platform;

#[cfg(target_os = "windows")]
use windows_sys::Win32::{
    Foundation::{CloseHandle, ERROR_ACCESS_DENIED, GetLastError},
    System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION},
};

impl PlatformExtensions for Platform {
    fn default_app_names() -> &'static [&'static str] {
        &[
            "chrome.exe",
            "node.exe",
            "code.exe",
            "python.exe",
            "postman.exe",
            "slack.exe",
            "adobe premiere pro.exe",
            "afterfx.exe",
        ]
    }

    #[cfg(target_os = "windows")]
    fn process_access(pid: u32) -> ProcessAccess {
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                return if GetLastError() == ERROR_ACCESS_DENIED {
                    ProcessAccess::Denied
                } else {
                    ProcessAccess::Vanished
                };
            }
            CloseHandle(handle);
            ProcessAccess::Accessible
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn process_access(_pid: u32) -> ProcessAccess {
        ProcessAccess::Vanished
    }
}
