use libproc::libproc::proc_pid::pidinfo;
use libproc::libproc::task_info::TaskInfo;

use super::{PlatformExtensions, ProcessAccess};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn default_app_names() -> &'static [&'static str] {
        &[
            "google chrome",
            "node",
            "code",
            "electron",
            "python",
            "python3",
            "postman",
            "slack",
            "adobe premiere pro",
            "after effects",
        ]
    }

    fn process_access(pid: u32) -> ProcessAccess {
        // Task info carries resident memory; if it can be read the process is usable.
        if pidinfo::<TaskInfo>(pid as i32, 0).is_ok() {
            return ProcessAccess::Accessible;
        }
        // libproc only reports a message string, so ask kill(2) whether the pid exists.
        let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if rc == 0 {
            return ProcessAccess::Denied;
        }
        match std::io::Error::last_os_error().raw_os_error() {
            Some(libc::ESRCH) => ProcessAccess::Vanished,
            _ => ProcessAccess::Denied,
        }
    }
}
