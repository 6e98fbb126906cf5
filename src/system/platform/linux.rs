use std::io::ErrorKind;

use super::{PlatformExtensions, ProcessAccess};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn default_app_names() -> &'static [&'static str] {
        &["chrome", "node", "code", "python", "python3", "postman", "slack"]
    }

    fn process_access(pid: u32) -> ProcessAccess {
        // /proc/{pid}/stat is what the enumeration parses; if it can be opened
        // the process is alive and readable.
        match std::fs::File::open(format!("/proc/{pid}/stat")) {
            Ok(_) => ProcessAccess::Accessible,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => ProcessAccess::Denied,
            Err(_) => ProcessAccess::Vanished,
        }
    }
}
