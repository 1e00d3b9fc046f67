//! Process handle with automatic cleanup

use super::bindings::kernel32;
use crate::core::types::{MemoryResult, ProcessId};
use std::fmt;
use winapi::um::winnt::HANDLE;

/// Open handle to a target process, closed on drop
pub struct ProcessHandle {
    handle: HANDLE,
    pid: ProcessId,
}

impl ProcessHandle {
    /// Opens `pid` with all access rights
    pub fn open(pid: ProcessId) -> MemoryResult<Self> {
        let handle = kernel32::open_process_all_access(pid)?;
        Ok(ProcessHandle { handle, pid })
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the raw handle
    ///
    /// # Safety
    /// The returned handle is only valid as long as this ProcessHandle exists
    pub unsafe fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // Ignore errors on cleanup
        unsafe {
            let _ = kernel32::close_handle(self.handle);
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("handle", &self.handle)
            .finish()
    }
}

// Send + Sync are safe because HANDLEs are process-local
unsafe impl Send for ProcessHandle {}
unsafe impl Sync for ProcessHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_current_process() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();
        assert_eq!(handle.pid(), std::process::id());
        assert!(unsafe { !handle.raw().is_null() });
    }
}
