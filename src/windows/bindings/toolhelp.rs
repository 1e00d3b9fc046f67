//! Process enumeration using the ToolHelp32 API

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use std::mem;
use winapi::shared::minwindef::FALSE;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32First, Process32Next, PROCESSENTRY32, TH32CS_SNAPPROCESS,
};
use winapi::um::winnt::HANDLE;

/// Snapshot of running processes, yielding `(pid, executable name)`
pub struct ProcessSnapshot {
    snapshot: HANDLE,
    first_called: bool,
}

impl ProcessSnapshot {
    pub fn new() -> MemoryResult<Self> {
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
            if snapshot.is_null() || snapshot == INVALID_HANDLE_VALUE {
                return Err(MemoryError::last_os_error());
            }
            Ok(ProcessSnapshot {
                snapshot,
                first_called: false,
            })
        }
    }

    fn next_entry(&mut self) -> Option<(ProcessId, String)> {
        unsafe {
            let mut entry: PROCESSENTRY32 = mem::zeroed();
            entry.dwSize = mem::size_of::<PROCESSENTRY32>() as u32;

            let success = if !self.first_called {
                self.first_called = true;
                Process32First(self.snapshot, &mut entry)
            } else {
                Process32Next(self.snapshot, &mut entry)
            };

            if success == FALSE {
                return None;
            }

            let name_bytes = &entry.szExeFile;
            let len = name_bytes
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(name_bytes.len());
            let name: Vec<u8> = name_bytes[..len].iter().map(|&c| c as u8).collect();
            Some((
                entry.th32ProcessID,
                String::from_utf8_lossy(&name).into_owned(),
            ))
        }
    }
}

impl Drop for ProcessSnapshot {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.snapshot);
        }
    }
}

impl Iterator for ProcessSnapshot {
    type Item = (ProcessId, String);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}

/// First process whose executable name is exactly `name`
pub fn find_process_id(name: &str) -> MemoryResult<Option<ProcessId>> {
    Ok(ProcessSnapshot::new()?
        .find(|(_, exe)| exe == name)
        .map(|(pid, _)| pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lists_processes() {
        let processes: Vec<_> = ProcessSnapshot::new().unwrap().collect();
        assert!(!processes.is_empty());
        assert!(processes.iter().any(|(pid, _)| *pid == std::process::id()));
    }

    #[test]
    fn test_find_missing_process() {
        let pid = find_process_id("no-such-process-memscan.exe").unwrap();
        assert!(pid.is_none());
    }
}
