//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use std::io;
use std::mem;
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION, PROCESS_ALL_ACCESS};

/// Opens `pid` with all access rights
pub fn open_process_all_access(pid: ProcessId) -> MemoryResult<HANDLE> {
    unsafe {
        let handle = OpenProcess(PROCESS_ALL_ACCESS, FALSE, pid);
        if handle.is_null() {
            Err(MemoryError::process_open(
                pid,
                io::Error::last_os_error().to_string(),
            ))
        } else {
            Ok(handle)
        }
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::last_os_error())
    } else {
        Ok(())
    }
}

/// Reads exactly `buffer.len()` bytes at `address`
///
/// # Safety
/// The handle must be a valid process handle with read access
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: Address,
    buffer: &mut [u8],
) -> MemoryResult<()> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address.as_usize() as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        Err(MemoryError::read_failure(
            address,
            format!("ReadProcessMemory failed: {}", io::Error::last_os_error()),
        ))
    } else if bytes_read != buffer.len() {
        Err(MemoryError::read_failure(
            address,
            format!("short read ({} of {} bytes)", bytes_read, buffer.len()),
        ))
    } else {
        Ok(())
    }
}

/// Writes all of `data` at `address`
///
/// # Safety
/// The handle must be a valid process handle with write access
pub unsafe fn write_process_memory(
    handle: HANDLE,
    address: Address,
    data: &[u8],
) -> MemoryResult<()> {
    let mut bytes_written = 0;

    let result = WriteProcessMemory(
        handle,
        address.as_usize() as LPVOID,
        data.as_ptr() as LPCVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        Err(MemoryError::write_failure(
            address,
            format!("WriteProcessMemory failed: {}", io::Error::last_os_error()),
        ))
    } else if bytes_written != data.len() {
        Err(MemoryError::write_failure(
            address,
            format!("short write ({} of {} bytes)", bytes_written, data.len()),
        ))
    } else {
        Ok(())
    }
}

/// Describes the region containing `address`; `None` past the last region
///
/// # Safety
/// The handle must be a valid process handle with query access
pub unsafe fn virtual_query_ex(
    handle: HANDLE,
    address: usize,
) -> Option<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = mem::zeroed();

    let result = VirtualQueryEx(
        handle,
        address as LPCVOID,
        &mut mbi,
        mem::size_of::<MEMORY_BASIC_INFORMATION>(),
    );

    if result == 0 {
        None
    } else {
        Some(mbi)
    }
}
