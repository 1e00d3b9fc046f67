//! Walking the writable committed regions of a process

use super::bindings::kernel32;
use super::handle::ProcessHandle;
use crate::core::types::Address;
use winapi::um::winnt::{
    MEMORY_BASIC_INFORMATION, MEM_COMMIT, PAGE_EXECUTE_READWRITE, PAGE_READWRITE,
    PAGE_WRITECOPY,
};

/// Protections a scanned region must carry at least one of
const SCANNABLE_PROTECTION: u32 = PAGE_READWRITE | PAGE_EXECUTE_READWRITE | PAGE_WRITECOPY;

/// A region worth scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub base: Address,
    pub size: usize,
}

impl Region {
    fn from_info(mbi: &MEMORY_BASIC_INFORMATION) -> Self {
        Region {
            base: Address::new(mbi.BaseAddress as usize),
            size: mbi.RegionSize,
        }
    }
}

/// True for committed regions holding writable data
pub fn is_scannable(state: u32, protect: u32) -> bool {
    state == MEM_COMMIT && (protect & SCANNABLE_PROTECTION) != 0
}

/// Iterates `VirtualQueryEx` from address 0, yielding scannable regions
pub struct RegionWalker<'a> {
    handle: &'a ProcessHandle,
    next: usize,
    queried: usize,
    done: bool,
}

impl<'a> RegionWalker<'a> {
    pub fn new(handle: &'a ProcessHandle) -> Self {
        RegionWalker {
            handle,
            next: 0,
            queried: 0,
            done: false,
        }
    }

    /// Number of regions described so far, scannable or not
    pub fn queried(&self) -> usize {
        self.queried
    }
}

impl Iterator for RegionWalker<'_> {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        while !self.done {
            let mbi = match unsafe { kernel32::virtual_query_ex(self.handle.raw(), self.next) } {
                Some(mbi) => mbi,
                None => {
                    self.done = true;
                    break;
                }
            };
            self.queried += 1;

            match (mbi.BaseAddress as usize).checked_add(mbi.RegionSize) {
                Some(end) if end > self.next => self.next = end,
                _ => self.done = true,
            }

            if is_scannable(mbi.State, mbi.Protect) {
                return Some(Region::from_info(&mbi));
            }
        }
        None
    }
}
