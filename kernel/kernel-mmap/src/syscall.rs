//! # Syscall-style surface
//!
//! Thin wrappers translating the typed results of
//! [`ProcessVm::map`]/[`ProcessVm::unmap`] into the classic sentinel
//! convention: an invalid-address value for `mmap`, `0`/`-1` for `munmap`.
//! No unwinding crosses this boundary; failures are logged and turned into
//! sentinels for the dispatch layer to hand to the process.

use crate::process::{AddressSpaceOps, ProcessVm};
use crate::request::{MapFlags, MapProtection, MapRequest};
use kernel_kmalloc::{FrameSource, LockedKernelHeap};
use kernel_memory_addresses::VirtualAddress;
use log::debug;

/// Reserved invalid-address value returned by [`sys_mmap`] on failure.
/// Distinct from any legal mapping address (those lie below the kernel
/// boundary).
pub const MAP_FAILED: u64 = u64::MAX;

/// `mmap(addr, length, prot, flags, fd, offset)`.
///
/// Returns the page-aligned start address of the new mapping, or
/// [`MAP_FAILED`].
#[allow(clippy::too_many_arguments)]
pub fn sys_mmap(
    pm: &mut ProcessVm,
    aspace: &mut dyn AddressSpaceOps,
    heap: &LockedKernelHeap,
    frames: &mut dyn FrameSource,
    hint: u64,
    length: u64,
    prot: MapProtection,
    flags: MapFlags,
    fd: i32,
    offset: u64,
) -> u64 {
    let request = MapRequest {
        hint: VirtualAddress::new(hint),
        length,
        prot,
        flags,
        fd,
        offset,
    };
    match pm.map(aspace, heap, frames, &request) {
        Ok(start) => start.as_u64(),
        Err(err) => {
            debug!("mmap({hint:#x}, {length:#x}) failed: {err}");
            MAP_FAILED
        }
    }
}

/// `munmap(addr, length)`. Returns `0` on success, `-1` on failure.
pub fn sys_munmap(
    pm: &mut ProcessVm,
    aspace: &mut dyn AddressSpaceOps,
    heap: &LockedKernelHeap,
    addr: u64,
    length: u64,
) -> i64 {
    match pm.unmap(aspace, heap, VirtualAddress::new(addr), length) {
        Ok(()) => 0,
        Err(err) => {
            debug!("munmap({addr:#x}, {length:#x}) failed: {err}");
            -1
        }
    }
}
