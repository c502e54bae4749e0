//! # Per-Process Anonymous Memory Mappings
//!
//! Region tracking for anonymous (non-file-backed) mappings: each process
//! carries a singly linked list of [`MappedRegion`] records anchored in its
//! [`ProcessVm`], kept non-overlapping at the start-address level,
//! page-aligned, and consistent with the process's address-space size across
//! growth, shrink, and bulk teardown.
//!
//! ## Collaborators
//!
//! The hard work of making virtual memory present or absent is delegated:
//!
//! - [`AddressSpaceOps`] installs and removes page-table mappings for a byte
//!   range and activates the page table on the executing context;
//! - the shared [`LockedKernelHeap`](kernel_kmalloc::LockedKernelHeap)
//!   provides storage for the region records themselves.
//!
//! ## Operation shape
//!
//! A map request grows the address space, takes a record from the heap,
//! resolves a non-colliding page-aligned start address against the existing
//! list, and links the record in; every failure path rolls back whatever the
//! call already did, so no partial effect is ever observable. An unmap
//! request requires an exact start/length match. [`ProcessVm::teardown_all`]
//! is the bulk cleanup used when the whole address space is being destroyed.
//!
//! The syscall-facing surface lives in [`syscall`] and converts the typed
//! errors into the classic sentinel returns (`MAP_FAILED`, `-1`).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod layout;
mod mapper;
mod process;
mod region;
mod request;
pub mod syscall;

pub use mapper::{MapError, UnmapError};
pub use process::{AddressSpaceOps, ProcessVm, RegionIter};
pub use region::{MappedRegion, RegionKind};
pub use request::{MapFlags, MapProtection, MapRequest};
