//! # Page-Backed Kernel Metadata Allocator
//!
//! A small general-purpose allocator for short-lived kernel metadata records
//! (mapped-region bookkeeping and the like), backed by pages pulled one at a
//! time from a physical frame allocator.
//!
//! ## Design outline
//! - **Free-list nodes**: every free block starts with a header carrying its
//!   size in *allocation units* (one unit is the size of one header) and a
//!   link to the next free block.
//! - **Ring structure**: free blocks form a **circular**, address-ordered
//!   singly linked list anchored by a permanently present zero-size sentinel.
//! - **Allocation strategy**: first-fit starting at a rover cursor left behind
//!   by the previous operation, so repeated allocations do not rescan the
//!   front of the list. Exact fits are unlinked; larger blocks hand out their
//!   tail and keep the head in the list.
//! - **Growth**: a fruitless full traversal pulls exactly one page from the
//!   [`FrameSource`] and feeds it through the release path; exhaustion of the
//!   frame source is the only failure mode.
//! - **Coalescing**: physically adjacent free blocks are merged on every
//!   release, so the ring never carries two adjacent free blocks.
//! - **Synchronization**: [`LockedKernelHeap`] wraps the whole thing in a
//!   [`SpinLock`](kernel_sync::SpinLock) held for the duration of each call;
//!   the heap is a single kernel-wide resource, not per-process state.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod frame_source;
mod heap;
mod locked;

pub use frame_source::FrameSource;
pub use heap::{FreeListStats, KernelHeap, MAX_ALLOC, PAGE_SIZE};
pub use locked::LockedKernelHeap;
