use crate::FrameSource;
use crate::heap::{FreeListStats, KernelHeap};
use core::ptr::NonNull;
use kernel_sync::SpinLock;

/// The kernel-wide heap behind its mutual-exclusion lock.
///
/// The free ring is one resource shared by the whole kernel; the lock is held
/// for the full duration of every allocate/release so concurrent kernel
/// contexts never observe a half-spliced ring.
pub struct LockedKernelHeap {
    inner: SpinLock<KernelHeap>,
}

impl LockedKernelHeap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: SpinLock::new(KernelHeap::new()),
        }
    }

    /// Allocate under the lock. See [`KernelHeap::allocate`].
    ///
    /// # Safety
    /// Same contract as [`KernelHeap::allocate`]: this value must be pinned in
    /// place (a `static`, or boxed) and `frames` must uphold [`FrameSource`].
    pub unsafe fn allocate(
        &self,
        bytes: usize,
        frames: &mut dyn FrameSource,
    ) -> Option<NonNull<u8>> {
        let mut heap = self.inner.lock();
        // Safety: forwarded caller contract; the lock gives exclusive access.
        unsafe { heap.allocate(bytes, frames) }
    }

    /// Release under the lock. See [`KernelHeap::release`].
    ///
    /// # Safety
    /// `ptr` must come from [`allocate`](Self::allocate) on this heap and must
    /// not have been released already.
    pub unsafe fn release(&self, ptr: NonNull<u8>) {
        let mut heap = self.inner.lock();
        // Safety: forwarded caller contract.
        unsafe { heap.release(ptr) }
    }

    /// Snapshot of the free ring.
    #[must_use]
    pub fn stats(&self) -> FreeListStats {
        self.inner.with_lock(|heap| heap.stats())
    }
}

impl Default for LockedKernelHeap {
    fn default() -> Self {
        Self::new()
    }
}
