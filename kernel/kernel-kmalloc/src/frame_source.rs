use core::ptr::NonNull;

/// Source of physical pages for the heap (the external frame allocator).
///
/// Every successful call hands out a block of exactly
/// [`PAGE_SIZE`](crate::PAGE_SIZE) bytes; `None` means physical memory is
/// exhausted.
///
/// # Safety
/// Implementations must return pages that are valid, writable, exclusive to
/// the caller until released, and aligned to at least 16 bytes (real page
/// frames are page-aligned).
pub unsafe trait FrameSource {
    /// Acquire one page, or `None` if no frames remain.
    fn acquire_page(&mut self) -> Option<NonNull<u8>>;
}
