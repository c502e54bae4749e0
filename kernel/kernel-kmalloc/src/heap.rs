use crate::FrameSource;
use core::ptr::{NonNull, null_mut};
use log::trace;

/// Size of one physical page in bytes.
pub const PAGE_SIZE: usize = 4096;

const _: () = assert!(PAGE_SIZE as u64 == kernel_memory_addresses::PAGE_SIZE);

/// One allocation unit: the size of a block header. Block sizes are counted
/// in units, and every payload is a whole number of units.
const UNIT: usize = size_of::<BlockHeader>();

/// Units in one full page.
const PAGE_UNITS: usize = PAGE_SIZE / UNIT;

/// Largest request servable from a single page (one unit goes to the header).
pub const MAX_ALLOC: usize = PAGE_SIZE - UNIT;

const _: () = assert!(PAGE_SIZE % UNIT == 0);

/// Header at the start of every free block.
///
/// A block occupies `units * UNIT` bytes including this header; an allocated
/// block's payload begins one unit past the header:
///
/// ```text
/// +--------------+--------------------------------+
/// | BlockHeader  |   payload ((units - 1) * UNIT) |
/// +--------------+--------------------------------+
/// ^ block                                         ^ block + units * UNIT
/// ```
#[repr(C)]
struct BlockHeader {
    /// Next free block in the ring.
    next: *mut BlockHeader,
    /// Block size in units, header included.
    units: usize,
}

/// Aggregate view of the free ring, for diagnostics and tests.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FreeListStats {
    /// Number of free blocks (the anchor is not counted).
    pub blocks: usize,
    /// Total free capacity in units, headers included.
    pub units: usize,
}

/// Boundary-tag, first-fit heap over a circular, address-ordered free ring.
///
/// # Invariants
/// - The ring is always circular; the zero-size `anchor` is a permanent member
///   and is never handed to a caller or merged with page memory.
/// - Free blocks are address-ordered around the ring and never overlap.
/// - No two physically adjacent blocks remain after a release returns.
///
/// # Pinning
/// The ring links back into the embedded anchor, so the heap must not move in
/// memory once the first allocation has closed the ring. Keep it in a `static`
/// (see [`LockedKernelHeap`](crate::LockedKernelHeap)) or behind a `Box`.
pub struct KernelHeap {
    /// Permanently present zero-size sentinel block.
    anchor: BlockHeader,
    /// Where the previous allocate/release left off; null until first use.
    rover: *mut BlockHeader,
}

// Safety: raw pointers are only touched under the owner's exclusive access
// (LockedKernelHeap holds a SpinLock across every call).
unsafe impl Send for KernelHeap {}

impl KernelHeap {
    /// An empty heap; the free ring is closed lazily on first allocation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: BlockHeader {
                next: null_mut(),
                units: 0,
            },
            rover: null_mut(),
        }
    }

    /// `true` once the free ring has been closed by a first allocation.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        !self.rover.is_null()
    }

    /// Close the ring on the anchor. Idempotent.
    fn ensure_ring(&mut self) {
        if self.rover.is_null() {
            let anchor = &raw mut self.anchor;
            self.anchor.next = anchor;
            self.rover = anchor;
        }
    }

    /// Allocate `bytes` of metadata storage, rounded up to whole units.
    ///
    /// Walks the ring first-fit from the rover. A completed lap without a fit
    /// pulls exactly one page from `frames` and resumes; `None` is returned
    /// only when the frame source is exhausted (the ring is left unchanged in
    /// that case).
    ///
    /// # Panics
    /// If `bytes` is zero or exceeds [`MAX_ALLOC`]. A request that can never
    /// be satisfied by a single page is a contract violation by the caller,
    /// not a runtime condition.
    ///
    /// # Safety
    /// The heap must not have moved since the first allocation, and `frames`
    /// must uphold the [`FrameSource`] contract.
    pub unsafe fn allocate(
        &mut self,
        bytes: usize,
        frames: &mut dyn FrameSource,
    ) -> Option<NonNull<u8>> {
        assert!(bytes >= 1, "kmalloc: zero-size request");
        assert!(bytes <= MAX_ALLOC, "kmalloc: request exceeds a single page");
        let nunits = (bytes + UNIT - 1) / UNIT + 1;
        self.ensure_ring();

        // Safety: all pointers in the ring refer to live free blocks or the
        // pinned anchor; exclusive access is guaranteed by &mut self.
        unsafe {
            let mut prev = self.rover;
            let mut cur = (*prev).next;
            loop {
                if (*cur).units >= nunits {
                    if (*cur).units == nunits {
                        // exact fit: unlink the whole block
                        (*prev).next = (*cur).next;
                    } else {
                        // hand out the tail, keep the head in the ring
                        (*cur).units -= nunits;
                        cur = cur.add((*cur).units);
                        (*cur).units = nunits;
                    }
                    self.rover = prev;
                    return Some(NonNull::new_unchecked(cur.add(1).cast::<u8>()));
                }
                if cur == self.rover {
                    // full lap without a fit: grow by one page
                    trace!("kmalloc: free ring exhausted, pulling a page");
                    let page = frames.acquire_page()?;
                    let header = page.as_ptr().cast::<BlockHeader>();
                    (*header).units = PAGE_UNITS;
                    self.insert(header);
                    cur = self.rover;
                }
                prev = cur;
                cur = (*cur).next;
            }
        }
    }

    /// Return a previously allocated block to the ring.
    ///
    /// # Safety
    /// `ptr` must come from [`allocate`](Self::allocate) on this heap and must
    /// not have been released already; the heap must not have moved.
    pub unsafe fn release(&mut self, ptr: NonNull<u8>) {
        // Safety: the header sits one unit below the payload per the
        // allocate() layout; insertion requirements are the caller's contract.
        unsafe {
            let block = ptr.as_ptr().cast::<BlockHeader>().sub(1);
            self.insert(block);
        }
    }

    /// Splice `block` into the ring at its unique address-ordered position and
    /// coalesce with physical neighbors. Leaves the rover at the merge point.
    ///
    /// # Safety
    /// `block` must carry a valid `units` count and describe memory owned by
    /// the caller; the ring must be closed.
    unsafe fn insert(&mut self, block: *mut BlockHeader) {
        debug_assert!(self.is_initialized(), "free ring not closed");
        let block_addr = block as usize;
        let anchor = &raw mut self.anchor;

        unsafe {
            // Find p with p < block < p->next, or the wraparound arc where the
            // ring passes from the highest address back to the lowest.
            let mut p = self.rover;
            loop {
                let next_addr = (*p).next as usize;
                let p_addr = p as usize;
                if p_addr < block_addr && block_addr < next_addr {
                    break;
                }
                if p_addr >= next_addr && (block_addr > p_addr || block_addr < next_addr) {
                    break;
                }
                p = (*p).next;
            }

            // Merge with the upper neighbor when physically adjacent. The
            // anchor lives inside the allocator, not in page memory, and is
            // never merged.
            let next = (*p).next;
            if block_addr + (*block).units * UNIT == next as usize && next != anchor {
                (*block).units += (*next).units;
                (*block).next = (*next).next;
            } else {
                (*block).next = next;
            }

            // Merge with the lower neighbor under the same adjacency test.
            if p as usize + (*p).units * UNIT == block_addr && p != anchor {
                (*p).units += (*block).units;
                (*p).next = (*block).next;
            } else {
                (*p).next = block;
            }

            self.rover = p;
        }
    }

    /// Walk the ring and report free block count and capacity.
    #[must_use]
    pub fn stats(&self) -> FreeListStats {
        let mut stats = FreeListStats { blocks: 0, units: 0 };
        if !self.is_initialized() {
            return stats;
        }
        let anchor = (&raw const self.anchor).cast_mut();
        // Safety: the ring is closed and all links are live free blocks.
        unsafe {
            let mut p = self.anchor.next;
            while p != anchor {
                stats.blocks += 1;
                stats.units += (*p).units;
                p = (*p).next;
            }
        }
        stats
    }
}

impl Default for KernelHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_is_header_sized() {
        assert_eq!(UNIT, size_of::<BlockHeader>());
        assert_eq!(PAGE_UNITS * UNIT, PAGE_SIZE);
        assert_eq!(MAX_ALLOC, PAGE_SIZE - UNIT);
    }

    #[test]
    fn fresh_heap_is_empty() {
        let heap = KernelHeap::new();
        assert!(!heap.is_initialized());
        assert_eq!(heap.stats(), FreeListStats { blocks: 0, units: 0 });
    }
}
