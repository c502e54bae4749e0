use crate::layout::KERNEL_BASE;
use crate::process::{AddressSpaceOps, ProcessVm};
use crate::region::{MappedRegion, RegionKind};
use crate::request::MapRequest;
use core::ptr::NonNull;
use kernel_kmalloc::{FrameSource, LockedKernelHeap};
use kernel_memory_addresses::{PAGE_SIZE, VirtualAddress, page_align_down, page_align_up};
use log::trace;
use thiserror::Error;

/// Why a map request failed. Every failure leaves no observable effect.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum MapError {
    /// Zero length, an address hint in the kernel-reserved range, or a
    /// length that would overflow the address-space size.
    #[error("invalid length or address hint")]
    InvalidArgument,
    /// The address-space growth primitive or the metadata heap ran out of
    /// physical memory.
    #[error("out of memory")]
    AllocationExhausted,
    /// No non-colliding start address exists below the kernel boundary.
    #[error("no usable start address below the kernel boundary")]
    PlacementExhausted,
}

/// Why an unmap request failed. Every failure leaves no observable effect.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum UnmapError {
    /// Zero length or an address in the kernel-reserved range.
    #[error("invalid length or address")]
    InvalidArgument,
    /// No region matches the given start address and length exactly.
    #[error("no region matches the given start and length")]
    NoSuchRegion,
}

impl ProcessVm {
    /// Map `req.length` bytes of anonymous memory at the address-space
    /// high-water mark, returning the page-aligned start address.
    ///
    /// The hint is validated but not honored; protection and mapping flags
    /// and the file descriptor are accepted unused, and `req.offset` is
    /// stored on the record verbatim. Placement avoids the start addresses
    /// of existing regions (start-address collision check, not a full
    /// interval check). On any failure the address-space growth and the
    /// record allocation are rolled back before returning.
    pub fn map(
        &mut self,
        aspace: &mut dyn AddressSpaceOps,
        heap: &LockedKernelHeap,
        frames: &mut dyn FrameSource,
        req: &MapRequest,
    ) -> Result<VirtualAddress, MapError> {
        if req.length < 1 || req.hint.as_u64() >= KERNEL_BASE {
            return Err(MapError::InvalidArgument);
        }
        let old_size = self.size;
        let new_size = old_size
            .checked_add(req.length)
            .ok_or(MapError::InvalidArgument)?;

        // Make the memory present first; everything after this must undo the
        // growth on failure.
        let Some(grown) = aspace.grow(self.page_table, old_size, new_size) else {
            return Err(MapError::AllocationExhausted);
        };
        self.size = grown;
        aspace.activate(self.page_table);

        // Region record storage comes from the shared kernel heap.
        // Safety: the heap upholds its pinning contract (static or boxed);
        // `frames` is the kernel frame allocator.
        let Some(record) = (unsafe { heap.allocate(size_of::<MappedRegion>(), frames) }) else {
            self.size = aspace.shrink(self.page_table, self.size, old_size);
            aspace.activate(self.page_table);
            return Err(MapError::AllocationExhausted);
        };

        // Place at the pre-growth boundary, stepping over any region that
        // already starts at the candidate address. Advancing restarts the
        // scan: a step can land on a region seen earlier.
        let step = page_align_down(PAGE_SIZE.saturating_add(req.length));
        let mut start = VirtualAddress::new(page_align_up(old_size));
        'placement: loop {
            if start.as_u64() >= KERNEL_BASE {
                // Safety: `record` came from this heap and was never linked.
                unsafe { heap.release(record) };
                self.size = aspace.shrink(self.page_table, self.size, old_size);
                aspace.activate(self.page_table);
                return Err(MapError::PlacementExhausted);
            }
            for region in self.regions() {
                if region.start() == start {
                    start = VirtualAddress::new(start.as_u64().saturating_add(step));
                    continue 'placement;
                }
            }
            break;
        }

        let node = record.cast::<MappedRegion>();
        // Safety: the record is a fresh, exclusive, suitably aligned heap
        // block large enough for a MappedRegion (checked at compile time).
        unsafe {
            node.as_ptr().write(MappedRegion::new(
                start,
                req.length,
                RegionKind::Anonymous,
                req.offset,
            ));
        }
        self.push_region(node.as_ptr());

        trace!("mmap: placed {} + {:#x}", start, req.length);
        Ok(start)
    }

    /// Unmap the region whose start address and length exactly match.
    ///
    /// Shrinks the address space by `length`, splices the record out of the
    /// list (head removal promotes the successor untouched), and returns the
    /// record to the heap. Fails with zero side effects when nothing
    /// matches.
    pub fn unmap(
        &mut self,
        aspace: &mut dyn AddressSpaceOps,
        heap: &LockedKernelHeap,
        addr: VirtualAddress,
        length: u64,
    ) -> Result<(), UnmapError> {
        if length < 1 || addr.as_u64() >= KERNEL_BASE {
            return Err(UnmapError::InvalidArgument);
        }
        if self.region_head.is_null() {
            return Err(UnmapError::NoSuchRegion);
        }

        // Safety: list links are live records owned by this list; records
        // are returned to the heap only after being unlinked.
        unsafe {
            let head = self.region_head;
            if (*head).start == addr && (*head).length == length {
                self.shrink_by(aspace, length);
                self.region_head = (*head).next;
                self.region_count -= 1;
                heap.release(NonNull::new_unchecked(head.cast::<u8>()));
                trace!("munmap: removed head region {} + {length:#x}", addr);
                return Ok(());
            }

            let mut prev = head;
            let mut cur = (*head).next;
            while !cur.is_null() {
                if (*cur).start == addr && (*cur).length == length {
                    self.shrink_by(aspace, length);
                    (*prev).next = (*cur).next;
                    self.region_count -= 1;
                    heap.release(NonNull::new_unchecked(cur.cast::<u8>()));
                    trace!("munmap: removed region {} + {length:#x}", addr);
                    return Ok(());
                }
                prev = cur;
                cur = (*cur).next;
            }
        }

        Err(UnmapError::NoSuchRegion)
    }

    /// Release every region record and empty the list.
    ///
    /// Bookkeeping cleanup only: the page-table-level unmapping for the
    /// whole space is the address-space destruction path's job. Safe to call
    /// on an empty list.
    pub fn teardown_all(&mut self, heap: &LockedKernelHeap) {
        let count = self.region_count;
        // Safety: every link is a live record from this heap; each is read
        // before its storage is released.
        unsafe {
            let mut cur = self.region_head;
            while !cur.is_null() {
                let next = (*cur).next;
                heap.release(NonNull::new_unchecked(cur.cast::<u8>()));
                cur = next;
            }
        }
        self.region_head = core::ptr::null_mut();
        self.region_count = 0;
        trace!("mmap: tore down {count} regions");
    }

    fn shrink_by(&mut self, aspace: &mut dyn AddressSpaceOps, length: u64) {
        self.size = aspace.shrink(self.page_table, self.size, self.size.saturating_sub(length));
        aspace.activate(self.page_table);
    }
}
