use crate::region::MappedRegion;
use core::marker::PhantomData;
use core::ptr::null_mut;
use kernel_memory_addresses::PhysicalAddress;
use log::trace;

/// External address-space primitives (page-table installation and removal).
///
/// `grow` and `shrink` move the boundary of the mapped byte range
/// `[0, size)`; `activate` makes the change effective on the executing
/// context and must be invoked after every successful grow or shrink.
pub trait AddressSpaceOps {
    /// Extend the space from `old_size` to `new_size` bytes. Returns the
    /// resulting size, or `None` if page-table or frame allocation failed.
    fn grow(&mut self, page_table: PhysicalAddress, old_size: u64, new_size: u64) -> Option<u64>;

    /// Remove mappings above `new_size`, shrinking from `old_size`. Returns
    /// the resulting size.
    fn shrink(&mut self, page_table: PhysicalAddress, old_size: u64, new_size: u64) -> u64;

    /// Reload the page table on the executing context.
    fn activate(&mut self, page_table: PhysicalAddress);
}

/// Per-process view of the address space: its size, page-table root, and the
/// anchor of the mapped-region list.
///
/// The mapping operations in this crate mutate these fields as part of their
/// contract; the process entity owning this value lives elsewhere.
pub struct ProcessVm {
    /// Address-space high-water mark in bytes.
    pub(crate) size: u64,
    /// Page-table root for this process.
    pub(crate) page_table: PhysicalAddress,
    pub(crate) region_head: *mut MappedRegion,
    pub(crate) region_count: usize,
}

// Safety: region records are reachable only through this value; the caller
// discipline (one kernel context per process) rules out shared mutation.
unsafe impl Send for ProcessVm {}

impl ProcessVm {
    /// A process view with no mappings.
    #[must_use]
    pub const fn new(page_table: PhysicalAddress, size: u64) -> Self {
        Self {
            size,
            page_table,
            region_head: null_mut(),
            region_count: 0,
        }
    }

    /// Current address-space size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn page_table(&self) -> PhysicalAddress {
        self.page_table
    }

    /// Number of mapped regions in the list.
    #[must_use]
    pub const fn region_count(&self) -> usize {
        self.region_count
    }

    /// Iterate the mapped regions in list order (map-append order).
    #[must_use]
    pub fn regions(&self) -> RegionIter<'_> {
        RegionIter {
            cur: self.region_head,
            _marker: PhantomData,
        }
    }

    /// Append `node` to the list tail, or install it as the sole head.
    pub(crate) fn push_region(&mut self, node: *mut MappedRegion) {
        if self.region_head.is_null() {
            self.region_head = node;
        } else {
            // Safety: all list links point at live records owned by this list.
            unsafe {
                let mut tail = self.region_head;
                while !(*tail).next.is_null() {
                    tail = (*tail).next;
                }
                (*tail).next = node;
            }
        }
        self.region_count += 1;
    }

    /// Log the region list at trace level.
    pub fn debug_dump(&self) {
        trace!("process vm: {} regions, size {:#x}", self.region_count, self.size);
        for (index, region) in self.regions().enumerate() {
            trace!(
                "  #{index}: {} + {:#x} ({:?})",
                region.start(),
                region.length(),
                region.kind()
            );
        }
    }
}

/// Iterator over a process's mapped regions.
pub struct RegionIter<'a> {
    cur: *const MappedRegion,
    _marker: PhantomData<&'a MappedRegion>,
}

impl<'a> Iterator for RegionIter<'a> {
    type Item = &'a MappedRegion;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur.is_null() {
            return None;
        }
        // Safety: links are live records owned by the list borrowed by 'a.
        let region = unsafe { &*self.cur };
        self.cur = region.next;
        Some(region)
    }
}
