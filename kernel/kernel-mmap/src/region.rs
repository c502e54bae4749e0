use core::ptr::null_mut;
use kernel_memory_addresses::VirtualAddress;

/// What backs a mapped region.
///
/// Only anonymous mappings are currently created; the type is open for
/// file-backed kinds later.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum RegionKind {
    /// Fresh memory with no backing file.
    Anonymous,
}

/// One contiguous mapping owned exclusively by a single process.
///
/// Records are allocated from the shared kernel heap and linked singly from
/// the owning process's [`ProcessVm`](crate::ProcessVm). The start address is
/// always page-aligned, and no two records in one list share a start address.
pub struct MappedRegion {
    pub(crate) start: VirtualAddress,
    pub(crate) length: u64,
    pub(crate) kind: RegionKind,
    /// Stored verbatim for future file-backed kinds; unused for anonymous
    /// mappings.
    pub(crate) offset: u64,
    pub(crate) next: *mut MappedRegion,
}

// Region records must fit the metadata heap's single-page contract and its
// 16-byte payload alignment.
const _: () = {
    assert!(size_of::<MappedRegion>() <= kernel_kmalloc::MAX_ALLOC);
    assert!(align_of::<MappedRegion>() <= 16);
};

impl MappedRegion {
    pub(crate) const fn new(
        start: VirtualAddress,
        length: u64,
        kind: RegionKind,
        offset: u64,
    ) -> Self {
        Self {
            start,
            length,
            kind,
            offset,
            next: null_mut(),
        }
    }

    /// Page-aligned start address.
    #[must_use]
    pub const fn start(&self) -> VirtualAddress {
        self.start
    }

    /// Length in bytes as requested at map time.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// The file offset passed at map time, stored verbatim.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}
