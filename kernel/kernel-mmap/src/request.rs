use bitfield_struct::bitfield;
use kernel_memory_addresses::VirtualAddress;

/// Requested page protections.
///
/// Accepted for ABI compatibility and carried on the request; this subsystem
/// does not enforce protections on anonymous mappings.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct MapProtection {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    #[bits(29)]
    __: u32,
}

/// Mapping behavior flags. Accepted, not enforced.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct MapFlags {
    pub anonymous: bool,
    pub private: bool,
    pub fixed: bool,
    #[bits(29)]
    __: u32,
}

/// Parameters of one map request, in syscall argument order.
#[derive(Debug, Copy, Clone)]
pub struct MapRequest {
    /// Placement suggestion. Validated against the kernel boundary but not
    /// honored: anonymous mappings are placed at the address-space
    /// high-water mark.
    pub hint: VirtualAddress,
    /// Length of the mapping in bytes; must be at least 1.
    pub length: u64,
    /// Accepted, not enforced.
    pub prot: MapProtection,
    /// Accepted, not enforced.
    pub flags: MapFlags,
    /// File descriptor; anonymous mappings have no backing file.
    pub fd: i32,
    /// Stored verbatim on the region record.
    pub offset: u64,
}
