//! # Virtual address-space layout

use kernel_memory_addresses::is_page_aligned;

/// First byte of the kernel-reserved half of the virtual address space.
///
/// User mappings must resolve strictly below this boundary; the map placement
/// search treats reaching it as exhaustion.
pub const KERNEL_BASE: u64 = 0x8000_0000;

const _: () = assert!(is_page_aligned(KERNEL_BASE));
