//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for raw memory addresses used by the kernel's
//! memory-management code, plus page-alignment helpers.
//!
//! ## Overview
//!
//! The kernel translates with a single 4 KiB granule, so this crate keeps the
//! model small: two zero-cost wrappers around `u64` that prevent mixing
//! virtual and physical addresses at compile time, and `const` helpers for
//! rounding byte counts and addresses to page boundaries.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | An address subject to page-table translation. |
//! | [`PhysicalAddress`] | An address in host RAM (e.g. a page-table root). |
//!
//! Both types are `#[repr(transparent)]` and implement `Copy`, `Eq`, `Ord`
//! and `Hash`, making them usable as map keys or across FFI boundaries.

#![cfg_attr(not(any(test, doctest)), no_std)]

use core::fmt;
use core::ops::{Add, AddAssign};

/// Size of one page in bytes (the frame allocator's unit of allocation).
pub const PAGE_SIZE: u64 = 4096;

/// log2([`PAGE_SIZE`]); number of low bits used for the in-page offset.
pub const PAGE_SHIFT: u32 = 12;

const _: () = assert!(PAGE_SIZE == 1 << PAGE_SHIFT);

/// Round `value` down to the previous page boundary.
#[inline]
#[must_use]
pub const fn page_align_down(value: u64) -> u64 {
    value & !(PAGE_SIZE - 1)
}

/// Round `value` up to the next page boundary.
///
/// Values within one page of `u64::MAX` wrap; callers operating near the top
/// of the address space must range-check first.
#[inline]
#[must_use]
pub const fn page_align_up(value: u64) -> u64 {
    value.wrapping_add(PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

/// `true` if `value` lies on a page boundary.
#[inline]
#[must_use]
pub const fn is_page_aligned(value: u64) -> bool {
    value & (PAGE_SIZE - 1) == 0
}

/// Virtual memory address.
///
/// Carries the *kind* of address at the type level so virtual and physical
/// values cannot be mixed accidentally. No canonicality validation is done at
/// runtime; alignment is only guaranteed for values produced by
/// [`VirtualAddress::page_base`] / [`VirtualAddress::page_round_up`].
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Base of the page containing this address (aligns down).
    #[inline]
    #[must_use]
    pub const fn page_base(self) -> Self {
        Self(page_align_down(self.0))
    }

    /// This address rounded up to the next page boundary.
    #[inline]
    #[must_use]
    pub const fn page_round_up(self) -> Self {
        Self(page_align_up(self.0))
    }

    #[inline]
    #[must_use]
    pub const fn is_page_aligned(self) -> bool {
        is_page_aligned(self.0)
    }

    /// Checked addition of a byte count, `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u64) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for VirtualAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<VirtualAddress> for u64 {
    #[inline]
    fn from(a: VirtualAddress) -> Self {
        a.as_u64()
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for VirtualAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// Physical memory address.
///
/// The kernel's memory-mapping code uses this for page-table roots handed to
/// the address-space primitives; it is never dereferenced directly.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_page_aligned(self) -> bool {
        is_page_aligned(self.0)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u64 {
    #[inline]
    fn from(a: PhysicalAddress) -> Self {
        a.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_helpers() {
        assert_eq!(page_align_down(0x12345), 0x12000);
        assert_eq!(page_align_up(0x12345), 0x13000);
        assert_eq!(page_align_up(0x12000), 0x12000);
        assert_eq!(page_align_down(0), 0);
        assert_eq!(page_align_up(1), PAGE_SIZE);
        assert!(is_page_aligned(0x4_3000));
        assert!(!is_page_aligned(0x4_3001));
    }

    #[test]
    fn virtual_address_page_round_trip() {
        let va = VirtualAddress::new(0x8765);
        assert_eq!(va.page_base().as_u64(), 0x8000);
        assert_eq!(va.page_round_up().as_u64(), 0x9000);
        assert!(va.page_base().is_page_aligned());
        assert!(!va.is_page_aligned());
    }

    #[test]
    fn arithmetic_and_ordering() {
        let mut va = VirtualAddress::new(0x1000);
        va += 0x234;
        assert_eq!(va, VirtualAddress::new(0x1234));
        assert_eq!(va + 0x10, VirtualAddress::new(0x1244));
        assert!(VirtualAddress::new(0x1000) < VirtualAddress::new(0x2000));
        assert_eq!(va.checked_add(u64::MAX), None);
    }

    #[test]
    fn display_formats() {
        let va = VirtualAddress::new(0x8000_0000);
        assert_eq!(format!("{va}"), "0x0000000080000000");
        assert_eq!(format!("{va:?}"), "VA(0x0000000080000000)");
        let pa = PhysicalAddress::new(0x42);
        assert_eq!(format!("{pa:?}"), "PA(0x0000000000000042)");
    }
}
