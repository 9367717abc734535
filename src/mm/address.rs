//! Virtual Address Type and User-Space Layout
//!
//! A type-safe wrapper for user-supplied virtual addresses that keeps raw
//! integers from being used as addresses by accident.
//!
//! The ABI this kernel speaks is 32-bit: addresses and stack words are four
//! bytes, and user space is the low part of the address space below
//! [`USER_TOP`]. Nothing in this crate ever dereferences one of these
//! addresses directly; all access goes through the
//! [`UserMemory`](super::usermem::UserMemory) collaborator after validation.

use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: u32 = 4096;
/// Page size mask
pub const PAGE_MASK: u32 = PAGE_SIZE - 1;

/// First address above user space. Everything at or above this is kernel
/// territory and off-limits to user pointers.
pub const USER_TOP: u32 = 0xC000_0000;

/// A virtual address in a user process's address space.
///
/// Newtype over the raw 32-bit address. Construction is unrestricted (user
/// programs hand us arbitrary words); safety comes from validation before
/// use, not from the type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u32);

impl VirtAddr {
    /// Create a virtual address from a raw value.
    #[inline]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Whether this is the null address.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Align the address down to the start of its page.
    #[inline]
    pub const fn page_base(self) -> Self {
        Self(self.0 & !PAGE_MASK)
    }

    /// Get the offset within the page (lowest 12 bits).
    #[inline]
    pub const fn page_offset(self) -> u32 {
        self.0 & PAGE_MASK
    }

    /// Add an offset, wrapping on overflow.
    #[inline]
    pub const fn add(self, offset: u32) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Add an offset, `None` if the address space would wrap.
    #[inline]
    pub const fn checked_add(self, offset: u32) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Check whether an address lies in the user-accessible range.
///
/// Null is excluded separately by the validator; this is purely the
/// user/kernel split.
#[inline]
pub const fn is_user_addr(addr: VirtAddr) -> bool {
    addr.as_u32() < USER_TOP
}
