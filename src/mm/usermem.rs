//! User Memory Collaborator
//!
//! The address-translation side of the trust boundary. This crate never owns
//! page tables; the embedding kernel implements [`UserMemory`] over the
//! calling process's address mapping, and the syscall layer asks it two
//! questions: "is this page present?" and, once validated, "give me / take
//! this byte".

use bitflags::bitflags;

use super::address::VirtAddr;

bitflags! {
    /// Attributes of a present page, as reported by [`UserMemory::translate`].
    ///
    /// Presence itself is encoded by `translate` returning `Some`; the flags
    /// carry what the mediation layer needs beyond that.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u8 {
        /// Page may be written by user code (and therefore used as a
        /// destination buffer).
        const WRITABLE = 1 << 0;
    }
}

/// A user process's address mapping, as seen from the syscall layer.
///
/// # Contract
/// `load` and `store` must only be called on addresses the caller has
/// validated via `translate` (the syscall layer does this through
/// `syscall::validate`). Implementations are free to panic or fault on
/// unvalidated access; the mediation layer guarantees it never performs one.
pub trait UserMemory {
    /// Look up the page containing `addr`: `Some(flags)` if a page is
    /// present at that address in this mapping, `None` otherwise.
    fn translate(&self, addr: VirtAddr) -> Option<PageFlags>;

    /// Read one byte of user memory. Only called post-validation.
    fn load(&self, addr: VirtAddr) -> u8;

    /// Write one byte of user memory. Only called post-validation.
    fn store(&mut self, addr: VirtAddr, value: u8);
}
