//! Memory boundary types for the syscall layer
//!
//! Provides:
//! - Virtual address newtype and the user/kernel split
//! - The [`UserMemory`] collaborator trait backed by the embedding kernel's
//!   page tables
//!
//! Actual translation and page management are out of scope here; this module
//! is the interface the mediation layer validates against.

mod address;
mod usermem;

pub use address::{is_user_addr, VirtAddr, PAGE_MASK, PAGE_SIZE, USER_TOP};
pub use usermem::{PageFlags, UserMemory};
