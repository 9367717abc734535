//! System Call Mediation Layer
//!
//! Where untrusted user programs meet kernel services.
//!
//! # Security Model
//! - Fixed, ordered ABI table; the numbering is the external contract
//! - Every user pointer, range and string is validated against the calling
//!   process's mapping before the kernel touches it
//! - Protocol violations terminate the violator; recoverable failures
//!   return sentinels to a still-running caller
//!
//! # Flow
//! Trap entry hands [`dispatch`] a [`TrapFrame`](crate::trap::TrapFrame)
//! whose user stack pointer addresses the syscall number and arguments. The
//! dispatcher routes through [`Syscall`], the handler consumes its arguments
//! via the [`stack::UserStack`] cursor, and the result lands back in the
//! frame. On a violation the process is gone instead and the trap layer
//! gets [`Outcome::Terminate`](crate::trap::Outcome).

mod handler;
mod stack;
pub mod validate;

pub use handler::{dispatch, Syscall, SyscallContext};
pub use stack::{UserStack, WORD_SIZE};
pub use validate::{Access, Fault};
