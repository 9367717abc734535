//! OcelotOS Syscall Core
//!
//! The system-call mediation layer of a minimal teaching kernel: the boundary
//! where untrusted user-mode programs request kernel services via a
//! software-interrupt ABI.
//!
//! # Security Model
//! - Every user-supplied address is validated against the process's address
//!   mapping before the kernel touches a single byte
//! - A validation failure is unrecoverable for the violating process: the
//!   dispatcher terminates it, no return value is delivered
//! - Recoverable operation failures (file not found, table full) return
//!   in-band sentinels to the still-running caller
//!
//! # Architecture
//! The collaborators this core does not own are traits, wired in by the
//! embedding kernel:
//! - [`mm::UserMemory`]: address translation and user-page access
//! - [`fs::FileSystem`]: the filesystem's call surface, serialized behind
//!   the single global lock in [`fs::FsGateway`]
//! - [`console::Console`]: character-at-a-time console I/O
//! - Trap entry/exit and the non-returning process teardown live above this
//!   crate; the dispatcher hands them an [`trap::Outcome`]
//!
//! A self-contained 17.14 fixed-point arithmetic module ([`fixed`]) is
//! included for use elsewhere in the kernel.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod console;
pub mod fixed;
pub mod fs;
pub mod mm;
pub mod process;
pub mod syscall;
pub mod trap;

#[cfg(test)]
mod testutil;

pub use process::{Process, FD_STDIN, FD_STDOUT, MAX_FILES};
pub use syscall::{dispatch, SyscallContext};
pub use trap::{Outcome, TrapFrame};
