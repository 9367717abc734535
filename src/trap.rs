//! Trap Frame and Dispatch Outcome
//!
//! The saved execution context a software interrupt hands to the dispatcher,
//! and the verdict the dispatcher hands back. Low-level trap entry/exit (the
//! interrupt vector, register save/restore) lives in the embedding kernel;
//! this crate only needs the user stack pointer going in and the result slot
//! coming out.

use crate::mm::VirtAddr;

/// The interrupted user program's context, as seen by the syscall layer.
///
/// At interrupt time the user stack pointer addresses the syscall number,
/// followed by the call's arguments in declaration order. The handler's
/// return value is delivered through [`result`](TrapFrame::result).
#[derive(Debug, Clone, Copy)]
pub struct TrapFrame {
    user_sp: VirtAddr,
    result: i32,
}

impl TrapFrame {
    /// Build a frame for a trap taken with the given user stack pointer.
    pub const fn new(user_sp: VirtAddr) -> Self {
        Self { user_sp, result: 0 }
    }

    /// The user stack pointer at trap time.
    #[inline]
    pub const fn user_sp(&self) -> VirtAddr {
        self.user_sp
    }

    /// The value the trap exit path returns to user mode.
    #[inline]
    pub const fn result(&self) -> i32 {
        self.result
    }

    /// Set the return value. Only the dispatcher writes this.
    #[inline]
    pub(crate) fn set_result(&mut self, value: i32) {
        self.result = value;
    }
}

/// What the trap layer must do after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Resume the process in user mode; the frame's result slot holds the
    /// syscall's return value.
    Resume,
    /// The process is done (voluntary exit or protocol violation). Its
    /// descriptors are already reclaimed; the trap layer must now invoke the
    /// scheduler's non-returning teardown. No return value is delivered.
    Terminate {
        /// Exit status, `-1` for violations.
        status: i32,
    },
    /// Power off the machine.
    Halt,
}
