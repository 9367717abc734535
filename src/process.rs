//! Process Context
//!
//! The slice of per-process state the syscall layer owns: a display name and
//! the open-file descriptor table. Scheduling, address-space setup and the
//! rest of the process lifecycle belong to the embedding kernel.
//!
//! # Descriptor Table
//! - Fixed-size array of [`MAX_FILES`] slots addressed by small integers
//! - Slots 0 ([`FD_STDIN`]) and 1 ([`FD_STDOUT`]) are reserved for the
//!   console and never hold a file handle
//! - Slots 2.. hold at most one owned [`FileHandle`] each; handles are never
//!   shared or duplicated across slots or processes

use alloc::string::String;

use crate::fs::FileHandle;

/// Number of descriptor slots per process.
pub const MAX_FILES: usize = 32;

/// Reserved descriptor: console input.
pub const FD_STDIN: usize = 0;

/// Reserved descriptor: console output.
pub const FD_STDOUT: usize = 1;

/// First slot that can hold a file handle.
pub const FD_BASE: usize = 2;

/// Per-process context consumed by the syscall layer.
pub struct Process {
    name: String,
    files: [Option<FileHandle>; MAX_FILES],
}

impl Process {
    /// Create a process context with an empty descriptor table.
    ///
    /// `name` is the full command line; the exit message uses only the part
    /// before the first space.
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            files: core::array::from_fn(|_| None),
        }
    }

    /// Full display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command name: the token before the first space.
    pub fn command_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or("")
    }

    /// Whether `fd` addresses a slot at all. A valid fd is not necessarily
    /// occupied.
    #[inline]
    pub fn is_valid_fd(fd: i32) -> bool {
        fd >= 0 && (fd as usize) < MAX_FILES
    }

    /// The handle in slot `fd`, if the slot exists and is occupied.
    pub fn file(&self, fd: usize) -> Option<&FileHandle> {
        self.files.get(fd)?.as_ref()
    }

    /// Install a handle in the first free slot at or above [`FD_BASE`].
    ///
    /// Returns the slot index, or gives the handle back when the table is
    /// full so the caller can close it; the handle must not leak.
    pub fn install(&mut self, handle: FileHandle) -> Result<usize, FileHandle> {
        for fd in FD_BASE..MAX_FILES {
            if self.files[fd].is_none() {
                self.files[fd] = Some(handle);
                return Ok(fd);
            }
        }
        Err(handle)
    }

    /// Remove and return the handle in slot `fd`, leaving the slot empty.
    pub fn take(&mut self, fd: usize) -> Option<FileHandle> {
        self.files.get_mut(fd)?.take()
    }

    /// Number of occupied slots.
    pub fn open_files(&self) -> usize {
        self.files.iter().filter(|slot| slot.is_some()).count()
    }
}
