//! User Stack Argument Cursor
//!
//! At trap time the user stack pointer addresses the syscall number, followed
//! by the call's arguments in declaration order as 4-byte little-endian
//! words. [`UserStack`] walks that layout: every `next_*` call validates the
//! word's range, loads it, and advances, so handlers never do offset
//! bookkeeping or touch unvalidated stack memory.

use crate::mm::{UserMemory, VirtAddr};

use super::validate::{self, Access, Fault};

/// Width of one ABI stack word.
pub const WORD_SIZE: u32 = 4;

/// Cursor over the caller's stacked syscall number and arguments.
pub struct UserStack {
    cursor: VirtAddr,
}

impl UserStack {
    /// Start a cursor at the trap-time user stack pointer.
    pub const fn new(sp: VirtAddr) -> Self {
        Self { cursor: sp }
    }

    /// Validate, read and consume the next word.
    pub fn next_u32<M: UserMemory>(&mut self, mem: &M) -> Result<u32, Fault> {
        validate::check_range(mem, self.cursor, WORD_SIZE, Access::Read)?;
        let mut raw = [0u8; WORD_SIZE as usize];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = mem.load(self.cursor.add(i as u32));
        }
        self.cursor = self.cursor.add(WORD_SIZE);
        Ok(u32::from_le_bytes(raw))
    }

    /// Next word as a signed integer.
    pub fn next_i32<M: UserMemory>(&mut self, mem: &M) -> Result<i32, Fault> {
        Ok(self.next_u32(mem)? as i32)
    }

    /// Next word as a user address.
    ///
    /// Only the stack word itself is validated here; whatever it points at
    /// is validated by the consumer (`check_range`, `check_string`).
    pub fn next_addr<M: UserMemory>(&mut self, mem: &M) -> Result<VirtAddr, Fault> {
        Ok(VirtAddr::new(self.next_u32(mem)?))
    }
}
