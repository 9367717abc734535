//! Syscall Dispatch and Handlers
//!
//! Reads the syscall number off the user stack, routes it through the fixed
//! ABI table, and runs the handler. Each handler validates and consumes its
//! own argument layout through the [`UserStack`] cursor.
//!
//! # Security Considerations
//! - Numbers outside the table terminate the caller with a diagnostic
//! - A validation fault anywhere in a handler terminates the caller; side
//!   effects already performed are not rolled back (the process dies with
//!   all its state)
//! - Recoverable failures return sentinels (`-1`, or 0 bytes) instead

use alloc::format;
use alloc::string::String;
use log::{debug, warn};

use crate::console::Console;
use crate::fs::{FileSystem, FsGateway};
use crate::mm::UserMemory;
use crate::process::{Process, FD_BASE, FD_STDIN, FD_STDOUT, MAX_FILES};
use crate::trap::{Outcome, TrapFrame};

use super::stack::UserStack;
use super::validate::{self, Access, Fault};

/// The syscall ABI.
///
/// The discriminants are the wire protocol: user programs push these numbers,
/// and the order must never change. Reserved calls past `Close` (and `Exec`/
/// `Wait`) keep their numbers but terminate the caller when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Syscall {
    Halt = 0,
    Exit = 1,
    Exec = 2,
    Wait = 3,
    Create = 4,
    Remove = 5,
    Open = 6,
    Filesize = 7,
    Read = 8,
    Write = 9,
    Seek = 10,
    Tell = 11,
    Close = 12,
    Mmap = 13,
    Munmap = 14,
    Chdir = 15,
    Mkdir = 16,
    Readdir = 17,
    Isdir = 18,
    Inumber = 19,
}

impl Syscall {
    /// Number of entries in the dispatch table.
    pub const COUNT: u32 = 20;

    /// Look up a syscall by its ABI number.
    pub fn from_number(n: u32) -> Option<Self> {
        Some(match n {
            0 => Syscall::Halt,
            1 => Syscall::Exit,
            2 => Syscall::Exec,
            3 => Syscall::Wait,
            4 => Syscall::Create,
            5 => Syscall::Remove,
            6 => Syscall::Open,
            7 => Syscall::Filesize,
            8 => Syscall::Read,
            9 => Syscall::Write,
            10 => Syscall::Seek,
            11 => Syscall::Tell,
            12 => Syscall::Close,
            13 => Syscall::Mmap,
            14 => Syscall::Munmap,
            15 => Syscall::Chdir,
            16 => Syscall::Mkdir,
            17 => Syscall::Readdir,
            18 => Syscall::Isdir,
            19 => Syscall::Inumber,
            _ => return None,
        })
    }
}

/// Everything a handler may touch, borrowed from the embedding kernel for
/// the duration of one trap.
pub struct SyscallContext<'a, M, F, C> {
    /// The calling process's context (name, descriptor table).
    pub process: &'a mut Process,
    /// The calling process's address mapping.
    pub memory: &'a mut M,
    /// The filesystem behind its global lock.
    pub fs: &'a FsGateway<F>,
    /// The kernel console.
    pub console: &'a mut C,
}

/// Staging-buffer size for file transfers. User buffers can be as large as
/// the process's mapping; kernel memory per transfer stays bounded by moving
/// data in chunks of this size.
const IO_CHUNK: u32 = 512;

/// What a handler asks the dispatcher to do.
enum Flow {
    /// Deliver a return value and resume the caller.
    Return(i32),
    /// Voluntary exit with a status.
    Exit(i32),
    /// Power off the machine.
    Halt,
}

/// Handle one software interrupt.
///
/// Reads the syscall number at the frame's user stack pointer, dispatches,
/// writes the handler's return value into the frame's result slot, and tells
/// the trap layer whether to resume, terminate or halt. Protocol violations
/// (bad pointers, bad numbers, reserved calls) terminate the caller here,
/// descriptors reclaimed, before the verdict is returned.
pub fn dispatch<M, F, C>(ctx: &mut SyscallContext<'_, M, F, C>, frame: &mut TrapFrame) -> Outcome
where
    M: UserMemory,
    F: FileSystem,
    C: Console,
{
    let mut stack = UserStack::new(frame.user_sp());

    let number = match stack.next_u32(ctx.memory) {
        Ok(n) => n,
        Err(fault) => {
            warn!("[SYSCALL] {}: bad stack pointer: {}", ctx.process.name(), fault);
            return terminate(ctx, -1);
        }
    };

    let call = match Syscall::from_number(number) {
        Some(call) => call,
        None => {
            warn!(
                "[SYSCALL] {}: {}",
                ctx.process.name(),
                Fault::BadSyscall(number)
            );
            return terminate(ctx, -1);
        }
    };
    debug!("[SYSCALL] {}: {:?}", ctx.process.name(), call);

    let flow = match call {
        Syscall::Halt => Ok(Flow::Halt),
        Syscall::Exit => sys_exit(ctx, &mut stack),
        Syscall::Create => sys_create(ctx, &mut stack).map(Flow::Return),
        Syscall::Remove => sys_remove(ctx, &mut stack).map(Flow::Return),
        Syscall::Open => sys_open(ctx, &mut stack).map(Flow::Return),
        Syscall::Filesize => sys_filesize(ctx, &mut stack).map(Flow::Return),
        Syscall::Read => sys_read(ctx, &mut stack).map(Flow::Return),
        Syscall::Write => sys_write(ctx, &mut stack).map(Flow::Return),
        Syscall::Seek => sys_seek(ctx, &mut stack).map(Flow::Return),
        Syscall::Tell => sys_tell(ctx, &mut stack).map(Flow::Return),
        Syscall::Close => sys_close(ctx, &mut stack).map(Flow::Return),
        // Reserved in the table, no logic behind them in this core
        Syscall::Exec
        | Syscall::Wait
        | Syscall::Mmap
        | Syscall::Munmap
        | Syscall::Chdir
        | Syscall::Mkdir
        | Syscall::Readdir
        | Syscall::Isdir
        | Syscall::Inumber => Err(Fault::Unimplemented(call)),
    };

    match flow {
        Ok(Flow::Return(value)) => {
            frame.set_result(value);
            Outcome::Resume
        }
        Ok(Flow::Exit(status)) => terminate(ctx, status),
        Ok(Flow::Halt) => Outcome::Halt,
        Err(fault) => {
            warn!("[SYSCALL] {}: {}", ctx.process.name(), fault);
            terminate(ctx, -1)
        }
    }
}

/// Tear down the syscall layer's share of the process: close every open
/// descriptor under the filesystem lock and announce the exit on the
/// console. The trap layer finishes the job with the scheduler.
fn terminate<M, F, C>(ctx: &mut SyscallContext<'_, M, F, C>, status: i32) -> Outcome
where
    M: UserMemory,
    F: FileSystem,
    C: Console,
{
    for fd in FD_BASE..MAX_FILES {
        if let Some(handle) = ctx.process.take(fd) {
            ctx.fs.with(|fs| fs.close(handle));
        }
    }
    let message = format!("{}: exit({})\n", ctx.process.command_name(), status);
    ctx.console.put_str(&message);
    Outcome::Terminate { status }
}

fn sys_exit<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<Flow, Fault>
where
    M: UserMemory,
{
    let status = stack.next_i32(ctx.memory)?;
    Ok(Flow::Exit(status))
}

fn sys_create<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let path_addr = stack.next_addr(ctx.memory)?;
    let path = read_path(ctx, path_addr)?;
    let initial_size = stack.next_u32(ctx.memory)?;

    let created = ctx.fs.with(|fs| fs.create(&path, initial_size));
    Ok(created as i32)
}

fn sys_remove<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let path_addr = stack.next_addr(ctx.memory)?;
    let path = read_path(ctx, path_addr)?;

    let removed = ctx.fs.with(|fs| fs.remove(&path));
    Ok(removed as i32)
}

fn sys_open<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let path_addr = stack.next_addr(ctx.memory)?;
    let path = read_path(ctx, path_addr)?;

    let handle = match ctx.fs.with(|fs| fs.open(&path)) {
        Some(handle) => handle,
        None => return Ok(-1),
    };

    match ctx.process.install(handle) {
        Ok(fd) => Ok(fd as i32),
        Err(handle) => {
            // Table full: the fresh handle must not leak
            debug!("[SYSCALL] {}: descriptor table full", ctx.process.name());
            ctx.fs.with(|fs| fs.close(handle));
            Ok(-1)
        }
    }
}

fn sys_filesize<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let fd = stack.next_i32(ctx.memory)?;
    if !Process::is_valid_fd(fd) {
        return Ok(-1);
    }
    match ctx.process.file(fd as usize) {
        Some(handle) => Ok(ctx.fs.with(|fs| fs.length(handle)) as i32),
        None => Ok(-1),
    }
}

fn sys_read<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
    C: Console,
{
    let fd = stack.next_i32(ctx.memory)?;
    let buffer = stack.next_addr(ctx.memory)?;
    let size = stack.next_u32(ctx.memory)?;

    // The whole destination must be writable before anything is produced
    validate::check_range(ctx.memory, buffer, size, Access::Write)?;

    if !Process::is_valid_fd(fd) {
        return Ok(0);
    }
    let fd = fd as usize;

    if fd == FD_STDIN {
        // Console input is consumed, not echoed
        for i in 0..size {
            let c = ctx.console.get_char();
            ctx.memory.store(buffer.add(i), c);
        }
        return Ok(size as i32);
    }

    match ctx.process.file(fd) {
        Some(handle) => {
            let mut chunk = [0u8; IO_CHUNK as usize];
            let mut total: u32 = 0;
            while total < size {
                let want = (size - total).min(IO_CHUNK) as usize;
                let count = ctx.fs.with(|fs| fs.read(handle, &mut chunk[..want]));
                validate::copy_to_user(ctx.memory, buffer.add(total), &chunk[..count])?;
                total += count as u32;
                if count < want {
                    break;
                }
            }
            Ok(total as i32)
        }
        None => Ok(0),
    }
}

fn sys_write<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
    C: Console,
{
    let fd = stack.next_i32(ctx.memory)?;
    let buffer = stack.next_addr(ctx.memory)?;
    let size = stack.next_u32(ctx.memory)?;

    // The whole source must be readable before anything is consumed
    validate::check_range(ctx.memory, buffer, size, Access::Read)?;

    if !Process::is_valid_fd(fd) {
        return Ok(0);
    }
    let fd = fd as usize;

    if fd == FD_STDOUT {
        for i in 0..size {
            ctx.console.put_char(ctx.memory.load(buffer.add(i)));
        }
        return Ok(size as i32);
    }

    match ctx.process.file(fd) {
        Some(handle) => {
            let mut total: u32 = 0;
            while total < size {
                let want = (size - total).min(IO_CHUNK);
                let chunk = validate::copy_from_user(ctx.memory, buffer.add(total), want)?;
                let count = ctx.fs.with(|fs| fs.write(handle, &chunk));
                total += count as u32;
                if (count as u32) < want {
                    break;
                }
            }
            Ok(total as i32)
        }
        None => Ok(0),
    }
}

fn sys_seek<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let fd = stack.next_i32(ctx.memory)?;
    let position = stack.next_u32(ctx.memory)?;

    if !Process::is_valid_fd(fd) {
        return Ok(0);
    }
    if let Some(handle) = ctx.process.file(fd as usize) {
        ctx.fs.with(|fs| fs.seek(handle, position));
    }
    Ok(0)
}

fn sys_tell<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let fd = stack.next_i32(ctx.memory)?;
    if !Process::is_valid_fd(fd) {
        return Ok(-1);
    }
    match ctx.process.file(fd as usize) {
        Some(handle) => Ok(ctx.fs.with(|fs| fs.tell(handle)) as i32),
        None => Ok(-1),
    }
}

fn sys_close<M, F, C>(
    ctx: &mut SyscallContext<'_, M, F, C>,
    stack: &mut UserStack,
) -> Result<i32, Fault>
where
    M: UserMemory,
    F: FileSystem,
{
    let fd = stack.next_i32(ctx.memory)?;
    if Process::is_valid_fd(fd) {
        if let Some(handle) = ctx.process.take(fd as usize) {
            ctx.fs.with(|fs| fs.close(handle));
        }
    }
    Ok(0)
}

/// Copy in a validated path string. Non-UTF-8 names are passed through
/// lossily; the filesystem sees what it sees.
fn read_path<M, F, C>(
    ctx: &SyscallContext<'_, M, F, C>,
    addr: crate::mm::VirtAddr,
) -> Result<String, Fault>
where
    M: UserMemory,
{
    let bytes = validate::check_string(ctx.memory, addr)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
