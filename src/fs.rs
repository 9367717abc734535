//! Filesystem Gateway
//!
//! The call surface of the external filesystem and the single global lock
//! that serializes every call into it.
//!
//! # Locking Model
//! Exactly one lock exists for the whole filesystem, owned by [`FsGateway`].
//! Every handler runs each filesystem primitive through [`FsGateway::with`],
//! which holds the lock for precisely the duration of that one call and
//! releases it on every exit path. The lock is never held while acquiring
//! another lock, so lock-ordering deadlocks cannot arise; the cost is fully
//! serialized filesystem throughput.

use spin::Mutex;

/// An open file, issued by the filesystem.
///
/// Deliberately not `Clone`/`Copy`: a handle is owned by exactly one
/// descriptor slot of exactly one process, and closing consumes it. Move
/// semantics enforce the no-sharing rule at compile time.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FileHandle(u64);

impl FileHandle {
    /// Create a handle from a filesystem-issued id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// The external filesystem's call surface.
///
/// The storage engine behind it is out of scope; the syscall layer only
/// requires that handles returned by `open` stay valid until passed to
/// `close`. All methods are invoked under the [`FsGateway`] lock.
pub trait FileSystem {
    /// Create a file of the given initial size. `false` on failure.
    fn create(&mut self, name: &str, initial_size: u32) -> bool;

    /// Remove a file by name. `false` on failure.
    fn remove(&mut self, name: &str) -> bool;

    /// Open a file by name. `None` if it cannot be opened.
    fn open(&mut self, name: &str) -> Option<FileHandle>;

    /// Size of an open file in bytes.
    fn length(&mut self, handle: &FileHandle) -> u32;

    /// Read from the current position into `buf`; returns bytes read.
    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> usize;

    /// Write `buf` at the current position; returns bytes written.
    fn write(&mut self, handle: &FileHandle, buf: &[u8]) -> usize;

    /// Move the current position.
    fn seek(&mut self, handle: &FileHandle, position: u32);

    /// Current position.
    fn tell(&mut self, handle: &FileHandle) -> u32;

    /// Close an open file, consuming the handle.
    fn close(&mut self, handle: FileHandle);
}

/// Owner of the single global filesystem lock.
///
/// Shared by reference with every syscall handler; there is no other route
/// to the filesystem.
pub struct FsGateway<F> {
    inner: Mutex<F>,
}

impl<F: FileSystem> FsGateway<F> {
    /// Wrap a filesystem behind the global lock.
    pub const fn new(fs: F) -> Self {
        Self {
            inner: Mutex::new(fs),
        }
    }

    /// Run one filesystem call under the lock.
    ///
    /// The guard is dropped when `op` returns, on success and failure alike,
    /// so no call path can leave the lock held.
    pub fn with<R>(&self, op: impl FnOnce(&mut F) -> R) -> R {
        let mut fs = self.inner.lock();
        op(&mut fs)
    }

    /// Whether the lock is currently held. Diagnostic only.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemFs;

    #[test]
    fn lock_is_released_after_each_call() {
        let gate = FsGateway::new(MemFs::new());
        assert!(!gate.is_locked());

        let created = gate.with(|fs| fs.create("log.txt", 16));
        assert!(created);
        assert!(!gate.is_locked());

        // Failure path: opening a missing file still releases the lock
        let missing = gate.with(|fs| fs.open("no-such-file"));
        assert!(missing.is_none());
        assert!(!gate.is_locked());
    }

    #[test]
    fn lock_is_held_during_the_call() {
        let gate = FsGateway::new(MemFs::new());
        gate.with(|_| {
            assert!(gate.is_locked());
        });
        assert!(!gate.is_locked());
    }
}
