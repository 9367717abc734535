//! Console Collaborator
//!
//! Character-at-a-time console I/O, implemented by the embedding kernel's
//! serial/VGA driver. The syscall layer uses it for the reserved descriptors
//! (fd 0 reads consume input, fd 1 writes go straight to output) and for the
//! process exit message.

/// The kernel console, one character at a time.
pub trait Console {
    /// Emit one character.
    fn put_char(&mut self, c: u8);

    /// Consume one character of input, blocking until one is available.
    fn get_char(&mut self) -> u8;

    /// Emit a string. Convenience over `put_char`.
    fn put_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.put_char(b);
        }
    }
}
