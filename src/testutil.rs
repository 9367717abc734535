//! Shared test infrastructure: mock collaborators standing in for the
//! embedding kernel.
//!
//! `MockMemory` panics on any load/store to an unmapped page, so a test that
//! passes proves the syscall layer never touched memory it had not
//! validated.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::console::Console;
use crate::fs::{FileHandle, FileSystem};
use crate::mm::{PageFlags, UserMemory, VirtAddr, PAGE_SIZE};

/// A sparse, page-granular user address space.
pub struct MockMemory {
    pages: BTreeMap<u32, MockPage>,
}

struct MockPage {
    flags: PageFlags,
    bytes: Box<[u8]>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self {
            pages: BTreeMap::new(),
        }
    }

    /// Map one page at a page-aligned base address.
    pub fn map_page(&mut self, base: u32, flags: PageFlags) {
        assert_eq!(base % PAGE_SIZE, 0, "page base must be aligned");
        self.pages.insert(
            base,
            MockPage {
                flags,
                bytes: vec![0u8; PAGE_SIZE as usize].into_boxed_slice(),
            },
        );
    }

    fn page(&self, addr: VirtAddr) -> &MockPage {
        self.pages
            .get(&addr.page_base().as_u32())
            .unwrap_or_else(|| panic!("access to unvalidated address {addr}"))
    }

    fn page_mut(&mut self, addr: VirtAddr) -> &mut MockPage {
        self.pages
            .get_mut(&addr.page_base().as_u32())
            .unwrap_or_else(|| panic!("access to unvalidated address {addr}"))
    }

    /// Test setup: place raw bytes, bypassing validation.
    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            let a = VirtAddr::new(addr + i as u32);
            let off = a.page_offset() as usize;
            self.page_mut(a).bytes[off] = b;
        }
    }

    /// Test setup: place little-endian words, bypassing validation.
    pub fn write_words(&mut self, addr: u32, words: &[u32]) {
        for (i, w) in words.iter().enumerate() {
            self.write_bytes(addr + 4 * i as u32, &w.to_le_bytes());
        }
    }

    /// Test inspection: read raw bytes back.
    pub fn read_bytes(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let a = VirtAddr::new(addr + i as u32);
                self.page(a).bytes[a.page_offset() as usize]
            })
            .collect()
    }
}

impl UserMemory for MockMemory {
    fn translate(&self, addr: VirtAddr) -> Option<PageFlags> {
        self.pages
            .get(&addr.page_base().as_u32())
            .map(|page| page.flags)
    }

    fn load(&self, addr: VirtAddr) -> u8 {
        self.page(addr).bytes[addr.page_offset() as usize]
    }

    fn store(&mut self, addr: VirtAddr, value: u8) {
        let off = addr.page_offset() as usize;
        self.page_mut(addr).bytes[off] = value;
    }
}

/// An in-memory filesystem with position-tracking open files.
pub struct MemFs {
    files: HashMap<String, Vec<u8>>,
    open: HashMap<u64, OpenFile>,
    next_id: u64,
}

struct OpenFile {
    name: String,
    pos: usize,
}

impl MemFs {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            open: HashMap::new(),
            next_id: 1,
        }
    }

    /// Build a filesystem pre-populated with named contents.
    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        let mut fs = Self::new();
        for (name, data) in files {
            fs.files.insert((*name).into(), data.to_vec());
        }
        fs
    }

    /// Number of handles currently open. A nonzero count after every
    /// descriptor is closed means something leaked.
    pub fn open_handles(&self) -> usize {
        self.open.len()
    }

    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    fn entry(&mut self, handle: &FileHandle) -> (&mut OpenFile, &mut Vec<u8>) {
        let of = self
            .open
            .get_mut(&handle.raw())
            .expect("operation on a closed handle");
        let data = self
            .files
            .get_mut(&of.name)
            .expect("open file has no backing entry");
        (of, data)
    }
}

impl FileSystem for MemFs {
    fn create(&mut self, name: &str, initial_size: u32) -> bool {
        if name.is_empty() || self.files.contains_key(name) {
            return false;
        }
        self.files
            .insert(name.into(), vec![0u8; initial_size as usize]);
        true
    }

    fn remove(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }

    fn open(&mut self, name: &str) -> Option<FileHandle> {
        if !self.files.contains_key(name) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(
            id,
            OpenFile {
                name: name.into(),
                pos: 0,
            },
        );
        Some(FileHandle::new(id))
    }

    fn length(&mut self, handle: &FileHandle) -> u32 {
        let (_, data) = self.entry(handle);
        data.len() as u32
    }

    fn read(&mut self, handle: &FileHandle, buf: &mut [u8]) -> usize {
        let (of, data) = self.entry(handle);
        let available = data.len().saturating_sub(of.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&data[of.pos..of.pos + n]);
        of.pos += n;
        n
    }

    fn write(&mut self, handle: &FileHandle, buf: &[u8]) -> usize {
        let (of, data) = self.entry(handle);
        if data.len() < of.pos + buf.len() {
            data.resize(of.pos + buf.len(), 0);
        }
        data[of.pos..of.pos + buf.len()].copy_from_slice(buf);
        of.pos += buf.len();
        buf.len()
    }

    fn seek(&mut self, handle: &FileHandle, position: u32) {
        let (of, _) = self.entry(handle);
        of.pos = position as usize;
    }

    fn tell(&mut self, handle: &FileHandle) -> u32 {
        let (of, _) = self.entry(handle);
        of.pos as u32
    }

    fn close(&mut self, handle: FileHandle) {
        self.open
            .remove(&handle.raw())
            .expect("double close of a handle");
    }
}

/// A console with scripted input and captured output.
pub struct ScriptedConsole {
    pub output: Vec<u8>,
    input: VecDeque<u8>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            input: VecDeque::new(),
        }
    }

    pub fn with_input(input: &[u8]) -> Self {
        let mut console = Self::new();
        console.input.extend(input);
        console
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for ScriptedConsole {
    fn put_char(&mut self, c: u8) {
        self.output.push(c);
    }

    fn get_char(&mut self) -> u8 {
        // A real console blocks; tests just script enough input
        self.input.pop_front().expect("console input exhausted")
    }
}
