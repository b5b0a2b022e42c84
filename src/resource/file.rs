//! File access behind a narrow trait.

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// Reads whole files for file-backed resources.
pub trait FileReader: Send + Sync + Debug {
    /// Read the complete content of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads from the local file system, on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
