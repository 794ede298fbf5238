//! Re-openable document sources.
//!
//! Validation consumes a stream, so the converter asks the provider for a
//! fresh one before parsing.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Something that can open the same document any number of times.
pub trait InputStreamProvider {
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

impl InputStreamProvider for [u8] {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self))
    }
}

impl InputStreamProvider for Vec<u8> {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_slice()))
    }
}

impl InputStreamProvider for str {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_bytes()))
    }
}

impl InputStreamProvider for String {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_bytes()))
    }
}

/// Opens a file from disk on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInputStreamProvider(pub PathBuf);

impl FileInputStreamProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl InputStreamProvider for FileInputStreamProvider {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.0)?))
    }
}
