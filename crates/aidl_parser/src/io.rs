use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File access used by the parser and the import loader
pub trait IoDelegate {
    fn read_file(&self, path: &Path) -> io::Result<String>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Reads from the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsIoDelegate;

impl IoDelegate for FsIoDelegate {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Serves files from a map, for tests and embedders
#[derive(Debug, Default, Clone)]
pub struct MemoryIoDelegate {
    files: HashMap<PathBuf, String>,
}

impl MemoryIoDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl IoDelegate for MemoryIoDelegate {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_delegate() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("a/IFoo.aidl", "interface IFoo {}");
        assert!(io.file_exists(Path::new("a/IFoo.aidl")));
        assert_eq!(io.read_file(Path::new("a/IFoo.aidl")).unwrap(), "interface IFoo {}");
        assert_eq!(io.read_file(Path::new("b")).unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
