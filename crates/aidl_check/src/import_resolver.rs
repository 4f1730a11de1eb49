use std::path::{Path, PathBuf};

use aidl_parser::IoDelegate;

/// Locates the file that declares an imported class
pub struct ImportResolver<'a> {
    io: &'a dyn IoDelegate,
    import_paths: &'a [PathBuf],
    input_files: &'a [PathBuf],
}

impl<'a> ImportResolver<'a> {
    pub fn new(io: &'a dyn IoDelegate, import_paths: &'a [PathBuf], input_files: &'a [PathBuf]) -> Self {
        Self { io, import_paths, input_files }
    }

    /// `a.b.Foo` -> `a/b/Foo.aidl`
    pub fn relative_path(canonical_name: &str) -> PathBuf {
        let mut path: PathBuf = canonical_name.split('.').collect();
        path.set_extension("aidl");
        path
    }

    /// First import root holding the file wins; otherwise an input file
    /// whose path ends with the expected relative path.
    pub fn find_import_file(&self, canonical_name: &str) -> Option<PathBuf> {
        let relative = Self::relative_path(canonical_name);
        self.import_paths
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| self.io.file_exists(candidate))
            .or_else(|| {
                self.input_files
                    .iter()
                    .find(|input| Path::new(input).ends_with(&relative))
                    .cloned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidl_parser::MemoryIoDelegate;

    #[test]
    fn test_relative_path() {
        assert_eq!(ImportResolver::relative_path("a.b.Foo"), PathBuf::from("a/b/Foo.aidl"));
        assert_eq!(ImportResolver::relative_path("Foo"), PathBuf::from("Foo.aidl"));
    }

    #[test]
    fn test_first_root_wins() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("second/a/Foo.aidl", "").add_file("third/a/Foo.aidl", "");
        let roots = vec![PathBuf::from("first"), PathBuf::from("second"), PathBuf::from("third")];
        let resolver = ImportResolver::new(&io, &roots, &[]);
        assert_eq!(resolver.find_import_file("a.Foo"), Some(PathBuf::from("second/a/Foo.aidl")));
        assert_eq!(resolver.find_import_file("a.Bar"), None);
    }

    #[test]
    fn test_falls_back_to_input_files() {
        let io = MemoryIoDelegate::new();
        let inputs = vec![PathBuf::from("src/x/IFoo.aidl"), PathBuf::from("src/y/a/Foo.aidl")];
        let resolver = ImportResolver::new(&io, &[], &inputs);
        assert_eq!(resolver.find_import_file("a.Foo"), Some(PathBuf::from("src/y/a/Foo.aidl")));
        assert_eq!(resolver.find_import_file("Foo"), Some(PathBuf::from("src/y/a/Foo.aidl")));
        assert_eq!(resolver.find_import_file("b.Foo"), None);
    }
}
