use std::path::{Path, PathBuf};

use crate::{DefinedType, Location, Node, TypeSpecifier};

/// The top-level declarations of one .aidl file, in parse order
#[derive(Debug, Default)]
pub struct Document {
    defined_types: Vec<DefinedType>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ty: DefinedType) {
        self.defined_types.push(ty);
    }

    pub fn defined_types(&self) -> &[DefinedType] {
        &self.defined_types
    }

    pub fn is_empty(&self) -> bool {
        self.defined_types.is_empty()
    }

    /// Move the first declaration out of the document
    pub fn release_defined_type(&mut self) -> Option<DefinedType> {
        if self.defined_types.is_empty() {
            return None;
        }
        Some(self.defined_types.remove(0))
    }

    pub fn for_each_type_specifier_mut(&mut self, f: &mut dyn FnMut(&mut TypeSpecifier)) {
        for ty in &mut self.defined_types {
            ty.for_each_type_specifier_mut(f);
        }
    }
}

/// `import a.b.Foo;` plus, once located and parsed, the file behind it
#[derive(Debug)]
pub struct Import {
    location: Location,
    needed_class: String,
    filename: Option<PathBuf>,
    document: Option<Document>,
}

impl Import {
    pub fn new(location: Location, needed_class: impl Into<String>) -> Self {
        Self { location, needed_class: needed_class.into(), filename: None, document: None }
    }

    pub fn needed_class(&self) -> &str {
        &self.needed_class
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn set_document(&mut self, document: Document) {
        self.document = Some(document);
    }
}

impl Node for Import {
    fn location(&self) -> &Location {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QualifiedName;

    fn parcelable(name: &str) -> DefinedType {
        DefinedType::parcelable(Location::nowhere(), QualifiedName::new(Location::nowhere(), name, ""), vec![], None)
    }

    #[test]
    fn test_release_moves_out() {
        let mut doc = Document::new();
        doc.add(parcelable("A"));
        doc.add(parcelable("B"));

        let released = doc.release_defined_type().unwrap();
        assert_eq!(released.name(), "A");
        let names: Vec<&str> = doc.defined_types().iter().map(DefinedType::name).collect();
        assert_eq!(names, ["B"]);

        assert!(doc.release_defined_type().is_some());
        assert!(doc.release_defined_type().is_none());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_import_attachments() {
        let mut import = Import::new(Location::nowhere(), "a.b.Foo");
        assert_eq!(import.needed_class(), "a.b.Foo");
        assert!(import.filename().is_none());
        assert!(import.document().is_none());

        import.set_filename("inc/a/b/Foo.aidl");
        let mut doc = Document::new();
        doc.add(parcelable("Foo"));
        import.set_document(doc);
        assert_eq!(import.filename(), Some(Path::new("inc/a/b/Foo.aidl")));
        assert_eq!(import.document().map(|d| d.defined_types().len()), Some(1));
    }
}
