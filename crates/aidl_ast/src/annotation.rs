use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::{Location, Node};

pub const NULLABLE: &str = "nullable";
pub const UTF8: &str = "utf8";
pub const UTF8_IN_CPP: &str = "utf8InCpp";

const RECOGNIZED_ANNOTATIONS: &[&str] = &[NULLABLE, UTF8, UTF8_IN_CPP];

/// `@name` tag. Identity is the name alone.
#[derive(Debug, Clone)]
pub struct Annotation {
    location: Location,
    name: String,
}

impl Annotation {
    /// Returns `None` for names the compiler does not know.
    pub fn parse(location: Location, name: &str) -> Option<Annotation> {
        if !RECOGNIZED_ANNOTATIONS.contains(&name) {
            return None;
        }
        Some(Annotation { location, name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recognized_names() -> &'static [&'static str] {
        RECOGNIZED_ANNOTATIONS
    }
}

impl Node for Annotation {
    fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Annotation {}

impl PartialOrd for Annotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Annotation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// The set of annotations attached to a type or declaration
#[derive(Debug, Default)]
pub struct Annotatable {
    annotations: BTreeSet<Annotation>,
}

impl Annotatable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set; duplicates collapse by name.
    pub fn annotate(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations = annotations.into_iter().collect();
    }

    pub fn is_nullable(&self) -> bool {
        self.has(NULLABLE)
    }

    pub fn is_utf8(&self) -> bool {
        self.has(UTF8)
    }

    pub fn is_utf8_in_cpp(&self) -> bool {
        self.has(UTF8_IN_CPP)
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    fn has(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }
}

/// Sorted, space separated: `@nullable @utf8InCpp`
impl fmt::Display for Annotatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.annotations.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(name: &str) -> Annotation {
        Annotation::parse(Location::nowhere(), name).unwrap()
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(Annotation::parse(Location::nowhere(), "nullable").is_some());
        assert!(Annotation::parse(Location::nowhere(), "Nullable").is_none());
        assert!(Annotation::parse(Location::nowhere(), "deprecated").is_none());
    }

    #[test]
    fn test_annotate_dedups_and_replaces() {
        let mut annotatable = Annotatable::new();
        annotatable.annotate(vec![annotation("utf8InCpp"), annotation("nullable"), annotation("nullable")]);
        assert!(annotatable.is_nullable());
        assert!(annotatable.is_utf8_in_cpp());
        assert!(!annotatable.is_utf8());
        assert_eq!(annotatable.to_string(), "@nullable @utf8InCpp");

        annotatable.annotate(vec![annotation("utf8")]);
        assert!(!annotatable.is_nullable());
        assert_eq!(annotatable.to_string(), "@utf8");
    }
}
