use crate::{Location, Node};

/// Dotted identifier such as a package or import target, built one term
/// at a time by the parser.
#[derive(Debug)]
pub struct QualifiedName {
    location: Location,
    terms: Vec<String>,
    comments: String,
}

impl QualifiedName {
    pub fn new(location: Location, term: impl Into<String>, comments: impl Into<String>) -> Self {
        Self { location, terms: vec![term.into()], comments: comments.into() }
    }

    pub fn add_term(&mut self, term: impl Into<String>) {
        self.terms.push(term.into());
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// The last term
    pub fn simple_name(&self) -> &str {
        self.terms.last().map(String::as_str).unwrap_or_default()
    }

    /// Every term except the last
    pub fn package(&self) -> &[String] {
        &self.terms[..self.terms.len().saturating_sub(1)]
    }

    pub fn dot_name(&self) -> String {
        self.terms.join(".")
    }

    pub fn colon_name(&self) -> String {
        self.terms.join("::")
    }
}

impl Node for QualifiedName {
    fn location(&self) -> &Location {
        &self.location
    }
}
