use std::fmt;
use std::rc::Rc;

/// A 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub line: u32,
    pub column: u32,
}

impl Point {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Where a node was written. Only diagnostics look at this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    file: Rc<str>,
    begin: Point,
    end: Point,
}

impl Location {
    pub fn new(file: impl Into<Rc<str>>, begin: Point, end: Point) -> Self {
        Self { file: file.into(), begin, end }
    }

    /// For tests and synthesized nodes
    pub fn nowhere() -> Self {
        Self::new("nowhere", Point::default(), Point::default())
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn begin(&self) -> Point {
        self.begin
    }

    pub fn end(&self) -> Point {
        self.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.begin.line, self.begin.column)
    }
}

/// Anything that is locatable in a .aidl file
pub trait Node {
    fn location(&self) -> &Location;
}
