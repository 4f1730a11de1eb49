use std::io;

use crate::InternalError;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Sink that declarations render themselves into
pub trait Emitter {
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    fn indent(&mut self);
    fn dedent(&mut self);
}

/// Emitter that prefixes every new line with two spaces per indent level.
pub struct CodeWriter<W: io::Write> {
    out: W,
    indent_level: usize,
    start_of_line: bool,
}

impl<W: io::Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, indent_level: 0, start_of_line: true }
    }
}

impl CodeWriter<Vec<u8>> {
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

impl<W: io::Write> Emitter for CodeWriter<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        for line in text.split_inclusive('\n') {
            if self.start_of_line && line != "\n" {
                for _ in 0..self.indent_level {
                    self.out.write_all(b"  ")?;
                }
            }
            self.out.write_all(line.as_bytes())?;
            self.start_of_line = line.ends_with('\n');
        }
        Ok(())
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indents_each_line() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.write_str("a {\n").unwrap();
        writer.indent();
        writer.write_str("b;\nc").unwrap();
        writer.write_str("d;\n\n").unwrap();
        writer.dedent();
        writer.write_str("}\n").unwrap();
        assert_eq!(writer.into_string(), "a {\n  b;\n  cd;\n\n}\n");
    }
}
