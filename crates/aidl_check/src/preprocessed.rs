//! Preprocessed declaration files.
//!
//! One declaration per line, `<kind> <canonical name>;`, where kind is
//! `parcelable`, `structured_parcelable` or `interface`. Blank lines and
//! lines starting with `//` are skipped.

use std::path::Path;

use aidl_ast::{DefinedKind, DefinedType, Diagnostics, Location, Point, QualifiedName, Typenames};
use aidl_parser::IoDelegate;
use tracing::{debug, trace};

/// Split a line into its kind, package and class name.
///
/// The class is whatever follows the last dot, so nested classes lose
/// their outer class name.
pub fn parse_preprocessed_line(line: &str) -> Option<(DefinedKind, Vec<String>, String)> {
    let trimmed = line.trim_end_matches([' ', ';', '\t']);
    if trimmed.is_empty() || trimmed.contains(';') {
        return None;
    }

    let mut pieces = trimmed.split([' ', '\t']).filter(|p| !p.is_empty());
    let kind = DefinedKind::from_preprocess_keyword(pieces.next()?)?;
    let type_name = pieces.next()?;
    if pieces.next().is_some() {
        return None;
    }

    let (package, class_name) = match type_name.rsplit_once('.') {
        Some((package, class_name)) => (package.split('.').map(str::to_string).collect(), class_name),
        None => (Vec::new(), type_name),
    };
    if class_name.is_empty() {
        return None;
    }
    Some((kind, package, class_name.to_string()))
}

/// Register every declaration of a preprocessed file. Stops at the first
/// malformed line.
pub fn parse_preprocessed_file(
    io: &dyn IoDelegate,
    path: &Path,
    typenames: &mut Typenames,
    diags: &mut Diagnostics,
) -> bool {
    let contents = match io.read_file(path) {
        Ok(contents) => contents,
        Err(err) => {
            diags.error(path, format!("cannot open preprocessed file: {}", err));
            return false;
        }
    };

    let file = path.display().to_string();
    let mut count = 0usize;
    for (index, line) in contents.lines().enumerate() {
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let lineno = index as u32 + 1;

        let Some((kind, package, class_name)) = parse_preprocessed_line(line) else {
            diags.error(format!("{}:{}", file, lineno), format!("malformed preprocessed file line: '{}'", line));
            return false;
        };

        let point = Point::new(lineno, 0);
        let location = Location::new(file.as_str(), point, point);
        let ty = match kind {
            DefinedKind::Parcelable => {
                let name = QualifiedName::new(location.clone(), class_name, "");
                DefinedType::parcelable(location, name, package, None)
            }
            DefinedKind::StructuredParcelable => {
                let name = QualifiedName::new(location.clone(), class_name, "");
                DefinedType::structured_parcelable(location, name, package, Vec::new())
            }
            DefinedKind::Interface => DefinedType::interface(location, class_name, "", false, Vec::new(), package),
        };

        let canonical = ty.canonical_name();
        if !typenames.add_preprocessed_type(ty) {
            trace!(name = %canonical, "preprocessed type already known");
        }
        count += 1;
    }

    debug!(file = %file, types = count, "loaded preprocessed file");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidl_parser::MemoryIoDelegate;

    #[test]
    fn test_parse_lines() {
        let (kind, package, name) = parse_preprocessed_line("parcelable a.b.Foo;").unwrap();
        assert_eq!(kind, DefinedKind::Parcelable);
        assert_eq!(package, ["a", "b"]);
        assert_eq!(name, "Foo");

        let (kind, package, name) = parse_preprocessed_line("interface\tIFoo ; ").unwrap();
        assert_eq!(kind, DefinedKind::Interface);
        assert!(package.is_empty());
        assert_eq!(name, "IFoo");

        let (kind, _, name) = parse_preprocessed_line("structured_parcelable x.Bar.Baz;").unwrap();
        assert_eq!(kind, DefinedKind::StructuredParcelable);
        assert_eq!(name, "Baz");
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_preprocessed_line("parcelable a.b.Foo; interface b").is_none());
        assert!(parse_preprocessed_line("parcelable a b;").is_none());
        assert!(parse_preprocessed_line("enum a.B;").is_none());
        assert!(parse_preprocessed_line("parcelable;").is_none());
        assert!(parse_preprocessed_line(" ; ").is_none());
    }

    #[test]
    fn test_registers_types() {
        let mut io = MemoryIoDelegate::new();
        io.add_file(
            "framework.aidl",
            "// framework types\n\nparcelable android.os.Bundle;\ninterface android.os.IServiceManager;\n",
        );
        let mut typenames = Typenames::new();
        let mut diags = Diagnostics::new();
        assert!(parse_preprocessed_file(&io, Path::new("framework.aidl"), &mut typenames, &mut diags));
        assert!(diags.is_empty());

        assert_eq!(typenames.resolve_typename("Bundle").as_deref(), Some("android.os.Bundle"));
        let entry = typenames.try_get_defined_type("android.os.IServiceManager").unwrap();
        assert_eq!(entry.kind, DefinedKind::Interface);
        assert_eq!(entry.location.begin(), Point::new(4, 0));
    }

    #[test]
    fn test_reports_malformed_line() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("bad.aidl", "parcelable a.Foo;\nunion a.Bar;\nparcelable a.Baz;\n");
        let mut typenames = Typenames::new();
        let mut diags = Diagnostics::new();
        assert!(!parse_preprocessed_file(&io, Path::new("bad.aidl"), &mut typenames, &mut diags));
        assert_eq!(
            diags.iter().next().unwrap().to_string(),
            "ERROR: bad.aidl:2: malformed preprocessed file line: 'union a.Bar;'"
        );
        assert!(typenames.resolve_typename("a.Foo").is_some());
        assert!(typenames.resolve_typename("a.Baz").is_none());
    }

    #[test]
    fn test_missing_file() {
        let io = MemoryIoDelegate::new();
        let mut diags = Diagnostics::new();
        assert!(!parse_preprocessed_file(&io, Path::new("nope.aidl"), &mut Typenames::new(), &mut diags));
        assert_eq!(diags.error_count(), 1);
    }
}
