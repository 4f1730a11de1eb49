use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use aidl_ast::{DefinedKind, DefinedType, Diagnostics, Import, InternalError, Node, Typenames};
use aidl_parser::{IoDelegate, Parser, ParserOptions};
use tracing::{debug, trace};

use crate::validate::{check_and_assign_method_ids, check_filename, check_types, validate_constants};
use crate::{AidlError, ImportResolver, attach_language_types, parse_preprocessed_file};

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Roots searched for imported classes, in order
    pub import_paths: Vec<PathBuf>,
    pub preprocessed_files: Vec<PathBuf>,
    /// Every input of the invocation; imports may resolve to one of them
    pub input_files: Vec<PathBuf>,
    /// Reject unstructured parcelables anywhere in the symbol table
    pub structured: bool,
    pub parser: ParserOptions,
}

/// A validated declaration and every import loaded on its behalf
#[derive(Debug)]
pub struct LoadedUnit {
    pub defined_type: DefinedType,
    /// Direct imports first, then transitive ones in discovery order.
    /// Imports satisfied by an already known type carry no file.
    pub imports: Vec<Import>,
}

impl LoadedUnit {
    /// Files read to produce this unit, the input itself excluded
    pub fn import_files(&self) -> impl Iterator<Item = &Path> {
        self.imports.iter().filter_map(Import::filename)
    }
}

/// Parse `input`, load what it imports, resolve everything and validate
/// the single declaration it must contain.
pub fn load_and_validate(
    input: &Path,
    options: &LoadOptions,
    io: &dyn IoDelegate,
    typenames: &mut Typenames,
    diags: &mut Diagnostics,
) -> Result<LoadedUnit, AidlError> {
    debug!(input = %input.display(), "loading");

    let mut preprocessed_ok = true;
    for file in &options.preprocessed_files {
        preprocessed_ok &= parse_preprocessed_file(io, file, typenames, diags);
    }
    if !preprocessed_ok {
        return Err(AidlError::BadPreprocessedFile);
    }

    let mut parser = Parser::new(options.parser);
    let parsed = parser.parse_file(io, input, typenames);
    diags.append(&mut parser.take_diagnostics());
    if !parsed {
        return Err(AidlError::ParseError);
    }

    check_document_shape(input, &parser, diags)?;

    let imported = load_imports(&mut parser, options, io, typenames, diags)?;

    let resolved = parser.resolve(typenames);
    diags.append(&mut parser.take_diagnostics());
    if !resolved {
        return Err(AidlError::BadType);
    }

    let mut imports = Vec::with_capacity(imported.len());
    let mut import_errors = false;
    for (mut import, import_parser) in imported {
        if let Some(mut import_parser) = import_parser {
            let resolved = import_parser.resolve(typenames);
            diags.append(&mut import_parser.take_diagnostics());
            if !resolved {
                diags.error(import.location(), format!("unable to resolve types used by {}", import.needed_class()));
                import_errors = true;
            }
            if let Some(document) = import_parser.release_document() {
                import.set_document(document);
            }
        }
        imports.push(import);
    }
    if import_errors {
        return Err(AidlError::BadImport);
    }

    let mut defined_type = parser
        .release_document()
        .and_then(|mut document| document.release_defined_type())
        .ok_or_else(|| InternalError::new(input, "parsed document lost its declaration"))?;

    if !check_types(&defined_type, typenames, diags) {
        return Err(AidlError::BadType);
    }

    if options.structured && !check_all_structured(typenames, diags) {
        return Err(AidlError::BadType);
    }

    if let Some(iface) = defined_type.as_interface_mut() {
        if !check_and_assign_method_ids(input, iface.methods_mut(), diags) {
            return Err(AidlError::BadMethodId);
        }
    }
    if let Some(iface) = defined_type.as_interface() {
        if !validate_constants(iface, diags) {
            return Err(AidlError::BadConstants);
        }
    }

    attach_language_types(&mut defined_type, typenames);

    debug!(
        input = %input.display(),
        name = %defined_type.canonical_name(),
        imports = imports.len(),
        "validated"
    );
    Ok(LoadedUnit { defined_type, imports })
}

/// Exactly one declaration, and not an unstructured parcelable, in a file
/// whose path matches its package.
fn check_document_shape(input: &Path, parser: &Parser, diags: &mut Diagnostics) -> Result<(), AidlError> {
    let types = parser.document().map(|d| d.defined_types()).unwrap_or_default();

    if types.is_empty() {
        diags.error(input, "Cannot generate file without any definitions.");
        return Err(AidlError::BadType);
    }
    if types.iter().all(|ty| ty.as_unstructured_parcelable().is_some()) {
        diags.error(input, "Refusing to generate code with unstructured parcelables.");
        return Err(AidlError::FoundParcelable);
    }
    if types.len() > 1 {
        diags.error(input, "Exactly one structured type is required to be defined.");
        return Err(AidlError::BadType);
    }

    let ty = &types[0];
    if !check_filename(input, ty, diags) {
        diags.error(ty.location(), format!("Invalid package declaration '{}'", ty.package()));
        return Err(AidlError::BadPackage);
    }
    Ok(())
}

fn is_known_class(typenames: &Typenames, needed_class: &str) -> bool {
    typenames
        .try_get_defined_type(needed_class)
        .is_some_and(|entry| entry.canonical_name == needed_class)
}

/// Locate and parse every import, following the imports of imported files.
/// A class that is already in the symbol table is not loaded again, which
/// also ends import cycles.
fn load_imports(
    parser: &mut Parser,
    options: &LoadOptions,
    io: &dyn IoDelegate,
    typenames: &mut Typenames,
    diags: &mut Diagnostics,
) -> Result<Vec<(Import, Option<Parser>)>, AidlError> {
    let resolver = ImportResolver::new(io, &options.import_paths, &options.input_files);
    let mut pending: VecDeque<Import> = parser.release_imports().into();
    let mut loaded = Vec::new();
    let mut failed = false;

    while let Some(mut import) = pending.pop_front() {
        let needed = import.needed_class().to_string();
        if is_known_class(typenames, &needed) {
            trace!(class = %needed, "import already known");
            loaded.push((import, None));
            continue;
        }

        let Some(path) = resolver.find_import_file(&needed) else {
            diags.error(import.location(), format!("couldn't find import for class {}", needed));
            failed = true;
            loaded.push((import, None));
            continue;
        };
        debug!(class = %needed, path = %path.display(), "import");
        import.set_filename(path.clone());

        let mut import_parser = Parser::new(options.parser);
        let parsed = import_parser.parse_file(io, &path, typenames);
        diags.append(&mut import_parser.take_diagnostics());
        if !parsed {
            diags.error(path.as_path(), format!("error while parsing import for class {}", needed));
            failed = true;
            loaded.push((import, None));
            continue;
        }

        if let Some(document) = import_parser.document() {
            for ty in document.defined_types() {
                failed |= !check_filename(&path, ty, diags);
            }
        }

        pending.extend(import_parser.release_imports());
        loaded.push((import, Some(import_parser)));
    }

    if failed {
        return Err(AidlError::BadImport);
    }
    Ok(loaded)
}

fn check_all_structured(typenames: &Typenames, diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    for entry in typenames.iter_types() {
        if entry.kind == DefinedKind::Parcelable {
            diags.error(
                &entry.location,
                format!("{} is not structured, but this is a structured interface.", entry.canonical_name),
            );
            ok = false;
        }
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidl_parser::MemoryIoDelegate;

    use crate::{ValidatableKind, ValidatableType};

    fn options(import_paths: &[&str]) -> LoadOptions {
        LoadOptions { import_paths: import_paths.iter().map(PathBuf::from).collect(), ..LoadOptions::default() }
    }

    fn run(io: &MemoryIoDelegate, input: &str, options: &LoadOptions) -> (Result<LoadedUnit, AidlError>, Diagnostics) {
        let mut typenames = Typenames::new();
        let mut diags = Diagnostics::new();
        let result = load_and_validate(Path::new(input), options, io, &mut typenames, &mut diags);
        (result, diags)
    }

    #[test]
    fn test_loads_interface_with_imports() {
        let mut io = MemoryIoDelegate::new();
        io.add_file(
            "src/p/IFoo.aidl",
            "package p;\nimport q.Data;\ninterface IFoo {\n  Data get(in int key);\n  void put(in Data d);\n  const int VERSION = 2;\n}\n",
        )
        .add_file("inc/q/Data.aidl", "package q;\nimport q.Inner;\nparcelable Data { Inner inner; }\n")
        .add_file("inc/q/Inner.aidl", "package q;\nparcelable Inner { int x; }\n");

        let (result, diags) = run(&io, "src/p/IFoo.aidl", &options(&["inc"]));
        let unit = result.unwrap_or_else(|e| panic!("{}: {:?}", e, diags.messages()));
        assert!(diags.is_empty());

        assert_eq!(unit.defined_type.canonical_name(), "p.IFoo");
        let files: Vec<&Path> = unit.import_files().collect();
        assert_eq!(files, [Path::new("inc/q/Data.aidl"), Path::new("inc/q/Inner.aidl")]);
        assert!(unit.imports.iter().all(|i| i.document().is_some()));

        let data = &unit.imports[0].document().unwrap().defined_types()[0];
        let inner_field = &data.as_structured_parcelable().unwrap().fields()[0];
        assert_eq!(inner_field.get_type().name(), "q.Inner");

        let iface = unit.defined_type.as_interface().unwrap();
        let ids: Vec<Option<i32>> = iface.methods().iter().map(|m| m.id()).collect();
        assert_eq!(ids, [Some(0), Some(1)]);

        let payload = iface.methods()[0].return_type().language_type::<ValidatableType>().unwrap();
        assert_eq!(payload.kind, ValidatableKind::Parcelable);
        assert_eq!(payload.origin_file.as_deref(), Some("inc/q/Data.aidl"));
    }

    #[test]
    fn test_resolution_follows_the_unit_imports() {
        let mut io = MemoryIoDelegate::new();
        io.add_file(
            "p/IFoo.aidl",
            "package p;\nimport z.Foo;\nimport q.Data;\ninterface IFoo { void f(in Foo foo, in Data d); }\n",
        )
        .add_file("inc/q/Data.aidl", "package q;\nimport a.Foo;\nimport q.Inner;\nparcelable Data { Foo foo; Inner inner; }\n")
        .add_file("inc/q/Inner.aidl", "package q;\nparcelable Inner { int x; }\n")
        .add_file("inc/a/Foo.aidl", "package a;\nparcelable Foo { int a; }\n")
        .add_file("inc/z/Foo.aidl", "package z;\nparcelable Foo { int z; }\n")
        .add_file("p/IBar.aidl", "package p;\nimport q.Data;\ninterface IBar { void g(in Inner i); }\n");

        let (result, diags) = run(&io, "p/IFoo.aidl", &options(&["inc"]));
        let unit = result.unwrap_or_else(|e| panic!("{}: {:?}", e, diags.messages()));
        let method = &unit.defined_type.as_interface().unwrap().methods()[0];
        assert_eq!(method.arguments()[0].get_type().name(), "z.Foo");

        let data = unit.imports.iter().find(|i| i.needed_class() == "q.Data").and_then(Import::document).unwrap();
        let fields = data.defined_types()[0].as_structured_parcelable().unwrap().fields();
        assert_eq!(fields[0].get_type().name(), "a.Foo");

        // q.Inner is loaded for q.Data but IBar never imports it
        let (result, diags) = run(&io, "p/IBar.aidl", &options(&["inc"]));
        assert!(matches!(result, Err(AidlError::BadType)));
        assert_eq!(diags.messages(), ["Failed to resolve 'Inner'"]);
    }

    #[test]
    fn test_import_cycle_terminates() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("a/IA.aidl", "package a; import b.IB; interface IA { void f(in IB b); }")
            .add_file("inc/b/IB.aidl", "package b; import a.IA; interface IB { void g(in IA a); }");
        let (result, diags) = run(&io, "a/IA.aidl", &options(&["inc"]));
        let unit = result.unwrap_or_else(|e| panic!("{}: {:?}", e, diags.messages()));
        assert_eq!(unit.imports.len(), 2);
        assert_eq!(unit.import_files().count(), 1);
    }

    #[test]
    fn test_document_shape_errors() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("p/Empty.aidl", "package p;")
            .add_file("p/Foo.aidl", "package p; parcelable Foo;")
            .add_file("p/Two.aidl", "package p; parcelable Two { int a; } interface ITwo { }")
            .add_file("p/IWrong.aidl", "package q; interface IWrong { }");

        let cases = [
            ("p/Empty.aidl", "Cannot generate file without any definitions."),
            ("p/Foo.aidl", "Refusing to generate code with unstructured parcelables."),
            ("p/Two.aidl", "Exactly one structured type is required to be defined."),
            ("p/IWrong.aidl", "IWrong should be declared in a file called q/IWrong.aidl"),
        ];
        for (input, message) in cases {
            let (result, diags) = run(&io, input, &LoadOptions::default());
            assert!(result.is_err(), "{} should fail", input);
            assert_eq!(diags.messages()[0], message);
        }

        let (result, _) = run(&io, "p/Foo.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::FoundParcelable)));
        let (result, _) = run(&io, "p/IWrong.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::BadPackage)));
    }

    #[test]
    fn test_missing_import() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("p/IFoo.aidl", "package p;\nimport q.Missing;\ninterface IFoo { }\n");
        let (result, diags) = run(&io, "p/IFoo.aidl", &options(&["inc"]));
        assert!(matches!(result, Err(AidlError::BadImport)));
        let rendered: Vec<String> = diags.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, ["ERROR: p/IFoo.aidl:2:1: couldn't find import for class q.Missing"]);
    }

    #[test]
    fn test_parse_and_resolve_failures() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("p/IFoo.aidl", "package p; interface IFoo { void f( }")
            .add_file("p/IBar.aidl", "package p; interface IBar { Nope f(); }");

        let (result, _) = run(&io, "p/IFoo.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::ParseError)));

        let (result, diags) = run(&io, "p/IBar.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::BadType)));
        assert_eq!(diags.messages(), ["Failed to resolve 'Nope'"]);
    }

    #[test]
    fn test_preprocessed_types() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("framework.aidl", "parcelable android.os.Bundle;\n")
            .add_file("broken.aidl", "parcelable\n")
            .add_file("p/IFoo.aidl", "package p; interface IFoo { void f(in Bundle b); }");

        let mut opts = LoadOptions { preprocessed_files: vec![PathBuf::from("framework.aidl")], ..LoadOptions::default() };
        let (result, diags) = run(&io, "p/IFoo.aidl", &opts);
        assert!(result.is_ok(), "{:?}", diags.messages());

        opts.structured = true;
        let (result, diags) = run(&io, "p/IFoo.aidl", &opts);
        assert!(matches!(result, Err(AidlError::BadType)));
        assert_eq!(
            diags.messages(),
            ["android.os.Bundle is not structured, but this is a structured interface."]
        );

        opts.preprocessed_files.push(PathBuf::from("broken.aidl"));
        let (result, _) = run(&io, "p/IFoo.aidl", &opts);
        assert!(matches!(result, Err(AidlError::BadPreprocessedFile)));
    }

    #[test]
    fn test_method_id_and_constant_failures() {
        let mut io = MemoryIoDelegate::new();
        io.add_file("p/IIds.aidl", "package p; interface IIds { void a() = 1; void b(); }")
            .add_file("p/IConsts.aidl", "package p; interface IConsts { const int A = 1; const int A = 2; }");

        let (result, _) = run(&io, "p/IIds.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::BadMethodId)));
        let (result, _) = run(&io, "p/IConsts.aidl", &LoadOptions::default());
        assert!(matches!(result, Err(AidlError::BadConstants)));
    }
}
