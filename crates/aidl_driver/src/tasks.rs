use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use aidl_ast::{CodeWriter, DefinedType, Diagnostics, Emitter, Typenames, WriteError};
use aidl_check::{AidlError, LoadOptions, LoadedUnit, load_and_validate};
use aidl_parser::{IoDelegate, Parser};
use tracing::{debug, info};

/// Where `check` writes its dependency file
#[derive(Debug, Clone)]
pub struct DepFileOptions {
    pub path: PathBuf,
    /// Target the inputs are listed as prerequisites of
    pub target: String,
    /// Ninja depfiles carry no phony rules
    pub ninja: bool,
}

/// Load and validate every input. Stops at the first input that fails.
pub fn check(
    inputs: &[PathBuf],
    options: &LoadOptions,
    depfile: Option<&DepFileOptions>,
    io: &dyn IoDelegate,
    diags: &mut Diagnostics,
) -> Result<Vec<LoadedUnit>, AidlError> {
    let mut units = Vec::with_capacity(inputs.len());
    let mut deps = String::new();
    for input in inputs {
        let unit = load_and_validate(input, options, io, &mut Typenames::new(), diags)?;
        info!(input = %input.display(), name = %unit.defined_type.canonical_name(), "ok");
        if let Some(depfile) = depfile {
            deps.push_str(&dep_file_contents(&depfile.target, input, &unit, depfile.ninja));
        }
        units.push(unit);
    }

    if let Some(depfile) = depfile {
        write_output(&depfile.path, &deps)?;
    }
    Ok(units)
}

/// Make-style dependency rule: the target depends on the input and every
/// imported file. Make output also gets an empty rule per source so a
/// deleted file does not break incremental builds.
pub fn dep_file_contents(target: &str, input: &Path, unit: &LoadedUnit, ninja: bool) -> String {
    let sources: Vec<String> = std::iter::once(input)
        .chain(unit.import_files())
        .map(|path| path.display().to_string())
        .collect();

    let mut out = format!("{} : \\\n  {}\n", target, sources.join(" \\\n  "));
    if !ninja {
        out.push('\n');
        for source in &sources {
            out.push_str(&format!("{} :\n", source));
        }
    }
    out
}

/// Write `<kind> <canonical name>;` for every declaration in the inputs
pub fn preprocess(
    inputs: &[PathBuf],
    output: &Path,
    options: &LoadOptions,
    io: &dyn IoDelegate,
    diags: &mut Diagnostics,
) -> Result<(), AidlError> {
    let mut out = String::new();
    for input in inputs {
        let mut typenames = Typenames::new();
        let mut parser = Parser::new(options.parser);
        let parsed = parser.parse_file(io, input, &mut typenames);
        diags.append(&mut parser.take_diagnostics());
        if !parsed {
            return Err(AidlError::ParseError);
        }
        for ty in parser.document().map(|d| d.defined_types()).unwrap_or_default() {
            out.push_str(&format!("{} {};\n", ty.preprocess_declaration_name(), ty.canonical_name()));
        }
    }
    debug!(output = %output.display(), "writing preprocessed file");
    write_output(output, &out)
}

/// Validate the inputs and write their declarations grouped by package,
/// packages and names in sorted order
pub fn dump_api(
    inputs: &[PathBuf],
    output: &Path,
    options: &LoadOptions,
    io: &dyn IoDelegate,
    diags: &mut Diagnostics,
) -> Result<(), AidlError> {
    let mut by_package: BTreeMap<String, Vec<DefinedType>> = BTreeMap::new();
    for input in inputs {
        let unit = load_and_validate(input, options, io, &mut Typenames::new(), diags)?;
        by_package.entry(unit.defined_type.package()).or_default().push(unit.defined_type);
    }

    let text = render_api(&mut by_package).map_err(|err| write_error(output, err))?;
    write_output(output, &text)
}

fn render_api(by_package: &mut BTreeMap<String, Vec<DefinedType>>) -> Result<String, WriteError> {
    let mut writer = CodeWriter::new(Vec::new());
    for (package, types) in by_package.iter_mut() {
        types.sort_by(|a, b| a.name().cmp(b.name()));
        writer.write_str(&format!("package {} {{\n", package))?;
        writer.indent();
        for ty in types.iter() {
            ty.write(&mut writer)?;
            writer.write_str("\n")?;
        }
        writer.dedent();
        writer.write_str("}\n")?;
    }
    Ok(writer.into_string())
}

fn write_error(path: &Path, err: WriteError) -> AidlError {
    match err {
        WriteError::Io(source) => AidlError::io(path, source),
        WriteError::Internal(internal) => AidlError::Internal(internal),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), AidlError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| AidlError::io(parent, err))?;
    }
    fs::write(path, contents).map_err(|err| AidlError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidl_parser::MemoryIoDelegate;

    fn memory_tree() -> MemoryIoDelegate {
        let mut io = MemoryIoDelegate::new();
        io.add_file("src/p/IFoo.aidl", "package p;\nimport q.Data;\ninterface IFoo { void f(in Data d); }\n")
            .add_file("src/p/IBar.aidl", "package p;\ninterface IBar { oneway void ping(); }\n")
            .add_file("inc/q/Data.aidl", "package q;\nparcelable Data { int x; }\n");
        io
    }

    fn options() -> LoadOptions {
        LoadOptions { import_paths: vec![PathBuf::from("inc")], ..LoadOptions::default() }
    }

    #[test]
    fn test_dep_file_formats() {
        let io = memory_tree();
        let mut diags = Diagnostics::new();
        let input = Path::new("src/p/IFoo.aidl");
        let unit = load_and_validate(input, &options(), &io, &mut Typenames::new(), &mut diags).unwrap();

        assert_eq!(
            dep_file_contents("out/IFoo.java", input, &unit, false),
            "out/IFoo.java : \\\n  src/p/IFoo.aidl \\\n  inc/q/Data.aidl\n\nsrc/p/IFoo.aidl :\ninc/q/Data.aidl :\n"
        );
        assert_eq!(
            dep_file_contents("out/IFoo.java", input, &unit, true),
            "out/IFoo.java : \\\n  src/p/IFoo.aidl \\\n  inc/q/Data.aidl\n"
        );
    }

    #[test]
    fn test_render_api() {
        let io = memory_tree();
        let mut diags = Diagnostics::new();
        let mut by_package: BTreeMap<String, Vec<DefinedType>> = BTreeMap::new();
        for input in ["src/p/IFoo.aidl", "src/p/IBar.aidl", "inc/q/Data.aidl"] {
            let unit =
                load_and_validate(Path::new(input), &options(), &io, &mut Typenames::new(), &mut diags).unwrap();
            by_package.entry(unit.defined_type.package()).or_default().push(unit.defined_type);
        }

        let text = render_api(&mut by_package).unwrap();
        assert_eq!(
            text,
            "package p {\n  interface IBar {\n    oneway void ping();\n  }\n\n  interface IFoo {\n    void f(in q.Data d);\n  }\n\n}\npackage q {\n  parcelable Data {\n    int x;\n  }\n\n}\n"
        );
    }

    #[test]
    fn test_check_stops_at_first_failure() {
        let mut io = memory_tree();
        io.add_file("src/p/IBad.aidl", "package p;\ninterface IBad { Missing f(); }\n");
        let mut diags = Diagnostics::new();
        let inputs = [PathBuf::from("src/p/IBad.aidl"), PathBuf::from("src/p/IFoo.aidl")];
        let result = check(&inputs, &options(), None, &io, &mut diags);
        assert!(matches!(result, Err(AidlError::BadType)));
        assert_eq!(diags.messages(), ["Failed to resolve 'Missing'"]);
    }
}
