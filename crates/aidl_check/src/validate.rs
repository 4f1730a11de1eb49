//! Validity rules run over a resolved declaration

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use aidl_ast::{Argument, DefinedType, Diagnostics, Interface, Method, Node, StructuredParcelable, Typenames};
use tracing::debug;

/// Offsets from the first and last user call transaction codes
pub const MIN_USER_SET_METHOD_ID: i32 = 0;
pub const MAX_USER_SET_METHOD_ID: i32 = 16_777_214;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp", "super",
    "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void", "volatile", "while",
    "true", "false", "null",
];

const RESERVED_PREFIX: &str = "_aidl";

/// Check the members of an interface or the fields of a structured
/// parcelable. Unstructured parcelables have nothing to check.
pub fn check_types(ty: &DefinedType, typenames: &Typenames, diags: &mut Diagnostics) -> bool {
    if let Some(iface) = ty.as_interface() {
        let mut ok = true;
        if ty.annotations().is_utf8() && ty.annotations().is_utf8_in_cpp() {
            diags.error(ty.location(), "Interface cannot be marked as both @utf8 and @utf8InCpp");
            ok = false;
        }
        return check_interface(iface, typenames, diags) && ok;
    }
    if let Some(parcelable) = ty.as_structured_parcelable() {
        return check_structured_parcelable(parcelable, diags);
    }
    true
}

fn check_structured_parcelable(parcelable: &StructuredParcelable, diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    for field in parcelable.fields() {
        ok &= field.check_valid(diags);
        let ty = field.get_type();
        if !ty.check_valid(diags) {
            ok = false;
            continue;
        }
        if ty.is_void() {
            diags.error(field.location(), format!("field '{}' cannot be void", field.name()));
            ok = false;
        }
    }
    ok
}

fn check_interface(iface: &Interface, typenames: &Typenames, diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    let mut method_names: HashMap<&str, &Method> = HashMap::new();

    for method in iface.methods() {
        let oneway = method.is_oneway() || iface.is_oneway();

        ok &= method.return_type().check_valid(diags);
        if oneway && !method.return_type().is_void() {
            diags.error(method.location(), format!("oneway method '{}' cannot return a value", method.name()));
            ok = false;
        }

        for (index, arg) in method.arguments().iter().enumerate() {
            if !arg.get_type().check_valid(diags) {
                ok = false;
                continue;
            }
            ok &= check_argument(arg, index + 1, typenames, diags);

            if oneway && arg.is_out() {
                diags.error(
                    method.location(),
                    format!("oneway method '{}' cannot have out parameters", method.name()),
                );
                ok = false;
            }
        }

        match method_names.get(method.name()) {
            Some(previous) => {
                diags.error(method.location(), format!("attempt to redefine method {}:", method.name()));
                diags.error(previous.location(), "previously defined here.");
                ok = false;
            }
            None => {
                method_names.insert(method.name(), method);
            }
        }
    }
    ok
}

fn check_argument(arg: &Argument, index: usize, typenames: &Typenames, diags: &mut Diagnostics) -> bool {
    let prefix = format!("parameter {} (argument {}): ", arg.name(), index);
    let ty = arg.get_type();

    if ty.is_void() {
        diags.error(arg.location(), format!("{}'void' is not a valid argument type", prefix));
        return false;
    }

    let can_be_out = typenames.can_be_out_parameter(ty);
    if !arg.is_direction_specified() && can_be_out {
        diags.error(
            arg.location(),
            format!(
                "{}'{}' can be an out type, so you must declare it as in, out, or inout.",
                prefix, ty
            ),
        );
        return false;
    }

    if arg.is_out() && !can_be_out {
        diags.error(arg.location(), format!("{}'{}' can only be an in parameter.", prefix, arg));
        return false;
    }

    if JAVA_KEYWORDS.contains(&arg.name()) {
        diags.error(arg.location(), format!("{}Argument name is a Java or aidl keyword", prefix));
        return false;
    }

    if arg.name().starts_with(RESERVED_PREFIX) {
        diags.error(arg.location(), format!("{}Argument name cannot begin with '{}'", prefix, RESERVED_PREFIX));
        return false;
    }

    true
}

/// Ids are either all written or all omitted. Written ids must be unique and
/// in range; omitted ones are numbered from zero in declaration order.
pub fn check_and_assign_method_ids(filename: &Path, methods: &mut [Method], diags: &mut Diagnostics) -> bool {
    let mut used_ids = BTreeSet::new();
    let mut has_unassigned = false;
    let mut has_assigned = false;

    for method in methods.iter() {
        match method.id().filter(|_| method.has_explicit_id()) {
            Some(id) => {
                has_assigned = true;
                if !used_ids.insert(id) {
                    diags.error(
                        method.location(),
                        format!("Found duplicate method id ({}) for method {}", id, method.name()),
                    );
                    return false;
                }
                if !(MIN_USER_SET_METHOD_ID..=MAX_USER_SET_METHOD_ID).contains(&id) {
                    diags.error(
                        method.location(),
                        format!(
                            "Found out of bounds id ({}) for method {}. Value for id must be between {} and {} inclusive.",
                            id,
                            method.name(),
                            MIN_USER_SET_METHOD_ID,
                            MAX_USER_SET_METHOD_ID
                        ),
                    );
                    return false;
                }
            }
            None => has_unassigned = true,
        }
        if has_assigned && has_unassigned {
            diags.error(filename, "You must either assign id's to all methods or to none of them.");
            return false;
        }
    }

    if has_unassigned {
        for (id, method) in (0..).zip(methods.iter_mut()) {
            method.set_id(id);
        }
        debug!(file = %filename.display(), count = methods.len(), "assigned method ids");
    }
    true
}

/// Constant names are unique within an interface and every value fits its type
pub fn validate_constants(iface: &Interface, diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    let mut names = HashSet::new();
    for constant in iface.constants() {
        if !names.insert(constant.name()) {
            diags.error(constant.location(), format!("Found duplicate constant name '{}'", constant.name()));
            ok = false;
        }
        ok &= constant.check_valid(diags);
    }
    ok
}

/// `package/path/Name.aidl` for a declaration. Nested names keep only the
/// outer class.
pub fn expected_filename(ty: &DefinedType) -> PathBuf {
    let mut expected: PathBuf = ty.split_package().iter().collect();
    let name = ty.name();
    let outer = name.split('.').next().unwrap_or(name);
    expected.push(format!("{}.aidl", outer));
    expected
}

/// The declaring file must end with the package path and the type name
pub fn check_filename(filename: &Path, ty: &DefinedType, diags: &mut Diagnostics) -> bool {
    let expected = expected_filename(ty);
    if filename.ends_with(&expected) {
        return true;
    }
    diags.error(
        ty.location(),
        format!("{} should be declared in a file called {}", ty.name(), expected.display()),
    );
    false
}
