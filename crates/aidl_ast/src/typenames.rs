//! Symbol table shared by every unit of one compilation.
//!
//! Holds the built-in names, the types defined by parsed units and the
//! types loaded from preprocessed files. Lookups are deterministic: the
//! maps are ordered by canonical name.
//!
//! Names written in a unit resolve through `resolve_in_scope`, which only
//! sees what the unit can name: its own package, its imports, fully
//! qualified names and preprocessed types.

use std::collections::BTreeMap;

use crate::{DefinedKind, DefinedType, Location, Node, TypeSpecifier};

pub const BUILTIN_TYPES: &[&str] = &[
    "void",
    "boolean",
    "byte",
    "char",
    "int",
    "long",
    "float",
    "double",
    "String",
    "List",
    "Map",
    "IBinder",
    "FileDescriptor",
    "CharSequence",
    "java.util.List",
    "java.util.Map",
];

/// What the table remembers about a registered type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub canonical_name: String,
    pub kind: DefinedKind,
    pub location: Location,
}

impl TypeEntry {
    fn of(ty: &DefinedType) -> Self {
        Self {
            name: ty.name().to_string(),
            canonical_name: ty.canonical_name(),
            kind: ty.kind(),
            location: ty.location().clone(),
        }
    }
}

/// Names visible from one unit besides fully qualified ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitScope {
    package: String,
    imports: Vec<String>,
}

impl UnitScope {
    pub fn new(package: impl Into<String>) -> Self {
        Self { package: package.into(), imports: Vec::new() }
    }

    pub fn add_import(&mut self, canonical_name: impl Into<String>) {
        self.imports.push(canonical_name.into());
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Canonical name an import gives to `name`. `Foo.Bar` under
    /// `import a.Foo;` is `a.Foo.Bar`.
    fn imported(&self, name: &str) -> Option<String> {
        let (head, rest) = match name.split_once('.') {
            Some((head, _)) => (head, &name[head.len()..]),
            None => (name, ""),
        };
        self.imports
            .iter()
            .find(|import| import.rsplit('.').next() == Some(head))
            .map(|import| format!("{}{}", import, rest))
    }

    fn in_package(&self, name: &str) -> Option<String> {
        (!self.package.is_empty()).then(|| format!("{}.{}", self.package, name))
    }
}

#[derive(Debug, Default)]
pub struct Typenames {
    defined: BTreeMap<String, TypeEntry>,
    preprocessed: BTreeMap<String, (TypeEntry, DefinedType)>,
}

impl Typenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type declared by a parsed unit. The unit keeps owning
    /// the node; false if the canonical name is already taken.
    pub fn add_defined_type(&mut self, ty: &DefinedType) -> bool {
        let entry = TypeEntry::of(ty);
        if self.defined.contains_key(&entry.canonical_name) {
            return false;
        }
        self.defined.insert(entry.canonical_name.clone(), entry);
        true
    }

    /// Register a type read from a preprocessed file. The table owns it.
    pub fn add_preprocessed_type(&mut self, ty: DefinedType) -> bool {
        let entry = TypeEntry::of(&ty);
        if self.preprocessed.contains_key(&entry.canonical_name) {
            return false;
        }
        self.preprocessed.insert(entry.canonical_name.clone(), (entry, ty));
        true
    }

    pub fn is_builtin_typename(name: &str) -> bool {
        BUILTIN_TYPES.contains(&name)
    }

    /// Find a defined or preprocessed type by canonical name, defined ones
    /// first, then a preprocessed type by simple name. Defined types are
    /// never matched by simple name: which of them a unit sees depends on
    /// its package and imports.
    pub fn try_get_defined_type(&self, name: &str) -> Option<&TypeEntry> {
        self.get_canonical(name).or_else(|| self.preprocessed_by_simple_name(name))
    }

    fn get_canonical(&self, name: &str) -> Option<&TypeEntry> {
        self.defined.get(name).or_else(|| self.preprocessed.get(name).map(|(entry, _)| entry))
    }

    fn preprocessed_by_simple_name(&self, name: &str) -> Option<&TypeEntry> {
        self.preprocessed.values().map(|(entry, _)| entry).find(|entry| entry.name == name)
    }

    pub fn preprocessed_type(&self, canonical_name: &str) -> Option<&DefinedType> {
        self.preprocessed.get(canonical_name).map(|(_, ty)| ty)
    }

    /// Canonical name for `name` outside of any unit, or `None` if nothing
    /// matches
    pub fn resolve_typename(&self, name: &str) -> Option<String> {
        self.resolve_in_scope(name, &UnitScope::default())
    }

    /// Canonical name for `name` as written in a unit. Tried in order:
    /// built-ins, fully qualified names, the unit's imports, the unit's
    /// package, then preprocessed types by simple name.
    pub fn resolve_in_scope(&self, name: &str, scope: &UnitScope) -> Option<String> {
        if Self::is_builtin_typename(name) {
            return Some(name.to_string());
        }
        if let Some(entry) = self.get_canonical(name) {
            return Some(entry.canonical_name.clone());
        }
        let scoped = [scope.imported(name), scope.in_package(name)];
        if let Some(entry) = scoped.iter().flatten().find_map(|candidate| self.get_canonical(candidate)) {
            return Some(entry.canonical_name.clone());
        }
        self.preprocessed_by_simple_name(name).map(|entry| entry.canonical_name.clone())
    }

    pub fn can_be_out_parameter(&self, ty: &TypeSpecifier) -> bool {
        let name = ty.name();
        if Self::is_builtin_typename(name) {
            return ty.is_array() || matches!(name, "List" | "Map" | "java.util.List" | "java.util.Map");
        }
        match self.try_get_defined_type(name) {
            Some(entry) => matches!(entry.kind, DefinedKind::Parcelable | DefinedKind::StructuredParcelable),
            None => false,
        }
    }

    /// Every registered type, defined ones first, each group in name order
    pub fn iter_types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.defined.values().chain(self.preprocessed.values().map(|(entry, _)| entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QualifiedName;

    fn qname(name: &str) -> QualifiedName {
        QualifiedName::new(Location::nowhere(), name, "")
    }

    fn package(pkg: &str) -> Vec<String> {
        pkg.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect()
    }

    fn parcelable(pkg: &str, name: &str) -> DefinedType {
        DefinedType::parcelable(Location::nowhere(), qname(name), package(pkg), None)
    }

    fn interface(pkg: &str, name: &str) -> DefinedType {
        DefinedType::interface(Location::nowhere(), name, "", false, Vec::new(), package(pkg))
    }

    fn ty(name: &str, is_array: bool) -> TypeSpecifier {
        TypeSpecifier::new(Location::nowhere(), name, is_array, None, "")
    }

    #[test]
    fn test_builtins_resolve_to_themselves() {
        let typenames = Typenames::new();
        assert_eq!(typenames.resolve_typename("int").as_deref(), Some("int"));
        assert_eq!(typenames.resolve_typename("java.util.List").as_deref(), Some("java.util.List"));
        assert_eq!(typenames.resolve_typename("Integer"), None);
    }

    #[test]
    fn test_resolution_order() {
        let mut typenames = Typenames::new();
        assert!(typenames.add_defined_type(&parcelable("a.b", "Foo")));
        assert!(typenames.add_preprocessed_type(parcelable("z", "Foo")));
        assert!(typenames.add_preprocessed_type(interface("p", "IBar")));

        assert_eq!(typenames.resolve_typename("a.b.Foo").as_deref(), Some("a.b.Foo"));
        assert_eq!(typenames.resolve_typename("z.Foo").as_deref(), Some("z.Foo"));
        assert_eq!(typenames.resolve_typename("IBar").as_deref(), Some("p.IBar"));
        assert!(typenames.preprocessed_type("p.IBar").is_some());

        // Outside a unit only preprocessed types match by simple name
        assert_eq!(typenames.resolve_typename("Foo").as_deref(), Some("z.Foo"));

        let in_package = UnitScope::new("a.b");
        assert_eq!(typenames.resolve_in_scope("Foo", &in_package).as_deref(), Some("a.b.Foo"));
        assert_eq!(typenames.resolve_in_scope("IBar", &in_package).as_deref(), Some("p.IBar"));
    }

    #[test]
    fn test_imports_pick_between_same_simple_names() {
        let mut typenames = Typenames::new();
        typenames.add_defined_type(&parcelable("a", "Foo"));
        typenames.add_defined_type(&parcelable("z", "Foo"));
        typenames.add_defined_type(&parcelable("q", "Inner"));

        let mut scope = UnitScope::new("p");
        scope.add_import("z.Foo");
        assert_eq!(typenames.resolve_in_scope("Foo", &scope).as_deref(), Some("z.Foo"));
        assert_eq!(typenames.resolve_in_scope("a.Foo", &scope).as_deref(), Some("a.Foo"));

        // Loaded, but neither imported nor in the unit's package
        assert_eq!(typenames.resolve_in_scope("Inner", &scope), None);
        assert_eq!(typenames.resolve_in_scope("Inner", &UnitScope::new("q")).as_deref(), Some("q.Inner"));
    }

    #[test]
    fn test_import_of_nested_name() {
        let mut typenames = Typenames::new();
        typenames.add_defined_type(&parcelable("a", "Outer.Inner"));
        let mut scope = UnitScope::new("p");
        scope.add_import("a.Outer");
        assert_eq!(typenames.resolve_in_scope("Outer.Inner", &scope).as_deref(), Some("a.Outer.Inner"));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut typenames = Typenames::new();
        assert!(typenames.add_defined_type(&parcelable("a", "Foo")));
        assert!(!typenames.add_defined_type(&parcelable("a", "Foo")));
        assert!(typenames.add_defined_type(&parcelable("b", "Foo")));
        assert!(typenames.add_preprocessed_type(parcelable("a", "Foo")));
        assert!(!typenames.add_preprocessed_type(parcelable("a", "Foo")));
        assert_eq!(typenames.iter_types().count(), 3);
    }

    #[test]
    fn test_can_be_out_parameter() {
        let mut typenames = Typenames::new();
        typenames.add_defined_type(&parcelable("a", "Foo"));
        typenames.add_defined_type(&interface("a", "IFoo"));

        assert!(!typenames.can_be_out_parameter(&ty("int", false)));
        assert!(typenames.can_be_out_parameter(&ty("int", true)));
        assert!(typenames.can_be_out_parameter(&ty("List", false)));
        assert!(typenames.can_be_out_parameter(&ty("Map", false)));
        assert!(!typenames.can_be_out_parameter(&ty("String", false)));
        assert!(typenames.can_be_out_parameter(&ty("a.Foo", false)));
        assert!(!typenames.can_be_out_parameter(&ty("a.IFoo", false)));
        assert!(!typenames.can_be_out_parameter(&ty("Unknown", false)));
    }
}
