use aidl_ast::{DefinedKind, DefinedType, Node, TypeSpecifier, Typenames};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatableKind {
    BuiltIn,
    Parcelable,
    Interface,
}

impl From<DefinedKind> for ValidatableKind {
    fn from(kind: DefinedKind) -> Self {
        match kind {
            DefinedKind::Parcelable | DefinedKind::StructuredParcelable => ValidatableKind::Parcelable,
            DefinedKind::Interface => ValidatableKind::Interface,
        }
    }
}

/// Payload attached to every validated type specifier and declaration.
/// Backends read it back with `language_type::<ValidatableType>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatableType {
    pub kind: ValidatableKind,
    pub canonical_name: String,
    /// File the type was declared in; `None` for built-ins
    pub origin_file: Option<String>,
}

impl ValidatableType {
    pub fn lookup(name: &str, typenames: &Typenames) -> Option<Self> {
        if Typenames::is_builtin_typename(name) {
            return Some(Self { kind: ValidatableKind::BuiltIn, canonical_name: name.to_string(), origin_file: None });
        }
        typenames.try_get_defined_type(name).map(|entry| Self {
            kind: entry.kind.into(),
            canonical_name: entry.canonical_name.clone(),
            origin_file: Some(entry.location.file().to_string()),
        })
    }

    pub fn of_specifier(ty: &TypeSpecifier, typenames: &Typenames) -> Option<Self> {
        if !ty.is_resolved() {
            return None;
        }
        Self::lookup(ty.name(), typenames)
    }
}

/// Attach a `ValidatableType` to the declaration and to each resolved
/// type specifier in it.
pub fn attach_language_types(ty: &mut DefinedType, typenames: &Typenames) {
    let own = ValidatableType {
        kind: ty.kind().into(),
        canonical_name: ty.canonical_name(),
        origin_file: Some(ty.location().file().to_string()),
    };
    ty.set_language_type(own);

    ty.for_each_type_specifier_mut(&mut |ts| {
        if let Some(payload) = ValidatableType::of_specifier(ts, typenames) {
            ts.set_language_type(payload);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidl_ast::{Location, PayloadError, QualifiedName};
    use aidl_parser::{Parser, ParserOptions};

    #[test]
    fn test_attach_and_read_back() {
        let mut typenames = Typenames::new();
        let foo = DefinedType::parcelable(
            Location::nowhere(),
            QualifiedName::new(Location::nowhere(), "Foo", ""),
            vec!["a".to_string()],
            None,
        );
        typenames.add_preprocessed_type(foo);

        let mut parser = Parser::new(ParserOptions::default());
        assert!(parser.parse_source("p/IBar.aidl", "package p; interface IBar { List<Foo> get(); }", &mut typenames));
        assert!(parser.resolve(&typenames));
        let mut ty = parser.release_document().unwrap().release_defined_type().unwrap();

        assert_eq!(ty.language_type::<ValidatableType>().unwrap_err(), PayloadError::Unattached);
        attach_language_types(&mut ty, &typenames);

        let own = ty.language_type::<ValidatableType>().unwrap();
        assert_eq!(own.kind, ValidatableKind::Interface);
        assert_eq!(own.canonical_name, "p.IBar");
        assert_eq!(own.origin_file.as_deref(), Some("p/IBar.aidl"));

        let method = &ty.as_interface().unwrap().methods()[0];
        let list = method.return_type().language_type::<ValidatableType>().unwrap();
        assert_eq!(list.kind, ValidatableKind::BuiltIn);
        let foo = method.return_type().type_parameters()[0].language_type::<ValidatableType>().unwrap();
        assert_eq!(foo.kind, ValidatableKind::Parcelable);
        assert_eq!(foo.canonical_name, "a.Foo");

        assert!(matches!(
            method.return_type().language_type::<String>(),
            Err(PayloadError::TypeMismatch { .. })
        ));
    }
}
