use std::any::Any;
use std::fmt;

use crate::{
    Annotatable, Annotation, ConstantDeclaration, Emitter, LanguageTypeSlot, Location, Member, Method,
    Node, PayloadError, QualifiedName, TypeSpecifier, VariableDeclaration, WriteError,
};

/// Which of the three declaration forms a type is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinedKind {
    Parcelable,
    StructuredParcelable,
    Interface,
}

impl DefinedKind {
    /// Keyword used for this kind in preprocessed files
    pub fn preprocess_keyword(self) -> &'static str {
        match self {
            DefinedKind::Parcelable => "parcelable",
            DefinedKind::StructuredParcelable => "structured_parcelable",
            DefinedKind::Interface => "interface",
        }
    }

    pub fn from_preprocess_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "parcelable" => Some(DefinedKind::Parcelable),
            "structured_parcelable" => Some(DefinedKind::StructuredParcelable),
            "interface" => Some(DefinedKind::Interface),
            _ => None,
        }
    }
}

impl fmt::Display for DefinedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preprocess_keyword())
    }
}

/// A parcelable whose layout lives in native code
#[derive(Debug)]
pub struct Parcelable {
    name: QualifiedName,
    cpp_header: Option<String>,
}

impl Parcelable {
    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    /// Header path without the quotes
    pub fn cpp_header(&self) -> Option<&str> {
        self.cpp_header.as_deref()
    }
}

#[derive(Debug)]
pub struct StructuredParcelable {
    parcelable: Parcelable,
    fields: Vec<VariableDeclaration>,
}

impl StructuredParcelable {
    pub fn fields(&self) -> &[VariableDeclaration] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [VariableDeclaration] {
        &mut self.fields
    }
}

#[derive(Debug)]
pub struct Interface {
    oneway: bool,
    methods: Vec<Method>,
    constants: Vec<ConstantDeclaration>,
}

impl Interface {
    pub fn is_oneway(&self) -> bool {
        self.oneway
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> &mut [Method] {
        &mut self.methods
    }

    pub fn constants(&self) -> &[ConstantDeclaration] {
        &self.constants
    }
}

#[derive(Debug)]
pub enum DefinedTypeKind {
    Parcelable(Parcelable),
    StructuredParcelable(StructuredParcelable),
    Interface(Interface),
}

/// A top-level declaration of a .aidl file
#[derive(Debug)]
pub struct DefinedType {
    location: Location,
    annotations: Annotatable,
    name: String,
    comments: String,
    package: Vec<String>,
    language_type: LanguageTypeSlot,
    kind: DefinedTypeKind,
}

impl DefinedType {
    /// `parcelable a.b.Foo;`. The header is taken verbatim from the source,
    /// quotes included.
    pub fn parcelable(
        location: Location,
        name: QualifiedName,
        package: Vec<String>,
        cpp_header: Option<String>,
    ) -> Self {
        let cpp_header = cpp_header.map(|h| strip_quotes(&h).to_string());
        let parcelable = Parcelable { name, cpp_header };
        Self::new(location, package, DefinedTypeKind::Parcelable(parcelable))
    }

    pub fn structured_parcelable(
        location: Location,
        name: QualifiedName,
        package: Vec<String>,
        fields: Vec<VariableDeclaration>,
    ) -> Self {
        let parcelable = Parcelable { name, cpp_header: None };
        let kind = DefinedTypeKind::StructuredParcelable(StructuredParcelable { parcelable, fields });
        Self::new(location, package, kind)
    }

    pub fn interface(
        location: Location,
        name: impl Into<String>,
        comments: impl Into<String>,
        oneway: bool,
        members: Vec<Member>,
        package: Vec<String>,
    ) -> Self {
        let mut methods = Vec::new();
        let mut constants = Vec::new();
        for member in members {
            match member {
                Member::Method(method) => methods.push(method),
                Member::ConstantDeclaration(constant) => constants.push(constant),
            }
        }
        Self {
            location,
            annotations: Annotatable::new(),
            name: name.into(),
            comments: comments.into(),
            package,
            language_type: LanguageTypeSlot::default(),
            kind: DefinedTypeKind::Interface(Interface { oneway, methods, constants }),
        }
    }

    fn new(location: Location, package: Vec<String>, kind: DefinedTypeKind) -> Self {
        let (name, comments) = match &kind {
            DefinedTypeKind::Parcelable(p) => (p.name.dot_name(), p.name.comments().to_string()),
            DefinedTypeKind::StructuredParcelable(s) => {
                (s.parcelable.name.dot_name(), s.parcelable.name.comments().to_string())
            }
            DefinedTypeKind::Interface(_) => (String::new(), String::new()),
        };
        Self {
            location,
            annotations: Annotatable::new(),
            name,
            comments,
            package,
            language_type: LanguageTypeSlot::default(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn split_package(&self) -> &[String] {
        &self.package
    }

    /// Dot-joined package, empty for the default package
    pub fn package(&self) -> String {
        self.package.join(".")
    }

    /// `a.b.Foo`, or just `Foo` in the default package
    pub fn canonical_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package(), self.name)
        }
    }

    pub fn annotations(&self) -> &Annotatable {
        &self.annotations
    }

    pub fn annotate(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations.annotate(annotations);
    }

    pub fn kind(&self) -> DefinedKind {
        match &self.kind {
            DefinedTypeKind::Parcelable(_) => DefinedKind::Parcelable,
            DefinedTypeKind::StructuredParcelable(_) => DefinedKind::StructuredParcelable,
            DefinedTypeKind::Interface(_) => DefinedKind::Interface,
        }
    }

    pub fn preprocess_declaration_name(&self) -> &'static str {
        self.kind().preprocess_keyword()
    }

    /// Any parcelable, structured ones included
    pub fn as_parcelable(&self) -> Option<&Parcelable> {
        match &self.kind {
            DefinedTypeKind::Parcelable(p) => Some(p),
            DefinedTypeKind::StructuredParcelable(s) => Some(&s.parcelable),
            DefinedTypeKind::Interface(_) => None,
        }
    }

    pub fn as_unstructured_parcelable(&self) -> Option<&Parcelable> {
        match &self.kind {
            DefinedTypeKind::Parcelable(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_structured_parcelable(&self) -> Option<&StructuredParcelable> {
        match &self.kind {
            DefinedTypeKind::StructuredParcelable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structured_parcelable_mut(&mut self) -> Option<&mut StructuredParcelable> {
        match &mut self.kind {
            DefinedTypeKind::StructuredParcelable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match &self.kind {
            DefinedTypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_interface_mut(&mut self) -> Option<&mut Interface> {
        match &mut self.kind {
            DefinedTypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn language_type<T: Any>(&self) -> Result<&T, PayloadError> {
        self.language_type.get()
    }

    pub fn set_language_type<T: Any>(&mut self, language_type: T) {
        self.language_type.set(language_type);
    }

    /// Every type specifier of the declaration, generic parameters included,
    /// in source order.
    pub fn for_each_type_specifier(&self, f: &mut dyn FnMut(&TypeSpecifier)) {
        match &self.kind {
            DefinedTypeKind::Parcelable(_) => {}
            DefinedTypeKind::StructuredParcelable(s) => {
                for field in &s.fields {
                    field.get_type().walk(f);
                }
            }
            DefinedTypeKind::Interface(i) => {
                for method in &i.methods {
                    for ty in method.type_specifiers() {
                        ty.walk(f);
                    }
                }
                for constant in &i.constants {
                    constant.get_type().walk(f);
                }
            }
        }
    }

    pub fn for_each_type_specifier_mut(&mut self, f: &mut dyn FnMut(&mut TypeSpecifier)) {
        match &mut self.kind {
            DefinedTypeKind::Parcelable(_) => {}
            DefinedTypeKind::StructuredParcelable(s) => {
                for field in &mut s.fields {
                    field.get_type_mut().walk_mut(f);
                }
            }
            DefinedTypeKind::Interface(i) => {
                for method in &mut i.methods {
                    method.return_type_mut().walk_mut(f);
                    for arg in method.arguments_mut() {
                        arg.get_type_mut().walk_mut(f);
                    }
                }
                for constant in &mut i.constants {
                    constant.get_type_mut().walk_mut(f);
                }
            }
        }
    }

    /// Render the declaration back to AIDL source
    pub fn write(&self, out: &mut dyn Emitter) -> Result<(), WriteError> {
        match &self.kind {
            DefinedTypeKind::Parcelable(_) => {
                out.write_str(&format!("parcelable {};\n", self.name))?;
            }
            DefinedTypeKind::StructuredParcelable(s) => {
                out.write_str(&format!("parcelable {} {{\n", self.name))?;
                out.indent();
                for field in &s.fields {
                    out.write_str(&format!("{};\n", field.to_source()?))?;
                }
                out.dedent();
                out.write_str("}\n")?;
            }
            DefinedTypeKind::Interface(i) => {
                out.write_str(&format!("interface {} {{\n", self.name))?;
                out.indent();
                for method in &i.methods {
                    out.write_str(&format!("{};\n", method))?;
                }
                for constant in &i.constants {
                    out.write_str(&format!("{};\n", constant.to_source()?))?;
                }
                out.dedent();
                out.write_str("}\n")?;
            }
        }
        Ok(())
    }
}

impl Node for DefinedType {
    fn location(&self) -> &Location {
        &self.location
    }
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"').and_then(|t| t.strip_suffix('"')).unwrap_or(text)
}
