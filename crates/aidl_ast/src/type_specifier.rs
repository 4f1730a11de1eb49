use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    Annotatable, Annotation, Diagnostics, LanguageTypeSlot, Location, Node, PayloadError, Typenames, UnitScope,
};

static NEXT_TYPE_SPEC_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a type specifier, used to match deferred resolution
/// requests back to the node they were made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeSpecId(u32);

impl TypeSpecId {
    fn fresh() -> Self {
        TypeSpecId(NEXT_TYPE_SPEC_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A reference to a built-in type, a defined type, or an array/generic
/// variant of one.
#[derive(Debug)]
pub struct TypeSpecifier {
    id: TypeSpecId,
    location: Location,
    annotations: Annotatable,
    unresolved_name: String,
    fully_qualified_name: Option<String>,
    is_array: bool,
    type_params: Option<Vec<TypeSpecifier>>,
    comments: String,
    language_type: LanguageTypeSlot,
}

impl TypeSpecifier {
    pub fn new(
        location: Location,
        unresolved_name: impl Into<String>,
        is_array: bool,
        type_params: Option<Vec<TypeSpecifier>>,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            id: TypeSpecId::fresh(),
            location,
            annotations: Annotatable::new(),
            unresolved_name: unresolved_name.into(),
            fully_qualified_name: None,
            is_array,
            type_params,
            comments: comments.into(),
            language_type: LanguageTypeSlot::default(),
        }
    }

    pub fn id(&self) -> TypeSpecId {
        self.id
    }

    /// Fully qualified base name once resolved, the written name before.
    ///
    /// `int[]` -> `int`, `List<String>` -> `List`,
    /// `IFoo` -> `foo.bar.IFoo` when IFoo lives in package foo.bar.
    pub fn name(&self) -> &str {
        match &self.fully_qualified_name {
            Some(name) => name,
            None => &self.unresolved_name,
        }
    }

    pub fn unresolved_name(&self) -> &str {
        &self.unresolved_name
    }

    pub fn is_resolved(&self) -> bool {
        self.fully_qualified_name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_generic(&self) -> bool {
        self.type_params.is_some()
    }

    pub fn type_parameters(&self) -> &[TypeSpecifier] {
        self.type_params.as_deref().unwrap_or_default()
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn annotations(&self) -> &Annotatable {
        &self.annotations
    }

    pub fn annotate(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations.annotate(annotations);
    }

    pub fn is_integer_family(&self) -> bool {
        !self.is_array && !self.is_generic() && matches!(self.name(), "byte" | "int" | "long")
    }

    pub fn is_string(&self) -> bool {
        !self.is_array && !self.is_generic() && self.name() == "String"
    }

    pub fn is_void(&self) -> bool {
        self.name() == "void"
    }

    /// Annotations followed by the type string
    pub fn signature(&self) -> String {
        if self.annotations.is_empty() {
            self.to_string()
        } else {
            format!("{} {}", self.annotations, self)
        }
    }

    /// Resolve the base name only. Generic parameters are separate
    /// specifiers with their own resolution.
    pub fn resolve(&mut self, typenames: &Typenames, scope: &UnitScope) -> bool {
        if self.is_resolved() {
            return true;
        }
        match typenames.resolve_in_scope(&self.unresolved_name, scope) {
            Some(canonical) => {
                self.fully_qualified_name = Some(canonical);
                true
            }
            None => false,
        }
    }

    /// Resolve this specifier and, recursively, all of its parameters.
    pub fn resolve_all(&mut self, typenames: &Typenames, scope: &UnitScope) -> bool {
        let mut ok = self.resolve(typenames, scope);
        if let Some(params) = &mut self.type_params {
            for param in params {
                ok &= param.resolve_all(typenames, scope);
            }
        }
        ok
    }

    pub fn check_valid(&self, diags: &mut Diagnostics) -> bool {
        if !self.is_resolved() {
            diags.error(&self.location, format!("type '{}' was never resolved", self));
            return false;
        }

        if self.is_void() && self.is_array {
            diags.error(&self.location, "void cannot be an array");
            return false;
        }

        let Some(params) = &self.type_params else {
            return true;
        };

        if self.is_array {
            diags.error(
                &self.location,
                format!("arrays of generic types are not supported, but got '{}'", self),
            );
            return false;
        }

        let num = params.len();
        match self.name() {
            "List" | "java.util.List" => {
                if num > 1 {
                    diags.error(
                        &self.location,
                        format!("List cannot have type parameters more than one, but got '{}'", self),
                    );
                    return false;
                }
            }
            "Map" | "java.util.Map" => {
                if num != 0 && num != 2 {
                    diags.error(
                        &self.location,
                        format!("Map must have 0 or 2 type parameters, but got '{}'", self),
                    );
                    return false;
                }
            }
            _ => {
                diags.error(&self.location, format!("'{}' is not a generic type", self.name()));
                return false;
            }
        }

        let mut ok = true;
        for param in params {
            if param.is_void() {
                diags.error(&param.location, format!("void is not a valid type parameter in '{}'", self));
                ok = false;
                continue;
            }
            ok &= param.check_valid(diags);
        }
        ok
    }

    pub fn language_type<T: Any>(&self) -> Result<&T, PayloadError> {
        self.language_type.get()
    }

    pub fn set_language_type<T: Any>(&mut self, language_type: T) {
        self.language_type.set(language_type);
    }

    /// Visit this specifier, then its type parameters, in written order.
    pub fn walk(&self, f: &mut dyn FnMut(&TypeSpecifier)) {
        f(self);
        for param in self.type_parameters() {
            param.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut TypeSpecifier)) {
        f(self);
        if let Some(params) = &mut self.type_params {
            for param in params {
                param.walk_mut(f);
            }
        }
    }
}

impl Node for TypeSpecifier {
    fn location(&self) -> &Location {
        &self.location
    }
}

/// Base name, then generic parameters and array suffix: `List<String>`, `int[]`
impl fmt::Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(params) = &self.type_params {
            let names: Vec<String> = params.iter().map(|p| p.to_string()).collect();
            write!(f, "<{}>", names.join(","))?;
        }
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
