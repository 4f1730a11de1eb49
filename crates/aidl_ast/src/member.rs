use std::fmt;

use crate::{
    Argument, ConstantKind, ConstantValue, Diagnostics, InternalError, Location, Node, TypeSpecifier,
    integer_range,
};

#[derive(Debug)]
pub struct Method {
    location: Location,
    oneway: bool,
    comments: String,
    return_type: TypeSpecifier,
    name: String,
    arguments: Vec<Argument>,
    in_arguments: Vec<usize>,
    out_arguments: Vec<usize>,
    explicit_id: bool,
    id: Option<i32>,
}

impl Method {
    pub fn new(
        location: Location,
        oneway: bool,
        return_type: TypeSpecifier,
        name: impl Into<String>,
        arguments: Vec<Argument>,
        comments: impl Into<String>,
        id: Option<i32>,
    ) -> Self {
        let in_arguments = arguments.iter().enumerate().filter(|(_, a)| a.is_in()).map(|(i, _)| i).collect();
        let out_arguments = arguments.iter().enumerate().filter(|(_, a)| a.is_out()).map(|(i, _)| i).collect();
        Self {
            location,
            oneway,
            comments: comments.into(),
            return_type,
            name: name.into(),
            arguments,
            in_arguments,
            out_arguments,
            explicit_id: id.is_some(),
            id,
        }
    }

    pub fn is_oneway(&self) -> bool {
        self.oneway
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn return_type(&self) -> &TypeSpecifier {
        &self.return_type
    }

    pub fn return_type_mut(&mut self) -> &mut TypeSpecifier {
        &mut self.return_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut [Argument] {
        &mut self.arguments
    }

    /// Arguments marked `in` or `inout`, in declaration order
    pub fn in_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.in_arguments.iter().map(|&i| &self.arguments[i])
    }

    /// Arguments marked `out` or `inout`, in declaration order
    pub fn out_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.out_arguments.iter().map(|&i| &self.arguments[i])
    }

    pub fn has_explicit_id(&self) -> bool {
        self.explicit_id
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    /// Assign a transaction id when none was written
    pub fn set_id(&mut self, id: i32) {
        self.id = Some(id);
    }

    /// `ReturnType name(ArgType1, ArgType2)`
    pub fn signature(&self) -> String {
        let args: Vec<String> = self.arguments.iter().map(|a| a.get_type().to_string()).collect();
        format!("{} {}({})", self.return_type, self.name, args.join(", "))
    }

    /// Return type plus every argument type, in written order
    pub fn type_specifiers(&self) -> impl Iterator<Item = &TypeSpecifier> {
        std::iter::once(&self.return_type).chain(self.arguments.iter().map(Argument::get_type))
    }
}

impl Node for Method {
    fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.oneway {
            write!(f, "oneway ")?;
        }
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        write!(f, "{} {}({})", self.return_type, self.name, args.join(", "))?;
        if let (true, Some(id)) = (self.explicit_id, self.id) {
            write!(f, " = {}", id)?;
        }
        Ok(())
    }
}

/// `const type NAME = value;` inside an interface
#[derive(Debug)]
pub struct ConstantDeclaration {
    location: Location,
    ty: TypeSpecifier,
    name: String,
    value: ConstantValue,
    comments: String,
}

impl ConstantDeclaration {
    pub fn new(
        location: Location,
        ty: TypeSpecifier,
        name: impl Into<String>,
        value: ConstantValue,
        comments: impl Into<String>,
    ) -> Self {
        Self { location, ty, name: name.into(), value, comments: comments.into() }
    }

    pub fn get_type(&self) -> &TypeSpecifier {
        &self.ty
    }

    pub fn get_type_mut(&mut self) -> &mut TypeSpecifier {
        &mut self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ConstantValue {
        &self.value
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn check_valid(&self, diags: &mut Diagnostics) -> bool {
        let kind = self.value.kind();
        match kind {
            ConstantKind::Error => {
                diags.error(
                    &self.location,
                    format!(
                        "Constant {} has an invalid value '{}'",
                        self.name,
                        self.value.error_text().unwrap_or_default()
                    ),
                );
                false
            }
            ConstantKind::Integer if self.ty.is_integer_family() => {
                let n = self.value.as_integer().unwrap_or_default();
                match integer_range(self.ty.name()) {
                    Some((min, max)) if n < min || n > max => {
                        diags.error(
                            &self.location,
                            format!("Constant {} value {} is out of range for {}", self.name, n, self.ty),
                        );
                        false
                    }
                    _ => true,
                }
            }
            ConstantKind::String if self.ty.is_string() => true,
            _ => {
                diags.error(
                    &self.location,
                    format!("Constant {} is of type {} but is a {}", self.name, self.ty, kind),
                );
                false
            }
        }
    }

    /// `const type name = value`
    pub fn to_source(&self) -> Result<String, InternalError> {
        Ok(format!("const {} {} = {}", self.ty, self.name, self.value.to_source()?))
    }
}

impl Node for ConstantDeclaration {
    fn location(&self) -> &Location {
        &self.location
    }
}

/// One entry of an interface body
#[derive(Debug)]
pub enum Member {
    Method(Method),
    ConstantDeclaration(ConstantDeclaration),
}

impl Member {
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            Member::ConstantDeclaration(_) => None,
        }
    }

    pub fn as_constant_declaration(&self) -> Option<&ConstantDeclaration> {
        match self {
            Member::ConstantDeclaration(constant) => Some(constant),
            Member::Method(_) => None,
        }
    }
}

impl Node for Member {
    fn location(&self) -> &Location {
        match self {
            Member::Method(method) => method.location(),
            Member::ConstantDeclaration(constant) => constant.location(),
        }
    }
}
