use std::fmt;

use crate::{
    ConstantKind, ConstantValue, Diagnostics, InternalError, Location, Node, TypeSpecifier,
    integer_range,
};

/// `type name` with an optional default value, used for parcelable fields
/// and as the body of a method argument.
#[derive(Debug)]
pub struct VariableDeclaration {
    location: Location,
    ty: TypeSpecifier,
    name: String,
    default_value: Option<ConstantValue>,
}

impl VariableDeclaration {
    pub fn new(
        location: Location,
        ty: TypeSpecifier,
        name: impl Into<String>,
        default_value: Option<ConstantValue>,
    ) -> Self {
        Self { location, ty, name: name.into(), default_value }
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

    pub fn default_value(&self) -> Option<&ConstantValue> {
        self.default_value.as_ref()
    }

    /// A default value must be a literal the declared type can hold.
    pub fn check_valid(&self, diags: &mut Diagnostics) -> bool {
        let Some(value) = &self.default_value else {
            return true;
        };
        match value.kind() {
            ConstantKind::Error => {
                diags.error(
                    value.location(),
                    format!(
                        "invalid default value '{}' for '{}'",
                        value.error_text().unwrap_or_default(),
                        self.name
                    ),
                );
                false
            }
            ConstantKind::Integer if self.ty.is_integer_family() => {
                let n = value.as_integer().unwrap_or_default();
                match integer_range(self.ty.name()) {
                    Some((min, max)) if n < min || n > max => {
                        diags.error(
                            value.location(),
                            format!("default value {} does not fit in {} '{}'", n, self.ty, self.name),
                        );
                        false
                    }
                    _ => true,
                }
            }
            ConstantKind::String if self.ty.is_string() => true,
            kind => {
                diags.error(
                    value.location(),
                    format!("cannot assign a {} literal to '{}' of type {}", kind, self.name, self.ty),
                );
                false
            }
        }
    }

    /// `<annotations> <type> <name>`
    pub fn signature(&self) -> String {
        format!("{} {}", self.ty.signature(), self.name)
    }

    /// `type name` or `type name = value`
    pub fn to_source(&self) -> Result<String, InternalError> {
        let mut out = format!("{} {}", self.ty, self.name);
        if let Some(value) = &self.default_value {
            out.push_str(" = ");
            out.push_str(&value.to_source()?);
        }
        Ok(out)
    }
}

impl Node for VariableDeclaration {
    fn location(&self) -> &Location {
        &self.location
    }
}

/// Direction bit mask of a method argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In = 1,
    Out = 2,
    InOut = 3,
}

impl Direction {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "inout"),
        }
    }
}

#[derive(Debug)]
pub struct Argument {
    var: VariableDeclaration,
    direction: Direction,
    direction_specified: bool,
}

impl Argument {
    /// An argument whose direction was written in the source
    pub fn new(direction: Direction, var: VariableDeclaration) -> Self {
        Self { var, direction, direction_specified: true }
    }

    /// An argument without a written direction
    pub fn with_default_direction(var: VariableDeclaration, default: Direction) -> Self {
        Self { var, direction: default, direction_specified: false }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_direction_specified(&self) -> bool {
        self.direction_specified
    }

    pub fn is_in(&self) -> bool {
        self.direction.bits() & Direction::In.bits() != 0
    }

    pub fn is_out(&self) -> bool {
        self.direction.bits() & Direction::Out.bits() != 0
    }

    pub fn var(&self) -> &VariableDeclaration {
        &self.var
    }

    pub fn get_type(&self) -> &TypeSpecifier {
        self.var.get_type()
    }

    pub fn get_type_mut(&mut self) -> &mut TypeSpecifier {
        self.var.get_type_mut()
    }

    pub fn name(&self) -> &str {
        self.var.name()
    }

    pub fn signature(&self) -> String {
        self.var.signature()
    }
}

impl Node for Argument {
    fn location(&self) -> &Location {
        self.var.location()
    }
}

/// `[direction ]type name`, the direction only when it was written
impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction_specified {
            write!(f, "{} ", self.direction)?;
        }
        write!(f, "{} {}", self.get_type(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Annotation, Typenames, UnitScope};

    fn resolved(name: &str) -> TypeSpecifier {
        let mut ty = TypeSpecifier::new(Location::nowhere(), name, false, None, "");
        assert!(ty.resolve(&Typenames::new(), &UnitScope::default()));
        ty
    }

    fn var(ty: &str, name: &str, value: Option<ConstantValue>) -> VariableDeclaration {
        VariableDeclaration::new(Location::nowhere(), resolved(ty), name, value)
    }

    fn int(n: i64) -> Option<ConstantValue> {
        Some(ConstantValue::literal_int(Location::nowhere(), n))
    }

    #[test]
    fn test_default_value_compatibility() {
        let mut diags = Diagnostics::new();
        assert!(var("int", "a", None).check_valid(&mut diags));
        assert!(var("int", "a", int(7)).check_valid(&mut diags));
        assert!(var("byte", "b", int(-128)).check_valid(&mut diags));
        assert!(!var("byte", "b", int(200)).check_valid(&mut diags));
        assert!(!var("String", "s", int(1)).check_valid(&mut diags));

        let text = ConstantValue::parse_string(Location::nowhere(), "\"hi\"");
        assert!(var("String", "s", Some(text)).check_valid(&mut diags));
        let text = ConstantValue::parse_string(Location::nowhere(), "\"hi\"");
        assert!(!var("long", "l", Some(text)).check_valid(&mut diags));

        let bad = ConstantValue::parse_hex(Location::nowhere(), "0xg");
        assert!(!var("int", "h", Some(bad)).check_valid(&mut diags));
        assert_eq!(diags.error_count(), 4);
    }

    #[test]
    fn test_signature_and_source() {
        let mut ty = resolved("String");
        ty.annotate(Annotation::parse(Location::nowhere(), "utf8InCpp"));
        let decl = VariableDeclaration::new(Location::nowhere(), ty, "name", None);
        assert_eq!(decl.signature(), "@utf8InCpp String name");
        assert_eq!(decl.to_source().unwrap(), "String name");

        assert_eq!(var("int", "count", int(3)).to_source().unwrap(), "int count = 3");
    }

    #[test]
    fn test_direction_masks() {
        let inout = Argument::new(Direction::InOut, var("int", "a", None));
        assert!(inout.is_in() && inout.is_out());
        assert_eq!(inout.to_string(), "inout int a");

        let out = Argument::new(Direction::Out, var("int", "b", None));
        assert!(!out.is_in() && out.is_out());

        let implicit = Argument::with_default_direction(var("int", "c", None), Direction::In);
        assert!(implicit.is_in() && !implicit.is_out());
        assert!(!implicit.is_direction_specified());
        assert_eq!(implicit.to_string(), "int c");
    }
}
