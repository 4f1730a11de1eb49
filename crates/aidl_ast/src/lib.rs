//! AIDL declaration model
//!
//! Every node produced by the parser lives here, together with the pieces
//! the nodes need to resolve and validate themselves:
//! 1. Locations and the diagnostic collector
//! 2. The `Typenames` symbol table used for name resolution
//! 3. The `Emitter` boundary that code generators write through

mod annotation;
mod code_writer;
mod constant;
mod defined_type;
mod diagnostics;
mod document;
mod location;
mod member;
mod payload;
mod qualified_name;
mod type_specifier;
mod typenames;
mod variable;

pub use annotation::*;
pub use code_writer::*;
pub use constant::*;
pub use defined_type::*;
pub use diagnostics::*;
pub use document::*;
pub use location::*;
pub use member::*;
pub use payload::*;
pub use qualified_name::*;
pub use type_specifier::*;
pub use typenames::*;
pub use variable::*;
