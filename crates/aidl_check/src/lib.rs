//! Semantic checking for AIDL
//!
//! Loads a unit together with everything it imports, resolves it and runs
//! the validity rules a code generator relies on.

mod error;
mod import_resolver;
mod load;
mod preprocessed;
mod validatable;
mod validate;

pub use error::AidlError;
pub use import_resolver::ImportResolver;
pub use load::{LoadOptions, LoadedUnit, load_and_validate};
pub use preprocessed::{parse_preprocessed_file, parse_preprocessed_line};
pub use validatable::{ValidatableKind, ValidatableType, attach_language_types};
pub use validate::{
    check_and_assign_method_ids, check_filename, check_types, expected_filename, validate_constants,
    MAX_USER_SET_METHOD_ID, MIN_USER_SET_METHOD_ID,
};
