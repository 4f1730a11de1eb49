//! Backend payload slot.
//!
//! Backends attach their own per-type data after resolution. The slot is
//! type-erased; whoever reads it must ask for the same concrete type that
//! the writer stored, and a mismatch is reported instead of reinterpreted.

use std::any::{Any, type_name};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("language type was read before it was attached")]
    Unattached,
    #[error("language type is not a `{expected}`")]
    TypeMismatch { expected: &'static str },
}

#[derive(Default)]
pub struct LanguageTypeSlot {
    value: Option<Box<dyn Any>>,
}

impl LanguageTypeSlot {
    pub fn set<T: Any>(&mut self, value: T) {
        self.value = Some(Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Result<&T, PayloadError> {
        let value = self.value.as_ref().ok_or(PayloadError::Unattached)?;
        value
            .downcast_ref::<T>()
            .ok_or(PayloadError::TypeMismatch { expected: type_name::<T>() })
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Debug for LanguageTypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "attached" } else { "empty" };
        write!(f, "LanguageTypeSlot({})", state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_downcast() {
        let mut slot = LanguageTypeSlot::default();
        assert_eq!(slot.get::<u32>(), Err(PayloadError::Unattached));

        slot.set(7u32);
        assert_eq!(slot.get::<u32>(), Ok(&7));
        assert!(matches!(slot.get::<String>(), Err(PayloadError::TypeMismatch { .. })));
    }
}
