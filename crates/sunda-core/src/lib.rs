//! Shared vocabulary for the Sunda source model.
//!
//! Everything here is plain data used by every other crate in the workspace:
//! qualified-name helpers, the source-level modifier set, and the kind of a
//! type declaration.

use serde::{Deserialize, Serialize};

pub mod modifiers;
pub mod names;

pub use modifiers::Modifiers;

/// Kind of a type declaration.
///
/// Annotation types count as interfaces for hierarchy purposes: they never
/// have a superclass, declared or implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    #[must_use]
    pub fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}
