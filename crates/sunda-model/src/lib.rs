//! Data model for the class graph.
//!
//! Source-declared classes live in a [`ClassArena`] and point at each other
//! through [`ClassId`]s, never through owned subtrees. Type references are
//! plain [`TypeRef`] values that record what was written at the use site;
//! resolving one against the registry happens elsewhere and is never cached
//! on the reference itself.

mod arena;
mod item;

pub use arena::{ClassArena, ClassId, SourceId};
pub use item::{ClassData, FieldData, Import, MethodData, SourceUnitData, TypeRef};
