//! Namespace registry and type resolution over the source model.
//!
//! A [`ClassRegistry`] accumulates parsed compilation units and answers
//! structural questions about them: lookup by fully qualified name,
//! predicate search, transitive is-a, bean properties. Names a unit could
//! not declare itself are resolved through an ordered chain of
//! [`TypeResolver`]s, so a JDK index or any other binary introspector can
//! plug in behind the same lookup surface.
//!
//! Lookup precedence is fixed: source-declared classes first (later
//! registrations shadow earlier ones of the same name), then the resolver
//! chain in registration order, then absence. Absence is a value, not an
//! error.
//!
//! The registry is synchronous throughout. Registration takes `&mut self`;
//! every query takes `&self` and reflects live registry state at the time
//! of the call. Share a registry across threads only behind external
//! synchronization.

mod persist;
mod property;
mod query;
mod registry;

pub use persist::{PersistError, REGISTRY_FORMAT_VERSION};
pub use property::BeanProperty;
pub use query::{Class, Field, Method, Source, Type};
pub use registry::{ClassRegistry, SourceError, TypeResolver};

pub use sunda_core::{Modifiers, TypeKind};
pub use sunda_model::{ClassData, FieldData, Import, MethodData, TypeRef};
pub use sunda_syntax::ParseError;
