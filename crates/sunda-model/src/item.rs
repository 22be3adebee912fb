use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use sunda_core::{names, Modifiers, TypeKind};

use crate::arena::{ClassId, SourceId};

/// A type as written at a use site: a name, array dimensions, and the
/// source unit whose imports scope the name. Resolution is recomputed
/// against the registry on every lookup; nothing is cached here, so a
/// reference created before its target exists starts resolving as soon
/// as the target is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub dims: u32,
    /// Unit providing import context. `None` means the name is taken
    /// verbatim: it resolves only if the registry knows it as written.
    pub owner: Option<SourceId>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            dims: 0,
            owner: None,
        }
    }

    pub fn array(name: impl Into<String>, dims: u32) -> Self {
        TypeRef {
            name: name.into(),
            dims,
            owner: None,
        }
    }

    pub fn scoped(name: impl Into<String>, dims: u32, owner: SourceId) -> Self {
        TypeRef {
            name: name.into(),
            dims,
            owner: Some(owner),
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// The reference with one array dimension stripped, or `None` for a
    /// non-array reference.
    #[must_use]
    pub fn component(&self) -> Option<TypeRef> {
        if self.dims == 0 {
            return None;
        }
        Some(TypeRef {
            name: self.name.clone(),
            dims: self.dims - 1,
            owner: self.owner,
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// One class, interface, enum, or annotation declaration. Source-declared
/// entities live in the arena and link to neighbors by id; entities built
/// by external resolvers stand alone with no ids filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassData {
    /// Simple name, without package or enclosing classes.
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    /// Declared `extends` clause. `None` for a concrete class means it
    /// implicitly extends `java.lang.Object`; queries supply that default,
    /// the stored data never does.
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldData>,
    pub methods: Vec<MethodData>,
    pub nested: Vec<ClassId>,
    pub enclosing: Option<ClassId>,
    pub unit: Option<SourceId>,
}

impl Default for ClassData {
    fn default() -> Self {
        ClassData {
            name: String::new(),
            package: String::new(),
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            enclosing: None,
            unit: None,
        }
    }
}

impl ClassData {
    /// Package-qualified name. Correct as-is for top-level and binary
    /// entities; nested source classes need the enclosing chain spliced in,
    /// which only the registry can do.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        names::join(&self.package, &self.name)
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodData {
    pub name: String,
    pub modifiers: Modifiers,
    /// `None` for constructors only; `void` is an ordinary named type.
    pub returns: Option<TypeRef>,
    pub parameters: Vec<TypeRef>,
    pub is_constructor: bool,
}

/// Import as the registry sees it, package strings already split out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Import {
    Single(String),
    Wildcard(String),
}

/// One registered compilation unit: the import context shared by every
/// type reference created under it, plus the top-level classes it declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUnitData {
    /// Declared package, empty for the default package.
    pub package: String,
    pub imports: Vec<Import>,
    /// Top-level classes in declaration order.
    pub types: Vec<ClassId>,
    pub origin: Option<PathBuf>,
}
