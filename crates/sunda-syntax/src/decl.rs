use serde::{Deserialize, Serialize};
use sunda_core::{Modifiers, TypeKind};

/// One parsed compilation unit: package, imports, top-level type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

/// A type import, in declaration order.
///
/// Static imports are accepted by the scanner and dropped; they never take
/// part in type resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportDecl {
    /// `import java.util.List;`
    Single(String),
    /// `import java.util.*;`, carrying the package part only.
    Wildcard(String),
}

/// A class, interface, enum, or annotation declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub modifiers: Modifiers,
    /// `extends` clause of a class. Interfaces put their extends list in
    /// `interfaces` instead.
    pub superclass: Option<TypeUse>,
    pub interfaces: Vec<TypeUse>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub nested: Vec<TypeDecl>,
}

/// A type as written at a use site: dotted name plus array dimensions.
/// Generic arguments are skipped by the scanner and not recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUse {
    pub name: String,
    pub dims: u32,
}

impl TypeUse {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dims: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeUse,
    pub modifiers: Modifiers,
}

/// A method or constructor. Constructors have no return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub return_type: Option<TypeUse>,
    pub parameters: Vec<TypeUse>,
    pub is_constructor: bool,
}
