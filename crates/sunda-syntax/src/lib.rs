//! Declaration scanner for Java-like source text.
//!
//! [`parse_unit`] turns one compilation unit into a [`CompilationUnit`]
//! declaration tree: package, imports, and nested type declarations with
//! their members. Bodies, annotations, generics, and other expression-level
//! constructs are skipped, not modeled; the tree carries exactly what the
//! structural model downstream needs.
//!
//! The tree is an ordinary value type; anything able to produce
//! `CompilationUnit`s can stand in for this scanner.

mod decl;
mod scan;

pub use decl::{CompilationUnit, FieldDecl, ImportDecl, MethodDecl, TypeDecl, TypeUse};
pub use scan::{parse_unit, ParseError};
