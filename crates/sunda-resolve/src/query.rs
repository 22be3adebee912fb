use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sunda_core::{names, Modifiers, TypeKind};
use sunda_model::{ClassData, ClassId, FieldData, Import, MethodData, SourceId, TypeRef};

use crate::registry::ClassRegistry;

/// Where a class handle's data lives: the arena for source-declared
/// classes, a shared resolver result for binary ones.
#[derive(Clone)]
pub(crate) enum ClassSite {
    Source(ClassId),
    Binary(Arc<ClassData>),
}

/// A class known to the registry. Cheap to clone; all queries read the
/// registry live, so answers can change as sources and resolvers are added.
#[derive(Clone)]
pub struct Class<'r> {
    registry: &'r ClassRegistry,
    site: ClassSite,
}

impl<'r> Class<'r> {
    pub(crate) fn from_source(registry: &'r ClassRegistry, id: ClassId) -> Self {
        Class {
            registry,
            site: ClassSite::Source(id),
        }
    }

    pub(crate) fn from_binary(registry: &'r ClassRegistry, data: Arc<ClassData>) -> Self {
        Class {
            registry,
            site: ClassSite::Binary(data),
        }
    }

    pub(crate) fn data(&self) -> &ClassData {
        match &self.site {
            ClassSite::Source(id) => &self.registry.arena[*id],
            ClassSite::Binary(data) => data,
        }
    }

    pub(crate) fn method_handle(&self, index: usize) -> Method<'r> {
        Method {
            registry: self.registry,
            site: self.site.clone(),
            index,
        }
    }

    /// Simple name, without package or enclosing classes.
    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn package_name(&self) -> &str {
        &self.data().package
    }

    pub fn fully_qualified_name(&self) -> String {
        match &self.site {
            ClassSite::Source(id) => self.registry.class_fqn(*id),
            ClassSite::Binary(data) => data.qualified_name(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.data().kind
    }

    pub fn is_interface(&self) -> bool {
        self.data().kind.is_interface()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.data().modifiers
    }

    /// Unit this class was declared in. Binary classes have none.
    pub fn source(&self) -> Option<Source<'r>> {
        match &self.site {
            ClassSite::Source(id) => self.registry.arena[*id]
                .unit
                .map(|unit| Source::new(self.registry, unit)),
            ClassSite::Binary(_) => None,
        }
    }

    pub fn enclosing_class(&self) -> Option<Class<'r>> {
        match &self.site {
            ClassSite::Source(id) => self.registry.arena[*id]
                .enclosing
                .map(|parent| Class::from_source(self.registry, parent)),
            ClassSite::Binary(_) => None,
        }
    }

    pub fn nested_classes(&self) -> Vec<Class<'r>> {
        match &self.site {
            ClassSite::Source(id) => self.registry.arena[*id]
                .nested
                .iter()
                .map(|&child| Class::from_source(self.registry, child))
                .collect(),
            ClassSite::Binary(_) => Vec::new(),
        }
    }

    /// Declared or implicit superclass reference.
    ///
    /// Interfaces and annotations have none, declared or implicit. The
    /// root object type itself has none. A concrete class without an
    /// `extends` clause reports `java.lang.Object`.
    pub fn superclass(&self) -> Option<Type<'r>> {
        let data = self.data();
        if data.kind.is_interface() {
            return None;
        }
        if let Some(reference) = &data.superclass {
            return Some(Type::new(self.registry, reference.clone()));
        }
        if self.fully_qualified_name() == names::JAVA_LANG_OBJECT {
            return None;
        }
        Some(Type::new(
            self.registry,
            TypeRef::new(names::JAVA_LANG_OBJECT),
        ))
    }

    /// The superclass as a class, when the reference resolves to one the
    /// registry knows.
    pub fn superclass_entity(&self) -> Option<Class<'r>> {
        self.superclass().and_then(|t| t.as_class())
    }

    /// Implemented interfaces of a class, or extended interfaces of an
    /// interface; the declaration stores both the same way.
    pub fn interfaces(&self) -> Vec<Type<'r>> {
        self.data()
            .interfaces
            .iter()
            .map(|reference| Type::new(self.registry, reference.clone()))
            .collect()
    }

    pub fn fields(&self) -> Vec<Field<'r>> {
        (0..self.data().fields.len())
            .map(|index| Field {
                registry: self.registry,
                site: self.site.clone(),
                index,
            })
            .collect()
    }

    pub fn field_by_name(&self, name: &str) -> Option<Field<'r>> {
        let index = self.data().fields.iter().position(|f| f.name == name)?;
        Some(Field {
            registry: self.registry,
            site: self.site.clone(),
            index,
        })
    }

    pub fn methods(&self) -> Vec<Method<'r>> {
        (0..self.data().methods.len())
            .map(|index| self.method_handle(index))
            .collect()
    }

    /// Exact-signature lookup: name plus parameter list, each parameter
    /// compared by resolved-or-literal name and array dimensions. No
    /// widening or boxing.
    pub fn method_by_signature(&self, name: &str, parameters: &[TypeRef]) -> Option<Method<'r>> {
        let index = self
            .data()
            .methods
            .iter()
            .position(|m| self.signature_matches(m, name, parameters))?;
        Some(self.method_handle(index))
    }

    fn signature_matches(&self, method: &MethodData, name: &str, parameters: &[TypeRef]) -> bool {
        if method.name != name || method.parameters.len() != parameters.len() {
            return false;
        }
        method.parameters.iter().zip(parameters).all(|(have, want)| {
            have.dims == want.dims
                && self.registry.qualified_or_literal(have)
                    == self.registry.qualified_or_literal(want)
        })
    }

    /// Transitive is-a over extends and implements edges, resolved against
    /// the live registry.
    ///
    /// Reflexive on the fully qualified name. A concrete class whose
    /// hierarchy has no declared root is-a `java.lang.Object`; an interface
    /// with no declared supertype is not. A hierarchy cycle terminates the
    /// walk with `false`.
    pub fn is_a(&self, target: &str) -> bool {
        let mut visited = HashSet::new();
        self.is_a_inner(target, &mut visited)
    }

    fn is_a_inner(&self, target: &str, visited: &mut HashSet<String>) -> bool {
        let fqn = self.fully_qualified_name();
        if fqn == target {
            return true;
        }
        if !visited.insert(fqn) {
            return false;
        }

        for interface in self.interfaces() {
            if let Some(entity) = interface.as_class() {
                if entity.is_a_inner(target, visited) {
                    return true;
                }
            }
        }

        if !self.is_interface() {
            match &self.data().superclass {
                Some(reference) => {
                    let superclass = Type::new(self.registry, reference.clone());
                    if let Some(entity) = superclass.as_class() {
                        if entity.is_a_inner(target, visited) {
                            return true;
                        }
                    }
                }
                None => {
                    if target == names::JAVA_LANG_OBJECT {
                        return true;
                    }
                }
            }
        }

        false
    }
}

impl fmt::Debug for Class<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.fully_qualified_name())
    }
}

/// A type as written at some use site, resolved on demand.
#[derive(Clone)]
pub struct Type<'r> {
    registry: &'r ClassRegistry,
    reference: TypeRef,
}

impl<'r> Type<'r> {
    pub(crate) fn new(registry: &'r ClassRegistry, reference: TypeRef) -> Self {
        Type {
            registry,
            reference,
        }
    }

    /// The name as written, without array suffixes.
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    /// Whether the name currently resolves. Recomputed per call; a
    /// resolver or source registered after this reference was created
    /// makes it start reporting `true`.
    pub fn is_resolved(&self) -> bool {
        self.registry
            .resolve_type_name(self.reference.owner, &self.reference.name)
            .is_some()
    }

    /// Resolved fully qualified name, or the literal written name while
    /// unresolved.
    pub fn fully_qualified_name(&self) -> String {
        self.registry.qualified_or_literal(&self.reference)
    }

    pub fn dimensions(&self) -> u32 {
        self.reference.dims
    }

    pub fn is_array(&self) -> bool {
        self.reference.is_array()
    }

    /// The array component type, one dimension shallower.
    pub fn component_type(&self) -> Option<Type<'r>> {
        self.reference
            .component()
            .map(|reference| Type::new(self.registry, reference))
    }

    /// The class this reference denotes, when it resolves to one.
    pub fn as_class(&self) -> Option<Class<'r>> {
        let fqn = self
            .registry
            .resolve_type_name(self.reference.owner, &self.reference.name)?;
        self.registry.class_by_name(&fqn)
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified_name())?;
        for _ in 0..self.reference.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

#[derive(Clone)]
pub struct Method<'r> {
    registry: &'r ClassRegistry,
    site: ClassSite,
    index: usize,
}

impl<'r> Method<'r> {
    fn data(&self) -> &MethodData {
        match &self.site {
            ClassSite::Source(id) => &self.registry.arena[*id].methods[self.index],
            ClassSite::Binary(data) => &data.methods[self.index],
        }
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.data().modifiers
    }

    pub fn is_constructor(&self) -> bool {
        self.data().is_constructor
    }

    /// Return type; constructors have none.
    pub fn returns(&self) -> Option<Type<'r>> {
        self.data()
            .returns
            .as_ref()
            .map(|reference| Type::new(self.registry, reference.clone()))
    }

    pub fn parameter_types(&self) -> Vec<Type<'r>> {
        self.data()
            .parameters
            .iter()
            .map(|reference| Type::new(self.registry, reference.clone()))
            .collect()
    }
}

#[derive(Clone)]
pub struct Field<'r> {
    registry: &'r ClassRegistry,
    site: ClassSite,
    index: usize,
}

impl<'r> Field<'r> {
    fn data(&self) -> &FieldData {
        match &self.site {
            ClassSite::Source(id) => &self.registry.arena[*id].fields[self.index],
            ClassSite::Binary(data) => &data.fields[self.index],
        }
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.data().modifiers
    }

    pub fn ty(&self) -> Type<'r> {
        Type::new(self.registry, self.data().ty.clone())
    }
}

/// One registered compilation unit.
#[derive(Clone)]
pub struct Source<'r> {
    registry: &'r ClassRegistry,
    id: SourceId,
}

impl<'r> Source<'r> {
    pub(crate) fn new(registry: &'r ClassRegistry, id: SourceId) -> Self {
        Source { registry, id }
    }

    fn data(&self) -> &'r sunda_model::SourceUnitData {
        &self.registry.units[self.id.idx()]
    }

    /// Declared package, empty for the default package.
    pub fn package(&self) -> &'r str {
        &self.data().package
    }

    pub fn imports(&self) -> &'r [Import] {
        &self.data().imports
    }

    pub fn origin(&self) -> Option<&'r Path> {
        self.data().origin.as_deref()
    }

    /// Top-level classes in declaration order.
    pub fn classes(&self) -> Vec<Class<'r>> {
        self.data()
            .types
            .iter()
            .map(|&id| Class::from_source(self.registry, id))
            .collect()
    }

    /// Resolves a name against this unit's package and imports, per the
    /// registry's resolution order.
    pub fn resolve_type(&self, name: &str) -> Option<String> {
        self.registry.resolve_type_name(Some(self.id), name)
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({:?})", self.id)
    }
}
