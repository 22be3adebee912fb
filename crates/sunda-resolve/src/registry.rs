use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use sunda_core::names;
use sunda_model::{
    ClassArena, ClassData, ClassId, FieldData, Import, MethodData, SourceId, SourceUnitData,
    TypeRef,
};
use sunda_syntax::{CompilationUnit, ImportDecl, ParseError, TypeDecl, TypeUse};

use crate::query::{Class, Source};

/// Supplies class definitions for names no registered source declares,
/// typically by introspecting binary classes. Resolvers answer fully
/// qualified names only; short-name resolution happens in the registry
/// before the chain is consulted.
///
/// A resolver must be deterministic and side-effect-free: the registry
/// caches positive answers and never re-asks for them.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<ClassData>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },
}

/// The namespace of record: every source-declared class plus whatever the
/// resolver chain can supply, keyed by fully qualified name.
#[derive(Default)]
pub struct ClassRegistry {
    pub(crate) arena: ClassArena,
    pub(crate) units: Vec<SourceUnitData>,
    /// Fully qualified name of every source-declared class, nested ones
    /// included. Insertion replaces, so a later unit shadows an earlier
    /// class of the same name for lookup while both stay searchable.
    pub(crate) by_name: HashMap<String, ClassId>,
    resolvers: Vec<Box<dyn TypeResolver>>,
    /// Positive resolver answers. Misses are not cached, so a name that
    /// gains a resolver later starts resolving without any invalidation.
    binary: Mutex<HashMap<String, Arc<ClassData>>>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one unit of source text and registers every class it
    /// declares. A parse failure registers nothing.
    pub fn add_source(&mut self, text: &str) -> Result<Source<'_>, ParseError> {
        let unit = sunda_syntax::parse_unit(text)?;
        Ok(self.install_unit(unit, None))
    }

    /// Reads and registers a single source file.
    pub fn add_source_file(&mut self, path: &Path) -> Result<Source<'_>, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let unit = sunda_syntax::parse_unit(&text).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.install_unit(unit, Some(path.to_path_buf())))
    }

    /// Registers every `.java` file under `root`, in sorted path order so
    /// results do not depend on directory enumeration order. The first
    /// failing file aborts the walk; files registered before it stay.
    pub fn add_source_tree(&mut self, root: &Path) -> Result<(), SourceError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "java")
            {
                files.push(entry.into_path());
            }
        }
        files.sort();
        for file in &files {
            self.add_source_file(file)?;
        }
        debug!(root = %root.display(), files = files.len(), "added source tree");
        Ok(())
    }

    /// Appends a resolver to the lookup chain. Earlier resolvers win when
    /// several claim the same name.
    pub fn add_resolver(&mut self, resolver: impl TypeResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Looks up a class by fully qualified name: source-declared classes
    /// first, then the resolver chain. `None` is an ordinary answer.
    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<Class<'_>> {
        if let Some(&id) = self.by_name.get(name) {
            return Some(Class::from_source(self, id));
        }
        self.lookup_binary(name)
            .map(|data| Class::from_binary(self, data))
    }

    /// Registered units in registration order.
    pub fn sources(&self) -> impl Iterator<Item = Source<'_>> {
        (0..self.units.len()).map(|index| Source::new(self, SourceId::from_raw(index as u32)))
    }

    /// Every source-declared class, nested ones included, in registration
    /// order then declaration order within a unit.
    #[must_use]
    pub fn classes(&self) -> Vec<Class<'_>> {
        self.search(|_| true)
    }

    /// Applies `predicate` to every source-declared class and returns the
    /// matches, in the same order [`ClassRegistry::classes`] uses. Classes
    /// shadowed by a later registration are still visited.
    pub fn search<'r, F>(&'r self, mut predicate: F) -> Vec<Class<'r>>
    where
        F: FnMut(&Class<'r>) -> bool,
    {
        let mut hits = Vec::new();
        for unit in &self.units {
            for &top in &unit.types {
                self.search_into(top, &mut predicate, &mut hits);
            }
        }
        hits
    }

    fn search_into<'r, F>(&'r self, id: ClassId, predicate: &mut F, hits: &mut Vec<Class<'r>>)
    where
        F: FnMut(&Class<'r>) -> bool,
    {
        let class = Class::from_source(self, id);
        if predicate(&class) {
            hits.push(class);
        }
        for &child in &self.arena[id].nested {
            self.search_into(child, predicate, hits);
        }
    }

    /// Resolves a name as written at a use site to a fully qualified name,
    /// or `None` when nothing the registry knows matches. Tried in order:
    /// the name verbatim, the owner's package, single-type imports (taken
    /// on a simple-name match without confirmation), wildcard imports in
    /// declaration order, and finally `java.lang`. Without an owning unit
    /// only the verbatim step applies.
    ///
    /// The answer always reflects the current registry: nothing is cached
    /// on the reference, so classes and resolvers added after a reference
    /// was created still count.
    pub(crate) fn resolve_type_name(&self, owner: Option<SourceId>, name: &str) -> Option<String> {
        if self.contains_name(name) {
            return Some(name.to_string());
        }
        let unit = &self.units[owner?.idx()];

        if !unit.package.is_empty() {
            let candidate = names::join(&unit.package, name);
            if self.contains_name(&candidate) {
                return Some(candidate);
            }
        }

        for import in &unit.imports {
            if let Import::Single(fqn) = import {
                if names::simple_name(fqn) == name {
                    return Some(fqn.clone());
                }
            }
        }

        for import in &unit.imports {
            if let Import::Wildcard(package) = import {
                let candidate = names::join(package, name);
                if self.contains_name(&candidate) {
                    return Some(candidate);
                }
            }
        }

        let candidate = names::join(names::JAVA_LANG, name);
        if self.contains_name(&candidate) {
            return Some(candidate);
        }

        None
    }

    /// The resolved name of a reference, or the literal text it was
    /// written with when resolution fails.
    pub(crate) fn qualified_or_literal(&self, reference: &TypeRef) -> String {
        self.resolve_type_name(reference.owner, &reference.name)
            .unwrap_or_else(|| reference.name.clone())
    }

    pub(crate) fn contains_name(&self, fqn: &str) -> bool {
        self.by_name.contains_key(fqn) || self.lookup_binary(fqn).is_some()
    }

    pub(crate) fn lookup_binary(&self, fqn: &str) -> Option<Arc<ClassData>> {
        if let Some(hit) = lock_unpoison(&self.binary).get(fqn) {
            return Some(Arc::clone(hit));
        }
        for resolver in &self.resolvers {
            if let Some(data) = resolver.resolve(fqn) {
                debug!(name = fqn, "resolver supplied class");
                let data = Arc::new(data);
                lock_unpoison(&self.binary).insert(fqn.to_string(), Arc::clone(&data));
                return Some(data);
            }
        }
        None
    }

    /// Fully qualified name of a source-declared class, enclosing chain
    /// spliced in for nested ones.
    pub(crate) fn class_fqn(&self, id: ClassId) -> String {
        let data = &self.arena[id];
        match data.enclosing {
            Some(parent) => format!("{}.{}", self.class_fqn(parent), data.name),
            None => data.qualified_name(),
        }
    }

    fn install_unit(&mut self, unit: CompilationUnit, origin: Option<PathBuf>) -> Source<'_> {
        let id = SourceId::from_raw(self.units.len() as u32);
        let package = unit.package.unwrap_or_default();
        let imports = unit
            .imports
            .into_iter()
            .map(|import| match import {
                ImportDecl::Single(name) => Import::Single(name),
                ImportDecl::Wildcard(pkg) => Import::Wildcard(pkg),
            })
            .collect();

        let mut types = Vec::new();
        for decl in unit.types {
            types.push(self.lower_type(decl, &package, id, None));
        }

        debug!(
            source = id.idx(),
            package = %package,
            types = types.len(),
            "registered source unit"
        );
        self.units.push(SourceUnitData {
            package,
            imports,
            types,
            origin,
        });
        Source::new(self, id)
    }

    fn lower_type(
        &mut self,
        decl: TypeDecl,
        package: &str,
        unit: SourceId,
        enclosing: Option<ClassId>,
    ) -> ClassId {
        let TypeDecl {
            kind,
            name,
            modifiers,
            superclass,
            interfaces,
            fields,
            methods,
            nested,
        } = decl;

        let data = ClassData {
            name,
            package: package.to_string(),
            kind,
            modifiers,
            superclass: superclass.map(|t| scoped_ref(t, unit)),
            interfaces: interfaces.into_iter().map(|t| scoped_ref(t, unit)).collect(),
            fields: fields
                .into_iter()
                .map(|f| FieldData {
                    name: f.name,
                    ty: scoped_ref(f.ty, unit),
                    modifiers: f.modifiers,
                })
                .collect(),
            methods: methods
                .into_iter()
                .map(|m| MethodData {
                    name: m.name,
                    modifiers: m.modifiers,
                    returns: m.return_type.map(|t| scoped_ref(t, unit)),
                    parameters: m.parameters.into_iter().map(|t| scoped_ref(t, unit)).collect(),
                    is_constructor: m.is_constructor,
                })
                .collect(),
            nested: Vec::new(),
            enclosing,
            unit: Some(unit),
        };

        let id = self.arena.alloc(data);
        self.by_name.insert(self.class_fqn(id), id);
        for nested_decl in nested {
            let child = self.lower_type(nested_decl, package, unit, Some(id));
            self.arena.get_mut(id).nested.push(child);
        }
        id
    }

    /// Rebuilds a registry from its persisted parts. The name index is
    /// replayed in unit order so shadowing comes out the same; the
    /// resolver chain starts empty.
    ///
    /// Ids are trusted here; `read_from` bounds-checks decoded images
    /// before calling this.
    pub(crate) fn from_parts(
        units: Vec<SourceUnitData>,
        arena: ClassArena,
        binary: Vec<(String, ClassData)>,
    ) -> Self {
        let mut registry = ClassRegistry {
            arena,
            units,
            by_name: HashMap::new(),
            resolvers: Vec::new(),
            binary: Mutex::new(
                binary
                    .into_iter()
                    .map(|(name, data)| (name, Arc::new(data)))
                    .collect(),
            ),
        };
        for index in 0..registry.units.len() {
            let types = registry.units[index].types.clone();
            for id in types {
                registry.index_class(id);
            }
        }
        registry
    }

    fn index_class(&mut self, id: ClassId) {
        self.by_name.insert(self.class_fqn(id), id);
        let nested = self.arena[id].nested.clone();
        for child in nested {
            self.index_class(child);
        }
    }

    pub(crate) fn binary_entries(&self) -> Vec<(String, ClassData)> {
        lock_unpoison(&self.binary)
            .iter()
            .map(|(name, data)| (name.clone(), ClassData::clone(data)))
            .collect()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("units", &self.units.len())
            .field("classes", &self.arena.len())
            .field("resolvers", &self.resolvers.len())
            .finish_non_exhaustive()
    }
}

fn scoped_ref(t: TypeUse, unit: SourceId) -> TypeRef {
    TypeRef::scoped(t.name, t.dims, unit)
}

fn lock_unpoison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lowering_indexes_nested_classes() {
        let mut registry = ClassRegistry::new();
        registry
            .add_source(
                "package foo.bar;\n\
                 public class Outer { private int n; public class Inner { public void m() {} } }",
            )
            .unwrap();

        assert_eq!(registry.arena.len(), 2);
        assert!(registry.by_name.contains_key("foo.bar.Outer"));
        assert!(registry.by_name.contains_key("foo.bar.Outer.Inner"));

        let (outer_id, outer) = registry
            .arena
            .iter()
            .find(|(_, c)| c.name == "Outer")
            .unwrap();
        assert_eq!(outer.nested.len(), 1);
        let inner = &registry.arena[outer.nested[0]];
        assert_eq!(inner.enclosing, Some(outer_id));
        assert_eq!(inner.package, "foo.bar");
        assert_eq!(registry.class_fqn(outer.nested[0]), "foo.bar.Outer.Inner");
    }

    #[test]
    fn parse_failure_registers_nothing() {
        let mut registry = ClassRegistry::new();
        registry.add_source("package p; class Keep {}").unwrap();

        let err = registry.add_source("package p; class Broken { void m( }");
        assert!(err.is_err());

        assert_eq!(registry.units.len(), 1);
        assert_eq!(registry.arena.len(), 1);
        assert!(registry.class_by_name("p.Keep").is_some());
    }

    #[test]
    fn later_unit_shadows_earlier_name() {
        let mut registry = ClassRegistry::new();
        registry
            .add_source("package p; class Thing { void first() {} }")
            .unwrap();
        registry
            .add_source("package p; class Thing { void second() {} }")
            .unwrap();

        assert_eq!(registry.units.len(), 2);
        // lookup sees the later registration
        let shadowing = registry.class_by_name("p.Thing").unwrap();
        assert_eq!(shadowing.methods()[0].name(), "second");
        // search still visits both
        let all = registry.search(|c| c.name() == "Thing");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].methods()[0].name(), "first");
        assert_eq!(all[1].methods()[0].name(), "second");
    }

    #[test]
    fn unknown_name_is_absent_not_an_error() {
        let registry = ClassRegistry::new();
        assert!(registry.class_by_name("no.such.Thing").is_none());
    }

    #[test]
    fn debug_reports_counts_not_contents() {
        let mut registry = ClassRegistry::new();
        registry
            .add_source("package p; class Outer { class Inner {} }")
            .unwrap();

        let rendered = format!("{registry:?}");
        assert!(rendered.contains("units: 1"));
        assert!(rendered.contains("classes: 2"));
        assert!(rendered.contains("resolvers: 0"));
        assert!(!rendered.contains("Outer"));
    }
}
