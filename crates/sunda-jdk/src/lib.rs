//! Embedded index of well-known JDK types.
//!
//! [`JdkTypeIndex`] is a [`TypeResolver`] over a built-in table of core
//! `java.lang`, `java.io`, `java.util`, and `java.awt` types. It gives a
//! registry a standard-library backbone with no disk IO and no system JDK:
//! enough for `java.lang` fallback resolution and for `is_a` chains that
//! cross from source classes into the platform hierarchy.
//!
//! The table carries supertype edges only. Members of platform types are
//! out of its scope; a richer resolver can sit in front of this one in the
//! same chain.

use std::collections::HashMap;

use tracing::trace;

use sunda_core::{names, Modifiers, TypeKind};
use sunda_model::{ClassData, TypeRef};
use sunda_resolve::TypeResolver;

/// Supertype shape of one table row.
struct BuiltinType {
    kind: TypeKind,
    modifiers: Modifiers,
    superclass: Option<&'static str>,
    interfaces: &'static [&'static str],
}

/// Built-in resolver over a fixed set of JDK types, keyed by fully
/// qualified name.
pub struct JdkTypeIndex {
    types: HashMap<&'static str, BuiltinType>,
}

impl JdkTypeIndex {
    #[must_use]
    pub fn new() -> Self {
        let mut this = JdkTypeIndex {
            types: HashMap::new(),
        };

        // java.lang
        this.class("java.lang.Object", None, &[]);
        this.interface("java.lang.CharSequence", &[]);
        this.interface("java.lang.Comparable", &[]);
        this.interface("java.lang.Cloneable", &[]);
        this.interface("java.lang.Iterable", &[]);
        this.class(
            "java.lang.String",
            Some("java.lang.Object"),
            &[
                "java.io.Serializable",
                "java.lang.CharSequence",
                "java.lang.Comparable",
            ],
        );
        this.abstract_class(
            "java.lang.Number",
            Some("java.lang.Object"),
            &["java.io.Serializable"],
        );
        this.class(
            "java.lang.Integer",
            Some("java.lang.Number"),
            &["java.lang.Comparable"],
        );
        this.class(
            "java.lang.Long",
            Some("java.lang.Number"),
            &["java.lang.Comparable"],
        );
        this.class(
            "java.lang.Boolean",
            Some("java.lang.Object"),
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        this.class(
            "java.lang.Character",
            Some("java.lang.Object"),
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        this.class(
            "java.lang.Throwable",
            Some("java.lang.Object"),
            &["java.io.Serializable"],
        );
        this.class("java.lang.Exception", Some("java.lang.Throwable"), &[]);
        this.class(
            "java.lang.RuntimeException",
            Some("java.lang.Exception"),
            &[],
        );
        this.class("java.lang.Error", Some("java.lang.Throwable"), &[]);
        this.abstract_class(
            "java.lang.Enum",
            Some("java.lang.Object"),
            &["java.lang.Comparable", "java.io.Serializable"],
        );

        // java.io
        this.interface("java.io.Serializable", &[]);
        this.class(
            "java.io.File",
            Some("java.lang.Object"),
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        this.class("java.io.IOException", Some("java.lang.Exception"), &[]);

        // java.util
        this.interface("java.util.Iterator", &[]);
        this.interface("java.util.Collection", &["java.lang.Iterable"]);
        this.interface("java.util.List", &["java.util.Collection"]);
        this.interface("java.util.Set", &["java.util.Collection"]);
        this.interface("java.util.Map", &[]);
        this.interface("java.util.RandomAccess", &[]);
        this.abstract_class(
            "java.util.AbstractCollection",
            Some("java.lang.Object"),
            &["java.util.Collection"],
        );
        this.abstract_class(
            "java.util.AbstractList",
            Some("java.util.AbstractCollection"),
            &["java.util.List"],
        );
        this.class(
            "java.util.ArrayList",
            Some("java.util.AbstractList"),
            &[
                "java.util.List",
                "java.util.RandomAccess",
                "java.lang.Cloneable",
                "java.io.Serializable",
            ],
        );
        this.abstract_class(
            "java.util.AbstractSet",
            Some("java.util.AbstractCollection"),
            &["java.util.Set"],
        );
        this.class(
            "java.util.HashSet",
            Some("java.util.AbstractSet"),
            &[
                "java.util.Set",
                "java.lang.Cloneable",
                "java.io.Serializable",
            ],
        );
        this.abstract_class(
            "java.util.AbstractMap",
            Some("java.lang.Object"),
            &["java.util.Map"],
        );
        this.class(
            "java.util.HashMap",
            Some("java.util.AbstractMap"),
            &[
                "java.util.Map",
                "java.lang.Cloneable",
                "java.io.Serializable",
            ],
        );

        // java.awt, mostly so `List` has a second home package for
        // wildcard-import ordering
        this.abstract_class("java.awt.Component", Some("java.lang.Object"), &[]);
        this.class("java.awt.List", Some("java.awt.Component"), &[]);

        this
    }

    /// Every fully qualified name in the table, unordered.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    fn class(
        &mut self,
        name: &'static str,
        superclass: Option<&'static str>,
        interfaces: &'static [&'static str],
    ) {
        self.types.insert(
            name,
            BuiltinType {
                kind: TypeKind::Class,
                modifiers: Modifiers::PUBLIC,
                superclass,
                interfaces,
            },
        );
    }

    fn abstract_class(
        &mut self,
        name: &'static str,
        superclass: Option<&'static str>,
        interfaces: &'static [&'static str],
    ) {
        self.types.insert(
            name,
            BuiltinType {
                kind: TypeKind::Class,
                modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
                superclass,
                interfaces,
            },
        );
    }

    fn interface(&mut self, name: &'static str, extends: &'static [&'static str]) {
        self.types.insert(
            name,
            BuiltinType {
                kind: TypeKind::Interface,
                modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
                superclass: None,
                interfaces: extends,
            },
        );
    }
}

impl Default for JdkTypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeResolver for JdkTypeIndex {
    fn resolve(&self, name: &str) -> Option<ClassData> {
        let entry = self.types.get(name)?;
        trace!(name, "jdk table hit");
        Some(ClassData {
            name: names::simple_name(name).to_string(),
            package: names::package_name(name).to_string(),
            kind: entry.kind,
            modifiers: entry.modifiers,
            superclass: entry.superclass.map(TypeRef::new),
            interfaces: entry.interfaces.iter().map(|&i| TypeRef::new(i)).collect(),
            ..ClassData::default()
        })
    }
}
