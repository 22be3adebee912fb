use std::io::{self, BufWriter, Write};

use pretty_assertions::assert_eq;

use sunda_core::names;
use sunda_model::{ClassArena, ClassData, ClassId, Import, SourceId, SourceUnitData, TypeRef};
use sunda_resolve::{ClassRegistry, PersistError, TypeResolver, REGISTRY_FORMAT_VERSION};

/// Resolver claiming exactly one fully qualified name.
struct OneShotResolver(&'static str);

impl TypeResolver for OneShotResolver {
    fn resolve(&self, name: &str) -> Option<ClassData> {
        (name == self.0).then(|| ClassData {
            name: names::simple_name(name).to_string(),
            package: names::package_name(name).to_string(),
            ..ClassData::default()
        })
    }
}

/// Field-for-field mirror of the durable image, for writing bad ones.
#[derive(serde::Serialize)]
struct FakeImage {
    version: u32,
    units: Vec<SourceUnitData>,
    classes: ClassArena,
    binary: Vec<(String, ClassData)>,
}

/// Writer that rejects every byte, like a full disk.
struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn saved_registry_round_trips_through_a_file() {
    let mut registry = ClassRegistry::new();
    registry
        .add_source(
            "package p;\n\
             import q.B;\n\
             public class A extends B { int size; }",
        )
        .unwrap();
    registry.add_source("package q; public class B {}").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.bin");
    registry.save(&path).unwrap();

    let loaded = ClassRegistry::load(&path).unwrap();
    assert_eq!(loaded.classes().len(), 2);

    let a = loaded.class_by_name("p.A").unwrap();
    assert_eq!(a.fully_qualified_name(), "p.A");
    assert_eq!(a.fields().len(), 1);
    assert_eq!(a.fields()[0].name(), "size");
    assert!(a.is_a("q.B"));
    assert!(a.is_a("java.lang.Object"));

    let sources: Vec<_> = loaded.sources().collect();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].package(), "p");
    assert_eq!(sources[1].package(), "q");
    assert_eq!(sources[0].imports(), &[Import::Single("q.B".to_string())]);

    assert!(loaded.class_by_name("p.Missing").is_none());
}

#[test]
fn nested_classes_survive_an_in_memory_round_trip() {
    let mut registry = ClassRegistry::new();
    registry
        .add_source("package n; class Outer { class Inner { class Deepest {} } }")
        .unwrap();

    let mut bytes = Vec::new();
    registry.write_to(&mut bytes).unwrap();
    let loaded = ClassRegistry::read_from(&bytes[..]).unwrap();

    let deepest = loaded.class_by_name("n.Outer.Inner.Deepest").unwrap();
    assert_eq!(
        deepest.enclosing_class().unwrap().fully_qualified_name(),
        "n.Outer.Inner"
    );
    let names: Vec<String> = loaded
        .classes()
        .iter()
        .map(|c| c.fully_qualified_name())
        .collect();
    assert_eq!(
        names,
        vec!["n.Outer", "n.Outer.Inner", "n.Outer.Inner.Deepest"]
    );
}

#[test]
fn name_shadowing_is_replayed_on_load() {
    let mut registry = ClassRegistry::new();
    registry
        .add_source("package s; class Dup { void first() {} }")
        .unwrap();
    registry
        .add_source("package s; class Dup { void second() {} }")
        .unwrap();

    let mut bytes = Vec::new();
    registry.write_to(&mut bytes).unwrap();
    let loaded = ClassRegistry::read_from(&bytes[..]).unwrap();

    let shadowing = loaded.class_by_name("s.Dup").unwrap();
    assert_eq!(shadowing.methods()[0].name(), "second");
    assert_eq!(loaded.search(|c| c.name() == "Dup").len(), 2);
}

#[test]
fn cached_resolver_answers_survive_persistence() {
    let mut registry = ClassRegistry::new();
    registry.add_resolver(OneShotResolver("ext.Gear"));
    registry
        .add_source("package app; import ext.*; class Machine { Gear gear; }")
        .unwrap();

    // resolving before the save is what puts ext.Gear into the cache
    let gear = registry
        .class_by_name("app.Machine")
        .unwrap()
        .field_by_name("gear")
        .unwrap()
        .ty();
    assert_eq!(gear.fully_qualified_name(), "ext.Gear");

    let mut bytes = Vec::new();
    registry.write_to(&mut bytes).unwrap();
    let loaded = ClassRegistry::read_from(&bytes[..]).unwrap();

    // no resolver was re-added; the cached answer serves the lookup
    assert!(loaded.class_by_name("ext.Gear").is_some());
    let gear = loaded
        .class_by_name("app.Machine")
        .unwrap()
        .field_by_name("gear")
        .unwrap()
        .ty();
    assert!(gear.is_resolved());
    assert_eq!(gear.fully_qualified_name(), "ext.Gear");
}

#[test]
fn unconsulted_resolvers_leave_nothing_behind() {
    let mut registry = ClassRegistry::new();
    registry.add_resolver(OneShotResolver("ext.Gear"));
    registry
        .add_source("package app; import ext.*; class Machine { Gear gear; }")
        .unwrap();

    // nothing resolved before the save, so the cache stays empty
    let mut bytes = Vec::new();
    registry.write_to(&mut bytes).unwrap();
    let mut loaded = ClassRegistry::read_from(&bytes[..]).unwrap();

    let gear = loaded
        .class_by_name("app.Machine")
        .unwrap()
        .field_by_name("gear")
        .unwrap()
        .ty();
    assert!(!gear.is_resolved());
    assert_eq!(gear.fully_qualified_name(), "Gear");

    // re-adding the resolver brings the name back
    loaded.add_resolver(OneShotResolver("ext.Gear"));
    let gear = loaded
        .class_by_name("app.Machine")
        .unwrap()
        .field_by_name("gear")
        .unwrap()
        .ty();
    assert!(gear.is_resolved());
    assert_eq!(gear.fully_qualified_name(), "ext.Gear");
}

#[test]
fn version_mismatch_is_rejected() {
    let bytes = bincode::serialize(&FakeImage {
        version: REGISTRY_FORMAT_VERSION + 1,
        units: Vec::new(),
        classes: ClassArena::default(),
        binary: Vec::new(),
    })
    .unwrap();

    let err = ClassRegistry::read_from(&bytes[..]).unwrap_err();
    assert!(matches!(
        err,
        PersistError::Version { found, expected }
            if found == REGISTRY_FORMAT_VERSION + 1 && expected == REGISTRY_FORMAT_VERSION
    ));
}

#[test]
fn corrupted_bytes_are_a_codec_error() {
    let err = ClassRegistry::read_from(&b"definitely not a registry"[..]).unwrap_err();
    assert!(matches!(err, PersistError::Codec(_)));
}

#[test]
fn oversized_length_prefixes_are_a_codec_error() {
    // A valid version, one unit, and a package string claiming 2^64 - 1 bytes.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&REGISTRY_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());

    let err = ClassRegistry::read_from(&bytes[..]).unwrap_err();
    assert!(matches!(err, PersistError::Codec(_)));
}

#[test]
fn out_of_range_ids_are_rejected_at_load() {
    let bytes = bincode::serialize(&FakeImage {
        version: REGISTRY_FORMAT_VERSION,
        units: vec![SourceUnitData {
            package: "p".to_string(),
            types: vec![ClassId::from_raw(3)],
            ..SourceUnitData::default()
        }],
        classes: ClassArena::default(),
        binary: Vec::new(),
    })
    .unwrap();

    let err = ClassRegistry::read_from(&bytes[..]).unwrap_err();
    assert!(matches!(err, PersistError::Corrupt { .. }));
}

#[test]
fn cyclic_nesting_is_rejected_at_load() {
    let mut classes = ClassArena::default();
    let outer = classes.alloc(ClassData {
        name: "Outer".to_string(),
        package: "p".to_string(),
        ..ClassData::default()
    });
    let inner = classes.alloc(ClassData {
        name: "Inner".to_string(),
        package: "p".to_string(),
        enclosing: Some(outer),
        ..ClassData::default()
    });
    classes.get_mut(outer).nested.push(inner);
    // the way back up, closing the loop
    classes.get_mut(inner).nested.push(outer);

    let bytes = bincode::serialize(&FakeImage {
        version: REGISTRY_FORMAT_VERSION,
        units: vec![SourceUnitData {
            package: "p".to_string(),
            types: vec![outer],
            ..SourceUnitData::default()
        }],
        classes,
        binary: Vec::new(),
    })
    .unwrap();

    let err = ClassRegistry::read_from(&bytes[..]).unwrap_err();
    assert!(matches!(err, PersistError::Corrupt { .. }));
}

#[test]
fn dangling_reference_owners_are_rejected_at_load() {
    let entry = ClassData {
        name: "Gear".to_string(),
        package: "ext".to_string(),
        superclass: Some(TypeRef::scoped("Base", 0, SourceId::from_raw(9))),
        ..ClassData::default()
    };

    let bytes = bincode::serialize(&FakeImage {
        version: REGISTRY_FORMAT_VERSION,
        units: Vec::new(),
        classes: ClassArena::default(),
        binary: vec![("ext.Gear".to_string(), entry)],
    })
    .unwrap();

    let err = ClassRegistry::read_from(&bytes[..]).unwrap_err();
    assert!(matches!(err, PersistError::Corrupt { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClassRegistry::load(&dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, PersistError::Io(_)));
}

#[test]
fn failed_writes_are_reported_not_swallowed() {
    let mut registry = ClassRegistry::new();
    registry.add_source("package p; class Tiny {}").unwrap();

    // The image fits in the buffer, so only the final flush touches the disk.
    let err = registry.write_to(BufWriter::new(FullDisk)).unwrap_err();
    assert!(matches!(err, PersistError::Io(_) | PersistError::Codec(_)));
}

#[test]
fn empty_registry_round_trips() {
    let mut bytes = Vec::new();
    ClassRegistry::new().write_to(&mut bytes).unwrap();

    let loaded = ClassRegistry::read_from(&bytes[..]).unwrap();
    assert!(loaded.classes().is_empty());
    assert_eq!(loaded.sources().count(), 0);
    assert!(loaded.class_by_name("anything.AtAll").is_none());
}

#[test]
fn saving_leaves_the_live_registry_usable() {
    let mut registry = ClassRegistry::new();
    registry.add_source("package live; class Before {}").unwrap();

    let mut bytes = Vec::new();
    registry.write_to(&mut bytes).unwrap();

    assert!(registry.class_by_name("live.Before").is_some());
    registry.add_source("package live; class After {}").unwrap();
    assert!(registry.class_by_name("live.After").is_some());
}
