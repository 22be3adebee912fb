use pretty_assertions::assert_eq;

use sunda_jdk::JdkTypeIndex;
use sunda_resolve::ClassRegistry;

fn platform_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.add_resolver(JdkTypeIndex::new());
    registry
}

#[test]
fn array_list_reaches_its_whole_ancestry() {
    let registry = platform_registry();
    let array_list = registry.class_by_name("java.util.ArrayList").unwrap();

    assert!(array_list.is_a("java.util.ArrayList"));
    assert!(array_list.is_a("java.util.AbstractList"));
    assert!(array_list.is_a("java.util.AbstractCollection"));
    assert!(array_list.is_a("java.util.List"));
    assert!(array_list.is_a("java.util.Collection"));
    assert!(array_list.is_a("java.lang.Iterable"));
    assert!(array_list.is_a("java.util.RandomAccess"));
    assert!(array_list.is_a("java.lang.Object"));
    assert!(!array_list.is_a("java.util.Map"));
}

#[test]
fn collection_interfaces_do_not_reach_the_root() {
    let registry = platform_registry();
    let list = registry.class_by_name("java.util.List").unwrap();

    assert!(list.is_interface());
    assert!(list.superclass().is_none());
    assert!(list.is_a("java.lang.Iterable"));
    assert!(!list.is_a("java.lang.Object"));
}

#[test]
fn the_root_type_has_no_superclass() {
    let registry = platform_registry();
    let object = registry.class_by_name("java.lang.Object").unwrap();

    assert!(object.superclass().is_none());
    assert!(object.is_a("java.lang.Object"));
}

#[test]
fn superclass_entities_chain_through_the_table() {
    let registry = platform_registry();

    let string = registry.class_by_name("java.lang.String").unwrap();
    assert_eq!(
        string.superclass().unwrap().fully_qualified_name(),
        "java.lang.Object"
    );
    assert_eq!(
        string.superclass_entity().unwrap().fully_qualified_name(),
        "java.lang.Object"
    );

    let io_exception = registry.class_by_name("java.io.IOException").unwrap();
    assert!(io_exception.is_a("java.lang.Exception"));
    assert!(io_exception.is_a("java.lang.Throwable"));
    assert!(!io_exception.is_a("java.lang.RuntimeException"));
}

#[test]
fn source_classes_extend_into_the_platform() {
    let mut registry = platform_registry();
    registry
        .add_source(
            "package app;\n\
             import java.util.ArrayList;\n\
             public class Names extends ArrayList {}",
        )
        .unwrap();

    let names = registry.class_by_name("app.Names").unwrap();
    assert!(names.is_a("java.util.ArrayList"));
    assert!(names.is_a("java.util.List"));
    assert!(names.is_a("java.lang.Iterable"));
    assert!(names.is_a("java.lang.Object"));
    assert!(!names.is_a("java.util.Set"));
}

#[test]
fn java_lang_needs_no_import() {
    let mut registry = platform_registry();
    registry
        .add_source("package app; class Wrapper { String text; Integer count; }")
        .unwrap();

    let wrapper = registry.class_by_name("app.Wrapper").unwrap();
    let text = wrapper.field_by_name("text").unwrap().ty();
    assert!(text.is_resolved());
    assert_eq!(text.fully_qualified_name(), "java.lang.String");

    let count = wrapper.field_by_name("count").unwrap().ty();
    assert_eq!(count.fully_qualified_name(), "java.lang.Integer");
    assert!(count.as_class().unwrap().is_a("java.lang.Number"));
}

#[test]
fn wildcard_import_order_decides_between_homonyms() {
    let mut registry = platform_registry();
    registry
        .add_source(
            "package first;\n\
             import java.util.*;\n\
             import java.awt.*;\n\
             class Screen { List list; }",
        )
        .unwrap();
    registry
        .add_source(
            "package second;\n\
             import java.awt.*;\n\
             import java.util.*;\n\
             class Screen { List list; }",
        )
        .unwrap();

    let util_first = registry.class_by_name("first.Screen").unwrap();
    assert_eq!(
        util_first
            .field_by_name("list")
            .unwrap()
            .ty()
            .fully_qualified_name(),
        "java.util.List"
    );

    let awt_first = registry.class_by_name("second.Screen").unwrap();
    assert_eq!(
        awt_first
            .field_by_name("list")
            .unwrap()
            .ty()
            .fully_qualified_name(),
        "java.awt.List"
    );
}

#[test]
fn qualified_references_bypass_import_order() {
    let mut registry = platform_registry();
    registry
        .add_source(
            "package app;\n\
             import java.util.*;\n\
             class Window { java.awt.List widget; }",
        )
        .unwrap();

    let widget = registry
        .class_by_name("app.Window")
        .unwrap()
        .field_by_name("widget")
        .unwrap()
        .ty();
    assert_eq!(widget.fully_qualified_name(), "java.awt.List");
    assert!(widget.as_class().unwrap().is_a("java.awt.Component"));
}

#[test]
fn arrays_of_platform_types_keep_dimensions() {
    let mut registry = platform_registry();
    registry
        .add_source("package app; class Buffer { String[] lines; }")
        .unwrap();

    let lines = registry
        .class_by_name("app.Buffer")
        .unwrap()
        .field_by_name("lines")
        .unwrap()
        .ty();
    assert!(lines.is_array());
    assert_eq!(lines.to_string(), "java.lang.String[]");

    let component = lines.component_type().unwrap();
    assert_eq!(component.fully_qualified_name(), "java.lang.String");
    assert!(component.as_class().unwrap().is_a("java.lang.CharSequence"));
}

#[test]
fn reloaded_registries_take_a_fresh_index() {
    let mut registry = platform_registry();
    registry
        .add_source("package app; import java.util.*; class Names extends ArrayList {}")
        .unwrap();
    // pull ArrayList through the chain so it lands in the persisted cache
    assert!(registry
        .class_by_name("app.Names")
        .unwrap()
        .is_a("java.util.ArrayList"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("platform.bin");
    registry.save(&path).unwrap();

    let mut loaded = ClassRegistry::load(&path).unwrap();
    // cached rows answer without any resolver
    assert!(loaded.class_by_name("java.util.ArrayList").is_some());
    // rows never pulled before the save need the index re-added
    assert!(loaded.class_by_name("java.util.HashMap").is_none());

    loaded.add_resolver(JdkTypeIndex::new());
    assert!(loaded.class_by_name("java.util.HashMap").is_some());
    assert!(loaded
        .class_by_name("app.Names")
        .unwrap()
        .is_a("java.lang.Iterable"));
}
