#![no_main]

use libfuzzer_sys::fuzz_target;

use sunda_resolve::ClassRegistry;

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    // Registration and every query path must stay panic-free on arbitrary
    // input, including hierarchies that loop back on themselves.
    let mut registry = ClassRegistry::new();
    if registry.add_source(text).is_err() {
        return;
    }
    for class in registry.classes() {
        let _ = class.fully_qualified_name();
        let _ = class.is_a("java.lang.Object");
        let _ = class.bean_properties();
        if let Some(superclass) = class.superclass() {
            let _ = superclass.fully_qualified_name();
        }
        for method in class.methods() {
            for parameter in method.parameter_types() {
                let _ = parameter.fully_qualified_name();
            }
        }
    }
});
