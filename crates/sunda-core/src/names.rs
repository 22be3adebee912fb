//! Dotted-name helpers.
//!
//! Names are plain strings throughout the model; nested types use the dotted
//! form (`pkg.Outer.Inner`), not the JVM binary form with `$`.

/// The package every compilation unit implicitly imports.
pub const JAVA_LANG: &str = "java.lang";

/// The root of the class hierarchy.
pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Joins a package (possibly empty) and a name.
#[must_use]
pub fn join(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Last segment of a dotted name.
#[must_use]
pub fn simple_name(qualified: &str) -> &str {
    match qualified.rsplit_once('.') {
        Some((_, simple)) => simple,
        None => qualified,
    }
}

/// Everything before the last segment, or `""` for an unqualified name.
#[must_use]
pub fn package_name(qualified: &str) -> &str {
    match qualified.rsplit_once('.') {
        Some((package, _)) => package,
        None => "",
    }
}

/// Lower-cases the first character, as bean property names do.
#[must_use]
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_default_package() {
        assert_eq!(join("", "Thing"), "Thing");
        assert_eq!(join("com.blah", "Thing"), "com.blah.Thing");
    }

    #[test]
    fn simple_and_package_parts() {
        assert_eq!(simple_name("java.util.List"), "List");
        assert_eq!(simple_name("List"), "List");
        assert_eq!(package_name("java.util.List"), "java.util");
        assert_eq!(package_name("List"), "");
        assert_eq!(simple_name("foo.bar.Outer.Inner"), "Inner");
    }

    #[test]
    fn decapitalize_first_letter_only() {
        assert_eq!(decapitalize("Foo"), "foo");
        assert_eq!(decapitalize("fooBar"), "fooBar");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize(""), "");
    }
}
