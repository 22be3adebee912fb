use std::collections::BTreeMap;

use sunda_core::names;
use sunda_model::MethodData;

use crate::query::{Class, Method, Type};

/// An accessor/mutator pairing derived from a class's methods. At least
/// one of the two is always present.
pub struct BeanProperty<'r> {
    name: String,
    accessor: Option<Method<'r>>,
    mutator: Option<Method<'r>>,
}

impl<'r> BeanProperty<'r> {
    /// Property name: the method name with its `get`/`is`/`set` prefix
    /// stripped and the first letter lower-cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accessor(&self) -> Option<&Method<'r>> {
        self.accessor.as_ref()
    }

    pub fn mutator(&self) -> Option<&Method<'r>> {
        self.mutator.as_ref()
    }

    /// Declared type of the property: the accessor's return type, or the
    /// mutator's parameter type when there is no accessor.
    pub fn ty(&self) -> Option<Type<'r>> {
        if let Some(accessor) = &self.accessor {
            return accessor.returns();
        }
        self.mutator
            .as_ref()
            .and_then(|mutator| mutator.parameter_types().into_iter().next())
    }
}

impl<'r> Class<'r> {
    /// Bean properties of this class, in property-name order.
    ///
    /// A no-argument non-void `getX` or boolean `isX` is an accessor, a
    /// one-argument void `setX` is a mutator; the suffix must be non-empty.
    /// Static methods qualify like any other.
    pub fn bean_properties(&self) -> Vec<BeanProperty<'r>> {
        let mut groups: BTreeMap<String, (Option<usize>, Option<usize>)> = BTreeMap::new();
        for (index, method) in self.data().methods.iter().enumerate() {
            if let Some(name) = accessor_property(method) {
                let slot = &mut groups.entry(name).or_default().0;
                slot.get_or_insert(index);
            } else if let Some(name) = mutator_property(method) {
                let slot = &mut groups.entry(name).or_default().1;
                slot.get_or_insert(index);
            }
        }
        groups
            .into_iter()
            .map(|(name, (accessor, mutator))| BeanProperty {
                name,
                accessor: accessor.map(|index| self.method_handle(index)),
                mutator: mutator.map(|index| self.method_handle(index)),
            })
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<BeanProperty<'r>> {
        self.bean_properties()
            .into_iter()
            .find(|property| property.name() == name)
    }
}

fn accessor_property(method: &MethodData) -> Option<String> {
    if !method.parameters.is_empty() {
        return None;
    }
    let returns = method.returns.as_ref()?;
    if let Some(rest) = method.name.strip_prefix("get") {
        if !rest.is_empty() && returns.name != "void" {
            return Some(names::decapitalize(rest));
        }
    }
    if let Some(rest) = method.name.strip_prefix("is") {
        if !rest.is_empty() && returns.name == "boolean" && returns.dims == 0 {
            return Some(names::decapitalize(rest));
        }
    }
    None
}

fn mutator_property(method: &MethodData) -> Option<String> {
    if method.parameters.len() != 1 {
        return None;
    }
    let returns = method.returns.as_ref()?;
    if returns.name != "void" || returns.dims != 0 {
        return None;
    }
    let rest = method.name.strip_prefix("set")?;
    if rest.is_empty() {
        return None;
    }
    Some(names::decapitalize(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunda_model::TypeRef;

    fn method(name: &str, returns: Option<&str>, parameters: &[&str]) -> MethodData {
        MethodData {
            name: name.to_string(),
            modifiers: sunda_core::Modifiers::PUBLIC,
            returns: returns.map(TypeRef::new),
            parameters: parameters.iter().map(|p| TypeRef::new(*p)).collect(),
            is_constructor: false,
        }
    }

    #[test]
    fn recognizes_accessor_shapes() {
        assert_eq!(
            accessor_property(&method("getFoo", Some("String"), &[])),
            Some("foo".to_string())
        );
        assert_eq!(
            accessor_property(&method("isOpen", Some("boolean"), &[])),
            Some("open".to_string())
        );
        // void get is not an accessor, nor non-boolean is
        assert_eq!(accessor_property(&method("getFoo", Some("void"), &[])), None);
        assert_eq!(accessor_property(&method("isOpen", Some("int"), &[])), None);
        // bare prefixes have no property name
        assert_eq!(accessor_property(&method("get", Some("String"), &[])), None);
        assert_eq!(accessor_property(&method("is", Some("boolean"), &[])), None);
        // arguments disqualify
        assert_eq!(
            accessor_property(&method("getFoo", Some("String"), &["int"])),
            None
        );
    }

    #[test]
    fn recognizes_mutator_shapes() {
        assert_eq!(
            mutator_property(&method("setFoo", Some("void"), &["String"])),
            Some("foo".to_string())
        );
        assert_eq!(mutator_property(&method("set", Some("void"), &["int"])), None);
        assert_eq!(
            mutator_property(&method("setFoo", Some("int"), &["int"])),
            None
        );
        assert_eq!(mutator_property(&method("setFoo", Some("void"), &[])), None);
        assert_eq!(
            mutator_property(&method("setFoo", Some("void"), &["int", "int"])),
            None
        );
    }
}
