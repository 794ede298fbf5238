//! Verbatim storage for namespaced content the converters do not model.
//!
//! Every element embeds an [`ExtensionCarrier`]. Attributes and child elements
//! that no converter lifts into a typed field land here and are written back
//! unchanged.

use indexmap::IndexMap;

use crate::base::Position;

/// An attribute outside the set a converter understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionAttribute {
    pub name: String,
    pub value: String,
    pub namespace: Option<String>,
    pub namespace_prefix: Option<String>,
}

impl ExtensionAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.namespace_prefix = Some(prefix.into());
        self.namespace = Some(namespace.into());
        self
    }
}

/// A generic XML element tree: name, namespace, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionElement {
    pub id: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub namespace_prefix: Option<String>,
    pub element_text: Option<String>,
    /// Children grouped by element name; each group keeps document order.
    pub child_elements: IndexMap<String, Vec<ExtensionElement>>,
    pub attributes: IndexMap<String, Vec<ExtensionAttribute>>,
    pub position: Option<Position>,
}

impl ExtensionElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.namespace_prefix = Some(prefix.into());
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.element_text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, attribute: ExtensionAttribute) -> Self {
        self.add_attribute(attribute);
        self
    }

    pub fn with_child(mut self, child: ExtensionElement) -> Self {
        self.add_child_element(child);
        self
    }

    pub fn add_child_element(&mut self, child: ExtensionElement) {
        self.child_elements
            .entry(child.name.clone())
            .or_default()
            .push(child);
    }

    pub fn add_attribute(&mut self, attribute: ExtensionAttribute) {
        self.attributes
            .entry(attribute.name.clone())
            .or_default()
            .push(attribute);
    }

    /// First attribute value with this local name, regardless of namespace.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(|attr| attr.value.as_str())
    }

    /// First attribute value with this local name in the given namespace.
    /// `None` as namespace selects unqualified attributes.
    pub fn attribute_value_ns(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|values| {
            values
                .iter()
                .find(|attr| attr.namespace.as_deref() == namespace)
                .map(|attr| attr.value.as_str())
        })
    }

    /// Children in document order within each name group.
    pub fn children(&self) -> impl Iterator<Item = &ExtensionElement> {
        self.child_elements.values().flatten()
    }

    pub fn first_child(&self, name: &str) -> Option<&ExtensionElement> {
        self.child_elements.get(name).and_then(|group| group.first())
    }

    /// Trimmed text of the first child with this name, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.first_child(name)
            .and_then(|child| child.element_text.as_deref())
            .filter(|text| !text.is_empty())
    }

    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

/// Per-element storage of unmodelled attributes and extension children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionCarrier {
    pub extension_elements: IndexMap<String, Vec<ExtensionElement>>,
    pub attributes: IndexMap<String, Vec<ExtensionAttribute>>,
}

impl ExtensionCarrier {
    pub fn is_empty(&self) -> bool {
        self.extension_elements.is_empty() && self.attributes.is_empty()
    }

    pub fn add_extension_element(&mut self, element: ExtensionElement) {
        if element.name.is_empty() {
            return;
        }
        self.extension_elements
            .entry(element.name.clone())
            .or_default()
            .push(element);
    }

    pub fn add_attribute(&mut self, attribute: ExtensionAttribute) {
        if attribute.name.is_empty() {
            return;
        }
        self.attributes
            .entry(attribute.name.clone())
            .or_default()
            .push(attribute);
    }

    /// First extension attribute with this local name.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(|attr| attr.value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &ExtensionElement> {
        self.extension_elements.values().flatten()
    }

    pub fn has_elements(&self) -> bool {
        self.extension_elements.values().any(|group| !group.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_grouped_by_name() {
        let element = ExtensionElement::new("root")
            .with_child(ExtensionElement::new("a").with_text("1"))
            .with_child(ExtensionElement::new("b"))
            .with_child(ExtensionElement::new("a").with_text("2"));

        assert_eq!(element.child_elements.len(), 2);
        let texts: Vec<_> = element.child_elements["a"]
            .iter()
            .filter_map(|c| c.element_text.as_deref())
            .collect();
        assert_eq!(texts, vec!["1", "2"]);
    }

    #[test]
    fn test_attribute_lookup_by_namespace() {
        let element = ExtensionElement::new("field")
            .with_attribute(ExtensionAttribute::new("name", "plain"))
            .with_attribute(ExtensionAttribute::new("name", "vendor").with_namespace("v", "urn:v"));

        assert_eq!(element.attribute_value_ns(None, "name"), Some("plain"));
        assert_eq!(element.attribute_value_ns(Some("urn:v"), "name"), Some("vendor"));
        assert_eq!(element.attribute_value("name"), Some("plain"));
    }

    #[test]
    fn test_carrier_ignores_nameless_entries() {
        let mut carrier = ExtensionCarrier::default();
        carrier.add_extension_element(ExtensionElement::default());
        carrier.add_attribute(ExtensionAttribute::default());
        assert!(carrier.is_empty());
    }
}
