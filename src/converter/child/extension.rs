//! Extension content: the `extensionElements` wrapper on both sides, and the
//! custom-attribute pass-through.

use super::super::ConvertError;
use super::super::constants::{STANDARD_NAMESPACES, namespace};
use super::super::stream::{StartTag, XmlStream};
use super::super::writer::XmlEmitter;
use crate::model::{BpmnModel, ExtensionAttribute, ExtensionCarrier, ExtensionElement};
use indexmap::IndexMap;

/// Children of one `extensionElements` wrapper, read as generic trees.
///
/// Converters lift the vendor children they understand with
/// [`ExtensionBlock::take_vendor`]; whatever remains goes to the element's
/// [`ExtensionCarrier`] untouched.
#[derive(Debug, Default)]
pub struct ExtensionBlock {
    elements: Vec<ExtensionElement>,
}

impl ExtensionBlock {
    pub fn read(stream: &mut XmlStream<'_>, tag: &StartTag) -> Result<Self, ConvertError> {
        let mut elements = Vec::new();
        stream.read_children(tag, |stream, child| {
            elements.push(stream.read_subtree(child)?);
            Ok(())
        })?;
        Ok(Self { elements })
    }

    /// Removes the vendor elements with this local name, in document order.
    pub fn take_vendor(&mut self, local: &str) -> Vec<ExtensionElement> {
        let (taken, rest) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|element| element.is_in_namespace(namespace::VENDOR) && element.name == local);
        self.elements = rest;
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_carrier(self, carrier: &mut ExtensionCarrier) {
        for element in self.elements {
            carrier.add_extension_element(element);
        }
    }
}

/// Opens the `extensionElements` wrapper on first use and closes it once.
#[derive(Debug, Default)]
pub struct LazyExtensions {
    opened: bool,
}

impl LazyExtensions {
    pub fn open(&mut self, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
        if !self.opened {
            w.start_element("extensionElements")?;
            self.opened = true;
        }
        Ok(())
    }

    pub fn close(self, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
        if self.opened {
            w.end_element()?;
        }
        Ok(())
    }
}

/// Attribute names a converter lifts into typed fields. Everything else on the
/// start tag is kept as an [`ExtensionAttribute`].
///
/// `id` and `name` (unqualified) and vendor `async`/`exclusive` are always
/// known.
#[derive(Debug, Clone, Copy)]
pub struct KnownAttributes {
    pub plain: &'static [&'static str],
    pub vendor: &'static [&'static str],
}

impl KnownAttributes {
    pub const NONE: Self = Self {
        plain: &[],
        vendor: &[],
    };

    fn contains(&self, attr_namespace: Option<&str>, local: &str) -> bool {
        match attr_namespace {
            None => matches!(local, "id" | "name") || self.plain.contains(&local),
            Some(ns) if ns == namespace::VENDOR => {
                matches!(local, "async" | "exclusive") || self.vendor.contains(&local)
            }
            Some(_) => false,
        }
    }
}

pub fn collect_custom_attributes(tag: &StartTag, known: &KnownAttributes, carrier: &mut ExtensionCarrier) {
    for attr in &tag.attributes {
        if known.contains(attr.namespace.as_deref(), &attr.local_name) {
            continue;
        }
        carrier.add_attribute(ExtensionAttribute {
            name: attr.local_name.clone(),
            value: attr.value.clone(),
            namespace: attr.namespace.clone(),
            namespace_prefix: attr.prefix.clone(),
        });
    }
}

/// Whether the written document root binds `prefix` to `uri`.
pub fn root_declares(model: &BpmnModel, prefix: &str, uri: &str) -> bool {
    prefix == "xml"
        || STANDARD_NAMESPACES
            .iter()
            .any(|(p, u)| *p == prefix && *u == uri)
        || model.namespace(prefix) == Some(uri)
}

/// Writes extension attributes, declaring any prefix the document root does
/// not. `declared` holds prefixes already declared on the current element.
pub fn write_custom_attributes(
    attributes: &IndexMap<String, Vec<ExtensionAttribute>>,
    model: &BpmnModel,
    w: &mut dyn XmlEmitter,
    declared: &mut Vec<String>,
) -> Result<(), ConvertError> {
    for attr in attributes.values().flatten() {
        match attr.namespace_prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => {
                if let Some(uri) = attr.namespace.as_deref() {
                    if !root_declares(model, prefix, uri) && !declared.iter().any(|d| d == prefix) {
                        w.attribute(&format!("xmlns:{prefix}"), uri)?;
                        declared.push(prefix.to_string());
                    }
                }
                w.attribute(&format!("{prefix}:{}", attr.name), &attr.value)?;
            }
            None => w.attribute(&attr.name, &attr.value)?,
        }
    }
    Ok(())
}

/// Writes a generic extension tree. Text is written as CDATA.
pub fn write_extension_element(
    element: &ExtensionElement,
    model: &BpmnModel,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    let prefix = element.namespace_prefix.as_deref().filter(|p| !p.is_empty());
    let name = match prefix {
        Some(prefix) => format!("{prefix}:{}", element.name),
        None => element.name.clone(),
    };
    w.start_element(&name)?;

    let mut declared = Vec::new();
    match (prefix, element.namespace.as_deref()) {
        (Some(prefix), Some(uri)) if !root_declares(model, prefix, uri) => {
            w.attribute(&format!("xmlns:{prefix}"), uri)?;
            declared.push(prefix.to_string());
        }
        (None, Some(uri)) if uri != namespace::BPMN => w.attribute("xmlns", uri)?,
        _ => {}
    }
    write_custom_attributes(&element.attributes, model, w, &mut declared)?;

    if let Some(text) = element.element_text.as_deref().filter(|t| !t.is_empty()) {
        w.cdata(text)?;
    }
    for child in element.children() {
        write_extension_element(child, model, w)?;
    }
    w.end_element()
}

/// Writes every extension element of the carrier inside the lazy wrapper.
pub fn write_carrier_elements(
    carrier: &ExtensionCarrier,
    model: &BpmnModel,
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for element in carrier.elements() {
        extensions.open(w)?;
        write_extension_element(element, model, w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::converter::writer::QuickXmlEmitter;

    fn start_of(text: &str) -> (XmlStream<'_>, StartTag) {
        let mut stream = XmlStream::new(text);
        match stream.next_token().unwrap() {
            XmlToken::Start(tag) => (stream, tag),
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_attributes_skip_known_names() {
        let (_, tag) = start_of(
            r#"<task xmlns:activiti="http://activiti.org/bpmn" xmlns:c="urn:custom"
                id="t" name="n" default="f" activiti:async="true" c:color="red" extra="1"/>"#,
        );
        let known = KnownAttributes {
            plain: &["default"],
            vendor: &[],
        };
        let mut carrier = ExtensionCarrier::default();
        collect_custom_attributes(&tag, &known, &mut carrier);

        assert_eq!(carrier.attributes.len(), 2);
        assert_eq!(carrier.attribute_value("color"), Some("red"));
        assert_eq!(carrier.attributes["color"][0].namespace_prefix.as_deref(), Some("c"));
        assert_eq!(carrier.attribute_value("extra"), Some("1"));
    }

    #[test]
    fn test_take_vendor_leaves_foreign_elements() {
        let (mut stream, tag) = start_of(
            r#"<extensionElements xmlns:activiti="http://activiti.org/bpmn" xmlns:o="urn:other">
                <activiti:field name="a"/><o:field/><activiti:taskListener event="create"/>
            </extensionElements>"#,
        );
        let mut block = ExtensionBlock::read(&mut stream, &tag).unwrap();
        assert_eq!(block.take_vendor("field").len(), 1);

        let mut carrier = ExtensionCarrier::default();
        block.into_carrier(&mut carrier);
        assert_eq!(carrier.elements().count(), 2);
    }

    #[test]
    fn test_undeclared_prefix_is_declared_on_element() {
        let element = ExtensionElement::new("color")
            .with_namespace("c", "urn:custom")
            .with_attribute(ExtensionAttribute::new("shade", "dark").with_namespace("c", "urn:custom"))
            .with_text("red");
        let mut w = QuickXmlEmitter::new();
        write_extension_element(&element, &BpmnModel::new(), &mut w).unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            r#"<c:color xmlns:c="urn:custom" c:shade="dark"><![CDATA[red]]></c:color>"#
        );
    }
}
