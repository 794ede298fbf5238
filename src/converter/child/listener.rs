//! Listeners and field injections.

use super::super::ConvertError;
use super::super::constants::{namespace, vendor};
use super::super::writer::{XmlEmitter, optional_attribute};
use super::extension::LazyExtensions;
use crate::model::{
    EventListener, ExtensionElement, FieldExtension, Implementation, Listener,
};

fn plain<'a>(element: &'a ExtensionElement, name: &str) -> Option<&'a str> {
    element
        .attribute_value_ns(None, name)
        .filter(|value| !value.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// `class`, `expression` or `delegateExpression`, first match wins.
pub fn read_implementation(element: &ExtensionElement) -> Option<Implementation> {
    if let Some(class) = plain(element, "class") {
        Some(Implementation::Class(class.to_string()))
    } else if let Some(expression) = plain(element, "expression") {
        Some(Implementation::Expression(expression.to_string()))
    } else {
        plain(element, "delegateExpression")
            .map(|delegate| Implementation::DelegateExpression(delegate.to_string()))
    }
}

fn write_implementation(w: &mut dyn XmlEmitter, implementation: Option<&Implementation>) -> Result<(), ConvertError> {
    match implementation {
        Some(Implementation::Class(class)) => w.attribute("class", class),
        Some(Implementation::Expression(expression)) => w.attribute("expression", expression),
        Some(Implementation::DelegateExpression(delegate)) => w.attribute("delegateExpression", delegate),
        _ => Ok(()),
    }
}

fn vendor_child_text<'a>(element: &'a ExtensionElement, name: &str) -> Option<&'a str> {
    element
        .child_elements
        .get(name)
        .and_then(|group| group.iter().find(|child| child.is_in_namespace(namespace::VENDOR)))
        .and_then(|child| child.element_text.as_deref())
}

/// A `field`: value from the `stringValue`/`expression` attribute or the
/// `string`/`expression` child.
pub fn read_field(element: &ExtensionElement) -> FieldExtension {
    FieldExtension {
        name: plain(element, "name").unwrap_or_default().to_string(),
        string_value: owned(plain(element, "stringValue").or_else(|| vendor_child_text(element, "string"))),
        expression: owned(plain(element, "expression").or_else(|| vendor_child_text(element, "expression"))),
    }
}

pub fn read_fields(elements: &[ExtensionElement]) -> Vec<FieldExtension> {
    elements.iter().map(read_field).collect()
}

/// An `executionListener` or `taskListener`.
pub fn read_listener(element: &ExtensionElement) -> Listener {
    let fields = element
        .child_elements
        .get("field")
        .map(|group| {
            group
                .iter()
                .filter(|child| child.is_in_namespace(namespace::VENDOR))
                .map(read_field)
                .collect()
        })
        .unwrap_or_default();
    Listener {
        event: owned(plain(element, "event")),
        implementation: read_implementation(element),
        field_extensions: fields,
    }
}

pub fn read_listeners(elements: &[ExtensionElement]) -> Vec<Listener> {
    elements.iter().map(read_listener).collect()
}

pub fn read_event_listener(element: &ExtensionElement) -> EventListener {
    EventListener {
        events: owned(plain(element, "events")),
        implementation: read_implementation(element),
        entity_type: owned(plain(element, "entityType")),
    }
}

pub fn write_fields(
    fields: &[FieldExtension],
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for field in fields {
        extensions.open(w)?;
        write_field(field, w)?;
    }
    Ok(())
}

fn write_field(field: &FieldExtension, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element(&vendor("field"))?;
    w.attribute("name", &field.name)?;
    if let Some(value) = field.string_value.as_deref() {
        w.start_element(&vendor("string"))?;
        w.cdata(value)?;
        w.end_element()?;
    } else if let Some(expression) = field.expression.as_deref() {
        w.start_element(&vendor("expression"))?;
        w.cdata(expression)?;
        w.end_element()?;
    }
    w.end_element()
}

/// Writes listeners under the vendor element `local`
/// (`executionListener` or `taskListener`).
pub fn write_listeners(
    local: &str,
    listeners: &[Listener],
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for listener in listeners {
        extensions.open(w)?;
        w.start_element(&vendor(local))?;
        optional_attribute(w, "event", listener.event.as_deref())?;
        write_implementation(w, listener.implementation.as_ref())?;
        for field in &listener.field_extensions {
            write_field(field, w)?;
        }
        w.end_element()?;
    }
    Ok(())
}

pub fn write_event_listeners(
    listeners: &[EventListener],
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for listener in listeners {
        extensions.open(w)?;
        w.start_element(&vendor("eventListener"))?;
        optional_attribute(w, "events", listener.events.as_deref())?;
        write_implementation(w, listener.implementation.as_ref())?;
        optional_attribute(w, "entityType", listener.entity_type.as_deref())?;
        w.end_element()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtensionAttribute;

    fn vendor_element(name: &str) -> ExtensionElement {
        ExtensionElement::new(name).with_namespace("activiti", namespace::VENDOR)
    }

    #[test]
    fn test_field_value_from_child() {
        let field = vendor_element("field")
            .with_attribute(ExtensionAttribute::new("name", "to"))
            .with_child(vendor_element("string").with_text("kermit@muppets"));
        let read = read_field(&field);
        assert_eq!(read, FieldExtension::string("to", "kermit@muppets"));
    }

    #[test]
    fn test_listener_implementation_priority() {
        let listener = vendor_element("taskListener")
            .with_attribute(ExtensionAttribute::new("event", "create"))
            .with_attribute(ExtensionAttribute::new("expression", "${a}"))
            .with_attribute(ExtensionAttribute::new("class", "org.Listener"));
        let read = read_listener(&listener);
        assert_eq!(read.event.as_deref(), Some("create"));
        assert_eq!(read.implementation, Some(Implementation::Class("org.Listener".to_string())));
    }
}
