//! Form properties of user tasks and start events.

use super::super::ConvertError;
use super::super::constants::{namespace, vendor};
use super::super::stream::parse_flag;
use super::super::writer::{XmlEmitter, optional_attribute};
use super::extension::LazyExtensions;
use crate::model::{ExtensionElement, FormProperty, FormValue};

fn attr(element: &ExtensionElement, name: &str) -> Option<String> {
    element
        .attribute_value_ns(None, name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn read_form_property(element: &ExtensionElement) -> FormProperty {
    let flag = |name: &str, default: bool| {
        element
            .attribute_value_ns(None, name)
            .and_then(parse_flag)
            .unwrap_or(default)
    };
    let form_values = element
        .child_elements
        .get("value")
        .map(|group| {
            group
                .iter()
                .filter(|value| value.is_in_namespace(namespace::VENDOR))
                .map(|value| FormValue {
                    id: attr(value, "id").unwrap_or_default(),
                    name: attr(value, "name"),
                })
                .collect()
        })
        .unwrap_or_default();

    FormProperty {
        id: attr(element, "id").unwrap_or_default(),
        name: attr(element, "name"),
        property_type: attr(element, "type"),
        expression: attr(element, "expression"),
        variable: attr(element, "variable"),
        default_expression: attr(element, "default"),
        date_pattern: attr(element, "datePattern"),
        readable: flag("readable", true),
        writeable: flag("writable", true),
        required: flag("required", false),
        form_values,
    }
}

pub fn read_form_properties(elements: &[ExtensionElement]) -> Vec<FormProperty> {
    elements.iter().map(read_form_property).collect()
}

pub fn write_form_properties(
    properties: &[FormProperty],
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for property in properties {
        extensions.open(w)?;
        w.start_element(&vendor("formProperty"))?;
        w.attribute("id", &property.id)?;
        optional_attribute(w, "name", property.name.as_deref())?;
        optional_attribute(w, "type", property.property_type.as_deref())?;
        optional_attribute(w, "expression", property.expression.as_deref())?;
        optional_attribute(w, "variable", property.variable.as_deref())?;
        optional_attribute(w, "default", property.default_expression.as_deref())?;
        optional_attribute(w, "datePattern", property.date_pattern.as_deref())?;
        if !property.readable {
            w.attribute("readable", "false")?;
        }
        if !property.writeable {
            w.attribute("writable", "false")?;
        }
        if property.required {
            w.attribute("required", "true")?;
        }
        for value in &property.form_values {
            w.start_element(&vendor("value"))?;
            w.attribute("id", &value.id)?;
            optional_attribute(w, "name", value.name.as_deref())?;
            w.end_element()?;
        }
        w.end_element()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtensionAttribute;

    #[test]
    fn test_flags_default_when_absent() {
        let element = ExtensionElement::new("formProperty")
            .with_namespace("activiti", namespace::VENDOR)
            .with_attribute(ExtensionAttribute::new("id", "amount"))
            .with_attribute(ExtensionAttribute::new("required", "true"))
            .with_attribute(ExtensionAttribute::new("writable", "false"));
        let property = read_form_property(&element);
        assert!(property.readable);
        assert!(!property.writeable);
        assert!(property.required);
    }

    #[test]
    fn test_enum_values_are_read() {
        let value = |id: &str| {
            ExtensionElement::new("value")
                .with_namespace("activiti", namespace::VENDOR)
                .with_attribute(ExtensionAttribute::new("id", id))
        };
        let element = ExtensionElement::new("formProperty")
            .with_namespace("activiti", namespace::VENDOR)
            .with_attribute(ExtensionAttribute::new("id", "decision"))
            .with_child(value("yes"))
            .with_child(value("no"));
        let ids: Vec<_> = read_form_property(&element)
            .form_values
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["yes", "no"]);
    }
}
