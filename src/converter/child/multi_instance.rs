//! `multiInstanceLoopCharacteristics`.

use super::super::ConvertError;
use super::super::constants::{namespace, vendor};
use super::super::stream::parse_flag;
use super::super::writer::{XmlEmitter, text_element};
use crate::model::{ExtensionElement, MultiInstanceLoopCharacteristics};

pub fn read_multi_instance(element: &ExtensionElement) -> MultiInstanceLoopCharacteristics {
    let vendor_attr = |name: &str| {
        element
            .attribute_value_ns(Some(namespace::VENDOR), name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let child_text = |name: &str| element.child_text(name).map(str::to_string);

    let input_data_item = vendor_attr("collection").or_else(|| child_text("loopDataInputRef"));
    let element_variable = vendor_attr("elementVariable").or_else(|| {
        element
            .first_child("inputDataItem")
            .and_then(|item| item.attribute_value_ns(None, "name"))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    });

    MultiInstanceLoopCharacteristics {
        sequential: element
            .attribute_value_ns(None, "isSequential")
            .and_then(parse_flag)
            .unwrap_or(false),
        input_data_item,
        element_variable,
        element_index_variable: vendor_attr("elementIndexVariable"),
        loop_cardinality: child_text("loopCardinality"),
        completion_condition: child_text("completionCondition"),
    }
}

/// Writes the characteristics when they carry anything beyond the
/// sequential flag.
pub fn write_multi_instance(
    characteristics: &MultiInstanceLoopCharacteristics,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    if !characteristics.is_writable() {
        return Ok(());
    }
    w.start_element("multiInstanceLoopCharacteristics")?;
    w.attribute(
        "isSequential",
        if characteristics.sequential { "true" } else { "false" },
    )?;
    if let Some(collection) = characteristics.input_data_item.as_deref() {
        w.attribute(&vendor("collection"), collection)?;
    }
    if let Some(variable) = characteristics.element_variable.as_deref() {
        w.attribute(&vendor("elementVariable"), variable)?;
    }
    if let Some(index) = characteristics.element_index_variable.as_deref() {
        w.attribute(&vendor("elementIndexVariable"), index)?;
    }
    if let Some(cardinality) = characteristics.loop_cardinality.as_deref() {
        text_element(w, "loopCardinality", cardinality)?;
    }
    if let Some(condition) = characteristics.completion_condition.as_deref() {
        text_element(w, "completionCondition", condition)?;
    }
    w.end_element()
}
