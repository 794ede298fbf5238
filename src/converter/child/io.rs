//! Call activity IO parameters and `ioSpecification`.

use super::super::ConvertError;
use super::super::constants::vendor;
use super::super::stream::parse_flag;
use super::super::writer::{XmlEmitter, optional_attribute, text_element};
use super::extension::LazyExtensions;
use crate::model::{DataSpec, ExtensionElement, IoParameter, IoSpecification};

fn attr(element: &ExtensionElement, name: &str) -> Option<String> {
    element
        .attribute_value_ns(None, name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn read_io_parameter(element: &ExtensionElement) -> IoParameter {
    IoParameter {
        source: attr(element, "source"),
        source_expression: attr(element, "sourceExpression"),
        target: attr(element, "target"),
    }
}

pub fn read_io_parameters(elements: &[ExtensionElement]) -> Vec<IoParameter> {
    elements.iter().map(read_io_parameter).collect()
}

/// Writes parameters under the vendor element `local` (`in` or `out`).
pub fn write_io_parameters(
    local: &str,
    parameters: &[IoParameter],
    w: &mut dyn XmlEmitter,
    extensions: &mut LazyExtensions,
) -> Result<(), ConvertError> {
    for parameter in parameters {
        extensions.open(w)?;
        w.start_element(&vendor(local))?;
        optional_attribute(w, "source", parameter.source.as_deref())?;
        optional_attribute(w, "sourceExpression", parameter.source_expression.as_deref())?;
        optional_attribute(w, "target", parameter.target.as_deref())?;
        w.end_element()?;
    }
    Ok(())
}

fn read_data_spec(element: &ExtensionElement) -> DataSpec {
    DataSpec {
        id: attr(element, "id").unwrap_or_default(),
        name: attr(element, "name"),
        item_subject_ref: attr(element, "itemSubjectRef"),
        is_collection: element
            .attribute_value_ns(None, "isCollection")
            .and_then(parse_flag)
            .unwrap_or(false),
    }
}

fn refs(element: &ExtensionElement, set: &str, reference: &str) -> Vec<String> {
    element
        .child_elements
        .get(set)
        .into_iter()
        .flatten()
        .flat_map(|group| group.child_elements.get(reference).into_iter().flatten())
        .filter_map(|r| r.element_text.clone())
        .collect()
}

pub fn read_io_specification(element: &ExtensionElement) -> IoSpecification {
    let specs = |name: &str| {
        element
            .child_elements
            .get(name)
            .map(|group| group.iter().map(read_data_spec).collect())
            .unwrap_or_default()
    };
    IoSpecification {
        data_inputs: specs("dataInput"),
        data_outputs: specs("dataOutput"),
        data_input_refs: refs(element, "inputSet", "dataInputRefs"),
        data_output_refs: refs(element, "outputSet", "dataOutputRefs"),
    }
}

fn write_data_spec(name: &str, spec: &DataSpec, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element(name)?;
    w.attribute("id", &spec.id)?;
    optional_attribute(w, "name", spec.name.as_deref())?;
    optional_attribute(w, "itemSubjectRef", spec.item_subject_ref.as_deref())?;
    if spec.is_collection {
        w.attribute("isCollection", "true")?;
    }
    w.end_element()
}

pub fn write_io_specification(specification: &IoSpecification, w: &mut dyn XmlEmitter) -> Result<(), ConvertError> {
    w.start_element("ioSpecification")?;
    for input in &specification.data_inputs {
        write_data_spec("dataInput", input, w)?;
    }
    for output in &specification.data_outputs {
        write_data_spec("dataOutput", output, w)?;
    }
    w.start_element("inputSet")?;
    for reference in &specification.data_input_refs {
        text_element(w, "dataInputRefs", reference)?;
    }
    w.end_element()?;
    w.start_element("outputSet")?;
    for reference in &specification.data_output_refs {
        text_element(w, "dataOutputRefs", reference)?;
    }
    w.end_element()?;
    w.end_element()
}
