//! Valued data objects and data store references.

use super::super::ConvertError;
use super::super::base::{flow_element, mismatch, read_base, skip_unknown};
use super::super::child::{ExtensionBlock, KnownAttributes, LazyExtensions, collect_custom_attributes};
use super::super::constants::vendor;
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream};
use super::super::writer::{XmlEmitter, optional_attribute};
use crate::model::{
    BaseElement, DataObjectKind, DataStoreReference, DataValue, Element, ElementRef, FlowElement,
    ItemDefinition, ValuedDataObject,
};
use crate::model::data::DEFAULT_STRUCTURE_REF;

// ============================================================================
// DATA OBJECT
// ============================================================================

const DATA_OBJECT_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["itemSubjectRef"],
    vendor: &[],
};

/// `dataObject`, typed by the suffix of its `itemSubjectRef`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataObjectConverter;

/// Kind selected by a structure reference. A reference without a prefix
/// reads as a string.
fn kind_of(structure_ref: Option<&str>) -> Result<(DataObjectKind, String), String> {
    match structure_ref.and_then(|reference| reference.rsplit_once(':').map(|(_, suffix)| (reference, suffix))) {
        None => Ok((DataObjectKind::String, DEFAULT_STRUCTURE_REF.to_string())),
        Some((reference, suffix)) => DataObjectKind::from_type_suffix(suffix)
            .map(|kind| (kind, reference.to_string()))
            .ok_or_else(|| suffix.to_string()),
    }
}

fn needs_cdata(text: &str) -> bool {
    text.contains(['<', '>', '&'])
}

impl ElementConverter for DataObjectConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "dataObject"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let (kind, structure_ref) = match kind_of(tag.attr("itemSubjectRef")) {
            Ok(selected) => selected,
            Err(suffix) => {
                tracing::error!(
                    id = %tag.id(),
                    at = %tag.position,
                    suffix = %suffix,
                    "unsupported data object type, element dropped"
                );
                stream.skip_element(tag)?;
                return Ok(None);
            }
        };

        let mut data = ValuedDataObject {
            base: BaseElement::default(),
            name: tag.attr_string("name"),
            documentation: None,
            kind,
            item_subject_ref: ItemDefinition::with_structure_ref(structure_ref),
            value: None,
        };
        read_base(tag, &mut data.base);
        collect_custom_attributes(tag, &DATA_OBJECT_ATTRIBUTES, &mut data.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("documentation") => {
                data.documentation = stream.read_trimmed_text(child)?;
                Ok(())
            }
            Some("extensionElements") => {
                let mut block = ExtensionBlock::read(stream, child)?;
                let literal = block
                    .take_vendor("value")
                    .into_iter()
                    .find_map(|value| value.element_text);
                if let Some(literal) = literal {
                    match kind.coerce(&literal) {
                        Ok(value) => data.value = Some(value),
                        Err(error) => {
                            tracing::error!(id = %data.base.id, %error, "data object value ignored");
                        }
                    }
                }
                block.into_carrier(&mut data.base.extensions);
                Ok(())
            }
            _ => skip_unknown(stream, child),
        })?;

        Ok(Some(Element::Flow(FlowElement::DataObject(data))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let FlowElement::DataObject(data) = flow_element(element, "dataObject")? else {
            return Err(mismatch("dataObject", element.kind()));
        };
        match data.item_subject_ref.structure_ref.as_deref().filter(|r| !r.is_empty()) {
            Some(reference) => w.attribute("itemSubjectRef", reference),
            None => w.attribute("itemSubjectRef", &format!("xsd:{}", data.kind.type_suffix())),
        }
    }

    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        let FlowElement::DataObject(data) = flow_element(element, "dataObject")? else {
            return Err(mismatch("dataObject", element.kind()));
        };
        let Some(value) = &data.value else {
            return Ok(());
        };
        extensions.open(w)?;
        w.start_element(&vendor("value"))?;
        let literal = value.to_literal();
        match value {
            DataValue::String(_) if needs_cdata(&literal) => w.cdata(&literal)?,
            _ => w.characters(&literal)?,
        }
        w.end_element()
    }
}

// ============================================================================
// DATA STORE REFERENCE
// ============================================================================

const DATA_STORE_REFERENCE_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["dataStoreRef", "itemSubjectRef"],
    vendor: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DataStoreReferenceConverter;

fn data_store_reference<'a>(element: ElementRef<'a>) -> Result<&'a DataStoreReference, ConvertError> {
    match flow_element(element, "dataStoreReference")? {
        FlowElement::DataStoreReference(store) => Ok(store),
        other => Err(mismatch("dataStoreReference", other.kind())),
    }
}

impl ElementConverter for DataStoreReferenceConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "dataStoreReference"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut store = DataStoreReference {
            name: tag.attr_string("name"),
            data_store_ref: tag.attr_string("dataStoreRef"),
            item_subject_ref: tag.attr_string("itemSubjectRef"),
            ..Default::default()
        };
        read_base(tag, &mut store.base);
        collect_custom_attributes(tag, &DATA_STORE_REFERENCE_ATTRIBUTES, &mut store.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("documentation") => {
                store.documentation = stream.read_trimmed_text(child)?;
                Ok(())
            }
            Some("dataState") => {
                store.data_state = child.attr_string("name");
                stream.skip_element(child)
            }
            Some("extensionElements") => {
                ExtensionBlock::read(stream, child)?.into_carrier(&mut store.base.extensions);
                Ok(())
            }
            _ => skip_unknown(stream, child),
        })?;

        Ok(Some(Element::Flow(FlowElement::DataStoreReference(store))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let store = data_store_reference(element)?;
        optional_attribute(w, "dataStoreRef", store.data_store_ref.as_deref())?;
        optional_attribute(w, "itemSubjectRef", store.item_subject_ref.as_deref())
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        if let Some(state) = data_store_reference(element)?.data_state.as_deref() {
            w.start_element("dataState")?;
            w.attribute("name", state)?;
            w.end_element()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::model::BpmnModel;
    use rstest::rstest;

    fn parse(text: &str) -> Option<Element> {
        let model = BpmnModel::new();
        let mut stream = XmlStream::new(text);
        let XmlToken::Start(tag) = stream.next_token().unwrap() else {
            panic!("expected start tag");
        };
        let parsed = DataObjectConverter
            .parse(&mut stream, &tag, &ParseContext { model: &model })
            .unwrap();
        assert_eq!(stream.next_token().unwrap(), XmlToken::Eof);
        parsed
    }

    fn data_object(reference: &str, literal: &str) -> String {
        format!(
            r#"<dataObject xmlns:activiti="http://activiti.org/bpmn" id="d" name="n" itemSubjectRef="{reference}">
                <extensionElements><activiti:value>{literal}</activiti:value></extensionElements>
            </dataObject>"#
        )
    }

    #[test]
    fn test_int_literal_is_coerced() {
        let Some(Element::Flow(FlowElement::DataObject(data))) = parse(&data_object("xsd:int", "42")) else {
            panic!("expected data object");
        };
        assert_eq!(data.kind, DataObjectKind::Integer);
        assert_eq!(data.value, Some(DataValue::Integer(42)));
        assert!(!data.base.extensions.has_elements());
    }

    #[test]
    fn test_unknown_suffix_drops_element() {
        assert!(parse(&data_object("xsd:foo", "x")).is_none());
    }

    #[test]
    fn test_bad_literal_keeps_element_without_value() {
        let Some(Element::Flow(FlowElement::DataObject(data))) = parse(&data_object("xsd:long", "many")) else {
            panic!("expected data object");
        };
        assert_eq!(data.value, None);
    }

    #[rstest]
    #[case(None, DataObjectKind::String, "xsd:string")]
    #[case(Some("string"), DataObjectKind::String, "xsd:string")]
    #[case(Some("xsd:boolean"), DataObjectKind::Boolean, "xsd:boolean")]
    #[case(Some("custom:datetime"), DataObjectKind::Date, "custom:datetime")]
    fn test_kind_selection(
        #[case] reference: Option<&str>,
        #[case] kind: DataObjectKind,
        #[case] written: &str,
    ) {
        assert_eq!(kind_of(reference), Ok((kind, written.to_string())));
    }
}
