//! Sequence flows.

use super::super::ConvertError;
use super::super::base::{flow_element, mismatch, read_base, skip_unknown};
use super::super::child::listener::read_listeners;
use super::super::child::{ExtensionBlock, KnownAttributes, collect_custom_attributes};
use super::super::constants::{FORMAL_EXPRESSION_TYPE, vendor};
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream};
use super::super::writer::{XmlEmitter, optional_attribute};
use crate::model::{Element, ElementRef, FlowElement, SequenceFlow};

const SEQUENCE_FLOW_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["sourceRef", "targetRef"],
    vendor: &["skipExpression"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceFlowConverter;

fn sequence_flow<'a>(element: ElementRef<'a>) -> Result<&'a SequenceFlow, ConvertError> {
    match flow_element(element, "sequenceFlow")? {
        FlowElement::SequenceFlow(flow) => Ok(flow),
        other => Err(mismatch("sequenceFlow", other.kind())),
    }
}

impl ElementConverter for SequenceFlowConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "sequenceFlow"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut flow = SequenceFlow::new(
            tag.id(),
            tag.attr("sourceRef").unwrap_or_default(),
            tag.attr("targetRef").unwrap_or_default(),
        );
        read_base(tag, &mut flow.base);
        flow.name = tag.attr_string("name");
        flow.skip_expression = tag.vendor_attr_string("skipExpression");
        collect_custom_attributes(tag, &SEQUENCE_FLOW_ATTRIBUTES, &mut flow.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("conditionExpression") => {
                flow.condition_expression = stream.read_trimmed_text(child)?;
                Ok(())
            }
            Some("documentation") => {
                flow.documentation = stream.read_trimmed_text(child)?;
                Ok(())
            }
            Some("extensionElements") => {
                let mut block = ExtensionBlock::read(stream, child)?;
                flow.execution_listeners
                    .extend(read_listeners(&block.take_vendor("executionListener")));
                block.into_carrier(&mut flow.base.extensions);
                Ok(())
            }
            _ => skip_unknown(stream, child),
        })?;

        Ok(Some(Element::Flow(FlowElement::SequenceFlow(flow))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let flow = sequence_flow(element)?;
        optional_attribute(w, "sourceRef", Some(flow.source_ref.as_str()))?;
        optional_attribute(w, "targetRef", Some(flow.target_ref.as_str()))?;
        optional_attribute(w, &vendor("skipExpression"), flow.skip_expression.as_deref())
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        if let Some(condition) = sequence_flow(element)?.condition_expression.as_deref() {
            w.start_element("conditionExpression")?;
            w.attribute("xsi:type", FORMAL_EXPRESSION_TYPE)?;
            w.cdata(condition)?;
            w.end_element()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::converter::writer::QuickXmlEmitter;
    use crate::model::BpmnModel;

    #[test]
    fn test_condition_written_as_cdata() {
        let model = BpmnModel::new();
        let text = r#"<sequenceFlow xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" id="f" sourceRef="a" targetRef="b">
            <conditionExpression xsi:type="tFormalExpression"><![CDATA[${amount > 10}]]></conditionExpression>
        </sequenceFlow>"#;
        let mut stream = XmlStream::new(text);
        let XmlToken::Start(tag) = stream.next_token().unwrap() else {
            panic!("expected start tag");
        };
        let Some(Element::Flow(element)) = SequenceFlowConverter
            .parse(&mut stream, &tag, &ParseContext { model: &model })
            .unwrap()
        else {
            panic!("expected flow element");
        };
        assert_eq!(
            element.as_sequence_flow().and_then(|f| f.condition_expression.as_deref()),
            Some("${amount > 10}")
        );

        let registry = crate::converter::ConverterRegistry::shared();
        let ctx = WriteContext::new(&model, &registry);
        let mut w = QuickXmlEmitter::new();
        SequenceFlowConverter
            .write(ElementRef::Flow(&element), &ctx, &mut w)
            .unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            r#"<sequenceFlow id="f" sourceRef="a" targetRef="b"><conditionExpression xsi:type="tFormalExpression"><![CDATA[${amount > 10}]]></conditionExpression></sequenceFlow>"#
        );
    }
}
