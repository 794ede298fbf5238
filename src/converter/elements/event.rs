//! Event converters: start, end, boundary, intermediate throw and catch.

use super::super::ConvertError;
use super::super::base::{
    finish_flow_node_extensions, flow_element, mismatch, read_event_child, read_flow_node,
};
use super::super::child::event_definition::write_event_definitions;
use super::super::child::form::{read_form_properties, write_form_properties};
use super::super::child::{ExtensionBlock, KnownAttributes, LazyExtensions, collect_custom_attributes};
use super::super::constants::vendor;
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext};
use super::super::stream::{StartTag, XmlStream, parse_flag};
use super::super::writer::{XmlEmitter, optional_attribute};
use crate::model::{
    BoundaryEvent, Element, ElementRef, Event, FlowElement, StartEvent, VendorFormExtras,
};

fn event_of<'a>(element: ElementRef<'a>, tag: &str) -> Result<&'a Event, ConvertError> {
    match flow_element(element, tag)? {
        FlowElement::StartEvent(start) => Ok(&start.event),
        FlowElement::BoundaryEvent(boundary) => Ok(&boundary.event),
        FlowElement::EndEvent(event)
        | FlowElement::ThrowEvent(event)
        | FlowElement::IntermediateCatchEvent(event) => Ok(event),
        other => Err(mismatch(tag, other.kind())),
    }
}

fn write_definitions(
    element: ElementRef<'_>,
    tag: &str,
    ctx: &WriteContext<'_>,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    write_event_definitions(&event_of(element, tag)?.event_definitions, ctx.model, w)
}

/// Flow node attributes, nested event definitions and common children.
fn parse_event(
    stream: &mut XmlStream<'_>,
    tag: &StartTag,
    ctx: &ParseContext<'_>,
    known: &KnownAttributes,
) -> Result<Event, ConvertError> {
    let mut event = Event::default();
    read_flow_node(tag, &mut event.node);
    collect_custom_attributes(tag, known, &mut event.node.base.extensions);
    stream.read_children(tag, |stream, child| read_event_child(stream, child, &mut event, ctx.model))?;
    Ok(event)
}

// ============================================================================
// START EVENT
// ============================================================================

const START_EVENT_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["isInterrupting"],
    vendor: &["initiator", "formKey"],
};

const VENDOR_START_EVENT_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["isInterrupting"],
    vendor: &["initiator", "formKey", "runAs", "scriptProcessor"],
};

/// `startEvent`, plus the vendor variant selected by a configured form key.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartEventConverter;

impl ElementConverter for StartEventConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "startEvent"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut start = StartEvent::default();
        read_flow_node(tag, &mut start.event.node);
        start.initiator = tag.vendor_attr_string("initiator");
        start.form_key = tag.vendor_attr_string("formKey");
        start.interrupting = tag.attr("isInterrupting").and_then(parse_flag).unwrap_or(true);

        let vendor_form = start
            .form_key
            .as_deref()
            .is_some_and(|key| ctx.model.start_event_form_types.iter().any(|t| t == key));
        let known = if vendor_form {
            start.vendor = Some(VendorFormExtras {
                run_as: tag.vendor_attr_string("runAs"),
                script_processor: tag.vendor_attr_string("scriptProcessor"),
            });
            &VENDOR_START_EVENT_ATTRIBUTES
        } else {
            &START_EVENT_ATTRIBUTES
        };
        collect_custom_attributes(tag, known, &mut start.event.node.base.extensions);

        stream.read_children(tag, |stream, child| match child.bpmn_name() {
            Some("extensionElements") => {
                let mut block = ExtensionBlock::read(stream, child)?;
                start
                    .form_properties
                    .extend(read_form_properties(&block.take_vendor("formProperty")));
                finish_flow_node_extensions(block, &mut start.event.node);
                Ok(())
            }
            _ => read_event_child(stream, child, &mut start.event, ctx.model),
        })?;

        Ok(Some(Element::Flow(FlowElement::StartEvent(start))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let FlowElement::StartEvent(start) = flow_element(element, "startEvent")? else {
            return Err(mismatch("startEvent", element.kind()));
        };
        optional_attribute(w, &vendor("initiator"), start.initiator.as_deref())?;
        optional_attribute(w, &vendor("formKey"), start.form_key.as_deref())?;
        if let Some(extras) = &start.vendor {
            optional_attribute(w, &vendor("runAs"), extras.run_as.as_deref())?;
            optional_attribute(w, &vendor("scriptProcessor"), extras.script_processor.as_deref())?;
        }
        if !start.interrupting {
            w.attribute("isInterrupting", "false")?;
        }
        Ok(())
    }

    fn write_extension_children(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
        extensions: &mut LazyExtensions,
    ) -> Result<(), ConvertError> {
        let FlowElement::StartEvent(start) = flow_element(element, "startEvent")? else {
            return Err(mismatch("startEvent", element.kind()));
        };
        write_form_properties(&start.form_properties, w, extensions)
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        write_definitions(element, "startEvent", ctx, w)
    }
}

// ============================================================================
// END / THROW / CATCH
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct EndEventConverter;

impl ElementConverter for EndEventConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "endEvent"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let event = parse_event(stream, tag, ctx, &KnownAttributes::NONE)?;
        Ok(Some(Element::Flow(FlowElement::EndEvent(event))))
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        write_definitions(element, "endEvent", ctx, w)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowEventConverter;

impl ElementConverter for ThrowEventConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "intermediateThrowEvent"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let event = parse_event(stream, tag, ctx, &KnownAttributes::NONE)?;
        Ok(Some(Element::Flow(FlowElement::ThrowEvent(event))))
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        write_definitions(element, "intermediateThrowEvent", ctx, w)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatchEventConverter;

impl ElementConverter for CatchEventConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "intermediateCatchEvent"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let event = parse_event(stream, tag, ctx, &KnownAttributes::NONE)?;
        Ok(Some(Element::Flow(FlowElement::IntermediateCatchEvent(event))))
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        write_definitions(element, "intermediateCatchEvent", ctx, w)
    }
}

// ============================================================================
// BOUNDARY EVENT
// ============================================================================

const BOUNDARY_EVENT_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &["attachedToRef", "cancelActivity"],
    vendor: &[],
};

/// `boundaryEvent`. A boundary event with exactly one error definition never
/// cancels the activity, whatever `cancelActivity` says.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryEventConverter;

impl ElementConverter for BoundaryEventConverter {
    fn xml_element_name(&self, _element: ElementRef<'_>) -> &'static str {
        "boundaryEvent"
    }

    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let mut boundary = BoundaryEvent {
            event: parse_event(stream, tag, ctx, &BOUNDARY_EVENT_ATTRIBUTES)?,
            attached_to_ref_id: tag.attr_string("attachedToRef"),
            attached_to_ref: None,
            cancel_activity: tag.attr("cancelActivity").and_then(parse_flag) != Some(false),
        };
        if boundary.has_single_error_definition() {
            boundary.cancel_activity = false;
        }
        Ok(Some(Element::Flow(FlowElement::BoundaryEvent(boundary))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let FlowElement::BoundaryEvent(boundary) = flow_element(element, "boundaryEvent")? else {
            return Err(mismatch("boundaryEvent", element.kind()));
        };
        let attached = boundary
            .attached_to_ref
            .as_deref()
            .or(boundary.attached_to_ref_id.as_deref());
        optional_attribute(w, "attachedToRef", attached)?;
        if !boundary.has_single_error_definition() {
            w.attribute("cancelActivity", if boundary.cancel_activity { "true" } else { "false" })?;
        }
        Ok(())
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        write_definitions(element, "boundaryEvent", ctx, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;
    use crate::model::{BpmnModel, EventDefinitionKind};
    use rstest::rstest;

    fn parse_one(converter: &dyn ElementConverter, text: &str) -> FlowElement {
        let model = BpmnModel::new();
        let mut stream = XmlStream::new(text);
        let XmlToken::Start(tag) = stream.next_token().unwrap() else {
            panic!("expected start tag");
        };
        match converter.parse(&mut stream, &tag, &ParseContext { model: &model }).unwrap() {
            Some(Element::Flow(flow)) => flow,
            other => panic!("expected flow element, got {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"cancelActivity="true""#)]
    #[case("")]
    fn test_single_error_boundary_never_cancels(#[case] attribute: &str) {
        let text = format!(
            r#"<boundaryEvent id="b" attachedToRef="task" {attribute}><errorEventDefinition errorRef="e1"/></boundaryEvent>"#
        );
        let FlowElement::BoundaryEvent(boundary) = parse_one(&BoundaryEventConverter, &text) else {
            panic!("expected boundary event");
        };
        assert!(!boundary.cancel_activity);
        assert_eq!(boundary.attached_to_ref_id.as_deref(), Some("task"));
    }

    #[test]
    fn test_timer_boundary_keeps_cancel_flag() {
        let text = r#"<boundaryEvent id="b" attachedToRef="task" cancelActivity="FALSE">
            <timerEventDefinition><timeDuration>PT1H</timeDuration></timerEventDefinition>
        </boundaryEvent>"#;
        let FlowElement::BoundaryEvent(boundary) = parse_one(&BoundaryEventConverter, text) else {
            panic!("expected boundary event");
        };
        assert!(!boundary.cancel_activity);
        assert!(matches!(
            &boundary.event.event_definitions[0].kind,
            EventDefinitionKind::Timer(timer) if timer.time_duration.as_deref() == Some("PT1H")
        ));
    }

    #[test]
    fn test_start_event_reads_interrupting_flag() {
        let text = r#"<startEvent xmlns:activiti="http://activiti.org/bpmn" id="s"
            activiti:initiator="starter" isInterrupting="false"/>"#;
        let FlowElement::StartEvent(start) = parse_one(&StartEventConverter, text) else {
            panic!("expected start event");
        };
        assert!(!start.interrupting);
        assert_eq!(start.initiator.as_deref(), Some("starter"));
        assert!(start.event.node.base.extensions.attributes.is_empty());
    }
}
