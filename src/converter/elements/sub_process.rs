//! Sub-processes. The document driver streams their bodies as nested
//! scopes; this module reads the start tag and writes the whole element.

use super::super::ConvertError;
use super::super::base::{flow_element, mismatch, read_activity};
use super::super::child::{KnownAttributes, collect_custom_attributes};
use super::super::export::WriteContext;
use super::super::registry::{ElementConverter, ParseContext, sub_process_tag};
use super::super::stream::{StartTag, XmlStream, parse_flag};
use super::super::writer::{XmlEmitter, optional_attribute, text_element};
use crate::model::{AdhocSettings, Element, ElementRef, FlowElement, SubProcess, SubProcessKind};

const SUB_PROCESS_ATTRIBUTES: KnownAttributes = KnownAttributes {
    plain: &[
        "default",
        "isForCompensation",
        "triggeredByEvent",
        "ordering",
        "cancelRemainingInstances",
    ],
    vendor: &[],
};

/// Builds an empty sub-process from a `subProcess`, `transaction` or
/// `adHocSubProcess` start tag.
pub fn read_sub_process_start(tag: &StartTag) -> SubProcess {
    let kind = match tag.local_name.as_str() {
        "transaction" => SubProcessKind::Transaction,
        "adHocSubProcess" => SubProcessKind::AdHoc(AdhocSettings {
            completion_condition: None,
            ordering: tag.attr_string("ordering"),
            cancel_remaining_instances: tag
                .attr("cancelRemainingInstances")
                .and_then(parse_flag)
                .unwrap_or(true),
        }),
        _ if tag.attr("triggeredByEvent").and_then(parse_flag) == Some(true) => SubProcessKind::Event,
        _ => SubProcessKind::Embedded,
    };
    let mut sub = SubProcess::new("", kind);
    read_activity(tag, &mut sub.activity);
    collect_custom_attributes(tag, &SUB_PROCESS_ATTRIBUTES, &mut sub.activity.node.base.extensions);
    sub
}

/// Writes every sub-process kind, nested scope included.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubProcessConverter;

fn sub_process<'a>(element: ElementRef<'a>) -> Result<&'a SubProcess, ConvertError> {
    match flow_element(element, "subProcess")? {
        FlowElement::SubProcess(sub) => Ok(sub),
        other => Err(mismatch("subProcess", other.kind())),
    }
}

impl ElementConverter for SubProcessConverter {
    fn xml_element_name(&self, element: ElementRef<'_>) -> &'static str {
        match element {
            ElementRef::Flow(FlowElement::SubProcess(sub)) => sub_process_tag(&sub.kind),
            _ => "subProcess",
        }
    }

    /// Sub-process bodies belong to the driver's scope stack; a direct call
    /// reads only the start tag and skips the body.
    fn parse(
        &self,
        stream: &mut XmlStream<'_>,
        tag: &StartTag,
        _ctx: &ParseContext<'_>,
    ) -> Result<Option<Element>, ConvertError> {
        let sub = read_sub_process_start(tag);
        stream.skip_element(tag)?;
        Ok(Some(Element::Flow(FlowElement::SubProcess(sub))))
    }

    fn write_attributes(
        &self,
        element: ElementRef<'_>,
        _ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        match &sub_process(element)?.kind {
            SubProcessKind::Event => w.attribute("triggeredByEvent", "true"),
            SubProcessKind::AdHoc(settings) => {
                optional_attribute(w, "ordering", settings.ordering.as_deref())?;
                if !settings.cancel_remaining_instances {
                    w.attribute("cancelRemainingInstances", "false")?;
                }
                Ok(())
            }
            SubProcessKind::Embedded | SubProcessKind::Transaction => Ok(()),
        }
    }

    fn write_children(
        &self,
        element: ElementRef<'_>,
        ctx: &WriteContext<'_>,
        w: &mut dyn XmlEmitter,
    ) -> Result<(), ConvertError> {
        let sub = sub_process(element)?;
        ctx.write_scope(&sub.container, w)?;
        if let SubProcessKind::AdHoc(settings) = &sub.kind {
            if let Some(condition) = settings.completion_condition.as_deref().filter(|c| !c.is_empty()) {
                text_element(w, "completionCondition", condition)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::stream::XmlToken;

    fn start(text: &str) -> StartTag {
        let mut stream = XmlStream::new(text);
        match stream.next_token().unwrap() {
            XmlToken::Start(tag) => tag,
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn test_triggered_by_event_selects_event_kind() {
        let sub = read_sub_process_start(&start(r#"<subProcess id="s" triggeredByEvent="true"/>"#));
        assert_eq!(sub.kind, SubProcessKind::Event);
        assert_eq!(sub.id(), "s");
    }

    #[test]
    fn test_adhoc_settings() {
        let sub = read_sub_process_start(&start(
            r#"<adHocSubProcess id="a" ordering="Sequential" cancelRemainingInstances="false"/>"#,
        ));
        let SubProcessKind::AdHoc(settings) = sub.kind else {
            panic!("expected ad-hoc kind");
        };
        assert_eq!(settings.ordering.as_deref(), Some("Sequential"));
        assert!(!settings.cancel_remaining_instances);
    }
}
