//! Event definitions nested in start, end, boundary and intermediate events.

use super::super::ConvertError;
use super::super::constants::{namespace, vendor};
use super::super::stream::{StartTag, XmlStream, parse_flag};
use super::super::writer::{XmlEmitter, optional_attribute};
use crate::model::{
    BaseElement, BpmnModel, CompensateEventDefinition, ErrorEventDefinition, EventDefinition,
    EventDefinitionKind, ExtensionElement, MessageEventDefinition, SignalEventDefinition,
    TerminateEventDefinition, TimerEventDefinition,
};

const DEFINITION_TAGS: [&str; 7] = [
    "timerEventDefinition",
    "signalEventDefinition",
    "messageEventDefinition",
    "errorEventDefinition",
    "terminateEventDefinition",
    "cancelEventDefinition",
    "compensateEventDefinition",
];

pub fn is_event_definition(local: &str) -> bool {
    DEFINITION_TAGS.contains(&local)
}

fn attr(element: &ExtensionElement, name: &str) -> Option<String> {
    element
        .attribute_value_ns(None, name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn vendor_attr(element: &ExtensionElement, name: &str) -> Option<String> {
    element
        .attribute_value_ns(Some(namespace::VENDOR), name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Expands a `prefix:local` message reference whose prefix names a namespace
/// other than the target namespace into `uri:local`. A prefix bound to the
/// target namespace is dropped; an unknown prefix is kept as part of the id.
pub fn resolve_message_ref(reference: &str, model: &BpmnModel) -> String {
    let Some((prefix, local)) = reference.split_once(':') else {
        return reference.to_string();
    };
    match model.namespace(prefix) {
        None => reference.to_string(),
        Some(uri) if model.target_namespace.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(uri)) => {
            local.to_string()
        }
        Some(uri) => format!("{uri}:{local}"),
    }
}

/// Inverse of [`resolve_message_ref`]: strips the target namespace, or
/// replaces another registered namespace URI with its prefix.
pub fn export_message_ref(reference: &str, model: &BpmnModel) -> String {
    if let Some(target) = model.target_namespace.as_deref().filter(|t| !t.is_empty()) {
        if let Some(rest) = reference.strip_prefix(target) {
            return rest.strip_prefix(':').unwrap_or(rest).to_string();
        }
    }
    for (prefix, uri) in &model.namespaces {
        if uri.is_empty() {
            continue;
        }
        if let Some(rest) = reference.strip_prefix(uri.as_str()) {
            let rest = rest.strip_prefix(':').unwrap_or(rest);
            return format!("{prefix}:{rest}");
        }
    }
    reference.to_string()
}

pub fn read_event_definition(
    stream: &mut XmlStream<'_>,
    tag: &StartTag,
    model: &BpmnModel,
) -> Result<EventDefinition, ConvertError> {
    let element = stream.read_subtree(tag)?;
    let kind = match element.name.as_str() {
        "timerEventDefinition" => {
            let cycle = element.first_child("timeCycle");
            EventDefinitionKind::Timer(TimerEventDefinition {
                time_date: element.child_text("timeDate").map(str::to_string),
                time_duration: element.child_text("timeDuration").map(str::to_string),
                time_cycle: element.child_text("timeCycle").map(str::to_string),
                end_date: cycle.and_then(|cycle| vendor_attr(cycle, "endDate")),
                calendar_name: vendor_attr(&element, "businessCalendarName"),
            })
        }
        "signalEventDefinition" => EventDefinitionKind::Signal(SignalEventDefinition {
            signal_ref: attr(&element, "signalRef"),
            asynchronous: element
                .attribute_value_ns(Some(namespace::VENDOR), "async")
                .and_then(parse_flag)
                .unwrap_or(false),
        }),
        "messageEventDefinition" => EventDefinitionKind::Message(MessageEventDefinition {
            message_ref: attr(&element, "messageRef").map(|r| resolve_message_ref(&r, model)),
            message_expression: vendor_attr(&element, "messageExpression"),
        }),
        "errorEventDefinition" => EventDefinitionKind::Error(ErrorEventDefinition {
            error_code: attr(&element, "errorRef"),
        }),
        "terminateEventDefinition" => {
            let flag = |name: &str| {
                element
                    .attribute_value_ns(Some(namespace::VENDOR), name)
                    .and_then(parse_flag)
                    .unwrap_or(false)
            };
            EventDefinitionKind::Terminate(TerminateEventDefinition {
                terminate_all: flag("terminateAll"),
                terminate_multi_instance: flag("terminateMultiInstance"),
            })
        }
        "compensateEventDefinition" => EventDefinitionKind::Compensate(CompensateEventDefinition {
            activity_ref: attr(&element, "activityRef"),
            wait_for_completion: element
                .attribute_value_ns(None, "waitForCompletion")
                .and_then(parse_flag)
                .unwrap_or(true),
        }),
        _ => EventDefinitionKind::Cancel,
    };

    Ok(EventDefinition {
        base: BaseElement {
            id: attr(&element, "id").unwrap_or_default(),
            position: Some(tag.position),
            ..Default::default()
        },
        kind,
    })
}

pub fn write_event_definition(
    definition: &EventDefinition,
    model: &BpmnModel,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    let id = Some(definition.base.id.as_str());
    match &definition.kind {
        EventDefinitionKind::Timer(timer) => {
            w.start_element("timerEventDefinition")?;
            optional_attribute(w, "id", id)?;
            optional_attribute(w, &vendor("businessCalendarName"), timer.calendar_name.as_deref())?;
            let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
            if let Some(date) = non_empty(&timer.time_date) {
                w.start_element("timeDate")?;
                w.characters(&date)?;
                w.end_element()?;
            } else if let Some(cycle) = non_empty(&timer.time_cycle) {
                w.start_element("timeCycle")?;
                optional_attribute(w, &vendor("endDate"), timer.end_date.as_deref())?;
                w.characters(&cycle)?;
                w.end_element()?;
            } else if let Some(duration) = non_empty(&timer.time_duration) {
                w.start_element("timeDuration")?;
                w.characters(&duration)?;
                w.end_element()?;
            }
            w.end_element()
        }
        EventDefinitionKind::Signal(signal) => {
            w.start_element("signalEventDefinition")?;
            optional_attribute(w, "id", id)?;
            optional_attribute(w, "signalRef", signal.signal_ref.as_deref())?;
            if signal.asynchronous {
                w.attribute(&vendor("async"), "true")?;
            }
            w.end_element()
        }
        EventDefinitionKind::Message(message) => {
            w.start_element("messageEventDefinition")?;
            optional_attribute(w, "id", id)?;
            if let Some(reference) = message.message_ref.as_deref().filter(|r| !r.is_empty()) {
                w.attribute("messageRef", &export_message_ref(reference, model))?;
            }
            optional_attribute(w, &vendor("messageExpression"), message.message_expression.as_deref())?;
            w.end_element()
        }
        EventDefinitionKind::Error(error) => {
            w.start_element("errorEventDefinition")?;
            optional_attribute(w, "id", id)?;
            optional_attribute(w, "errorRef", error.error_code.as_deref())?;
            w.end_element()
        }
        EventDefinitionKind::Terminate(terminate) => {
            w.start_element("terminateEventDefinition")?;
            optional_attribute(w, "id", id)?;
            if terminate.terminate_all {
                w.attribute(&vendor("terminateAll"), "true")?;
            }
            if terminate.terminate_multi_instance {
                w.attribute(&vendor("terminateMultiInstance"), "true")?;
            }
            w.end_element()
        }
        EventDefinitionKind::Cancel => {
            w.start_element("cancelEventDefinition")?;
            optional_attribute(w, "id", id)?;
            w.end_element()
        }
        EventDefinitionKind::Compensate(compensate) => {
            w.start_element("compensateEventDefinition")?;
            optional_attribute(w, "id", id)?;
            optional_attribute(w, "activityRef", compensate.activity_ref.as_deref())?;
            if !compensate.wait_for_completion {
                w.attribute("waitForCompletion", "false")?;
            }
            w.end_element()
        }
    }
}

pub fn write_event_definitions(
    definitions: &[EventDefinition],
    model: &BpmnModel,
    w: &mut dyn XmlEmitter,
) -> Result<(), ConvertError> {
    for definition in definitions {
        write_event_definition(definition, model, w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::writer::QuickXmlEmitter;

    fn model_with_namespaces() -> BpmnModel {
        let mut model = BpmnModel::new();
        model.target_namespace = Some("http://www.activiti.org/test".to_string());
        model.add_namespace("tns", "http://www.activiti.org/test");
        model.add_namespace("shop", "http://shop.example.com");
        model
    }

    #[test]
    fn test_message_ref_read_expands_foreign_prefix() {
        let model = model_with_namespaces();
        assert_eq!(resolve_message_ref("shop:order", &model), "http://shop.example.com:order");
        assert_eq!(resolve_message_ref("tns:order", &model), "order");
        assert_eq!(resolve_message_ref("unknown:order", &model), "unknown:order");
        assert_eq!(resolve_message_ref("order", &model), "order");
    }

    #[test]
    fn test_message_ref_write_strips_target_namespace() {
        let model = model_with_namespaces();
        assert_eq!(export_message_ref("http://www.activiti.org/test:order", &model), "order");
        assert_eq!(export_message_ref("http://shop.example.com:order", &model), "shop:order");
        assert_eq!(export_message_ref("order", &model), "order");
    }

    #[test]
    fn test_timer_writes_first_non_empty_value() {
        let definition = EventDefinition::new(EventDefinitionKind::Timer(TimerEventDefinition {
            time_date: Some(String::new()),
            time_cycle: Some("R3/PT10H".to_string()),
            time_duration: Some("PT5M".to_string()),
            end_date: Some("2030-01-01".to_string()),
            calendar_name: None,
        }));
        let mut w = QuickXmlEmitter::new();
        write_event_definition(&definition, &BpmnModel::new(), &mut w).unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            r#"<timerEventDefinition><timeCycle activiti:endDate="2030-01-01">R3/PT10H</timeCycle></timerEventDefinition>"#
        );
    }

    #[test]
    fn test_terminate_flags_only_when_true() {
        let definition = EventDefinition::new(EventDefinitionKind::Terminate(TerminateEventDefinition {
            terminate_all: true,
            terminate_multi_instance: false,
        }));
        let mut w = QuickXmlEmitter::new();
        write_event_definition(&definition, &BpmnModel::new(), &mut w).unwrap();
        let out = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(out, r#"<terminateEventDefinition activiti:terminateAll="true"/>"#);
    }
}
