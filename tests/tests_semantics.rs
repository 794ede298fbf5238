//! Model-level behavior after parsing: linking, boundary events, typed data,
//! message references, registry misses.

mod helpers;

use std::sync::Arc;

use bpmn_xml::converter::ConverterRegistry;
use bpmn_xml::model::{
    Activity, DataObjectKind, DataValue, ElementKind, EventDefinitionKind, FlowElement, FlowNode, Implementation,
    Process, SequenceFlow,
};
use bpmn_xml::{BpmnModel, BpmnXmlConverter, ConvertError, ConverterOptions, link};
use chrono::NaiveDate;
use helpers::bpmn_fixtures::{fixture_bytes, parse_fixture, write_text};
use rstest::rstest;

fn flow_node<'a>(model: &'a BpmnModel, id: &str) -> &'a FlowNode {
    model.get_flow_element(id).and_then(FlowElement::as_flow_node).unwrap()
}

// ============================================================================
// LINKING
// ============================================================================

#[test]
fn test_flows_are_linked_within_their_scope() {
    let model = parse_fixture("order_process.bpmn");

    assert_eq!(flow_node(&model, "start").outgoing, ["toReview"]);
    assert_eq!(flow_node(&model, "decision").outgoing, ["toCharge", "toReject"]);
    assert_eq!(flow_node(&model, "notifyReject").incoming, ["toReject", "toCompensate"]);
    assert_eq!(flow_node(&model, "pick").incoming, ["fulfilToPick"]);
}

#[test]
fn test_sibling_scope_reference_stays_unresolved() {
    let model = parse_fixture("nested_scopes.bpmn");

    assert_eq!(flow_node(&model, "leftTask").outgoing, ["crossScope"]);
    assert!(flow_node(&model, "rightTask").incoming.is_empty());
    let cross = model.get_flow_element("crossScope").and_then(FlowElement::as_sequence_flow).unwrap();
    assert_eq!(cross.resolved_source.as_deref(), Some("leftTask"));
    assert_eq!(cross.resolved_target, None);
}

#[test]
fn test_boundary_events_attach_only_within_scope() {
    let model = parse_fixture("nested_scopes.bpmn");

    let outside = model.get_flow_element("outOfScopeBoundary").and_then(FlowElement::as_boundary_event).unwrap();
    assert_eq!(outside.attached_to_ref_id.as_deref(), Some("leftTask"));
    assert_eq!(outside.attached_to_ref, None);

    let right_task = model.get_flow_element("rightTask").and_then(FlowElement::as_activity).unwrap();
    assert_eq!(right_task.boundary_events, ["rightCancel"]);
}

#[test]
fn test_relinking_after_edit() {
    let mut model = parse_fixture("order_process.bpmn");
    let process = &mut model.processes[0];
    process.container.add_flow_element(FlowElement::Task(Activity::new("extra")));
    process
        .container
        .add_flow_element(FlowElement::SequenceFlow(SequenceFlow::new("toExtra", "done", "extra")));

    link(&mut model);

    assert_eq!(flow_node(&model, "done").outgoing, ["toExtra"]);
    assert_eq!(flow_node(&model, "done").incoming, ["joinToEnd"]);
    assert_eq!(flow_node(&model, "extra").incoming, ["toExtra"]);
}

// ============================================================================
// BOUNDARY EVENTS
// ============================================================================

#[test]
fn test_single_error_boundary_never_cancels() {
    let converter = BpmnXmlConverter::default();
    let model = parse_fixture("order_process.bpmn");

    let failed = model.get_flow_element("chargeFailed").and_then(FlowElement::as_boundary_event).unwrap();
    assert!(!failed.cancel_activity);
    assert_eq!(failed.attached_to_ref.as_deref(), Some("charge"));

    let timeout = model.get_flow_element("chargeTimeout").and_then(FlowElement::as_boundary_event).unwrap();
    assert!(!timeout.cancel_activity);

    let charge = model.get_flow_element("charge").and_then(FlowElement::as_activity).unwrap();
    assert_eq!(charge.boundary_events, ["chargeFailed", "chargeTimeout"]);

    let written = write_text(&converter, &model);
    assert!(written.contains(r#"<boundaryEvent id="chargeFailed" attachedToRef="charge">"#));
    assert!(written.contains(r#"<boundaryEvent id="chargeTimeout" attachedToRef="charge" cancelActivity="false">"#));
}

#[test]
fn test_error_boundary_forced_even_when_model_says_cancel() {
    let converter = BpmnXmlConverter::default();
    let mut model = parse_fixture("order_process.bpmn");
    if let Some(FlowElement::BoundaryEvent(event)) =
        model.processes[0].container.get_flow_element_mut("chargeFailed")
    {
        event.cancel_activity = true;
        assert!(!event.is_cancel_activity());
    }

    let written = write_text(&converter, &model);
    assert!(!written.contains(r#"id="chargeFailed" attachedToRef="charge" cancelActivity"#));
}

// ============================================================================
// TYPED DATA
// ============================================================================

#[rstest]
#[case("customer", DataObjectKind::String, Some(DataValue::String("Kermit & Piggy".to_string())))]
#[case("quantity", DataObjectKind::Integer, Some(DataValue::Integer(42)))]
#[case("serial", DataObjectKind::Long, Some(DataValue::Long(9_007_199_254_740_993)))]
#[case("rate", DataObjectKind::Double, Some(DataValue::Double(0.25)))]
#[case("express", DataObjectKind::Boolean, Some(DataValue::Boolean(true)))]
#[case("badNumber", DataObjectKind::Integer, None)]
fn test_data_object_values_are_coerced(
    #[case] id: &str,
    #[case] kind: DataObjectKind,
    #[case] value: Option<DataValue>,
) {
    let model = parse_fixture("data_objects.bpmn");
    let data = model.get_flow_element(id).and_then(FlowElement::as_data_object).unwrap();
    assert_eq!(data.kind, kind);
    assert_eq!(data.value, value);
}

#[test]
fn test_datetime_data_object() {
    let model = parse_fixture("data_objects.bpmn");
    let data = model.get_flow_element("placedAt").and_then(FlowElement::as_data_object).unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(12, 30, 0)).unwrap();
    assert_eq!(data.value, Some(DataValue::Date(expected)));
    assert_eq!(data.item_subject_ref.structure_ref.as_deref(), Some("xsd:datetime"));
}

#[test]
fn test_unknown_data_type_drops_only_that_element() {
    let model = parse_fixture("data_objects.bpmn");
    let process = model.main_process().unwrap();

    assert!(process.container.get_flow_element("mystery").is_none());
    assert!(process.container.get_flow_element("useData").is_some());
    assert!(process.container.get_flow_element("stockRef").is_some());
    assert_eq!(model.data_stores["warehouseDb"].data_state.as_deref(), Some("online"));
}

#[test]
fn test_data_values_written_back() {
    let converter = BpmnXmlConverter::default();
    let written = write_text(&converter, &parse_fixture("data_objects.bpmn"));

    assert!(written.contains("<activiti:value>42</activiti:value>"));
    assert!(written.contains("<activiti:value>2024-03-01T12:30:00</activiti:value>"));
    assert!(written.contains("<activiti:value><![CDATA[Kermit & Piggy]]></activiti:value>"));
    assert!(!written.contains("mystery"));
}

// ============================================================================
// REFERENCES AND TASK DETAILS
// ============================================================================

#[test]
fn test_message_references_are_rewritten() {
    let converter = BpmnXmlConverter::default();
    let model = parse_fixture("order_process.bpmn");

    let message_ref = |id: &str| {
        let definitions = match model.get_flow_element(id) {
            Some(FlowElement::StartEvent(start)) => &start.event.event_definitions,
            Some(FlowElement::IntermediateCatchEvent(event)) => &event.event_definitions,
            other => panic!("{id} is not a message event: {other:?}"),
        };
        event_message_ref(&definitions[0].kind)
    };
    assert_eq!(message_ref("start").as_deref(), Some("orderReceived"));
    assert_eq!(message_ref("waitPayment").as_deref(), Some("urn:partner:payment"));

    let written = write_text(&converter, &model);
    assert!(written.contains(r#"<messageEventDefinition messageRef="orderReceived"/>"#));
    assert!(written.contains(r#"<messageEventDefinition messageRef="ext:payment"/>"#));
}

fn event_message_ref(kind: &EventDefinitionKind) -> Option<String> {
    match kind {
        EventDefinitionKind::Message(message) => message.message_ref.clone(),
        _ => None,
    }
}

#[test]
fn test_service_task_details() {
    let model = parse_fixture("order_process.bpmn");
    let Some(FlowElement::ServiceTask(task)) = model.get_flow_element("charge") else {
        panic!("charge is not a service task");
    };
    assert_eq!(task.implementation, Some(Implementation::Class("org.example.ChargeCard".to_string())));
    assert!(task.activity.node.asynchronous);
    assert_eq!(task.field_extensions.len(), 2);
    assert_eq!(task.field_extensions[0].string_value.as_deref(), Some("stripe"));
    assert_eq!(task.field_extensions[1].expression.as_deref(), Some("${amount}"));
}

#[test]
fn test_user_task_variant_selected_by_form_key() {
    let text = String::from_utf8(fixture_bytes("order_process.bpmn"))
        .unwrap()
        .replace(r#"activiti:priority="50">"#, r#"activiti:priority="50" activiti:formKey="wizard" activiti:runAs="clerk">"#);

    let plain = BpmnXmlConverter::default().parse_str(&text).unwrap();
    let plain_task = plain.get_flow_element("review").unwrap();
    assert_eq!(plain_task.kind(), ElementKind::UserTask);

    let options = ConverterOptions::default().with_user_task_form_types(["wizard"]);
    let converter = BpmnXmlConverter::new(options);
    let model = converter.parse_str(&text).unwrap();
    let task = model.get_flow_element("review").unwrap();
    assert_eq!(task.kind(), ElementKind::VendorUserTask);
    assert!(write_text(&converter, &model).contains(r#"activiti:runAs="clerk""#));
}

#[test]
fn test_process_level_details() {
    let model = parse_fixture("order_process.bpmn");
    let process: &Process = model.main_process().unwrap();

    assert_eq!(process.documentation.as_deref(), Some("Handles incoming orders."));
    assert_eq!(process.candidate_starter_groups, ["sales"]);
    assert_eq!(process.execution_listeners.len(), 1);
    assert_eq!(process.event_listeners.len(), 1);
    assert_eq!(process.lanes[0].flow_references, ["start", "review"]);
    assert_eq!(model.signals["cancelSignal"].scope.as_deref(), Some("global"));
    assert_eq!(model.resources["clerks"].name.as_deref(), Some("Clerks"));
    assert!(model.namespace("audit").is_some());
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn test_writing_unregistered_kind_fails() {
    let model = parse_fixture("order_process.bpmn");
    let converter = BpmnXmlConverter::with_registry(ConverterOptions::default(), Arc::new(ConverterRegistry::new()));

    let result = converter.write(&model);
    assert!(matches!(result, Err(ConvertError::Unregistered(_))), "{result:?}");
}

#[test]
fn test_unregistered_tags_are_skipped_on_parse() {
    let converter = BpmnXmlConverter::with_registry(ConverterOptions::default(), Arc::new(ConverterRegistry::new()));
    let model = converter.parse_bytes(&fixture_bytes("order_process.bpmn")).unwrap();

    let process = model.main_process().unwrap();
    assert!(process.container.get_flow_element("review").is_none());
    // Sub-processes are scopes of the driver, not registry entries.
    assert!(process.container.get_flow_element("fulfil").is_some());
}
