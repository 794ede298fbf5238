//! Parse → write → parse round trips over the fixture documents.

mod helpers;

use bpmn_xml::converter::FileInputStreamProvider;
use bpmn_xml::model::{FlowElement, SubProcessKind};
use bpmn_xml::{BpmnXmlConverter, ConverterOptions};
use helpers::bpmn_fixtures::{all_fixtures, parse_fixture, write_text};
use rstest::rstest;

#[test]
fn test_every_fixture_is_stable_after_one_round_trip() {
    let converter = BpmnXmlConverter::default();
    let fixtures = all_fixtures();
    assert!(fixtures.len() >= 3, "fixtures missing: {fixtures:?}");

    for path in fixtures {
        let model = converter.parse(&FileInputStreamProvider::new(&path)).unwrap();
        let first = write_text(&converter, &model);
        let reparsed = converter.parse_str(&first).unwrap();
        let second = write_text(&converter, &reparsed);
        assert_eq!(first, second, "unstable output for {}", path.display());
    }
}

#[test]
fn test_written_fixtures_pass_validation() {
    let converter = BpmnXmlConverter::new(ConverterOptions::default().with_validation(true));
    for path in all_fixtures() {
        let model = converter.parse(&FileInputStreamProvider::new(&path)).unwrap();
        let written = converter.write(&model).unwrap();
        converter
            .parse_bytes(&written)
            .unwrap_or_else(|e| panic!("{} does not validate after writing: {e}", path.display()));
    }
}

#[rstest]
#[case("start", "startEvent")]
#[case("review", "userTask")]
#[case("decision", "exclusiveGateway")]
#[case("charge", "serviceTask")]
#[case("chargeFailed", "boundaryEvent")]
#[case("notifyReject", "scriptTask")]
#[case("rejected", "endEvent")]
#[case("fulfil", "subProcess")]
#[case("pick", "manualTask")]
#[case("checkStock", "businessRuleTask")]
#[case("invoice", "callActivity")]
#[case("waitPayment", "intermediateCatchEvent")]
#[case("announce", "intermediateThrowEvent")]
#[case("join", "parallelGateway")]
#[case("orderTotal", "dataObject")]
#[case("toCharge", "sequenceFlow")]
fn test_element_kinds_survive_round_trip(#[case] id: &str, #[case] tag: &str) {
    let converter = BpmnXmlConverter::default();
    let model = parse_fixture("order_process.bpmn");
    let reparsed = converter.parse_str(&write_text(&converter, &model)).unwrap();

    let before = model.get_flow_element(id).unwrap();
    let after = reparsed.get_flow_element(id).unwrap();
    assert_eq!(before.kind(), after.kind());
    assert_eq!(before.name(), after.name());

    let written = write_text(&converter, &reparsed);
    assert!(written.contains(&format!("<{tag} id=\"{id}\"")), "missing <{tag} id=\"{id}\">");
}

#[test]
fn test_nested_scopes_round_trip() {
    let converter = BpmnXmlConverter::default();
    let model = parse_fixture("nested_scopes.bpmn");
    let reparsed = converter.parse_str(&write_text(&converter, &model)).unwrap();
    let process = reparsed.main_process().unwrap();

    let left = process.container.get_flow_element("left").and_then(FlowElement::as_sub_process).unwrap();
    let deep = left.container.get_flow_element("deep").and_then(FlowElement::as_sub_process).unwrap();
    assert!(deep.container.get_flow_element("deepTask").is_some());
    assert!(process.container.get_flow_element("deepTask").is_none());

    let kind_of = |id: &str| process.container.get_flow_element(id).and_then(FlowElement::as_sub_process).map(|s| s.kind.clone());
    assert_eq!(kind_of("right"), Some(SubProcessKind::Transaction));
    assert_eq!(kind_of("onError"), Some(SubProcessKind::Event));
    let Some(SubProcessKind::AdHoc(settings)) = kind_of("adhoc") else {
        panic!("adhoc is not an ad-hoc sub-process");
    };
    assert_eq!(settings.ordering.as_deref(), Some("Sequential"));
    assert!(!settings.cancel_remaining_instances);
    assert_eq!(settings.completion_condition.as_deref(), Some("${done}"));
}

#[test]
fn test_extensions_and_custom_attributes_are_preserved() {
    let converter = BpmnXmlConverter::default();
    let written = write_text(&converter, &parse_fixture("order_process.bpmn"));

    assert!(written.contains(r#"xmlns:audit="urn:audit""#));
    assert!(written.contains(r#"audit:owner="ops""#));
    assert!(written.contains(r#"<audit:policy level="high"><![CDATA[retain]]></audit:policy>"#));
    assert!(written.contains(r#"id="orderDefinitions""#));
    assert!(written.contains(r#"<activiti:executionListener event="start" class="org.example.StartListener"/>"#));
    assert!(written.contains(r#"<activiti:eventListener events="TASK_CREATED" class="org.example.TaskAudit"/>"#));
}

#[test]
fn test_pretty_printing_keeps_text_inline() {
    let converter = BpmnXmlConverter::default();
    let written = write_text(&converter, &parse_fixture("order_process.bpmn"));

    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<definitions"));
    assert!(written.contains("\n    <documentation>Handles incoming orders.</documentation>\n"));
    assert!(written.contains(
        r#"<conditionExpression xsi:type="tFormalExpression"><![CDATA[${approved && amount > 0}]]></conditionExpression>"#
    ));
    assert!(written.contains("<script><![CDATA[\n        if (amount < 10) {\n"));
    assert!(written.ends_with("</definitions>"));
}

#[test]
fn test_diagram_round_trip() {
    let converter = BpmnXmlConverter::default();
    let written = write_text(&converter, &parse_fixture("nested_scopes.bpmn"));

    assert!(written.contains(r#"<bpmndi:BPMNPlane bpmnElement="Collaboration" id="BPMNPlane_Collaboration">"#));
    assert!(written.contains(r#"<omgdc:Bounds height="400.0" width="900.0" x="0.0" y="0.0"/>"#));
    assert!(written.contains(r#"<omgdi:waypoint x="10.5" y="500.0"/>"#));
    assert!(written.contains(r#"<participant id="customerPool" name="Customer"/>"#));
}
