//! Input sources, encodings, schema validation and batch parsing.

mod helpers;

use std::io::Write;

use bpmn_xml::converter::{FileInputStreamProvider, InputStreamProvider};
use bpmn_xml::{BpmnXmlConverter, ConvertError, ConverterOptions};
use helpers::bpmn_fixtures::{all_fixtures, fixture_bytes};
use rstest::rstest;
use tempfile::NamedTempFile;

const DOCTYPE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE definitions>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" targetNamespace="urn:t">
  <process id="p"><startEvent id="s"/></process>
</definitions>"#;

fn validating(safe_xml: bool) -> BpmnXmlConverter {
    BpmnXmlConverter::new(ConverterOptions::default().with_validation(true).with_safe_xml(safe_xml))
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_fixtures_pass_validation() {
    let converter = validating(true);
    for path in all_fixtures() {
        let provider = FileInputStreamProvider::new(&path);
        if let Err(error) = converter.parse(&provider) {
            panic!("{} failed validation: {error}", path.display());
        }
    }
}

#[rstest]
#[case::undeclared_element(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process id="p"><teleport id="t"/></process></definitions>"#)]
#[case::foreign_root(r#"<workflow xmlns="urn:other"/>"#)]
#[case::undeclared_prefix(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process id="p" vendor:flag="x"><vendor:thing/></process></definitions>"#)]
#[case::trailing_root(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"/><definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"/>"#)]
fn test_invalid_documents_are_rejected(#[case] text: &str) {
    let result = validating(true).parse_bytes(text.as_bytes());
    assert!(matches!(result, Err(ConvertError::Validation(_))), "{result:?}");
}

#[test]
fn test_invalid_document_parses_without_validation() {
    let text = r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process id="p"><teleport id="t"/><task id="a"/></process></definitions>"#;
    let model = BpmnXmlConverter::default().parse_bytes(text.as_bytes()).unwrap();
    assert!(model.get_flow_element("a").is_some());
}

#[test]
fn test_doctype_rejected_in_safe_mode() {
    let result = validating(true).parse_bytes(DOCTYPE_DOC.as_bytes());
    assert!(matches!(result, Err(ConvertError::Validation(_))), "{result:?}");
}

#[test]
fn test_doctype_tolerated_in_direct_mode() {
    let model = validating(false).parse_bytes(DOCTYPE_DOC.as_bytes()).unwrap();
    assert!(model.get_flow_element("s").is_some());
}

#[test]
fn test_missing_schema_override_is_a_resource_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConverterOptions::default()
        .with_validation(true)
        .with_schema_path(dir.path().join("absent.xsd"));
    let result = BpmnXmlConverter::new(options).parse_bytes(&fixture_bytes("data_objects.bpmn"));
    assert!(matches!(result, Err(ConvertError::SchemaResource(_))), "{result:?}");
}

// ============================================================================
// SOURCES AND ENCODINGS
// ============================================================================

#[test]
fn test_file_provider_reopens_for_validation_and_parse() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&fixture_bytes("order_process.bpmn")).unwrap();

    let provider = FileInputStreamProvider::new(file.path());
    let model = validating(true).parse(&provider).unwrap();
    assert_eq!(model.main_process().map(|p| p.id()), Some("orderProcess"));
    assert!(provider.open().is_ok());
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FileInputStreamProvider::new(dir.path().join("gone.bpmn"));
    let result = BpmnXmlConverter::default().parse(&provider);
    assert!(matches!(result, Err(ConvertError::Io(_))), "{result:?}");
}

#[test]
fn test_utf16_label_writes_utf8() {
    let converter = BpmnXmlConverter::new(ConverterOptions::default().with_encoding("UTF-16LE"));
    let model = BpmnXmlConverter::default().parse_bytes(&fixture_bytes("data_objects.bpmn")).unwrap();

    let written = converter.write(&model).unwrap();
    assert!(written.starts_with(br#"<?xml version="1.0" encoding="UTF-8"?>"#));
    let reparsed = BpmnXmlConverter::default().parse_bytes(&written).unwrap();
    assert_eq!(reparsed.data_stores.len(), 1);
    assert!(reparsed.get_flow_element("customer").is_some());
}

#[test]
fn test_encoding_mismatch_is_reported() {
    let converter = BpmnXmlConverter::new(ConverterOptions::default().with_encoding("Shift_JIS"));
    let mut bytes = fixture_bytes("data_objects.bpmn");
    bytes.extend_from_slice(&[0x81, 0x20]);
    assert!(matches!(converter.parse_bytes(&bytes), Err(ConvertError::Encoding(_))));
}

#[test]
fn test_custom_indent() {
    let converter = BpmnXmlConverter::new(ConverterOptions::default().with_indent("\t"));
    let model = converter.parse_bytes(&fixture_bytes("data_objects.bpmn")).unwrap();
    let written = String::from_utf8(converter.write(&model).unwrap()).unwrap();
    assert!(written.contains("\n\t<process id=\"data\""));
    assert!(written.contains("\n\t\t<dataObject id=\"customer\""));
}

// ============================================================================
// BATCH
// ============================================================================

#[test]
fn test_parse_many_matches_sequential_parse() {
    let converter = BpmnXmlConverter::default();
    let inputs: Vec<Vec<u8>> = all_fixtures().iter().map(|path| std::fs::read(path).unwrap()).collect();

    let parallel = converter.parse_many(&inputs);
    assert_eq!(parallel.len(), inputs.len());
    for (bytes, result) in inputs.iter().zip(parallel) {
        let sequential = converter.parse_bytes(bytes).unwrap();
        let parallel = result.unwrap();
        assert_eq!(
            converter.write(&parallel).unwrap(),
            converter.write(&sequential).unwrap()
        );
    }
}
