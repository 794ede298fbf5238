//! Schema validation run before parsing.
//!
//! The schema is an XSD document. Loading it collects every declared element
//! name; validation then walks the document once and checks that it is well
//! formed, that its root is a BPMN `definitions` element, and that every
//! element in the BPMN namespace is declared. Elements of other namespaces
//! (vendor extensions, diagram interchange) are left to their own schemas.

use std::io::BufRead;
use std::sync::LazyLock;

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use rustc_hash::FxHashSet;

use super::ConvertError;
use super::constants::namespace;
use super::options::ConverterOptions;

const EMBEDDED_XSD: &str = include_str!("../../resources/bpmn20-model.xsd");

static EMBEDDED_SCHEMA: LazyLock<Result<Schema, String>> =
    LazyLock::new(|| Schema::from_xsd(EMBEDDED_XSD).map_err(|e| e.to_string()));

/// Whether DOCTYPE declarations may appear in a validated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctypePolicy {
    Reject,
    /// Skipped without expanding any entity.
    Tolerate,
}

/// Element declarations of a loaded schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    global: FxHashSet<String>,
    declared: FxHashSet<String>,
}

impl Schema {
    /// The schema selected by the options: the override file when set,
    /// else the embedded one.
    pub fn load(options: &ConverterOptions) -> Result<Self, ConvertError> {
        match &options.schema_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ConvertError::schema_resource(format!("cannot read schema {}: {e}", path.display()))
                })?;
                Self::from_xsd(&text)
            }
            None => Self::embedded(),
        }
    }

    pub fn embedded() -> Result<Self, ConvertError> {
        (*EMBEDDED_SCHEMA).clone().map_err(ConvertError::schema_resource)
    }

    /// Reads the element declarations of an XSD document.
    pub fn from_xsd(text: &str) -> Result<Self, ConvertError> {
        let mut reader = NsReader::from_str(text);
        let mut schema = Self::default();
        let mut depth = 0usize;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| ConvertError::schema_resource(format!("malformed schema: {e}")))?;
            let (start, empty) = match event {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            let is_xsd_element = matches!(resolved, ResolveResult::Bound(ns) if ns.as_ref() == namespace::XSD.as_bytes())
                && start.local_name().as_ref() == b"element";
            if is_xsd_element {
                let name = start
                    .try_get_attribute("name")
                    .map_err(|e| ConvertError::schema_resource(format!("malformed schema: {e}")))?;
                if let Some(name) = name {
                    let name = String::from_utf8_lossy(&name.value).into_owned();
                    if depth == 1 {
                        schema.global.insert(name.clone());
                    }
                    schema.declared.insert(name);
                }
            }
            if !empty {
                depth += 1;
            }
        }

        if schema.global.is_empty() {
            return Err(ConvertError::schema_resource("schema declares no global elements"));
        }
        tracing::debug!(
            global = schema.global.len(),
            declared = schema.declared.len(),
            "loaded schema"
        );
        Ok(schema)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.global.contains(name)
    }

    /// Validates a whole document read from `input`.
    pub fn validate<R: BufRead>(&self, input: R, doctype: DoctypePolicy) -> Result<(), ConvertError> {
        let mut reader = NsReader::from_reader(input);
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let offset = reader.buffer_position();
            let (resolved, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| ConvertError::validation(format!("byte {offset}: {e}"), None))?;
            let (start, empty) = match event {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    buf.clear();
                    continue;
                }
                Event::DocType(_) => {
                    if doctype == DoctypePolicy::Reject {
                        return Err(ConvertError::validation(
                            format!("byte {offset}: DOCTYPE is not allowed"),
                            None,
                        ));
                    }
                    tracing::debug!("skipping DOCTYPE declaration");
                    buf.clear();
                    continue;
                }
                Event::Eof => break,
                _ => {
                    buf.clear();
                    continue;
                }
            };

            let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
            let in_bpmn = matches!(resolved, ResolveResult::Bound(ns) if ns.as_ref() == namespace::BPMN.as_bytes());
            if let ResolveResult::Unknown(prefix) = resolved {
                return Err(ConvertError::validation(
                    format!(
                        "byte {offset}: undeclared namespace prefix '{}'",
                        String::from_utf8_lossy(&prefix)
                    ),
                    None,
                ));
            }

            if !seen_root {
                if !in_bpmn || local != "definitions" {
                    return Err(ConvertError::validation(
                        format!("root element <{local}> is not a BPMN definitions element"),
                        None,
                    ));
                }
                seen_root = true;
            } else if depth == 0 {
                return Err(ConvertError::validation(
                    format!("byte {offset}: content after the root element"),
                    None,
                ));
            }
            if in_bpmn && !self.declares(&local) {
                return Err(ConvertError::validation(
                    format!("byte {offset}: element <{local}> is not declared by the schema"),
                    None,
                ));
            }

            if !empty {
                depth += 1;
            }
            buf.clear();
        }

        if !seen_root {
            return Err(ConvertError::validation("document has no root element", None));
        }
        if depth != 0 {
            return Err(ConvertError::validation("unexpected end of document", None));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" xmlns:activiti="http://activiti.org/bpmn">
  <process id="p">
    <extensionElements><activiti:anything/></extensionElements>
    <startEvent id="s"/>
  </process>
</definitions>"#;

    fn validate(text: &str, doctype: DoctypePolicy) -> Result<(), ConvertError> {
        Schema::embedded().unwrap().validate(text.as_bytes(), doctype)
    }

    #[test]
    fn test_embedded_schema_declares_core_elements() {
        let schema = Schema::embedded().unwrap();
        assert!(schema.is_global("definitions"));
        assert!(schema.is_global("userTask"));
        assert!(schema.declares("conditionExpression"));
        assert!(!schema.is_global("conditionExpression"));
    }

    #[test]
    fn test_valid_document() {
        validate(DOC, DoctypePolicy::Reject).unwrap();
    }

    #[rstest]
    #[case::wrong_root(r#"<process xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"/>"#)]
    #[case::wrong_namespace(r#"<definitions xmlns="urn:other"/>"#)]
    #[case::undeclared(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><flyingTask/></definitions>"#)]
    #[case::mismatched(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process></definitions>"#)]
    #[case::truncated(r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process>"#)]
    #[case::empty("")]
    fn test_invalid_documents(#[case] text: &str) {
        let result = validate(text, DoctypePolicy::Reject);
        assert!(matches!(result, Err(ConvertError::Validation(_))), "{result:?}");
    }

    #[test]
    fn test_doctype_policy() {
        let text = format!("<!DOCTYPE definitions>\n{}", DOC.trim_start_matches(|c| c != '\n'));
        assert!(matches!(
            validate(&text, DoctypePolicy::Reject),
            Err(ConvertError::Validation(_))
        ));
        validate(&text, DoctypePolicy::Tolerate).unwrap();
    }

    #[test]
    fn test_schema_without_global_elements() {
        let result = Schema::from_xsd(r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"/>"#);
        assert!(matches!(result, Err(ConvertError::SchemaResource(_))));
    }

    #[test]
    fn test_missing_schema_override() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConverterOptions::default().with_schema_path(dir.path().join("missing.xsd"));
        assert!(matches!(Schema::load(&options), Err(ConvertError::SchemaResource(_))));
    }

    #[test]
    fn test_schema_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.xsd");
        std::fs::write(
            &path,
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"><xsd:element name="definitions"/></xsd:schema>"#,
        )
        .unwrap();
        let schema = Schema::load(&ConverterOptions::default().with_schema_path(&path)).unwrap();
        let result = schema.validate(DOC.as_bytes(), DoctypePolicy::Reject);
        assert!(matches!(result, Err(ConvertError::Validation(_))));
    }
}
