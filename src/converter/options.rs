//! Conversion options

use std::path::PathBuf;

/// Options for parsing and writing BPMN documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Encoding label used to decode input and encode output
    pub encoding: String,
    /// Validate the document against the schema before parsing
    pub validate_schema: bool,
    /// Stream the input through the validator and reject DOCTYPE declarations
    /// (false = validate the opened stream as is)
    pub safe_xml: bool,
    /// Indentation unit for written documents
    pub indent: String,
    /// Form keys that select the vendor user task variant
    pub user_task_form_types: Vec<String>,
    /// Form keys that select the vendor start event variant
    pub start_event_form_types: Vec<String>,
    /// Schema file replacing the embedded one
    pub schema_path: Option<PathBuf>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            validate_schema: false,
            safe_xml: true,
            indent: "  ".to_string(),
            user_task_form_types: Vec::new(),
            start_event_form_types: Vec::new(),
            schema_path: None,
        }
    }
}

impl ConverterOptions {
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_validation(mut self, validate_schema: bool) -> Self {
        self.validate_schema = validate_schema;
        self
    }

    pub fn with_safe_xml(mut self, safe_xml: bool) -> Self {
        self.safe_xml = safe_xml;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_user_task_form_types<I, S>(mut self, form_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_task_form_types = form_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_start_event_form_types<I, S>(mut self, form_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_event_form_types = form_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }
}
