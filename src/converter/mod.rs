//! BPMN 2.0 XML conversion.
//!
//! ```text
//! ┌───────────────────┐  validate   ┌─────────────┐
//! │ InputStreamProvider├────────────▶│   Schema    │ (optional)
//! └─────────┬─────────┘             └─────────────┘
//!           │ decode (encoding_rs)
//!           ▼
//! ┌───────────────────┐  tag lookup ┌───────────────────┐
//! │  parse_document   ├────────────▶│ ConverterRegistry │
//! │ (scope stack)     │             │ tag -> converter  │
//! └─────────┬─────────┘             │ kind -> converter │
//!           │ link                  └─────────▲─────────┘
//!           ▼                                 │ kind lookup
//! ┌───────────────────┐  write_document ┌─────┴─────────────┐
//! │     BpmnModel     ├────────────────▶│  IndentingWriter  │──▶ bytes
//! └───────────────────┘                 └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use bpmn_xml::converter::{BpmnXmlConverter, ConverterOptions};
//!
//! let converter = BpmnXmlConverter::new(ConverterOptions::default().with_validation(true));
//! let model = converter.parse_bytes(&std::fs::read("order.bpmn")?)?;
//! let xml = converter.write(&model)?;
//! ```

pub mod base;
pub mod child;
pub mod constants;
pub mod elements;
mod error;
pub mod export;
pub mod indent;
pub mod input;
pub mod linker;
mod options;
pub mod parse;
pub mod registry;
pub mod stream;
pub mod validation;
pub mod writer;

use std::io::{BufReader, Read};
use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use rayon::prelude::*;

use crate::model::BpmnModel;

pub use error::ConvertError;
pub use export::{WriteContext, write_document};
pub use indent::IndentingWriter;
pub use input::{FileInputStreamProvider, InputStreamProvider};
pub use linker::link;
pub use options::ConverterOptions;
pub use parse::parse_document;
pub use registry::{ConverterRegistry, ElementConverter, ParseContext};
pub use validation::{DoctypePolicy, Schema};
pub use writer::{QuickXmlEmitter, XmlEmitter};

/// Parses and writes BPMN documents with one set of options.
///
/// The converter is immutable and `Sync`; one instance may serve any number
/// of threads.
#[derive(Debug, Clone)]
pub struct BpmnXmlConverter {
    options: ConverterOptions,
    registry: Arc<ConverterRegistry>,
}

impl Default for BpmnXmlConverter {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

impl BpmnXmlConverter {
    /// A converter backed by the shared standard registry.
    pub fn new(options: ConverterOptions) -> Self {
        Self::with_registry(options, ConverterRegistry::shared())
    }

    pub fn with_registry(options: ConverterOptions, registry: Arc<ConverterRegistry>) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Validates (when enabled), decodes, parses and links a document.
    pub fn parse<P: InputStreamProvider + ?Sized>(&self, input: &P) -> Result<BpmnModel, ConvertError> {
        let encoding = self.encoding()?;
        if self.options.validate_schema {
            self.validate(input, encoding)?;
        }

        let mut bytes = Vec::new();
        input.open()?.read_to_end(&mut bytes)?;
        let text = decode(&bytes, encoding)?;
        self.parse_text(&text)
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<BpmnModel, ConvertError> {
        self.parse(bytes)
    }

    /// Parses text that is already decoded; the encoding option is ignored.
    pub fn parse_str(&self, text: &str) -> Result<BpmnModel, ConvertError> {
        if self.options.validate_schema {
            Schema::load(&self.options)?.validate(text.as_bytes(), self.doctype_policy())?;
        }
        self.parse_text(text)
    }

    /// Parses independent documents in parallel against the shared registry.
    /// Results keep the order of `inputs`.
    pub fn parse_many(&self, inputs: &[Vec<u8>]) -> Vec<Result<BpmnModel, ConvertError>> {
        inputs.par_iter().map(|bytes| self.parse_bytes(bytes)).collect()
    }

    /// Serializes a model as a pretty-printed document in the configured
    /// encoding.
    pub fn write(&self, model: &BpmnModel) -> Result<Vec<u8>, ConvertError> {
        let encoding = self.encoding()?.output_encoding();
        let declared = if encoding == self.encoding()? {
            self.options.encoding.as_str()
        } else {
            encoding.name()
        };

        let mut w = IndentingWriter::new(QuickXmlEmitter::new(), self.options.indent.clone());
        write_document(model, &self.registry, declared, &mut w)?;
        let bytes = w.into_inner().into_inner()?;
        if encoding == UTF_8 {
            return Ok(bytes);
        }

        let text = String::from_utf8(bytes).map_err(|e| ConvertError::encoding(e.to_string()))?;
        let (encoded, _, unmappable) = encoding.encode(&text);
        if unmappable {
            tracing::debug!(encoding = encoding.name(), "unmappable characters written as character references");
        }
        Ok(encoded.into_owned())
    }

    fn parse_text(&self, text: &str) -> Result<BpmnModel, ConvertError> {
        let mut model = parse_document(text, &self.registry, &self.options)?;
        link(&mut model);
        tracing::debug!(
            processes = model.processes.len(),
            pools = model.pools.len(),
            "parsed document"
        );
        Ok(model)
    }

    fn encoding(&self) -> Result<&'static Encoding, ConvertError> {
        Encoding::for_label(self.options.encoding.as_bytes())
            .ok_or_else(|| ConvertError::encoding(format!("unknown encoding '{}'", self.options.encoding)))
    }

    fn doctype_policy(&self) -> DoctypePolicy {
        if self.options.safe_xml {
            DoctypePolicy::Reject
        } else {
            DoctypePolicy::Tolerate
        }
    }

    /// Runs schema validation. Either strategy spends the stream it
    /// validates, so parsing opens another one.
    fn validate<P: InputStreamProvider + ?Sized>(
        &self,
        input: &P,
        encoding: &'static Encoding,
    ) -> Result<(), ConvertError> {
        let schema = Schema::load(&self.options)?;
        let stream = input.open()?;
        if !encoding.is_ascii_compatible() {
            let mut bytes = Vec::new();
            BufReader::new(stream).read_to_end(&mut bytes)?;
            let text = decode(&bytes, encoding)?;
            return schema.validate(text.as_bytes(), self.doctype_policy());
        }
        schema.validate(BufReader::new(stream), self.doctype_policy())
    }
}

/// Decodes a document, honoring a byte order mark over the configured
/// encoding.
fn decode<'b>(bytes: &'b [u8], encoding: &'static Encoding) -> Result<std::borrow::Cow<'b, str>, ConvertError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConvertError::encoding(format!("input is not valid {}", used.name())));
    }
    Ok(text)
}
