//! Tag/attribute/text emitter used by every converter on the write side.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::ConvertError;

/// A streaming XML sink.
///
/// Attributes attach to the most recently started element and must be written
/// before any content of that element.
pub trait XmlEmitter {
    fn write_declaration(&mut self, encoding: &str) -> Result<(), ConvertError>;

    fn start_element(&mut self, name: &str) -> Result<(), ConvertError>;

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), ConvertError>;

    /// Escaped character data.
    fn characters(&mut self, text: &str) -> Result<(), ConvertError>;

    /// Literal character data.
    fn cdata(&mut self, text: &str) -> Result<(), ConvertError>;

    /// Closes the innermost open element.
    fn end_element(&mut self) -> Result<(), ConvertError>;

    /// Formatting whitespace, written as is.
    fn whitespace(&mut self, text: &str) -> Result<(), ConvertError>;
}

/// Writes an element holding a single escaped text child.
pub fn text_element(w: &mut dyn XmlEmitter, name: &str, text: &str) -> Result<(), ConvertError> {
    w.start_element(name)?;
    w.characters(text)?;
    w.end_element()
}

/// Writes an attribute only when a value is present and non-empty.
pub fn optional_attribute(
    w: &mut dyn XmlEmitter,
    name: &str,
    value: Option<&str>,
) -> Result<(), ConvertError> {
    match value {
        Some(value) if !value.is_empty() => w.attribute(name, value),
        _ => Ok(()),
    }
}

/// Emitter backed by `quick_xml::Writer` over an in-memory buffer.
///
/// The start tag is held back until content or the end tag arrives, so
/// elements without content are written in self-closing form.
pub struct QuickXmlEmitter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl Default for QuickXmlEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickXmlEmitter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            pending: None,
            open: Vec::new(),
        }
    }

    /// The written bytes. Fails if elements are still open.
    pub fn into_inner(mut self) -> Result<Vec<u8>, ConvertError> {
        self.flush_pending()?;
        if let Some(name) = self.open.last() {
            return Err(ConvertError::write(format!("element <{name}> was never closed")));
        }
        Ok(self.writer.into_inner())
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), ConvertError> {
        self.writer
            .write_event(event)
            .map_err(|e| ConvertError::write(format!("Write error: {e}")))
    }

    fn flush_pending(&mut self) -> Result<(), ConvertError> {
        match self.pending.take() {
            Some(start) => self.emit(Event::Start(start)),
            None => Ok(()),
        }
    }
}

impl XmlEmitter for QuickXmlEmitter {
    fn write_declaration(&mut self, encoding: &str) -> Result<(), ConvertError> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some(encoding), None)))
    }

    fn start_element(&mut self, name: &str) -> Result<(), ConvertError> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), ConvertError> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(ConvertError::write(format!(
                "attribute '{name}' written outside a start tag"
            ))),
        }
    }

    fn characters(&mut self, text: &str) -> Result<(), ConvertError> {
        self.flush_pending()?;
        self.emit(Event::Text(BytesText::new(text)))
    }

    fn cdata(&mut self, text: &str) -> Result<(), ConvertError> {
        // A CDATA section cannot contain its own terminator.
        if text.contains("]]>") {
            return self.characters(text);
        }
        self.flush_pending()?;
        self.emit(Event::CData(BytesCData::new(text)))
    }

    fn end_element(&mut self) -> Result<(), ConvertError> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| ConvertError::write("end tag without open element"))?;
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(name))),
        }
    }

    fn whitespace(&mut self, text: &str) -> Result<(), ConvertError> {
        self.flush_pending()?;
        self.emit(Event::Text(BytesText::from_escaped(text)))
    }
}
