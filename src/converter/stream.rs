//! Forward-only, namespace-resolving token stream over a decoded document.
//!
//! Wraps `quick_xml::NsReader` and flattens its events into [`XmlToken`]s:
//! empty elements are expanded into start/end pairs, prolog noise (declaration,
//! comments, processing instructions, DOCTYPE) is dropped, and every start tag
//! carries its resolved namespace and source [`Position`].
//!
//! Sub-parsers consume whole subtrees through [`XmlStream::read_children`],
//! [`XmlStream::read_subtree`], [`XmlStream::read_text`] or
//! [`XmlStream::skip_element`], so the stream is always positioned just after
//! the end tag of whatever a handler was given.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};

use super::ConvertError;
use super::constants::namespace;
use crate::base::{LineIndex, Position};
use crate::model::{ExtensionAttribute, ExtensionElement};

/// One attribute of a start tag, namespace declarations excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

/// A resolved start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<XmlAttribute>,
    /// `(prefix, uri)` pairs; the default namespace has an empty prefix.
    pub namespace_declarations: Vec<(String, String)>,
    pub position: Position,
}

impl StartTag {
    /// The local name when the tag is in the BPMN model namespace or unbound.
    pub fn bpmn_name(&self) -> Option<&str> {
        match self.namespace.as_deref() {
            None => Some(&self.local_name),
            Some(ns) if ns == namespace::BPMN => Some(&self.local_name),
            _ => None,
        }
    }

    /// The local name when the tag is in the vendor namespace.
    pub fn vendor_name(&self) -> Option<&str> {
        self.in_namespace(namespace::VENDOR)
            .then_some(self.local_name.as_str())
    }

    pub fn in_namespace(&self, uri: &str) -> bool {
        self.namespace.as_deref() == Some(uri)
    }

    /// Non-empty value of an unqualified attribute.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attr_in(None, local)
    }

    /// Non-empty value of a vendor-qualified attribute.
    pub fn vendor_attr(&self, local: &str) -> Option<&str> {
        self.attr_in(Some(namespace::VENDOR), local)
    }

    pub fn attr_in(&self, uri: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.local_name == local && attr.namespace.as_deref() == uri)
            .map(|attr| attr.value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn attr_string(&self, local: &str) -> Option<String> {
        self.attr(local).map(str::to_string)
    }

    pub fn vendor_attr_string(&self, local: &str) -> Option<String> {
        self.vendor_attr(local).map(str::to_string)
    }

    /// The `id` attribute, empty when absent.
    pub fn id(&self) -> String {
        self.attr("id").unwrap_or_default().to_string()
    }

    /// Builds a generic extension element carrying this tag's name and
    /// attributes, without children or text.
    pub fn to_extension_element(&self) -> ExtensionElement {
        let mut element = ExtensionElement::new(&self.local_name);
        element.namespace = self.namespace.clone();
        element.namespace_prefix = self.prefix.clone();
        element.id = self.attr_string("id");
        element.position = Some(self.position);
        for attr in &self.attributes {
            element.add_attribute(ExtensionAttribute {
                name: attr.local_name.clone(),
                value: attr.value.clone(),
                namespace: attr.namespace.clone(),
                namespace_prefix: attr.prefix.clone(),
            });
        }
        element
    }
}

/// A token of the flattened event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    Start(StartTag),
    End,
    Text(String),
    CData(String),
    Eof,
}

/// Parses a `true`/`false` literal, ignoring case.
pub fn parse_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct XmlStream<'a> {
    reader: NsReader<&'a [u8]>,
    lines: LineIndex,
}

impl<'a> XmlStream<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut reader = NsReader::from_str(text);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(false);
        Self {
            reader,
            lines: LineIndex::new(text),
        }
    }

    /// Current position in the document.
    pub fn position(&self) -> Position {
        self.lines.position(self.reader.buffer_position() as usize)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ConvertError {
        ConvertError::stream(message, self.lines.position(offset))
    }

    pub fn next_token(&mut self) -> Result<XmlToken, ConvertError> {
        loop {
            let offset = self.reader.buffer_position() as usize;
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    let at = self.reader.error_position() as usize;
                    return Err(self.error(e.to_string(), at));
                }
            };
            match event {
                Event::Start(start) => return self.start_tag(&start, offset).map(XmlToken::Start),
                Event::End(_) => return Ok(XmlToken::End),
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| self.error(e.to_string(), offset))?;
                    return Ok(XmlToken::Text(text.into_owned()));
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| self.error(format!("invalid UTF-8 in CDATA: {e}"), offset))?;
                    return Ok(XmlToken::CData(text.to_string()));
                }
                Event::Eof => return Ok(XmlToken::Eof),
                _ => {}
            }
        }
    }

    fn start_tag(&self, start: &BytesStart<'_>, offset: usize) -> Result<StartTag, ConvertError> {
        let utf8 = |bytes: &[u8]| {
            std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| self.error(format!("invalid UTF-8 in name: {e}"), offset))
        };

        let (resolved, local) = self.reader.resolve_element(start.name());
        let namespace = self.namespace_of(resolved, offset)?;
        let local_name = utf8(local.as_ref())?;
        let prefix = start.name().prefix().map(|p| utf8(p.as_ref())).transpose()?;

        let mut attributes = Vec::new();
        let mut namespace_declarations = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.error(e.to_string(), offset))?;
            let value = attr
                .unescape_value()
                .map_err(|e| self.error(e.to_string(), offset))?
                .into_owned();
            if let Some(binding) = attr.key.as_namespace_binding() {
                let declared = match binding {
                    PrefixDeclaration::Default => String::new(),
                    PrefixDeclaration::Named(name) => utf8(name)?,
                };
                namespace_declarations.push((declared, value));
                continue;
            }
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            attributes.push(XmlAttribute {
                prefix: attr.key.prefix().map(|p| utf8(p.as_ref())).transpose()?,
                namespace: self.namespace_of(resolved, offset)?,
                local_name: utf8(local.as_ref())?,
                value,
            });
        }

        Ok(StartTag {
            prefix,
            namespace,
            local_name,
            attributes,
            namespace_declarations,
            position: self.lines.position(offset),
        })
    }

    fn namespace_of(&self, resolved: ResolveResult<'_>, offset: usize) -> Result<Option<String>, ConvertError> {
        match resolved {
            ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
            ResolveResult::Unbound => Ok(None),
            ResolveResult::Unknown(prefix) => Err(self.error(
                format!("undeclared namespace prefix '{}'", String::from_utf8_lossy(&prefix)),
                offset,
            )),
        }
    }

    fn unexpected_eof(&self, tag: &str) -> ConvertError {
        ConvertError::stream(
            format!("unexpected end of document inside <{tag}>"),
            self.position(),
        )
    }

    /// Hands every child start tag of `tag` to `f`, which must consume the
    /// child's subtree. Returns after the end tag of `tag`.
    pub fn read_children<F>(&mut self, tag: &StartTag, mut f: F) -> Result<(), ConvertError>
    where
        F: FnMut(&mut Self, &StartTag) -> Result<(), ConvertError>,
    {
        loop {
            match self.next_token()? {
                XmlToken::Start(child) => f(self, &child)?,
                XmlToken::End => return Ok(()),
                XmlToken::Text(_) | XmlToken::CData(_) => {}
                XmlToken::Eof => return Err(self.unexpected_eof(&tag.local_name)),
            }
        }
    }

    /// Discards the rest of the element whose start tag was just read.
    pub fn skip_element(&mut self, tag: &StartTag) -> Result<(), ConvertError> {
        let mut depth = 1usize;
        loop {
            match self.next_token()? {
                XmlToken::Start(_) => depth += 1,
                XmlToken::End => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                XmlToken::Text(_) | XmlToken::CData(_) => {}
                XmlToken::Eof => return Err(self.unexpected_eof(&tag.local_name)),
            }
        }
    }

    /// Concatenated text and CDATA content of the element, untrimmed.
    /// Nested element tags are dropped but their text is kept.
    pub fn read_text(&mut self, tag: &StartTag) -> Result<String, ConvertError> {
        let mut text = String::new();
        let mut depth = 1usize;
        loop {
            match self.next_token()? {
                XmlToken::Start(_) => depth += 1,
                XmlToken::End => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                XmlToken::Text(chunk) | XmlToken::CData(chunk) => text.push_str(&chunk),
                XmlToken::Eof => return Err(self.unexpected_eof(&tag.local_name)),
            }
        }
    }

    /// Trimmed text content, `None` when blank.
    pub fn read_trimmed_text(&mut self, tag: &StartTag) -> Result<Option<String>, ConvertError> {
        let text = self.read_text(tag)?;
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// Reads the element as a generic tree. Text is the trimmed concatenation
    /// of the element's own text and CDATA pieces.
    pub fn read_subtree(&mut self, tag: &StartTag) -> Result<ExtensionElement, ConvertError> {
        let mut element = tag.to_extension_element();
        let mut text = String::new();
        loop {
            match self.next_token()? {
                XmlToken::Start(child) => {
                    let child = self.read_subtree(&child)?;
                    element.add_child_element(child);
                }
                XmlToken::Text(chunk) | XmlToken::CData(chunk) => text.push_str(&chunk),
                XmlToken::End => break,
                XmlToken::Eof => return Err(self.unexpected_eof(&tag.local_name)),
            }
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            element.element_text = Some(trimmed.to_string());
        }
        Ok(element)
    }
}
