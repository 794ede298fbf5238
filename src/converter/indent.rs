//! Pretty-printing decorator for an [`XmlEmitter`].
//!
//! Indentation is only ever inserted between tags. Text and CDATA pass
//! through untouched, and an element whose content is text gets no newline
//! before its end tag, so literal bodies (scripts, documentation, conditions)
//! keep their exact content.

use super::ConvertError;
use super::writer::XmlEmitter;

/// What the current nesting level has emitted so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelState {
    Nothing,
    Element,
    Text,
}

pub struct IndentingWriter<E> {
    inner: E,
    indent: String,
    depth: usize,
    state: LevelState,
    stack: Vec<LevelState>,
}

impl<E: XmlEmitter> IndentingWriter<E> {
    pub fn new(inner: E, indent: impl Into<String>) -> Self {
        Self {
            inner,
            indent: indent.into(),
            depth: 0,
            state: LevelState::Nothing,
            stack: Vec::new(),
        }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn newline_and_indent(&mut self) -> Result<(), ConvertError> {
        let mut text = String::with_capacity(1 + self.indent.len() * self.depth);
        text.push('\n');
        for _ in 0..self.depth {
            text.push_str(&self.indent);
        }
        self.inner.whitespace(&text)
    }
}

impl<E: XmlEmitter> XmlEmitter for IndentingWriter<E> {
    fn write_declaration(&mut self, encoding: &str) -> Result<(), ConvertError> {
        self.inner.write_declaration(encoding)?;
        self.inner.whitespace("\n")
    }

    fn start_element(&mut self, name: &str) -> Result<(), ConvertError> {
        // The parent resumes with a child element seen.
        self.stack.push(LevelState::Element);
        self.state = LevelState::Nothing;
        if self.depth > 0 {
            self.newline_and_indent()?;
        }
        self.depth += 1;
        self.inner.start_element(name)
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), ConvertError> {
        self.inner.attribute(name, value)
    }

    fn characters(&mut self, text: &str) -> Result<(), ConvertError> {
        self.state = LevelState::Text;
        self.inner.characters(text)
    }

    fn cdata(&mut self, text: &str) -> Result<(), ConvertError> {
        self.state = LevelState::Text;
        self.inner.cdata(text)
    }

    fn end_element(&mut self) -> Result<(), ConvertError> {
        self.depth = self.depth.saturating_sub(1);
        if self.state == LevelState::Element {
            self.newline_and_indent()?;
        }
        self.state = self.stack.pop().unwrap_or(LevelState::Nothing);
        self.inner.end_element()
    }

    fn whitespace(&mut self, text: &str) -> Result<(), ConvertError> {
        self.inner.whitespace(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::writer::QuickXmlEmitter;

    fn render(build: impl FnOnce(&mut IndentingWriter<QuickXmlEmitter>)) -> String {
        let mut w = IndentingWriter::new(QuickXmlEmitter::new(), "  ");
        build(&mut w);
        String::from_utf8(w.into_inner().into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_nested_elements_are_indented() {
        let out = render(|w| {
            w.start_element("a").unwrap();
            w.start_element("b").unwrap();
            w.start_element("c").unwrap();
            w.end_element().unwrap();
            w.end_element().unwrap();
            w.end_element().unwrap();
        });
        assert_eq!(out, "<a>\n  <b>\n    <c/>\n  </b>\n</a>");
    }

    #[test]
    fn test_text_content_stays_inline() {
        let out = render(|w| {
            w.start_element("a").unwrap();
            w.start_element("script").unwrap();
            w.cdata("x = 1;\n  y = 2;").unwrap();
            w.end_element().unwrap();
            w.start_element("doc").unwrap();
            w.characters("hello").unwrap();
            w.end_element().unwrap();
            w.end_element().unwrap();
        });
        assert_eq!(
            out,
            "<a>\n  <script><![CDATA[x = 1;\n  y = 2;]]></script>\n  <doc>hello</doc>\n</a>"
        );
    }
}
