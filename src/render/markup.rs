//! Structured markup sinks the renderer writes into.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Error;

/// Class of the wrapper around per-profile alternatives.
pub const LANGUAGE_SPECIFIC_TEXT: &str = "languageSpecificText";

/// A generic structured-markup stream.
pub trait MarkupSink {
    /// Close the most recently opened element.
    ///
    /// # Errors
    ///
    /// Returns `Error::Markup` if no element is open or the sink rejects the write.
    fn end_element(&mut self) -> Result<(), Error>;

    /// Open an element with the given attributes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Markup` if the sink rejects the write.
    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error>;

    /// Write character data.
    ///
    /// # Errors
    ///
    /// Returns `Error::Markup` if the sink rejects the write.
    fn text(&mut self, text: &str) -> Result<(), Error>;
}

/// Map a quick-xml write failure into the crate error.
fn markup_error(e: impl std::fmt::Display) -> Error {
    return Error::Markup { reason: e.to_string() };
}

/// Escaping XML writer over an in-memory buffer.
pub struct XmlMarkup {
    /// Names of open elements, innermost last.
    open: Vec<String>,
    /// Underlying writer.
    writer: Writer<Vec<u8>>,
}

impl XmlMarkup {
    /// Finish and return the markup.
    ///
    /// # Errors
    ///
    /// Returns `Error::Markup` if elements are still open or the bytes are not UTF-8.
    pub fn into_string(self) -> Result<String, Error> {
        if let Some(name) = self.open.last() {
            return Err(Error::Markup { reason: format!("element `{name}` left open") });
        }
        return String::from_utf8(self.writer.into_inner()).map_err(markup_error);
    }

    /// Create an empty document fragment.
    pub fn new() -> Self {
        return Self {
            open: Vec::new(),
            writer: Writer::new(Vec::new()),
        };
    }
}

impl Default for XmlMarkup {
    fn default() -> Self {
        return Self::new();
    }
}

impl MarkupSink for XmlMarkup {
    fn end_element(&mut self) -> Result<(), Error> {
        let name = self.open.pop().ok_or_else(|| {
            return Error::Markup { reason: "end_element without an open element".to_string() };
        })?;
        return self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(markup_error);
    }

    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(markup_error)?;
        self.open.push(name.to_string());
        return Ok(());
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        return self.writer.write_event(Event::Text(BytesText::new(text))).map_err(markup_error);
    }
}

/// Plain text as a reader who selected one profile would see it.
///
/// Alternatives for other profiles inside a `languageSpecificText` wrapper
/// are dropped; all other text is kept.
#[derive(Debug)]
pub struct ProfileText {
    /// Profile class to keep.
    class: String,
    /// Accumulated text.
    out: String,
    /// Per open element: whether it is a wrapper, and whether its text is visible.
    stack: Vec<(bool, bool)>,
}

impl ProfileText {
    /// The accumulated text.
    pub fn as_str(&self) -> &str {
        return &self.out;
    }

    /// Consume the sink, returning the text.
    pub fn into_string(self) -> String {
        return self.out;
    }

    /// Create an empty sink for `class`.
    pub fn new(class: &str) -> Self {
        return Self {
            class: class.to_string(),
            out: String::new(),
            stack: Vec::new(),
        };
    }

    /// Whether text written now is visible.
    fn visible(&self) -> bool {
        return self.stack.last().is_none_or(|&(_, visible)| return visible);
    }
}

impl MarkupSink for ProfileText {
    fn end_element(&mut self) -> Result<(), Error> {
        return self.stack.pop().map(|_| return ()).ok_or_else(|| {
            return Error::Markup { reason: "end_element without an open element".to_string() };
        });
    }

    fn start_element(&mut self, _name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let class = attributes
            .iter()
            .find(|(key, _)| return *key == "class")
            .map(|(_, value)| return *value);
        let in_wrapper = self.stack.last().is_some_and(|&(wrapper, _)| return wrapper);
        let selected = !in_wrapper || class == Some(self.class.as_str());
        let visible = self.visible() && selected;
        self.stack.push((class == Some(LANGUAGE_SPECIFIC_TEXT), visible));
        return Ok(());
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        if self.visible() {
            self.out.push_str(text);
        }
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_alternatives(sink: &mut dyn MarkupSink) {
        sink.text("List").unwrap();
        sink.start_element("span", &[("class", LANGUAGE_SPECIFIC_TEXT)]).unwrap();
        for (class, text) in [("cs", "<"), ("vb", "(Of ")] {
            sink.start_element("span", &[("class", class)]).unwrap();
            sink.text(text).unwrap();
            sink.end_element().unwrap();
        }
        sink.end_element().unwrap();
        sink.text("T").unwrap();
    }

    #[test]
    fn xml_markup_escapes_text() {
        let mut xml = XmlMarkup::new();
        write_alternatives(&mut xml);
        assert_eq!(
            xml.into_string().unwrap(),
            r#"List<span class="languageSpecificText"><span class="cs">&lt;</span><span class="vb">(Of </span></span>T"#
        );
    }

    #[test]
    fn profile_text_keeps_only_its_alternative() {
        let mut vb = ProfileText::new("vb");
        write_alternatives(&mut vb);
        assert_eq!(vb.as_str(), "List(Of T");

        let mut cpp = ProfileText::new("cpp");
        write_alternatives(&mut cpp);
        assert_eq!(cpp.into_string(), "ListT");
    }

    #[test]
    fn unbalanced_end_is_an_error() {
        let mut xml = XmlMarkup::new();
        assert!(matches!(xml.end_element(), Err(Error::Markup { .. })));
        xml.start_element("span", &[]).unwrap();
        assert!(xml.into_string().is_err());
    }
}
