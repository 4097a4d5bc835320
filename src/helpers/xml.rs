//! XML writing utilities for SpreadsheetML package parts.
//! Provides a thin wrapper over `quick_xml::Writer` with attribute-slice helpers.

use crate::error::HtmlSheetError;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::io::Write;

/// XML writer producing compact (unindented) UTF-8 output.
pub(crate) struct XmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlWriter<W> {
    pub(crate) fn new(inner: W) -> XmlWriter<W> {
        XmlWriter { writer: Writer::new(inner) }
    }

    /// Writes the standalone UTF-8 XML declaration.
    pub(crate) fn declaration(&mut self) -> Result<(), HtmlSheetError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(())
    }

    /// Opens an element with the given attributes.
    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), HtmlSheetError> {
        self.writer.write_event(Event::Start(element(name, attributes)))?;
        Ok(())
    }

    /// Writes a self-closing element.
    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), HtmlSheetError> {
        self.writer.write_event(Event::Empty(element(name, attributes)))?;
        Ok(())
    }

    /// Closes an element.
    pub(crate) fn end(&mut self, name: &str) -> Result<(), HtmlSheetError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes escaped character data, dropping characters XML 1.0 forbids.
    pub(crate) fn text(&mut self, text: &str) -> Result<(), HtmlSheetError> {
        let text = sanitize_xml_text(text);
        self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        Ok(())
    }

    /// Writes `<name ...>text</name>`.
    pub(crate) fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), HtmlSheetError> {
        self.start(name, attributes)?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for attribute in attributes {
        element.push_attribute(*attribute);
    }
    element
}

/// Removes control characters that are not allowed in XML 1.0 documents.
pub(crate) fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .filter(|character| {
            matches!(character, '\t' | '\n' | '\r')
                || (*character >= '\u{20}' && !matches!(character, '\u{FFFE}' | '\u{FFFF}'))
        })
        .collect()
}
