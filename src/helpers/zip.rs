//! ZIP archive helper utilities for writing Office Open XML packages.

use crate::error::HtmlSheetError;
use crate::helpers::xml::XmlWriter;
use std::io::Seek;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

/// Helper trait for ZIP archive operations on package parts.
pub(crate) trait ZipHelper {
    /// Writes a raw part into the archive.
    fn write_part(&mut self, name: &str, content: &[u8]) -> Result<(), HtmlSheetError>;

    /// Builds an XML part with an [`XmlWriter`] and writes it into the archive.
    fn write_xml_part<F>(&mut self, name: &str, build: F) -> Result<(), HtmlSheetError>
    where
        F: FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<(), HtmlSheetError>;
}

impl<W: Write + Seek> ZipHelper for ZipWriter<W> {
    fn write_part(&mut self, name: &str, content: &[u8]) -> Result<(), HtmlSheetError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.start_file(name, options)?;
        self.write_all(content)?;
        Ok(())
    }

    fn write_xml_part<F>(&mut self, name: &str, build: F) -> Result<(), HtmlSheetError>
    where
        F: FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<(), HtmlSheetError>,
    {
        let mut writer = XmlWriter::new(Vec::with_capacity(4096));
        writer.declaration()?;
        build(&mut writer)?;
        self.write_part(name, &writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn write_and_read_back_parts() {
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
        archive.write_part("mimetype", b"plain").unwrap();
        archive
            .write_xml_part("xl/workbook.xml", |writer| writer.empty("workbook", &[]))
            .unwrap();
        let bytes = archive.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name("xl/workbook.xml").unwrap().read_to_string(&mut content).unwrap();
        assert!(content.starts_with("<?xml"));
        assert!(content.ends_with("<workbook/>"));
        assert_eq!(archive.len(), 2);
    }
}
