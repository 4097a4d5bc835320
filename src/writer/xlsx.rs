//! Office Open XML (`.xlsx`) package writer.
//!
//! Cells are written as inline strings, so the package carries no shared
//! string table. Coordinates consumed by a merge are still emitted, as empty
//! cells styled like their anchor, so borders render along the whole range.

use crate::error::HtmlSheetError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlWriter;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::workbook::Sheet;
use crate::spreadsheet::workbook::WorkbookModel;
use crate::writer::styles::StyleTable;
use crate::writer::WorkbookWriter;
use crate::writer::WriterError;
use crate::writer::MAX_COLUMNS;
use crate::writer::MAX_ROWS;
use crate::writer::NS_MAIN;
use crate::writer::NS_RELATIONSHIPS;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use std::io::Cursor;
use tracing::debug;
use tracing::info;
use zip::ZipWriter;

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CORE_PROPERTIES: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const NS_EXTENDED_PROPERTIES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

const REL_OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str = "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPERTIES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_EXTENDED_PROPERTIES: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Writes workbooks as `.xlsx` packages.
#[derive(Clone, Debug)]
pub struct XlsxWriter {
    /// Sets `wrapText` on every cell format.
    pub wrap_text: bool,

    /// Creation timestamp stored in `docProps/core.xml`.
    pub created: DateTime<Utc>,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        XlsxWriter { wrap_text: true, created: Utc::now() }
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn with_wrap_text(mut self, wrap_text: bool) -> Self {
        self.wrap_text = wrap_text;
        self
    }
}

impl WorkbookWriter for XlsxWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn mime_type(&self) -> &'static str {
        XLSX_MIME_TYPE
    }

    fn write(&self, workbook: &WorkbookModel) -> Result<Vec<u8>, HtmlSheetError> {
        if workbook.sheets.is_empty() {
            return Err(WriterError::EmptyWorkbook.into());
        }
        for sheet in &workbook.sheets {
            check_limits(sheet)?;
        }

        let sheet_count = workbook.sheets.len();
        let mut styles = StyleTable::new(self.wrap_text);
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

        archive.write_xml_part("[Content_Types].xml", |writer| write_content_types(writer, sheet_count))?;
        archive.write_xml_part("_rels/.rels", write_package_relationships)?;
        archive.write_xml_part("docProps/core.xml", |writer| write_core_properties(writer, &self.created))?;
        archive.write_xml_part("docProps/app.xml", |writer| write_app_properties(writer, workbook))?;
        archive.write_xml_part("xl/workbook.xml", |writer| write_workbook(writer, workbook))?;
        archive.write_xml_part("xl/_rels/workbook.xml.rels", |writer| write_workbook_relationships(writer, sheet_count))?;

        for (index, sheet) in workbook.sheets.iter().enumerate() {
            let name = format!("xl/worksheets/sheet{}.xml", index + 1);
            archive
                .write_xml_part(&name, |writer| write_worksheet(writer, sheet, &mut styles))
                .with_prefix(&format!("Failed to write sheet '{}'", sheet.name))?;
            debug!("{} written as {}", sheet.name, name);
        }

        // after the sheets, which register the formats they use
        archive.write_xml_part("xl/styles.xml", |writer| styles.write(writer))?;

        let bytes = archive.finish()?.into_inner();
        info!("wrote xlsx package: {} sheets, {} cell formats, {} bytes", sheet_count, styles.format_count(), bytes.len());
        Ok(bytes)
    }
}

fn check_limits(sheet: &Sheet) -> Result<(), WriterError> {
    let rows = sheet.grid.row_count();
    let columns = sheet.grid.column_count();
    if rows > MAX_ROWS || columns > MAX_COLUMNS {
        return Err(WriterError::SheetTooLarge { name: sheet.name.clone(), rows, columns });
    }
    Ok(())
}

/// Widths and heights rounded to two decimals, without trailing zeros.
fn format_measure(value: f64) -> String {
    ((value * 100.0).round() / 100.0).to_string()
}

fn write_content_types(writer: &mut XmlWriter<Vec<u8>>, sheet_count: usize) -> Result<(), HtmlSheetError> {
    writer.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    writer.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
    writer.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    writer.empty("Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)])?;
    for index in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{index}.xml");
        writer.empty("Override", &[("PartName", &part), ("ContentType", CT_WORKSHEET)])?;
    }
    writer.empty("Override", &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)])?;
    writer.empty("Override", &[("PartName", "/docProps/core.xml"), ("ContentType", CT_CORE_PROPERTIES)])?;
    writer.empty("Override", &[("PartName", "/docProps/app.xml"), ("ContentType", CT_EXTENDED_PROPERTIES)])?;
    writer.end("Types")
}

fn write_package_relationships(writer: &mut XmlWriter<Vec<u8>>) -> Result<(), HtmlSheetError> {
    writer.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    writer.empty("Relationship", &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", "xl/workbook.xml")])?;
    writer.empty("Relationship", &[("Id", "rId2"), ("Type", REL_CORE_PROPERTIES), ("Target", "docProps/core.xml")])?;
    writer.empty("Relationship", &[("Id", "rId3"), ("Type", REL_EXTENDED_PROPERTIES), ("Target", "docProps/app.xml")])?;
    writer.end("Relationships")
}

fn write_core_properties(writer: &mut XmlWriter<Vec<u8>>, created: &DateTime<Utc>) -> Result<(), HtmlSheetError> {
    let timestamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    writer.start("cp:coreProperties", &[
        ("xmlns:cp", NS_CORE_PROPERTIES),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ])?;
    writer.text_element("dc:creator", &[], env!("CARGO_PKG_NAME"))?;
    writer.text_element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &timestamp)?;
    writer.text_element("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &timestamp)?;
    writer.end("cp:coreProperties")
}

fn write_app_properties(writer: &mut XmlWriter<Vec<u8>>, workbook: &WorkbookModel) -> Result<(), HtmlSheetError> {
    let sheet_count = workbook.sheets.len().to_string();
    writer.start("Properties", &[("xmlns", NS_EXTENDED_PROPERTIES), ("xmlns:vt", "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes")])?;
    writer.text_element("Application", &[], env!("CARGO_PKG_NAME"))?;

    writer.start("HeadingPairs", &[])?;
    writer.start("vt:vector", &[("size", "2"), ("baseType", "variant")])?;
    writer.start("vt:variant", &[])?;
    writer.text_element("vt:lpstr", &[], "Worksheets")?;
    writer.end("vt:variant")?;
    writer.start("vt:variant", &[])?;
    writer.text_element("vt:i4", &[], &sheet_count)?;
    writer.end("vt:variant")?;
    writer.end("vt:vector")?;
    writer.end("HeadingPairs")?;

    writer.start("TitlesOfParts", &[])?;
    writer.start("vt:vector", &[("size", &sheet_count), ("baseType", "lpstr")])?;
    for sheet in &workbook.sheets {
        writer.text_element("vt:lpstr", &[], &sheet.name)?;
    }
    writer.end("vt:vector")?;
    writer.end("TitlesOfParts")?;

    writer.end("Properties")
}

fn write_workbook(writer: &mut XmlWriter<Vec<u8>>, workbook: &WorkbookModel) -> Result<(), HtmlSheetError> {
    writer.start("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    writer.start("bookViews", &[])?;
    writer.empty("workbookView", &[("activeTab", "0")])?;
    writer.end("bookViews")?;
    writer.start("sheets", &[])?;
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let relationship = format!("rId{}", index + 1);
        writer.empty("sheet", &[("name", &sheet.name), ("sheetId", &sheet_id), ("r:id", &relationship)])?;
    }
    writer.end("sheets")?;
    writer.end("workbook")
}

/// Worksheets take `rId1..=rIdN`, styles the id after them.
fn write_workbook_relationships(writer: &mut XmlWriter<Vec<u8>>, sheet_count: usize) -> Result<(), HtmlSheetError> {
    writer.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    for index in 1..=sheet_count {
        let id = format!("rId{index}");
        let target = format!("worksheets/sheet{index}.xml");
        writer.empty("Relationship", &[("Id", &id), ("Type", REL_WORKSHEET), ("Target", &target)])?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    writer.empty("Relationship", &[("Id", &styles_id), ("Type", REL_STYLES), ("Target", "styles.xml")])?;
    writer.end("Relationships")
}

fn write_worksheet(writer: &mut XmlWriter<Vec<u8>>, sheet: &Sheet, styles: &mut StyleTable) -> Result<(), HtmlSheetError> {
    let grid = &sheet.grid;
    writer.start("worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;

    let dimension = match (grid.row_count(), grid.column_count()) {
        (0, _) | (_, 0) => "A1".to_owned(),
        (rows, columns) => format!("A1:{}", index_to_reference(rows - 1, columns - 1)),
    };
    writer.empty("dimension", &[("ref", &dimension)])?;

    if !sheet.column_widths.is_empty() {
        writer.start("cols", &[])?;
        for (index, width) in sheet.column_widths.iter().enumerate() {
            let column = (index + 1).to_string();
            let width = format_measure(*width);
            writer.empty("col", &[("min", &column), ("max", &column), ("width", &width), ("customWidth", "1")])?;
        }
        writer.end("cols")?;
    }

    writer.start("sheetData", &[])?;
    for (row, cells) in grid.rows().iter().enumerate() {
        let number = (row + 1).to_string();
        let height = sheet.row_heights.get(row).map(|height| format_measure(*height));
        let mut attributes = vec![("r", number.as_str())];
        if let Some(height) = &height {
            attributes.push(("ht", height.as_str()));
            attributes.push(("customHeight", "1"));
        }
        writer.start("row", &attributes)?;

        for (col, slot) in cells.iter().enumerate() {
            let reference = index_to_reference(row, col);
            match slot {
                Some(cell) => {
                    let style = styles.register(&cell.style).to_string();
                    writer.start("c", &[("r", &reference), ("s", &style), ("t", "inlineStr")])?;
                    writer.start("is", &[])?;
                    writer.text_element("t", &[("xml:space", "preserve")], &cell.raw_content)?;
                    writer.end("is")?;
                    writer.end("c")?;
                }
                None => {
                    let style = grid
                        .covering_cell(row, col)
                        .map_or(0, |anchor| styles.register(&anchor.style))
                        .to_string();
                    writer.empty("c", &[("r", &reference), ("s", &style)])?;
                }
            }
        }
        writer.end("row")?;
    }
    writer.end("sheetData")?;

    let merges = sheet.merges();
    if !merges.is_empty() {
        writer.start("mergeCells", &[("count", &merges.len().to_string())])?;
        for merge in merges {
            writer.empty("mergeCell", &[("ref", &merge.reference())])?;
        }
        writer.end("mergeCells")?;
    }

    writer.end("worksheet")
}
