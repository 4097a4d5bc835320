use html_sheet::build_workbook;
use html_sheet::export_html;
use html_sheet::export_html_with;
use html_sheet::to_spreadsheet_color;
use html_sheet::CssStyleResolver;
use html_sheet::ExportOptions;
use html_sheet::HtmlDocument;
use html_sheet::HtmlSheetError;
use html_sheet::MemoryDocument;
use html_sheet::MergeRange;
use html_sheet::SpreadsheetError;
use html_sheet::WorkbookModel;
use html_sheet::WorkbookWriter;
use std::io::Cursor;
use std::io::Read;
use zip::ZipArchive;

fn workbook(html: &str) -> WorkbookModel {
    let document = HtmlDocument::parse(html);
    build_workbook(&document.tables(), &CssStyleResolver::new(), &ExportOptions::default()).unwrap()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
    content
}

#[test]
fn colspan_becomes_merge() {
    let workbook = workbook("<table><tr><td colspan='2'>Title</td></tr><tr><td>a</td><td>b</td></tr></table>");
    let grid = &workbook.sheets[0].grid;

    assert_eq!(grid.column_count(), 2);
    assert_eq!(grid.merges(), &[MergeRange { start_row: 0, start_col: 0, end_row: 0, end_col: 1 }]);
    assert!(grid.cell(0, 1).is_none());
    assert_eq!(grid.cell(1, 0).map(|cell| (cell.row, cell.col)), Some((1, 0)));
    assert_eq!(grid.cell(1, 1).map(|cell| (cell.row, cell.col)), Some((1, 1)));
}

#[test]
fn background_and_strong_text() {
    let workbook = workbook("<table><tr><td style='background-color:#ff0000'><strong>X</strong></td></tr></table>");
    let cell = workbook.sheets[0].grid.cell(0, 0).unwrap();

    assert_eq!(cell.style.fill_color.map(|color| color.to_string()), Some("FFFF0000".to_owned()));
    assert!(cell.style.bold);
    assert_eq!(cell.raw_content, "X");
}

#[test]
fn nested_table_is_flattened_into_cell() {
    let workbook = workbook(
        "<table><tr><td><table><tr><td>A</td><td>B</td></tr><tr><td>C</td><td>D</td></tr></table></td></tr></table>",
    );

    assert_eq!(workbook.sheets.len(), 1);
    assert_eq!(workbook.sheets[0].grid.cell(0, 0).unwrap().raw_content, "A | B\nC | D");
    assert_eq!(workbook.sheets[0].row_heights, vec![36.0]);
}

#[test]
fn ragged_rows_are_padded() {
    let workbook = workbook(
        "<table><tr><td>1</td><td>2</td><td>3</td></tr>\
         <tr><td>1</td><td>2</td></tr>\
         <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr></table>",
    );
    let grid = &workbook.sheets[0].grid;

    assert_eq!(grid.column_count(), 4);
    assert!(grid.rows().iter().all(|row| row.len() == 4));
    for (row, col) in [(0, 3), (1, 2), (1, 3)] {
        let cell = grid.cell(row, col).unwrap();
        assert_eq!(cell.raw_content, " ");
        assert!(!cell.is_merged());
    }
    assert!(grid.merges().is_empty());
}

#[test]
fn translucent_rgba_color() {
    let color = to_spreadsheet_color("rgba(10,20,30,0.5)");
    assert_eq!(color.to_string(), "800A141E");
    assert_eq!(color.alpha(), 0x80);
}

#[test]
fn export_produces_xlsx_package() {
    let options = ExportOptions { sheet_name_prefix: "表格".to_owned(), ..ExportOptions::default() };
    let bytes = export_html(
        "<html><body><h1>Report</h1>\
         <table><thead><tr><th colspan='2' style='color: rgb(0, 0, 255)'>Q1</th></tr></thead>\
         <tbody><tr><td bgcolor='yellow'>north</td><td align='right'>12</td></tr></tbody></table>\
         </body></html>",
        &options,
    )
    .unwrap();

    assert!(read_part(&bytes, "xl/workbook.xml").contains("<sheet name=\"表格 1\""));
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<mergeCell ref=\"A1:B1\"/>"));
    assert!(sheet.contains("<t xml:space=\"preserve\">north</t>"));
    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("<fgColor rgb=\"FFFFFF00\"/>"));
    assert!(styles.contains("<color rgb=\"FF0000FF\"/>"));
    assert!(styles.contains("horizontal=\"right\""));
}

#[test]
fn document_without_tables_fails() {
    let result = export_html("<p>nothing to export</p>", &ExportOptions::default());
    assert!(matches!(result, Err(HtmlSheetError::SpreadsheetError(SpreadsheetError::NoTablesFound))));
}

#[test]
fn in_memory_documents_are_exported() {
    let mut document = MemoryDocument::new();
    let table = document.element(None, "table");
    let row = document.element(Some(table), "tr");
    let cell = document.element(Some(row), "th");
    document.text(cell, "Header");

    let tables = document.elements_by_tag("table");
    let workbook = build_workbook(&tables, &CssStyleResolver::new(), &ExportOptions::default()).unwrap();
    let cell = workbook.sheets[0].grid.cell(0, 0).unwrap();
    assert!(cell.is_header && cell.style.bold);
}

/// Tab-separated dump of the first sheet.
struct TsvWriter;

impl WorkbookWriter for TsvWriter {
    fn extension(&self) -> &'static str {
        "tsv"
    }

    fn mime_type(&self) -> &'static str {
        "text/tab-separated-values"
    }

    fn write(&self, workbook: &WorkbookModel) -> Result<Vec<u8>, HtmlSheetError> {
        if workbook.sheets.len() != 1 {
            return Err(anyhow::anyhow!("expected one sheet, got {}", workbook.sheets.len()).into());
        }
        let lines: Vec<String> = workbook.sheets[0]
            .grid
            .rows()
            .iter()
            .map(|row| {
                let cells: Vec<&str> = row
                    .iter()
                    .map(|cell| cell.as_ref().map_or("", |cell| cell.raw_content.as_str()))
                    .collect();
                cells.join("\t")
            })
            .collect();
        Ok(lines.join("\n").into_bytes())
    }
}

#[test]
fn custom_writers_plug_in() {
    let bytes = export_html_with(
        "<table><tr><td>a</td><td>b</td></tr><tr><td colspan='2'>c</td></tr></table>",
        &ExportOptions::default(),
        &TsvWriter,
    )
    .unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "a\tb\nc\t");

    let result = export_html_with(
        "<table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table>",
        &ExportOptions::default(),
        &TsvWriter,
    );
    assert!(matches!(result, Err(HtmlSheetError::AnyhowError(_))));
}
