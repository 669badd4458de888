use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{CellValue, RowRecord};

/// Container formats the decoder recognises, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Xls,
    Xlsx,
    Xlsb,
    Ods,
}

impl SheetFormat {
    const ALL: [SheetFormat; 4] = [
        SheetFormat::Xls,
        SheetFormat::Xlsx,
        SheetFormat::Xlsb,
        SheetFormat::Ods,
    ];

    /// Opens `bytes` as this format. `Ok(None)` means the container opened
    /// but exposes no sheet, which zip-based readers report for each other's
    /// archives.
    fn first_sheet(self, bytes: &[u8]) -> std::result::Result<Option<Range<DataType>>, String> {
        match self {
            SheetFormat::Xls => first_sheet::<Xls<_>>(bytes),
            SheetFormat::Xlsx => first_sheet::<Xlsx<_>>(bytes),
            SheetFormat::Xlsb => first_sheet::<Xlsb<_>>(bytes),
            SheetFormat::Ods => first_sheet::<Ods<_>>(bytes),
        }
    }
}

fn first_sheet<'a, R>(bytes: &'a [u8]) -> std::result::Result<Option<Range<DataType>>, String>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(|error| error.to_string())?;
    match workbook.worksheet_range_at(0) {
        Some(range) => range.map(Some).map_err(|error| error.to_string()),
        None => Ok(None),
    }
}

/// Reads the first sheet of the workbook stored at `path`.
pub fn read_rows(path: &Path) -> Result<Vec<RowRecord>> {
    let bytes = std::fs::read(path)?;
    decode_rows(&bytes)
}

/// Decodes an in-memory spreadsheet (XLS, XLSX, XLSB or ODS) into one
/// [`RowRecord`] per data row of its first sheet.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let mut opened_without_sheets = false;
    let mut failures = Vec::new();

    for format in SheetFormat::ALL {
        match format.first_sheet(bytes) {
            Ok(Some(range)) => {
                debug!(?format, "detected spreadsheet format");
                return Ok(rows_from_range(&range));
            }
            Ok(None) => opened_without_sheets = true,
            Err(error) => failures.push(format!("{format:?}: {error}")),
        }
    }

    if opened_without_sheets {
        Err(ToolError::Decode("workbook contains no sheets".into()))
    } else {
        Err(ToolError::Decode(format!(
            "unrecognised spreadsheet format ({})",
            failures.join("; ")
        )))
    }
}

/// The first non-blank row of `range` is treated as the header row and its
/// cell text becomes the field names of every following row. Rows are emitted
/// in sheet order; blank rows and cells under an empty header are dropped.
fn rows_from_range(range: &Range<DataType>) -> Vec<RowRecord> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|cell| cell_value(cell).is_none()));

    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row.iter().map(cell_to_string).collect(),
        None => return Vec::new(),
    };

    let mut records = Vec::new();
    for row in rows {
        let mut record = RowRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = cell_value(cell) {
                record.insert(header.clone(), value);
            }
        }

        if !record.is_empty() {
            records.push(record);
        }
    }

    debug!(
        header_count = headers.len(),
        row_count = records.len(),
        "decoded first sheet"
    );
    records
}

fn cell_value(cell: &DataType) -> Option<CellValue> {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::String(value) if value.is_empty() => None,
        DataType::String(value) => Some(CellValue::Text(value.clone())),
        DataType::Float(value) => Some(CellValue::Number(*value)),
        DataType::Int(value) => Some(CellValue::Number(*value as f64)),
        DataType::Bool(value) => Some(CellValue::Bool(*value)),
        other => Some(CellValue::Text(other.to_string())),
    }
}

fn cell_to_string(cell: &DataType) -> String {
    cell_value(cell)
        .map(|value| value.as_text())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::excel_write::{SheetTable, workbook_to_bytes};
    use crate::model::columns;

    fn sheet(columns: &[&str], rows: Vec<Vec<Option<CellValue>>>) -> SheetTable {
        SheetTable {
            sheet_name: "Course".into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn maps_header_names_onto_each_row() {
        let table = sheet(
            &[columns::SUBMODULE_TITLE, columns::SECTION_TITLE, columns::SECTION_TIME],
            vec![
                vec![Some("Basics".into()), Some("Vars".into()), Some(CellValue::Number(10.0))],
                vec![Some("Basics".into()), Some("Loops".into()), Some("20".into())],
            ],
        );
        let bytes = workbook_to_bytes(&table).expect("workbook written");

        let rows = decode_rows(&bytes).expect("rows decoded");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(columns::SECTION_TITLE).as_deref(), Some("Vars"));
        assert_eq!(rows[0].get(columns::SECTION_TIME), Some(&CellValue::Number(10.0)));
        assert_eq!(
            rows[1].get(columns::SECTION_TIME),
            Some(&CellValue::Text("20".into()))
        );
    }

    #[test]
    fn empty_cells_and_blank_rows_are_omitted() {
        let table = sheet(
            &[columns::SUBMODULE_TITLE, columns::SECTION_TITLE, "Notes"],
            vec![
                vec![Some("Basics".into()), None, Some("draft".into())],
                vec![None, None, None],
                vec![Some("Advanced".into()), Some("Generics".into()), None],
            ],
        );
        let bytes = workbook_to_bytes(&table).expect("workbook written");

        let rows = decode_rows(&bytes).expect("rows decoded");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(columns::SECTION_TITLE), None);
        assert_eq!(rows[0].text("Notes").as_deref(), Some("draft"));
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let table = sheet(&columns::ALL, Vec::new());
        let bytes = workbook_to_bytes(&table).expect("workbook written");

        assert!(decode_rows(&bytes).expect("rows decoded").is_empty());
    }

    #[test]
    fn header_below_blank_rows_is_found() {
        let mut range: Range<DataType> = Range::new((0, 0), (3, 1));
        range.set_value((1, 0), DataType::String(columns::SUBMODULE_TITLE.into()));
        range.set_value((1, 1), DataType::String(columns::SECTION_TITLE.into()));
        range.set_value((2, 0), DataType::String("Basics".into()));
        range.set_value((2, 1), DataType::String("Vars".into()));
        range.set_value((3, 0), DataType::String("Advanced".into()));
        range.set_value((3, 1), DataType::Int(7));

        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(columns::SUBMODULE_TITLE).as_deref(), Some("Basics"));
        assert_eq!(rows[0].text(columns::SECTION_TITLE).as_deref(), Some("Vars"));
        assert_eq!(rows[1].get(columns::SECTION_TITLE), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn blank_sheet_has_no_rows() {
        let range: Range<DataType> = Range::new((0, 0), (2, 2));
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn open_document_spreadsheet_is_decoded() {
        let bytes = ods_payload(&[
            &[columns::SUBMODULE_TITLE, columns::SECTION_TITLE],
            &["Basics", "Vars"],
            &["Basics", "Loops"],
        ]);

        let rows = decode_rows(&bytes).expect("rows decoded");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text(columns::SUBMODULE_TITLE).as_deref(), Some("Basics"));
        assert_eq!(rows[1].text(columns::SECTION_TITLE).as_deref(), Some("Loops"));
    }

    fn ods_payload(rows: &[&[&str]]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut content = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<office:document-content"#,
            r#" xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0""#,
            r#" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0""#,
            r#" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0""#,
            r#" office:version="1.2">"#,
            r#"<office:body><office:spreadsheet><table:table table:name="Course">"#,
        ));
        for row in rows {
            content.push_str("<table:table-row>");
            for cell in row.iter() {
                content.push_str(&format!(
                    r#"<table:table-cell office:value-type="string"><text:p>{cell}</text:p></table:table-cell>"#
                ));
            }
            content.push_str("</table:table-row>");
        }
        content.push_str("</table:table></office:spreadsheet></office:body></office:document-content>");

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
        archive.start_file("mimetype", options).expect("mimetype entry");
        archive
            .write_all(b"application/vnd.oasis.opendocument.spreadsheet")
            .expect("mimetype written");
        archive.start_file("content.xml", options).expect("content entry");
        archive
            .write_all(content.as_bytes())
            .expect("content written");
        archive.finish().expect("archive finished").into_inner()
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let result = decode_rows(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(ToolError::Decode(_))));
    }
}
