use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{CellValue, columns};

/// Name given to the sheet of a generated course template.
pub const TEMPLATE_SHEET: &str = "Course";

/// A table that will be materialised as an Excel sheet. `None` leaves the
/// cell empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<CellValue>>>,
}

impl SheetTable {
    /// Table carrying the course header row followed by `rows`.
    pub fn course(rows: Vec<Vec<Option<CellValue>>>) -> Self {
        Self {
            sheet_name: TEMPLATE_SHEET.to_string(),
            columns: columns::ALL.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }
}

/// Writes an empty course template to `path`.
pub fn write_template(path: &Path) -> Result<()> {
    write_workbook(path, &SheetTable::course(Vec::new()))
}

/// Writes the provided table as a single-sheet workbook at `path`.
pub fn write_workbook(path: &Path, table: &SheetTable) -> Result<()> {
    let mut workbook = build_workbook(table)?;
    workbook.save(path)?;
    Ok(())
}

/// Serialises the provided table into an in-memory XLSX payload.
pub fn workbook_to_bytes(table: &SheetTable) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(table: &SheetTable) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        worksheet.set_column_width(col_idx as u16, header.len().max(12) as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                write_cell(worksheet, (row_idx + 1) as u32, col_idx as u16, value)?;
            }
        }
    }

    Ok(workbook)
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Text(text) => worksheet.write_string(row, col, text)?,
        CellValue::Number(number) => worksheet.write_number(row, col, *number)?,
        CellValue::Bool(flag) => worksheet.write_boolean(row, col, *flag)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::excel_read;
    use tempfile::tempdir;

    #[test]
    fn template_carries_every_course_column() {
        let temp_dir = tempdir().expect("temporary directory");
        let path = temp_dir.path().join("template.xlsx");

        write_template(&path).expect("template written");

        let mut workbook: calamine::Xlsx<_> =
            calamine::open_workbook(&path).expect("template readable");
        let range = calamine::Reader::worksheet_range(&mut workbook, TEMPLATE_SHEET)
            .expect("course sheet present")
            .expect("course sheet readable");
        let headers: Vec<String> = range
            .rows()
            .next()
            .expect("header row")
            .iter()
            .map(|cell| cell.to_string())
            .collect();

        assert_eq!(headers, columns::ALL);
        assert!(excel_read::read_rows(&path).expect("rows read").is_empty());
    }
}
