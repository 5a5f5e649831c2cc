//! `.xlsx` rendering.

use std::borrow::Cow;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::warn;

use registry_core::error::AppError;
use registry_core::traits::Record;

use super::columns::{cell_text, union_columns};

const SHEET_NAME: &str = "Documentos";
/// Longest string a single Excel cell can hold, in characters.
const MAX_CELL_CHARS: usize = 32_767;

fn xlsx_error(e: XlsxError) -> AppError {
    AppError::internal(format!("Spreadsheet export failed: {e}"))
}

/// Clip `text` to the cell limit.
fn fit_cell<'a>(text: &'a str, column: &str) -> Cow<'a, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                column = %column,
                length = text.chars().count(),
                "Value exceeds the spreadsheet cell limit, truncating"
            );
            Cow::Owned(text[..cut].to_string())
        }
        None => Cow::Borrowed(text),
    }
}

/// Render records as a workbook with a bold header row.
///
/// Columns are the union of keys across all records; a record without a
/// given key leaves that cell empty. No records yields a header-less but
/// valid workbook.
pub fn to_spreadsheet(records: &[Record]) -> Result<Vec<u8>, AppError> {
    let columns = union_columns(records);
    if columns.len() > usize::from(u16::MAX) {
        return Err(AppError::validation("Too many distinct fields to export"));
    }
    let row_limit = u32::MAX as usize;
    if records.len() >= row_limit {
        return Err(AppError::validation("Too many documents to export"));
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    for (col, name) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, fit_cell(name, name).as_ref(), &header)
            .map_err(xlsx_error)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            let text = cell_text(record.get(name));
            if text.is_empty() {
                continue;
            }
            sheet
                .write_string(row, col as u16, fit_cell(&text, name).as_ref())
                .map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot_is_valid_workbook() {
        let bytes = to_spreadsheet(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_heterogeneous_records() {
        let records: Vec<Record> = vec![
            json!({"Arquivo": "a", "Folhas": 3}),
            json!({"Local": null, "Tags": ["x"]}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let bytes = to_spreadsheet(&records).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_oversized_value_is_truncated() {
        let long = "a".repeat(40_000);
        let records: Vec<Record> = vec![json!({"Arquivo": "x", "Descricao": long})]
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();

        let bytes = to_spreadsheet(&records).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_fit_cell_counts_characters() {
        let short = "ação";
        assert!(matches!(fit_cell(short, "c"), Cow::Borrowed("ação")));

        let long = "é".repeat(MAX_CELL_CHARS + 5);
        let clipped = fit_cell(&long, "c");
        assert_eq!(clipped.chars().count(), MAX_CELL_CHARS);
    }
}
