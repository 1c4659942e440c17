use super::normalizer::header_keys;
use super::SheetImportError;
use crate::workflows::newsletter::{CellValue, Row};
use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;

pub(crate) fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>, SheetImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(csv_cell).collect::<Vec<_>>());
    }

    Ok(rows_from_grid(grid))
}

pub(crate) fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<Row>, SheetImportError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetImportError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let grid = range
        .rows()
        .map(|cells| cells.iter().map(workbook_cell).collect::<Vec<_>>())
        .collect();

    Ok(rows_from_grid(grid))
}

/// First non-blank row names the columns; every later row becomes a record
/// keyed by those names, without its blank cells.
fn rows_from_grid(grid: Vec<Vec<CellValue>>) -> Vec<Row> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut lines = grid
        .into_iter()
        .skip_while(|cells| cells.iter().all(CellValue::is_blank));

    let Some(header_row) = lines.next() else {
        return Vec::new();
    };

    let mut raw_headers: Vec<String> = header_row.iter().map(header_text).collect();
    raw_headers.resize(width, String::new());
    let keys = header_keys(&raw_headers);

    lines
        .filter_map(|cells| {
            let row: Row = keys
                .iter()
                .zip(cells)
                .filter(|(_, cell)| !cell.is_blank())
                .map(|(key, cell)| (key.clone(), cell))
                .collect();
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

fn header_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Blank => String::new(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Number(value) => value.to_string(),
        CellValue::Date(value) => value.format("%Y-%m-%d").to_string(),
        CellValue::Text(value) => value.clone(),
    }
}

fn csv_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Blank;
    }

    if let Some(number) = parse_plain_number(trimmed) {
        return CellValue::Number(number);
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    CellValue::Text(raw.to_string())
}

// Rejects spellings like "inf" or "NaN" that f64::from_str would accept.
fn parse_plain_number(value: &str) -> Option<f64> {
    if !value.bytes().any(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

fn workbook_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::String(value) if value.is_empty() => CellValue::Blank,
        Data::String(value) => CellValue::Text(value.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => match excel_serial_to_datetime(value.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(value.as_f64().to_string()),
        },
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::Text(value.clone()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}

/// Excel serials count days from 1899-12-30 (the epoch already absorbs the
/// phantom 1900-02-29).
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis as i64))
}
