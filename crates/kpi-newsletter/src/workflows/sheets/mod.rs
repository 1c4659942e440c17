mod normalizer;
mod parser;

use crate::workflows::newsletter::Row;
use std::path::Path;

#[derive(Debug)]
pub enum SheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Workbook(calamine::Error),
    EmptyWorkbook,
    HtmlPage,
}

impl std::fmt::Display for SheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetImportError::Io(err) => write!(f, "failed to read spreadsheet: {}", err),
            SheetImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            SheetImportError::Workbook(err) => write!(f, "invalid workbook: {}", err),
            SheetImportError::EmptyWorkbook => write!(f, "workbook contains no sheets"),
            SheetImportError::HtmlPage => write!(
                f,
                "received a web page instead of a spreadsheet; verify the file is shared publicly"
            ),
        }
    }
}

impl std::error::Error for SheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetImportError::Io(err) => Some(err),
            SheetImportError::Csv(err) => Some(err),
            SheetImportError::Workbook(err) => Some(err),
            SheetImportError::EmptyWorkbook | SheetImportError::HtmlPage => None,
        }
    }
}

impl From<std::io::Error> for SheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<calamine::Error> for SheetImportError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// xlsx/xlsb/ods (zip container) or legacy xls (OLE container).
    Workbook,
    Csv,
    Html,
}

impl SheetFormat {
    const ZIP_MAGIC: &'static [u8] = b"PK\x03\x04";
    const OLE_MAGIC: &'static [u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(Self::ZIP_MAGIC) || bytes.starts_with(Self::OLE_MAGIC) {
            return SheetFormat::Workbook;
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
        let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
        if head.starts_with("<!doctype html") || head.starts_with("<html") {
            return SheetFormat::Html;
        }

        SheetFormat::Csv
    }
}

/// Reads the first sheet of a downloaded spreadsheet into header-keyed rows.
pub struct SheetImporter;

impl SheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, SheetImportError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Vec<Row>, SheetImportError> {
        match SheetFormat::sniff(bytes) {
            SheetFormat::Workbook => parser::parse_workbook(bytes.to_vec()),
            SheetFormat::Csv => parser::parse_csv(bytes),
            SheetFormat::Html => Err(SheetImportError::HtmlPage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::newsletter::CellValue;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Mes").expect("header");
        sheet.write_string(0, 1, "Ventas").expect("header");
        sheet.write_string(0, 2, "Ventas").expect("header");
        sheet.write_string(1, 0, "Enero").expect("cell");
        sheet.write_number(1, 1, 100.0).expect("cell");
        sheet.write_number(1, 2, 5.0).expect("cell");
        sheet.write_string(2, 0, "Febrero").expect("cell");
        sheet.write_number(2, 1, 150.0).expect("cell");
        workbook.save_to_buffer().expect("workbook serializes")
    }

    #[test]
    fn sniffs_formats() {
        assert_eq!(SheetFormat::sniff(b"PK\x03\x04rest"), SheetFormat::Workbook);
        assert_eq!(SheetFormat::sniff(b"Mes,Ventas\n"), SheetFormat::Csv);
        assert_eq!(
            SheetFormat::sniff(b"\n  <!DOCTYPE html><html></html>"),
            SheetFormat::Html
        );
    }

    #[test]
    fn reads_csv_with_bom_header() {
        let rows = SheetImporter::from_bytes("\u{feff}Mes,Ventas\nEnero,100\nFebrero,150\n".as_bytes())
            .expect("csv imports");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Mes"), Some(&CellValue::Text("Enero".to_string())));
        assert_eq!(rows[1].number("Ventas"), Some(150.0));
    }

    #[test]
    fn reads_first_sheet_of_xlsx() {
        let rows = SheetImporter::from_bytes(&workbook_bytes()).expect("xlsx imports");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number("Ventas"), Some(100.0));
        assert_eq!(rows[0].number("Ventas_1"), Some(5.0));
        assert_eq!(rows[1].number("Ventas"), Some(150.0));
        assert!(rows[1].get("Ventas_1").is_none());
    }

    #[test]
    fn html_pages_are_rejected() {
        let error = SheetImporter::from_bytes(b"<html><body>Sign in</body></html>")
            .expect_err("html is not a sheet");
        assert!(matches!(error, SheetImportError::HtmlPage));
    }

    #[test]
    fn truncated_workbook_reports_error() {
        let error = SheetImporter::from_bytes(b"PK\x03\x04garbage").expect_err("broken zip");
        assert!(matches!(error, SheetImportError::Workbook(_)));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("kpis.csv");
        std::fs::write(&path, "Mes,Ventas\nEnero,100\n").expect("fixture written");

        let rows = SheetImporter::from_path(&path).expect("file imports");
        assert_eq!(rows[0].number("Ventas"), Some(100.0));

        let missing = SheetImporter::from_path(dir.path().join("missing.csv"));
        assert!(matches!(missing, Err(SheetImportError::Io(_))));
    }
}
