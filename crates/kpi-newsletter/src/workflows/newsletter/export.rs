use super::pdf::{render_pdf, PdfError};
use super::render::{render_html, RenderError};
use super::state::ReportData;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write newsletter: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Html(#[from] RenderError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Files written by one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNewsletter {
    pub pdf: PathBuf,
    pub html: PathBuf,
}

/// Generation date used when a caller names none. File names follow the UTC
/// calendar day.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// `reporte-YYYY-MM-DD.<extension>`
pub fn report_file_name(generated_on: NaiveDate, extension: &str) -> String {
    format!("reporte-{}.{extension}", generated_on.format("%Y-%m-%d"))
}

/// Writes the A4 PDF and the editable HTML side by side into `directory`,
/// creating it when needed.
pub fn export_newsletter(
    report: &ReportData,
    generated_on: NaiveDate,
    directory: &Path,
) -> Result<ExportedNewsletter, ExportError> {
    let html = render_html(report, generated_on)?;
    let pdf = render_pdf(report, generated_on)?;

    fs::create_dir_all(directory)?;
    let html_path = directory.join(report_file_name(generated_on, "html"));
    fs::write(&html_path, html.as_bytes())?;
    let pdf_path = directory.join(report_file_name(generated_on, "pdf"));
    fs::write(&pdf_path, &pdf.bytes)?;

    info!(
        pdf = %pdf_path.display(),
        html = %html_path.display(),
        pages = pdf.pages,
        "newsletter exported"
    );
    Ok(ExportedNewsletter {
        pdf: pdf_path,
        html: html_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_carries_the_generation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).expect("valid date");
        assert_eq!(report_file_name(date, "pdf"), "reporte-2024-01-09.pdf");
        assert_eq!(report_file_name(date, "html"), "reporte-2024-01-09.html");
    }

    #[test]
    fn default_date_follows_the_utc_calendar() {
        let before = Utc::now().date_naive();
        let today = today_utc();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn export_writes_pdf_next_to_html() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("boletines");
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).expect("valid date");

        let exported =
            export_newsletter(&ReportData::default(), date, &target).expect("export succeeds");

        assert_eq!(exported.pdf, target.join("reporte-2024-01-09.pdf"));
        assert_eq!(exported.html, target.join("reporte-2024-01-09.html"));

        let pdf = fs::read(&exported.pdf).expect("pdf readable");
        assert!(pdf.starts_with(b"%PDF-"));
        let written = fs::read_to_string(&exported.html).expect("html readable");
        assert!(written.contains("REPORTE ESTRATÉGICO"));
        assert!(written.contains("9/1/2024"));
    }
}
