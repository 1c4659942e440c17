pub mod domain;
pub mod export;
pub mod pdf;
pub mod render;
pub mod report;
pub mod router;
pub mod service;
pub mod state;

pub use domain::{CellValue, Kpi, Row, Trend};
pub use export::{
    export_newsletter, report_file_name, today_utc, ExportError, ExportedNewsletter,
};
pub use pdf::{render_pdf, PdfError, RenderedPdf};
pub use render::{render_html, RenderError};
pub use report::{derive, DerivationResult, NumberLocale, ReportDeriver, MAX_KPIS};
pub use router::{newsletter_router, NewsletterApi};
pub use service::{NewsletterService, SyncError};
pub use state::{
    CoverImage, CoverPreset, ReportData, ReportField, ReportState, SyncStatus, DEFAULT_SOURCE_URL,
};
