use std::sync::Arc;

use tracing::{info, warn};

use super::domain::Row;
use super::report::{DerivationResult, ReportDeriver};
use super::state::ReportState;
use crate::workflows::drive::{links, FetchError, SpreadsheetSource};
use crate::workflows::sheets::{SheetImportError, SheetImporter};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no spreadsheet link configured")]
    MissingSource,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Import(#[from] SheetImportError),
}

/// Pulls the linked spreadsheet and refreshes a caller-owned report with the
/// derived KPIs and narrative.
pub struct NewsletterService<S> {
    source: Arc<S>,
    deriver: ReportDeriver,
}

impl<S> NewsletterService<S>
where
    S: SpreadsheetSource + 'static,
{
    pub fn new(source: Arc<S>, deriver: ReportDeriver) -> Self {
        Self { source, deriver }
    }

    pub fn deriver(&self) -> ReportDeriver {
        self.deriver
    }

    /// Downloads and parses the sheet behind a share or download link.
    pub async fn fetch_rows(&self, source_url: &str) -> Result<Vec<Row>, SyncError> {
        let download_url = links::convert_to_download_url(source_url);
        if download_url.trim().is_empty() {
            return Err(SyncError::MissingSource);
        }

        let bytes = self.source.fetch(&download_url).await?;
        let rows = SheetImporter::from_bytes(&bytes)?;
        info!(rows = rows.len(), bytes = bytes.len(), "spreadsheet imported");
        Ok(rows)
    }

    /// Runs one sync against `state.source_url`. The state always ends in
    /// `Succeeded` or `Failed`; the report keeps its previous content on error.
    pub async fn sync(&self, state: &mut ReportState) -> Result<DerivationResult, SyncError> {
        state.begin_sync();
        info!(source = %state.source_url, "newsletter sync started");

        match self.fetch_rows(&state.source_url).await {
            Ok(rows) => {
                let result = self.deriver.derive(&rows);
                state.complete_sync(&result);
                info!(kpis = result.kpis.len(), "newsletter sync completed");
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "newsletter sync failed");
                state.fail_sync(err.to_string());
                Err(err)
            }
        }
    }
}
