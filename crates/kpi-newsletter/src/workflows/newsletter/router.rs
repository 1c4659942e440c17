use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::Row;
use super::export::{report_file_name, today_utc};
use super::pdf::render_pdf;
use super::render::render_html;
use super::report::{NumberLocale, ReportDeriver};
use super::service::{NewsletterService, SyncError};
use super::state::{CoverImage, CoverPreset, ReportData, ReportField, ReportState, SyncStatus};
use crate::workflows::drive::SpreadsheetSource;

/// Shared handler state: the sync service plus the link used when a request
/// names none.
pub struct NewsletterApi<S> {
    service: Arc<NewsletterService<S>>,
    default_source: String,
}

impl<S> NewsletterApi<S> {
    pub fn new(service: Arc<NewsletterService<S>>, default_source: impl Into<String>) -> Self {
        Self {
            service,
            default_source: default_source.into(),
        }
    }
}

impl<S> Clone for NewsletterApi<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            default_source: self.default_source.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeriveRequest {
    pub rows: Vec<Row>,
    #[serde(default)]
    pub locale: Option<NumberLocale>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub drive_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    /// Preset seed (`business`, `tech`, ...) for the cover image.
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub status: SyncStatus,
    pub report: ReportData,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub report: ReportData,
    #[serde(default)]
    pub generated_on: Option<NaiveDate>,
}

/// Router builder exposing derivation, sync, HTML and PDF endpoints.
pub fn newsletter_router<S>(api: NewsletterApi<S>) -> Router
where
    S: SpreadsheetSource + 'static,
{
    Router::new()
        .route("/api/v1/newsletter/derive", post(derive_handler::<S>))
        .route("/api/v1/newsletter/sync", post(sync_handler::<S>))
        .route("/api/v1/newsletter/render", post(render_handler))
        .route("/api/v1/newsletter/pdf", post(pdf_handler))
        .with_state(api)
}

pub(crate) async fn derive_handler<S>(
    State(api): State<NewsletterApi<S>>,
    axum::Json(request): axum::Json<DeriveRequest>,
) -> Response
where
    S: SpreadsheetSource + 'static,
{
    let deriver = match request.locale {
        Some(locale) => ReportDeriver::new(locale),
        None => api.service.deriver(),
    };
    let result = deriver.derive(&request.rows);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn sync_handler<S>(
    State(api): State<NewsletterApi<S>>,
    axum::Json(request): axum::Json<SyncRequest>,
) -> Response
where
    S: SpreadsheetSource + 'static,
{
    let source = request
        .drive_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| api.default_source.clone());
    let mut state = ReportState::new(source);

    if let Some(title) = request.title {
        state.report.update_field(ReportField::Title, title);
    }
    if let Some(period) = request.period {
        state.report.update_field(ReportField::Period, period);
    }
    if let Some(seed) = request.cover.as_deref() {
        match CoverPreset::from_seed(seed) {
            Some(preset) => state.report.select_cover(&CoverImage::Preset(preset)),
            None => warn!(seed, "unknown cover preset ignored"),
        }
    }

    match api.service.sync(&mut state).await {
        Ok(_) => {
            let body = SyncResponse {
                status: state.status,
                report: state.report,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => {
            let status = match error {
                SyncError::Fetch(_) => StatusCode::BAD_GATEWAY,
                SyncError::MissingSource | SyncError::Import(_) => StatusCode::BAD_REQUEST,
            };
            let payload = json!({
                "error": error.to_string(),
                "status": state.status,
                "report": state.report,
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn render_handler(axum::Json(request): axum::Json<RenderRequest>) -> Response {
    let generated_on = request.generated_on.unwrap_or_else(today_utc);
    match render_html(&request.report, generated_on) {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(error) => render_failure(error),
    }
}

pub(crate) async fn pdf_handler(axum::Json(request): axum::Json<RenderRequest>) -> Response {
    let generated_on = request.generated_on.unwrap_or_else(today_utc);
    match render_pdf(&request.report, generated_on) {
        Ok(pdf) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                report_file_name(generated_on, "pdf")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                pdf.bytes,
            )
                .into_response()
        }
        Err(error) => render_failure(error),
    }
}

fn render_failure(error: impl std::error::Error) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::drive::FetchError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct CannedSource(Option<&'static str>);

    #[async_trait]
    impl SpreadsheetSource for CannedSource {
        async fn fetch(&self, _download_url: &str) -> Result<Vec<u8>, FetchError> {
            match self.0 {
                Some(body) => Ok(body.as_bytes().to_vec()),
                None => Err(FetchError::Status { status: 403 }),
            }
        }
    }

    fn router(body: Option<&'static str>) -> Router {
        let service = NewsletterService::new(
            Arc::new(CannedSource(body)),
            ReportDeriver::new(NumberLocale::EsEs),
        );
        newsletter_router(NewsletterApi::new(
            Arc::new(service),
            "https://docs.google.com/spreadsheets/d/default_sheet/edit",
        ))
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    async fn read_json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn derive_route_uses_requested_locale() {
        let payload = json!({
            "rows": [
                { "Mes": "Enero", "Ventas": 1000 },
                { "Mes": "Febrero", "Ventas": 1500 }
            ],
            "locale": "en-US"
        });

        let response = router(None)
            .oneshot(post_json("/api/v1/newsletter/derive", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["kpis"][0]["label"], "Ventas");
        assert_eq!(body["kpis"][0]["value"], "1,500");
        assert_eq!(body["kpis"][0]["change"].as_f64(), Some(50.0));
        assert_eq!(body["kpis"][0]["trend"], "up");
    }

    #[tokio::test]
    async fn derive_route_returns_empty_result_for_no_rows() {
        let response = router(None)
            .oneshot(post_json("/api/v1/newsletter/derive", json!({ "rows": [] })))
            .await
            .expect("route executes");

        let body = read_json_body(response).await;
        assert_eq!(body, json!({ "kpis": [] }));
    }

    #[tokio::test]
    async fn sync_route_applies_overrides_and_derivation() {
        let payload = json!({ "title": "Boletín Marzo", "cover": "tech" });

        let response = router(Some("Mes,Ventas\nEnero,100\nFebrero,80\n"))
            .oneshot(post_json("/api/v1/newsletter/sync", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["status"]["state"], "succeeded");
        assert_eq!(body["report"]["title"], "Boletín Marzo");
        assert_eq!(
            body["report"]["main_image"],
            "https://picsum.photos/seed/tech/1200/600"
        );
        assert_eq!(body["report"]["kpis"][0]["trend"], "down");
    }

    #[tokio::test]
    async fn sync_route_reports_fetch_failures_as_bad_gateway() {
        let response = router(None)
            .oneshot(post_json("/api/v1/newsletter/sync", json!({})))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json_body(response).await;
        assert_eq!(body["error"], "Failed to fetch from Google Drive (HTTP 403)");
        assert_eq!(body["status"]["state"], "failed");
    }

    #[tokio::test]
    async fn render_route_returns_html_document() {
        let payload = json!({
            "report": { "title": "Resumen <Q2>" },
            "generated_on": "2024-07-01"
        });

        let response = router(None)
            .oneshot(post_json("/api/v1/newsletter/render", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        let html = String::from_utf8(body.to_vec()).expect("utf-8 html");
        assert!(html.contains("Resumen &lt;Q2&gt;"));
        assert!(html.contains("1/7/2024"));
    }

    #[tokio::test]
    async fn pdf_route_returns_named_attachment() {
        let payload = json!({
            "report": { "title": "Resumen Q2" },
            "generated_on": "2024-07-01"
        });

        let response = router(None)
            .oneshot(post_json("/api/v1/newsletter/pdf", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"reporte-2024-07-01.pdf\""
        );
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        assert!(body.starts_with(b"%PDF-"));
    }
}
