use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_newsletter_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kpi_newsletter::config::AppConfig;
use kpi_newsletter::error::AppError;
use kpi_newsletter::telemetry;
use kpi_newsletter::workflows::drive::HttpSpreadsheetFetcher;
use kpi_newsletter::workflows::newsletter::{
    NewsletterApi, NewsletterService, ReportDeriver, SyncError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let newsletter = &config.newsletter;
    let fetcher = HttpSpreadsheetFetcher::from_config(&newsletter.source).map_err(SyncError::from)?;
    let service = Arc::new(NewsletterService::new(
        Arc::new(fetcher),
        ReportDeriver::new(newsletter.locale),
    ));
    let api = NewsletterApi::new(service, newsletter.source.default_url.clone());

    let app = with_newsletter_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        locale = newsletter.locale.tag(),
        proxied = newsletter.source.proxy_prefix.is_some(),
        "kpi newsletter service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
