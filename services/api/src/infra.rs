use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_and_reports_bad_input() {
        assert_eq!(
            parse_date(" 2024-03-31 "),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date"))
        );
        let error = parse_date("31/03/2024").expect_err("wrong format");
        assert!(error.contains("YYYY-MM-DD"));
    }
}
