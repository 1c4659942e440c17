use chrono::NaiveDate;
use clap::Args;
use kpi_newsletter::config::{AppConfig, NewsletterConfig, TelemetryConfig};
use kpi_newsletter::error::AppError;
use kpi_newsletter::telemetry::{self, TelemetryError};
use kpi_newsletter::workflows::drive::HttpSpreadsheetFetcher;
use kpi_newsletter::workflows::newsletter::{
    export_newsletter, today_utc, CoverImage, CoverPreset, ExportedNewsletter, NewsletterService,
    ReportData, ReportDeriver, ReportField, ReportState, SyncError,
};
use kpi_newsletter::workflows::sheets::SheetImporter;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Google Drive or Sheets link (defaults to NEWSLETTER_SOURCE_URL)
    #[arg(long, conflicts_with = "file")]
    pub(crate) source: Option<String>,
    /// Local .csv/.xlsx/.xls/.ods file to read instead of a Drive link
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Directory for the exported PDF and HTML (defaults to NEWSLETTER_OUTPUT_DIR)
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Newsletter title
    #[arg(long)]
    pub(crate) title: Option<String>,
    /// Reporting period shown under the title
    #[arg(long)]
    pub(crate) period: Option<String>,
    /// Cover preset: business, tech, growth, team or office
    #[arg(long, value_parser = parse_cover)]
    pub(crate) cover: Option<CoverPreset>,
    /// Generation date for the footer and file names (defaults to today, UTC)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

fn parse_cover(raw: &str) -> Result<CoverPreset, String> {
    CoverPreset::from_seed(raw).ok_or_else(|| {
        let known: Vec<&str> = CoverPreset::ordered()
            .into_iter()
            .map(CoverPreset::seed)
            .collect();
        format!("unknown cover '{raw}' (expected one of: {})", known.join(", "))
    })
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    install_logging(&config.telemetry)?;
    let generated = generate_report(args, &config.newsletter).await?;

    if generated.json {
        let payload = serde_json::to_string_pretty(&generated.state.report)
            .map_err(|err| AppError::Io(err.into()))?;
        println!("{payload}");
    } else {
        print!("{}", render_summary(&generated.state.report));
    }
    println!("Exported newsletter to {}", generated.exported.pdf.display());
    println!("Editable HTML copy at {}", generated.exported.html.display());
    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn install_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    telemetry::init_with_writer(config, std::io::stderr)
}

#[derive(Debug)]
pub(crate) struct GeneratedReport {
    pub(crate) state: ReportState,
    pub(crate) exported: ExportedNewsletter,
    pub(crate) json: bool,
}

pub(crate) async fn generate_report(
    args: ReportArgs,
    config: &NewsletterConfig,
) -> Result<GeneratedReport, AppError> {
    let ReportArgs {
        source,
        file,
        out,
        title,
        period,
        cover,
        today,
        json,
    } = args;

    let deriver = ReportDeriver::new(config.locale);
    let mut state = ReportState::new(source.unwrap_or_else(|| config.source.default_url.clone()));
    if let Some(title) = title {
        state.report.update_field(ReportField::Title, title);
    }
    if let Some(period) = period {
        state.report.update_field(ReportField::Period, period);
    }
    if let Some(preset) = cover {
        state.report.select_cover(&CoverImage::Preset(preset));
    }

    match file {
        Some(path) => {
            state.begin_sync();
            match SheetImporter::from_path(&path) {
                Ok(rows) => state.complete_sync(&deriver.derive(&rows)),
                Err(err) => {
                    state.fail_sync(err.to_string());
                    return Err(err.into());
                }
            }
        }
        None => {
            let fetcher =
                HttpSpreadsheetFetcher::from_config(&config.source).map_err(SyncError::from)?;
            let service = NewsletterService::new(Arc::new(fetcher), deriver);
            service.sync(&mut state).await?;
        }
    }

    let today = today.unwrap_or_else(today_utc);
    let directory = out.unwrap_or_else(|| config.output_dir.clone());
    let exported = export_newsletter(&state.report, today, &directory)?;

    Ok(GeneratedReport {
        state,
        exported,
        json,
    })
}

pub(crate) fn render_summary(report: &ReportData) -> String {
    let mut output = String::new();
    writeln!(output, "{}", report.title).expect("write to string");
    writeln!(output, "{}", report.period).expect("write to string");

    if report.kpis.is_empty() {
        writeln!(output, "\nNo numeric indicators found.").expect("write to string");
    } else {
        writeln!(output, "\nIndicators").expect("write to string");
        for kpi in &report.kpis {
            writeln!(
                output,
                "- {}: {} ({} {}%)",
                kpi.label,
                kpi.value,
                kpi.trend.marker(),
                kpi.change.abs()
            )
            .expect("write to string");
        }
    }

    writeln!(output, "\nSummary: {}", report.summary).expect("write to string");
    writeln!(output, "Analysis: {}", report.analysis).expect("write to string");
    writeln!(output, "Conclusion: {}", report.conclusion).expect("write to string");
    output
}
