use super::domain::{Kpi, Trend};
use super::state::{picsum_url, ReportData, ReportField};
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

const TEMPLATE_NAME: &str = "newsletter";
const NEWSLETTER_TEMPLATE: &str = include_str!("templates/newsletter.hbs");

const FALLBACK_TITLE: &str = "BOLETÍN CORPORATIVO";
const FALLBACK_PERIOD: &str = "Reporte de Desempeño Mensual";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("newsletter template is invalid: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("newsletter could not be rendered: {0}")]
    Render(#[from] handlebars::RenderError),
}

#[derive(Debug, Serialize)]
struct NewsletterView<'a> {
    title: &'a str,
    period: &'a str,
    main_image: String,
    secondary_image: Option<&'a str>,
    summary: &'a str,
    analysis: &'a str,
    conclusion: &'a str,
    kpis: Vec<KpiCard<'a>>,
    generated_on: String,
    fields: EditableFields,
}

#[derive(Debug, Serialize)]
struct KpiCard<'a> {
    label: &'a str,
    value: &'a str,
    marker: &'static str,
    change: String,
    trend_class: &'static str,
}

impl<'a> From<&'a Kpi> for KpiCard<'a> {
    fn from(kpi: &'a Kpi) -> Self {
        Self {
            label: &kpi.label,
            value: &kpi.value,
            marker: kpi.trend.marker(),
            change: kpi.change.abs().to_string(),
            trend_class: match kpi.trend {
                Trend::Up => "trend-up",
                Trend::Down => "trend-down",
                Trend::Neutral => "trend-neutral",
            },
        }
    }
}

/// `data-field` keys, kept in step with the `ReportField` wire names.
#[derive(Debug, Serialize)]
struct EditableFields {
    title: &'static str,
    period: &'static str,
    summary: &'static str,
    analysis: &'static str,
    conclusion: &'static str,
}

impl EditableFields {
    const fn new() -> Self {
        Self {
            title: ReportField::Title.key(),
            period: ReportField::Period.key(),
            summary: ReportField::Summary.key(),
            analysis: ReportField::Analysis.key(),
            conclusion: ReportField::Conclusion.key(),
        }
    }
}

fn registry() -> Result<&'static Handlebars<'static>, RenderError> {
    static REGISTRY: OnceLock<Handlebars<'static>> = OnceLock::new();
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }

    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(TEMPLATE_NAME, NEWSLETTER_TEMPLATE)?;
    Ok(REGISTRY.get_or_init(|| handlebars))
}

/// Renders the newsletter as a standalone A4 HTML document.
///
/// Text regions keep `contenteditable` so the exported file can still be
/// touched up in a browser before printing.
pub fn render_html(report: &ReportData, generated_on: NaiveDate) -> Result<String, RenderError> {
    let main_image = if report.main_image.trim().is_empty() {
        picsum_url("corp", 1200, 600)
    } else {
        report.main_image.clone()
    };
    let secondary_image = Some(report.secondary_image.as_str()).filter(|url| !url.trim().is_empty());

    let view = NewsletterView {
        title: display_title(report),
        period: display_period(report),
        main_image,
        secondary_image,
        summary: &report.summary,
        analysis: &report.analysis,
        conclusion: &report.conclusion,
        kpis: report.kpis.iter().map(KpiCard::from).collect(),
        generated_on: footer_date(generated_on),
        fields: EditableFields::new(),
    };

    Ok(registry()?.render(TEMPLATE_NAME, &view)?)
}

pub(super) fn display_title(report: &ReportData) -> &str {
    non_empty_or(&report.title, FALLBACK_TITLE)
}

pub(super) fn display_period(report: &ReportData) -> &str {
    non_empty_or(&report.period, FALLBACK_PERIOD)
}

pub(super) fn footer_date(generated_on: NaiveDate) -> String {
    generated_on.format("%-d/%-m/%Y").to_string()
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
