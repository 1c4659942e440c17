use super::super::domain::{Kpi, Row, Trend};
use super::format::NumberLocale;
use super::narrative::compose_narrative;
use super::views::DerivationResult;

/// Upper bound on KPIs emitted per report.
pub const MAX_KPIS: usize = 4;

/// Turns the last two rows of a sheet into KPI summaries and narrative text.
///
/// The deriver holds no state beyond its formatting locale; the same rows
/// always produce the same result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportDeriver {
    locale: NumberLocale,
}

impl ReportDeriver {
    pub const fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    pub const fn locale(&self) -> NumberLocale {
        self.locale
    }

    pub fn derive(&self, rows: &[Row]) -> DerivationResult {
        let Some((last, earlier)) = rows.split_last() else {
            return DerivationResult::default();
        };
        let previous = earlier.last();

        let mut kpis: Vec<Kpi> = last
            .iter()
            .filter_map(|(column, cell)| {
                let current = cell.as_number()?;
                let prior = previous.and_then(|row| row.number(column));
                let change = percentage_change(current, prior);
                Some(Kpi {
                    label: column.to_string(),
                    value: self.locale.format(current),
                    change,
                    trend: Trend::from_change(change),
                })
            })
            .collect();

        // The mover is picked from the capped list, never from columns past the cap.
        kpis.truncate(MAX_KPIS);
        let narrative = compose_narrative(top_mover(&kpis));

        DerivationResult {
            kpis,
            summary: Some(narrative.summary),
            analysis: Some(narrative.analysis),
            conclusion: Some(narrative.conclusion),
        }
    }
}

/// Derives a report with the default locale.
pub fn derive(rows: &[Row]) -> DerivationResult {
    ReportDeriver::default().derive(rows)
}

/// The KPI with the largest absolute change; ties keep the earlier entry.
pub fn top_mover(kpis: &[Kpi]) -> Option<&Kpi> {
    kpis.iter().fold(None, |best, candidate| match best {
        Some(current) if current.change.abs() >= candidate.change.abs() => Some(current),
        _ => Some(candidate),
    })
}

fn percentage_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(previous) if previous != 0.0 => {
            round_to_hundredths(((current - previous) / previous) * 100.0)
        }
        _ => 0.0,
    }
}

/// Exact halves round away from zero.
fn round_to_hundredths(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
