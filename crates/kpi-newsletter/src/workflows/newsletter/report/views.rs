use super::super::domain::Kpi;
use serde::{Deserialize, Serialize};

/// Output of a single derivation run.
///
/// An empty input produces the default record: no KPIs and no narrative, so
/// callers keep whatever placeholder text they already show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivationResult {
    pub kpis: Vec<Kpi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl DerivationResult {
    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
            && self.summary.is_none()
            && self.analysis.is_none()
            && self.conclusion.is_none()
    }

    pub fn top_mover(&self) -> Option<&Kpi> {
        super::top_mover(&self.kpis)
    }
}
