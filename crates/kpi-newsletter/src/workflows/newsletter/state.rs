use super::domain::Kpi;
use super::report::DerivationResult;
use crate::workflows::drive::links;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE_URL: &str =
    "https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit?usp=sharing";

/// Editable content of a newsletter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportData {
    pub title: String,
    pub period: String,
    pub kpis: Vec<Kpi>,
    pub summary: String,
    pub analysis: String,
    pub conclusion: String,
    pub main_image: String,
    pub secondary_image: String,
}

impl Default for ReportData {
    fn default() -> Self {
        Self {
            title: "REPORTE ESTRATÉGICO".to_string(),
            period: "Q1 2024 - Análisis de Desempeño".to_string(),
            kpis: Vec::new(),
            summary: "Cargando datos del sistema...".to_string(),
            analysis: "Inicie la carga para generar el análisis automático.".to_string(),
            conclusion: "Pendiente de datos.".to_string(),
            main_image: CoverImage::Preset(CoverPreset::Business).url(),
            secondary_image: String::new(),
        }
    }
}

impl ReportData {
    /// Merges a derivation into the report. Empty results leave it untouched.
    pub fn apply(&mut self, result: &DerivationResult) {
        if result.is_empty() {
            return;
        }

        self.kpis = result.kpis.clone();
        if let Some(summary) = &result.summary {
            self.summary = summary.clone();
        }
        if let Some(analysis) = &result.analysis {
            self.analysis = analysis.clone();
        }
        if let Some(conclusion) = &result.conclusion {
            self.conclusion = conclusion.clone();
        }
    }

    pub fn update_field(&mut self, field: ReportField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ReportField::Title => self.title = value,
            ReportField::Period => self.period = value,
            ReportField::Summary => self.summary = value,
            ReportField::Analysis => self.analysis = value,
            ReportField::Conclusion => self.conclusion = value,
            ReportField::MainImage => self.main_image = value,
            ReportField::SecondaryImage => self.secondary_image = value,
        }
    }

    pub fn field(&self, field: ReportField) -> &str {
        match field {
            ReportField::Title => &self.title,
            ReportField::Period => &self.period,
            ReportField::Summary => &self.summary,
            ReportField::Analysis => &self.analysis,
            ReportField::Conclusion => &self.conclusion,
            ReportField::MainImage => &self.main_image,
            ReportField::SecondaryImage => &self.secondary_image,
        }
    }

    pub fn select_cover(&mut self, cover: &CoverImage) {
        self.main_image = cover.url();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Title,
    Period,
    Summary,
    Analysis,
    Conclusion,
    MainImage,
    SecondaryImage,
}

impl ReportField {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Period => "period",
            Self::Summary => "summary",
            Self::Analysis => "analysis",
            Self::Conclusion => "conclusion",
            Self::MainImage => "main_image",
            Self::SecondaryImage => "secondary_image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverPreset {
    Business,
    Tech,
    Growth,
    Team,
    Office,
}

impl CoverPreset {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Business,
            Self::Tech,
            Self::Growth,
            Self::Team,
            Self::Office,
        ]
    }

    pub const fn seed(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Tech => "tech",
            Self::Growth => "growth",
            Self::Team => "team",
            Self::Office => "office",
        }
    }

    pub fn from_seed(seed: &str) -> Option<Self> {
        let seed = seed.trim();
        Self::ordered()
            .into_iter()
            .find(|preset| preset.seed().eq_ignore_ascii_case(seed))
    }
}

/// Source of the newsletter's hero image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverImage {
    Preset(CoverPreset),
    Drive { file_id: String, name: String },
}

impl CoverImage {
    pub fn url(&self) -> String {
        match self {
            Self::Preset(preset) => picsum_url(preset.seed(), 1200, 600),
            Self::Drive { file_id, .. } => links::image_url(file_id),
        }
    }

    pub fn thumbnail_url(&self) -> String {
        match self {
            Self::Preset(preset) => picsum_url(preset.seed(), 100, 60),
            Self::Drive { file_id, .. } => links::image_url(file_id),
        }
    }
}

pub(crate) fn picsum_url(seed: &str, width: u32, height: u32) -> String {
    format!("https://picsum.photos/seed/{seed}/{width}/{height}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed {
        message: String,
    },
}

impl SyncStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Succeeded => "Succeeded",
            Self::Failed { .. } => "Failed",
        }
    }
}

/// Caller-owned newsletter session: the source link, the report being
/// edited, and the outcome of the latest sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportState {
    pub source_url: String,
    pub report: ReportData,
    pub status: SyncStatus,
}

impl Default for ReportState {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_URL)
    }
}

impl ReportState {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            report: ReportData::default(),
            status: SyncStatus::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SyncStatus::Loading
    }

    /// Clears any previous outcome and marks a sync as in flight.
    pub fn begin_sync(&mut self) {
        self.status = SyncStatus::Loading;
    }

    pub fn complete_sync(&mut self, result: &DerivationResult) {
        self.report.apply(result);
        self.status = SyncStatus::Succeeded;
    }

    pub fn fail_sync(&mut self, message: impl Into<String>) {
        self.status = SyncStatus::Failed {
            message: message.into(),
        };
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SyncStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}
