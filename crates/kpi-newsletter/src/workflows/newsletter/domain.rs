use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single decoded spreadsheet cell.
///
/// Only [`CellValue::Number`] takes part in KPI derivation; every other variant
/// is carried through untouched so callers can still display it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Blank,
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Blank | Self::Bool(_) | Self::Date(_) | Self::Text(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

/// One record of tabular data keyed by column name, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(column, value)| (column.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Neutral
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Neutral => "Neutral",
        }
    }

    /// Wording used inside the generated analysis paragraph.
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::Up => "positiva",
            Self::Down => "a la baja",
            Self::Neutral => "estable",
        }
    }

    pub const fn marker(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Neutral => "–",
        }
    }
}

/// A labelled metric with its period-over-period change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub change: f64,
    pub trend: Trend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_numbers_pass_the_numeric_guard() {
        assert_eq!(CellValue::Number(4.5).as_number(), Some(4.5));
        assert_eq!(CellValue::Text("4.5".to_string()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Blank.as_number(), None);
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::Date(date).as_number(), None);
    }

    #[test]
    fn trend_follows_sign_of_change() {
        assert_eq!(Trend::from_change(0.01), Trend::Up);
        assert_eq!(Trend::from_change(-12.5), Trend::Down);
        assert_eq!(Trend::from_change(0.0), Trend::Neutral);
        assert_eq!(Trend::from_change(-0.0), Trend::Neutral);
    }

    #[test]
    fn rows_keep_column_order_and_decode_json_cells() {
        let row: Row = serde_json::from_str(
            r#"{"Mes": "Marzo", "Ventas": 150, "Activo": true, "Notas": null, "Margen": 0.25}"#,
        )
        .expect("row decodes");

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["Mes", "Ventas", "Activo", "Notas", "Margen"]);
        assert_eq!(row.get("Mes"), Some(&CellValue::Text("Marzo".to_string())));
        assert_eq!(row.number("Ventas"), Some(150.0));
        assert_eq!(row.get("Activo"), Some(&CellValue::Bool(true)));
        assert_eq!(row.get("Notas"), Some(&CellValue::Blank));
        assert_eq!(row.number("Margen"), Some(0.25));
    }

    #[test]
    fn iso_timestamps_decode_as_dates() {
        let row: Row =
            serde_json::from_str(r#"{"Fecha": "2024-03-31T00:00:00"}"#).expect("row decodes");
        assert!(matches!(row.get("Fecha"), Some(CellValue::Date(_))));
        assert_eq!(row.number("Fecha"), None);
    }
}
