use serde::{Deserialize, Serialize};

const MAX_FRACTION_DIGITS: usize = 3;

/// Number presentation rules for KPI values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberLocale {
    #[default]
    #[serde(rename = "es-ES")]
    EsEs,
    #[serde(rename = "en-US")]
    EnUs,
}

impl NumberLocale {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "es" | "es-es" => Some(Self::EsEs),
            "en" | "en-us" => Some(Self::EnUs),
            _ => None,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::EsEs => "es-ES",
            Self::EnUs => "en-US",
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::EsEs => '.',
            Self::EnUs => ',',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::EsEs => ',',
            Self::EnUs => '.',
        }
    }

    /// Spanish leaves four-digit integers ungrouped ("1234" but "12.345").
    const fn min_grouping_digits(self) -> usize {
        match self {
            Self::EsEs => 2,
            Self::EnUs => 1,
        }
    }

    /// Formats `value` with at most three fraction digits and locale grouping.
    pub fn format(self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-∞" } else { "∞" }.to_string();
        }

        let rounded = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
        let fraction = fraction.trim_end_matches('0');

        let mut formatted = String::with_capacity(rounded.len() + 4);
        let is_zero = integer.bytes().all(|digit| digit == b'0') && fraction.is_empty();
        if value < 0.0 && !is_zero {
            formatted.push('-');
        }
        formatted.push_str(&self.group(integer));
        if !fraction.is_empty() {
            formatted.push(self.decimal_separator());
            formatted.push_str(fraction);
        }
        formatted
    }

    fn group(self, integer: &str) -> String {
        if integer.len() < 3 + self.min_grouping_digits() {
            return integer.to_string();
        }

        let separator = self.group_separator();
        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (index, digit) in integer.chars().enumerate() {
            let remaining = integer.len() - index;
            if index > 0 && remaining % 3 == 0 {
                grouped.push(separator);
            }
            grouped.push(digit);
        }
        grouped
    }
}
