use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single untyped cell as delivered by the spreadsheet parser.
///
/// Deserializes from a JSON number, a JSON string or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Empty)
    }
}

/// Rows of cells in the order the parser produced them. Each row is expected
/// to hold exactly three cells: label, prior-period value, current-period value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    /// Convenience builder for already-numeric statements.
    pub fn from_triples<L: Into<String>>(triples: impl IntoIterator<Item = (L, f64, f64)>) -> Self {
        let rows = triples
            .into_iter()
            .map(|(label, prior, current)| {
                vec![
                    RawCell::Text(label.into()),
                    RawCell::Number(prior),
                    RawCell::Number(current),
                ]
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One of the two numeric columns. The label column is never coerced, so it
/// has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Prior,
    Current,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prior => "prior",
            Self::Current => "current",
        };
        f.write_str(name)
    }
}

/// One row of the statement after numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    #[schemars(description = "Line-item name exactly as it appeared in the statement")]
    pub label: String,
    #[schemars(description = "Value for the prior period")]
    pub prior_value: f64,
    #[schemars(description = "Value for the current period")]
    pub current_value: f64,
}

impl LineItem {
    pub fn new(label: impl Into<String>, prior_value: f64, current_value: f64) -> Self {
        Self {
            label: label.into(),
            prior_value,
            current_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichedRow {
    pub label: String,
    pub prior_value: f64,
    pub current_value: f64,
    #[schemars(
        description = "Period-over-period growth in percent. A zero prior value is replaced by 1e-9, so very large magnitudes are expected for near-zero bases."
    )]
    pub growth_pct: f64,
    #[schemars(description = "Prior value as a percentage of prior-period total assets")]
    pub prior_share_pct: f64,
    #[schemars(description = "Current value as a percentage of current-period total assets")]
    pub current_share_pct: f64,
}

/// The line items with growth and composition columns attached.
///
/// Only the metric engine builds these; there are no mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichedTable {
    rows: Vec<EnrichedRow>,
    #[schemars(description = "Label of the row used as total assets for the share columns")]
    total_assets_label: String,
}

impl EnrichedTable {
    pub(crate) fn new(rows: Vec<EnrichedRow>, total_assets_label: String) -> Self {
        Self {
            rows,
            total_assets_label,
        }
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_assets_label(&self) -> &str {
        &self.total_assets_label
    }
}

impl<'a> IntoIterator for &'a EnrichedTable {
    type Item = &'a EnrichedRow;
    type IntoIter = std::slice::Iter<'a, EnrichedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    #[schemars(description = "No line item matched the label query")]
    RowNotFound { query: String },
    #[schemars(description = "The denominator was exactly zero")]
    ZeroDenominator,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowNotFound { query } => write!(f, "no line item matches {}", query),
            Self::ZeroDenominator => f.write_str("denominator is zero"),
        }
    }
}

/// A derived ratio, or an explicit marker saying why it could not be derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatioValue {
    Available { value: f64 },
    Unavailable { reason: UnavailableReason },
}

impl RatioValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available { value } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            Self::Available { .. } => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioBundle {
    #[schemars(description = "Current assets / current liabilities for the prior period")]
    pub current_ratio_prior: RatioValue,
    #[schemars(description = "Current assets / current liabilities for the current period")]
    pub current_ratio_current: RatioValue,
}

impl RatioBundle {
    pub const CURRENT_RATIO_PRIOR: &'static str = "Current ratio (prior period)";
    pub const CURRENT_RATIO_CURRENT: &'static str = "Current ratio (current period)";

    /// Named entries in display order.
    pub fn entries(&self) -> [(&'static str, &RatioValue); 2] {
        [
            (Self::CURRENT_RATIO_PRIOR, &self.current_ratio_prior),
            (Self::CURRENT_RATIO_CURRENT, &self.current_ratio_current),
        ]
    }

    /// Change of the current ratio between periods, when both sides exist.
    pub fn current_ratio_change(&self) -> Option<f64> {
        match (
            self.current_ratio_prior.value(),
            self.current_ratio_current.value(),
        ) {
            (Some(prior), Some(current)) => Some(current - prior),
            _ => None,
        }
    }
}

/// A non-fatal problem found while analysing a table. These are reported
/// alongside the results and never abort the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisWarning {
    CoercedToZero {
        row: usize,
        column: Column,
        raw: String,
    },
    LookupUnavailable {
        metric: String,
        reason: UnavailableReason,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoercedToZero { row, column, raw } => write!(
                f,
                "Row {} {} value '{}' is not numeric and was treated as 0",
                row, column, raw
            ),
            Self::LookupUnavailable { metric, reason } => {
                write!(f, "{} is unavailable: {}", metric, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_cell_deserializes_mixed_row() {
        let row: Vec<RawCell> = serde_json::from_str(r#"["Cash", 1200.5, null]"#).unwrap();
        assert_eq!(
            row,
            vec![
                RawCell::Text("Cash".to_string()),
                RawCell::Number(1200.5),
                RawCell::Empty,
            ]
        );
    }

    #[test]
    fn test_ratio_change_requires_both_periods() {
        let bundle = RatioBundle {
            current_ratio_prior: RatioValue::Available { value: 1.25 },
            current_ratio_current: RatioValue::Available { value: 2.0 },
        };
        assert_eq!(bundle.current_ratio_change(), Some(0.75));

        let bundle = RatioBundle {
            current_ratio_prior: RatioValue::Unavailable {
                reason: UnavailableReason::ZeroDenominator,
            },
            current_ratio_current: RatioValue::Available { value: 2.0 },
        };
        assert_eq!(bundle.current_ratio_change(), None);
    }

    #[test]
    fn test_ratio_value_serializes_with_status_tag() {
        let value = RatioValue::Unavailable {
            reason: UnavailableReason::RowNotFound {
                query: "'CURRENT ASSETS'".to_string(),
            },
        };
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"status\":\"unavailable\""));
        assert!(json.contains("\"kind\":\"row_not_found\""));
    }

    #[test]
    fn test_warning_display() {
        let warning = AnalysisWarning::CoercedToZero {
            row: 3,
            column: Column::Prior,
            raw: "n/a".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Row 3 prior value 'n/a' is not numeric and was treated as 0"
        );
    }
}
