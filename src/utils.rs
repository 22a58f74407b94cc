use crate::schema::{EnrichedTable, RatioBundle, RatioValue};

pub const NOT_AVAILABLE: &str = "N/A";

/// Rounds to a whole number and groups thousands: `1234567.8` -> `1,234,568`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Two-decimal percentage: `12.345` -> `12.35%` (the value is already in percent).
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

/// Two-decimal ratio, or `N/A` when the ratio is unavailable.
pub fn format_ratio(value: &RatioValue) -> String {
    match value.value() {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Same as [`format_ratio`] but for percentage-valued indicators.
pub fn format_ratio_percent(value: &RatioValue) -> String {
    match value.value() {
        Some(v) => format_percent(v),
        None => NOT_AVAILABLE.to_string(),
    }
}

const TABLE_HEADERS: [&str; 6] = [
    "Line item",
    "Prior period",
    "Current period",
    "Growth (%)",
    "Prior share (%)",
    "Current share (%)",
];

fn formatted_cells(table: &EnrichedTable) -> Vec<[String; 6]> {
    table
        .iter()
        .map(|row| {
            [
                row.label.clone(),
                format_amount(row.prior_value),
                format_amount(row.current_value),
                format_percent(row.growth_pct),
                format_percent(row.prior_share_pct),
                format_percent(row.current_share_pct),
            ]
        })
        .collect()
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl EnrichedTable {
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("| {} |\n", TABLE_HEADERS.join(" | ")));
        output.push_str("|---|---:|---:|---:|---:|---:|\n");

        for cells in formatted_cells(self) {
            let escaped: Vec<String> = cells.iter().map(|c| escape_markdown_cell(c)).collect();
            output.push_str(&format!("| {} |\n", escaped.join(" | ")));
        }

        output
    }

    /// Raw (unformatted) values, one line per row.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("label,prior_value,current_value,growth_pct,prior_share_pct,current_share_pct\n");

        for row in self {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                escape_csv_field(&row.label),
                row.prior_value,
                row.current_value,
                row.growth_pct,
                row.prior_share_pct,
                row.current_share_pct
            ));
        }

        output
    }
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl RatioBundle {
    pub fn to_markdown(&self) -> String {
        let mut output = String::from("| Indicator | Value |\n|---|---:|\n");
        for (name, value) in self.entries() {
            output.push_str(&format!("| {} | {} |\n", name, format_ratio(value)));
        }
        output
    }
}
