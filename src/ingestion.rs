use crate::error::{AnalysisError, Result};
use crate::schema::{AnalysisWarning, Column, LineItem, RawCell, RawTable};
use log::debug;

/// Rows sliced into line items, plus a warning for every cell that had to be
/// coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub items: Vec<LineItem>,
    pub warnings: Vec<AnalysisWarning>,
}

/// Maps each raw row positionally to (label, prior, current).
///
/// A row with any other number of cells fails the whole table. Numeric cells
/// that cannot be read are treated as zero rather than rejected, so a single
/// bad cell never aborts the analysis.
pub fn parse_statement(table: &RawTable) -> Result<ParsedStatement> {
    let mut items = Vec::with_capacity(table.rows.len());
    let mut warnings = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let [label, prior, current] = row.as_slice() else {
            return Err(AnalysisError::MalformedTable {
                row: idx,
                found: row.len(),
            });
        };

        let prior_value = coerce_cell(prior, idx, Column::Prior, &mut warnings);
        let current_value = coerce_cell(current, idx, Column::Current, &mut warnings);

        items.push(LineItem {
            label: label_text(label),
            prior_value,
            current_value,
        });
    }

    debug!(
        "Parsed {} line items ({} cells coerced to zero)",
        items.len(),
        warnings.len()
    );

    Ok(ParsedStatement { items, warnings })
}

/// Reads a numeric cell. Text is trimmed and parsed; anything unreadable,
/// empty or non-finite yields `None`.
pub fn coerce_numeric(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
        RawCell::Empty => return None,
    };
    value.is_finite().then_some(value)
}

fn coerce_cell(
    cell: &RawCell,
    row: usize,
    column: Column,
    warnings: &mut Vec<AnalysisWarning>,
) -> f64 {
    match coerce_numeric(cell) {
        Some(value) => value,
        None => {
            warnings.push(AnalysisWarning::CoercedToZero {
                row,
                column,
                raw: raw_text(cell),
            });
            0.0
        }
    }
}

fn label_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Text(text) => text.clone(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Empty => String::new(),
    }
}

fn raw_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Text(text) => text.clone(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Empty => "<empty>".to_string(),
    }
}
