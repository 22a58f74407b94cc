//! The metric engine: growth, composition and liquidity derived from a
//! two-period statement. Pure and deterministic.
//!
//! Two zero-denominator policies live here and are deliberately distinct:
//! [`safe_divide_approx`] keeps growth and share figures finite by
//! substituting [`EPSILON`], while [`safe_divide_or_unavailable`] refuses to
//! produce a liquidity ratio at all.

use crate::config::LabelAliases;
use crate::error::{AnalysisError, Result};
use crate::matcher::{find, AnyOf, ContainsIgnoreCase};
use crate::schema::{
    EnrichedRow, EnrichedTable, LineItem, RatioBundle, RatioValue, UnavailableReason,
};
use log::debug;

/// Stand-in for a zero denominator under the approximate policy.
pub const EPSILON: f64 = 1e-9;

/// `numerator / denominator`, with a zero denominator replaced by [`EPSILON`].
/// The result keeps its sign but can be very large.
pub fn safe_divide_approx(numerator: f64, denominator: f64) -> f64 {
    let divisor = if denominator != 0.0 {
        denominator
    } else {
        EPSILON
    };
    numerator / divisor
}

/// `numerator / denominator`, or `Unavailable` when the denominator is zero.
pub fn safe_divide_or_unavailable(numerator: f64, denominator: f64) -> RatioValue {
    if denominator == 0.0 {
        RatioValue::Unavailable {
            reason: UnavailableReason::ZeroDenominator,
        }
    } else {
        RatioValue::Available {
            value: numerator / denominator,
        }
    }
}

/// `numerator / denominator * 100` under the approximate policy. A result
/// that overflows `f64` saturates at `±f64::MAX` so it stays finite.
fn approx_percent(numerator: f64, denominator: f64) -> f64 {
    let pct = safe_divide_approx(numerator, denominator) * 100.0;
    if pct.is_finite() {
        pct
    } else if pct.is_nan() {
        0.0
    } else {
        f64::MAX.copysign(pct)
    }
}

/// Period-over-period growth of one line item, in percent.
pub fn compute_growth(item: &LineItem) -> f64 {
    approx_percent(item.current_value - item.prior_value, item.prior_value)
}

pub struct MetricEngine {
    total_assets: AnyOf<ContainsIgnoreCase>,
    current_assets: AnyOf<ContainsIgnoreCase>,
    current_liabilities: AnyOf<ContainsIgnoreCase>,
}

impl Default for MetricEngine {
    fn default() -> Self {
        Self::new(&LabelAliases::default())
    }
}

impl MetricEngine {
    pub fn new(labels: &LabelAliases) -> Self {
        Self {
            total_assets: AnyOf::aliases(&labels.total_assets),
            current_assets: AnyOf::aliases(&labels.current_assets),
            current_liabilities: AnyOf::aliases(&labels.current_liabilities),
        }
    }

    /// Builds the enriched table: growth plus the share of total assets for
    /// both periods.
    ///
    /// Fails with `MissingTotals` when no total-assets row exists; shares are
    /// undefined without it, so no partial table is returned.
    pub fn compute_shares(&self, items: &[LineItem]) -> Result<EnrichedTable> {
        let totals = find(items, &self.total_assets).map_err(|e| AnalysisError::MissingTotals {
            query: e.query,
        })?;

        debug!(
            "Total assets row '{}': prior {}, current {}",
            totals.label, totals.prior_value, totals.current_value
        );

        let rows = items
            .iter()
            .map(|item| EnrichedRow {
                label: item.label.clone(),
                prior_value: item.prior_value,
                current_value: item.current_value,
                growth_pct: compute_growth(item),
                prior_share_pct: approx_percent(item.prior_value, totals.prior_value),
                current_share_pct: approx_percent(item.current_value, totals.current_value),
            })
            .collect();

        Ok(EnrichedTable::new(rows, totals.label.clone()))
    }

    /// Current ratio for both periods. Missing rows or a zero liabilities
    /// value degrade the affected entries to `Unavailable`; this never fails.
    pub fn compute_liquidity(&self, items: &[LineItem]) -> RatioBundle {
        let lookup = find(items, &self.current_assets)
            .and_then(|assets| find(items, &self.current_liabilities).map(|liab| (assets, liab)));

        match lookup {
            Ok((assets, liabilities)) => RatioBundle {
                current_ratio_prior: safe_divide_or_unavailable(
                    assets.prior_value,
                    liabilities.prior_value,
                ),
                current_ratio_current: safe_divide_or_unavailable(
                    assets.current_value,
                    liabilities.current_value,
                ),
            },
            Err(not_found) => {
                let missing = RatioValue::Unavailable {
                    reason: UnavailableReason::RowNotFound {
                        query: not_found.query,
                    },
                };
                RatioBundle {
                    current_ratio_prior: missing.clone(),
                    current_ratio_current: missing,
                }
            }
        }
    }

    /// Growth of the current-assets row, if there is one.
    pub fn current_assets_growth(&self, table: &EnrichedTable) -> RatioValue {
        match find(table.rows(), &self.current_assets) {
            Ok(row) => RatioValue::Available {
                value: row.growth_pct,
            },
            Err(not_found) => RatioValue::Unavailable {
                reason: UnavailableReason::RowNotFound {
                    query: not_found.query,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_sheet() -> Vec<LineItem> {
        vec![
            LineItem::new("A. Current assets", 400.0, 600.0),
            LineItem::new("Cash", 100.0, 0.0),
            LineItem::new("Current liabilities", 200.0, 300.0),
            LineItem::new("TOTAL ASSETS", 1000.0, 1500.0),
        ]
    }

    #[test]
    fn test_growth_with_zero_prior_is_finite() {
        let growth = compute_growth(&LineItem::new("New line", 0.0, 5.0));
        assert!(growth.is_finite());
        assert!(growth > 1e9);
    }

    #[test]
    fn test_growth_saturates_instead_of_overflowing() {
        let up = compute_growth(&LineItem::new("x", 0.0, 1e300));
        assert!(up.is_finite());
        assert_eq!(up, f64::MAX);

        let down = compute_growth(&LineItem::new("x", 0.0, -1e300));
        assert_eq!(down, -f64::MAX);

        let wide = compute_growth(&LineItem::new("x", -f64::MAX, f64::MAX));
        assert!(wide.is_finite());
    }

    #[test]
    fn test_growth_sign_and_magnitude() {
        assert_eq!(compute_growth(&LineItem::new("x", 100.0, 150.0)), 50.0);
        assert_eq!(compute_growth(&LineItem::new("x", 100.0, 50.0)), -50.0);
        assert_eq!(compute_growth(&LineItem::new("x", 0.0, 0.0)), 0.0);
        assert!(compute_growth(&LineItem::new("x", 0.0, -5.0)) < 0.0);
    }

    #[test]
    fn test_shares_against_total_assets() {
        let engine = MetricEngine::default();
        let items = vec![
            LineItem::new("TOTAL ASSETS", 100.0, 200.0),
            LineItem::new("CASH", 40.0, 80.0),
        ];

        let table = engine.compute_shares(&items).unwrap();

        let cash = &table.rows()[1];
        assert_eq!(cash.prior_share_pct, 40.0);
        assert_eq!(cash.current_share_pct, 40.0);
        assert_eq!(cash.growth_pct, 100.0);
        assert_eq!(table.rows()[0].prior_share_pct, 100.0);
        assert_eq!(table.total_assets_label(), "TOTAL ASSETS");
    }

    #[test]
    fn test_shares_preserve_row_order() {
        let engine = MetricEngine::default();
        let table = engine.compute_shares(&balance_sheet()).unwrap();
        let labels: Vec<&str> = table.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["A. Current assets", "Cash", "Current liabilities", "TOTAL ASSETS"]
        );
    }

    #[test]
    fn test_shares_with_zero_total_stay_finite() {
        let engine = MetricEngine::default();
        let items = vec![
            LineItem::new("Total assets", 0.0, 10.0),
            LineItem::new("Cash", 3.0, 5.0),
        ];
        let table = engine.compute_shares(&items).unwrap();
        assert!(table.rows()[1].prior_share_pct.is_finite());
        assert_eq!(table.rows()[1].current_share_pct, 50.0);
    }

    #[test]
    fn test_huge_share_over_zero_total_saturates() {
        let engine = MetricEngine::default();
        let items = vec![
            LineItem::new("Total assets", 0.0, 1.0),
            LineItem::new("Goodwill", 1e300, 1.0),
        ];
        let table = engine.compute_shares(&items).unwrap();
        assert_eq!(table.rows()[1].prior_share_pct, f64::MAX);
        assert_eq!(table.rows()[1].current_share_pct, 100.0);
    }

    #[test]
    fn test_missing_total_assets_is_fatal() {
        let engine = MetricEngine::default();
        let items = vec![LineItem::new("Cash", 40.0, 80.0)];

        match engine.compute_shares(&items) {
            Err(AnalysisError::MissingTotals { query }) => {
                assert!(query.contains("TOTAL ASSETS"));
            }
            other => panic!("expected MissingTotals, got {:?}", other),
        }
    }

    #[test]
    fn test_liquidity_both_periods() {
        let engine = MetricEngine::default();
        let ratios = engine.compute_liquidity(&balance_sheet());
        assert_eq!(ratios.current_ratio_prior, RatioValue::Available { value: 2.0 });
        assert_eq!(ratios.current_ratio_current, RatioValue::Available { value: 2.0 });
    }

    #[test]
    fn test_liquidity_zero_liabilities_is_per_period() {
        let engine = MetricEngine::default();
        let items = vec![
            LineItem::new("Current assets", 500.0, 600.0),
            LineItem::new("Current liabilities", 250.0, 0.0),
        ];

        let ratios = engine.compute_liquidity(&items);

        assert_eq!(ratios.current_ratio_prior, RatioValue::Available { value: 2.0 });
        assert_eq!(
            ratios.current_ratio_current,
            RatioValue::Unavailable {
                reason: UnavailableReason::ZeroDenominator
            }
        );
    }

    #[test]
    fn test_liquidity_missing_row_marks_both_unavailable() {
        let engine = MetricEngine::default();
        let items = vec![
            LineItem::new("Current assets", 500.0, 600.0),
            LineItem::new("TOTAL ASSETS", 900.0, 1000.0),
        ];

        let ratios = engine.compute_liquidity(&items);

        assert!(!ratios.current_ratio_prior.is_available());
        assert!(!ratios.current_ratio_current.is_available());
        match ratios.current_ratio_current.unavailable_reason() {
            Some(UnavailableReason::RowNotFound { query }) => {
                assert!(query.contains("CURRENT LIABILITIES"))
            }
            other => panic!("unexpected reason {:?}", other),
        }
    }

    #[test]
    fn test_two_division_policies_differ_on_zero() {
        assert_eq!(safe_divide_approx(1.0, 0.0), 1.0 / EPSILON);
        assert!(!safe_divide_or_unavailable(1.0, 0.0).is_available());
        assert_eq!(safe_divide_approx(6.0, 3.0), 2.0);
        assert_eq!(safe_divide_or_unavailable(6.0, 3.0).value(), Some(2.0));
    }

    #[test]
    fn test_current_assets_growth() {
        let engine = MetricEngine::default();
        let table = engine.compute_shares(&balance_sheet()).unwrap();
        assert_eq!(engine.current_assets_growth(&table).value(), Some(50.0));
    }
}
