//! # Financial Statement Analyzer
//!
//! A library for deriving analytical metrics from a two-period financial
//! statement (line item, prior value, current value) and packaging them as
//! grounding context for a conversational assistant.
//!
//! ## Core Concepts
//!
//! - **Line items**: rows of an already-parsed statement; labels are free text
//!   and matched by case-insensitive substring, never by position
//! - **Enriched table**: every row extended with growth and its share of total
//!   assets for both periods
//! - **Ratio bundle**: the current ratio for both periods, each either a value
//!   or an explicit "unavailable" marker
//! - **Context assembly**: a one-shot narrative prompt or a role-tagged chat
//!   message sequence built from the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_statement_analyzer::*;
//!
//! let raw = RawTable::from_triples(vec![
//!     ("TỔNG CỘNG TÀI SẢN", 1_000.0, 1_500.0),
//!     ("TÀI SẢN NGẮN HẠN", 400.0, 600.0),
//!     ("NỢ NGẮN HẠN", 200.0, 250.0),
//! ]);
//!
//! let analysis = analyze_statement(&raw).unwrap();
//! let prompt = ContextAssembler::default()
//!     .build_analysis_prompt(analysis.table(), analysis.ratios());
//! ```

pub mod config;
pub mod context;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod matcher;
pub mod schema;
pub mod utils;

pub use config::{AnalyzerConfig, ApiKey, LabelAliases};
pub use context::ContextAssembler;
pub use conversation::{ChatMessage, ChatTurn, ConversationStore, Role};
pub use engine::{
    compute_growth, safe_divide_approx, safe_divide_or_unavailable, MetricEngine, EPSILON,
};
pub use error::{AnalysisError, Result, UpstreamErrorKind};
pub use ingestion::{parse_statement, ParsedStatement};
pub use matcher::{find, find_by_label, LabelMatcher, LabelNotFound};
pub use schema::*;
pub use utils::*;

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Everything derived from one uploaded statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementAnalysis {
    #[schemars(description = "SHA-256 of the raw table the analysis was derived from")]
    fingerprint: String,
    table: EnrichedTable,
    ratios: RatioBundle,
    #[schemars(
        description = "Non-fatal problems: cells treated as zero and indicators that could not be derived"
    )]
    warnings: Vec<AnalysisWarning>,
}

impl StatementAnalysis {
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn table(&self) -> &EnrichedTable {
        &self.table
    }

    pub fn ratios(&self) -> &RatioBundle {
        &self.ratios
    }

    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StatementAnalysis)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Runs the engine and remembers the last result, keyed by the content
/// fingerprint of the raw table. A different table replaces the memo.
pub struct StatementAnalyzer {
    engine: MetricEngine,
    last: Option<StatementAnalysis>,
}

impl Default for StatementAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl StatementAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            engine: MetricEngine::new(&config.labels),
            last: None,
        }
    }

    pub fn analyze(&mut self, raw: &RawTable) -> Result<StatementAnalysis> {
        let fingerprint = fingerprint(raw);

        if let Some(cached) = &self.last {
            if cached.fingerprint == fingerprint {
                debug!("Reusing analysis for table {}", fingerprint);
                return Ok(cached.clone());
            }
        }

        self.last = None;
        let analysis = run_analysis(&self.engine, raw, fingerprint)?;
        self.last = Some(analysis.clone());
        Ok(analysis)
    }

    /// Computes from scratch, ignoring and leaving the memo untouched.
    pub fn analyze_uncached(&self, raw: &RawTable) -> Result<StatementAnalysis> {
        run_analysis(&self.engine, raw, fingerprint(raw))
    }
}

pub fn analyze_statement(raw: &RawTable) -> Result<StatementAnalysis> {
    StatementAnalyzer::default().analyze_uncached(raw)
}

/// Hex SHA-256 over the exact cell contents (cell kind, number bits, text
/// bytes) of the raw table.
pub fn fingerprint(raw: &RawTable) -> String {
    let mut hasher = Sha256::new();
    hasher.update((raw.rows.len() as u64).to_le_bytes());
    for row in &raw.rows {
        hasher.update((row.len() as u64).to_le_bytes());
        for cell in row {
            match cell {
                RawCell::Empty => hasher.update([0u8]),
                RawCell::Number(n) => {
                    hasher.update([1u8]);
                    hasher.update(n.to_bits().to_le_bytes());
                }
                RawCell::Text(text) => {
                    hasher.update([2u8]);
                    hasher.update((text.len() as u64).to_le_bytes());
                    hasher.update(text.as_bytes());
                }
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

fn run_analysis(
    engine: &MetricEngine,
    raw: &RawTable,
    fingerprint: String,
) -> Result<StatementAnalysis> {
    info!("Analysing statement with {} rows", raw.len());

    let parsed = parse_statement(raw)?;
    let table = engine.compute_shares(&parsed.items)?;
    let ratios = engine.compute_liquidity(&parsed.items);

    let growth = engine.current_assets_growth(&table);

    let mut warnings = parsed.warnings;
    let indicators = std::iter::once((context::CURRENT_ASSETS_GROWTH, &growth))
        .chain(ratios.entries());
    for (name, value) in indicators {
        if let Some(reason) = value.unavailable_reason() {
            warnings.push(AnalysisWarning::LookupUnavailable {
                metric: name.to_string(),
                reason: reason.clone(),
            });
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }

    Ok(StatementAnalysis {
        fingerprint,
        table,
        ratios,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> RawTable {
        RawTable::from_triples(vec![
            ("TÀI SẢN NGẮN HẠN", 400.0, 600.0),
            ("Tiền", 100.0, 0.0),
            ("NỢ NGẮN HẠN", 200.0, 0.0),
            ("TỔNG CỘNG TÀI SẢN", 1000.0, 1500.0),
        ])
    }

    #[test]
    fn test_end_to_end_analysis() {
        let analysis = analyze_statement(&statement()).unwrap();

        assert_eq!(analysis.table().len(), 4);
        assert_eq!(analysis.table().total_assets_label(), "TỔNG CỘNG TÀI SẢN");
        assert_eq!(analysis.ratios().current_ratio_prior.value(), Some(2.0));
        assert!(!analysis.ratios().current_ratio_current.is_available());

        assert_eq!(analysis.warnings().len(), 1);
        assert_eq!(
            analysis.warnings()[0],
            AnalysisWarning::LookupUnavailable {
                metric: RatioBundle::CURRENT_RATIO_CURRENT.to_string(),
                reason: UnavailableReason::ZeroDenominator,
            }
        );
    }

    #[test]
    fn test_missing_current_assets_warns_for_every_indicator() {
        let raw = RawTable::from_triples(vec![
            ("NỢ NGẮN HẠN", 200.0, 250.0),
            ("TỔNG CỘNG TÀI SẢN", 1000.0, 1500.0),
        ]);

        let analysis = analyze_statement(&raw).unwrap();

        let metrics: Vec<&str> = analysis
            .warnings()
            .iter()
            .filter_map(|w| match w {
                AnalysisWarning::LookupUnavailable { metric, .. } => Some(metric.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            metrics,
            vec![
                context::CURRENT_ASSETS_GROWTH,
                RatioBundle::CURRENT_RATIO_PRIOR,
                RatioBundle::CURRENT_RATIO_CURRENT,
            ]
        );
    }

    #[test]
    fn test_saturated_growth_is_written_as_a_number() {
        let raw = RawTable::from_triples(vec![
            ("TOTAL ASSETS", 1.0, 1.0),
            ("New line", 0.0, 1e300),
        ]);
        let analysis = analyze_statement(&raw).unwrap();
        assert_eq!(analysis.table().rows()[1].growth_pct, f64::MAX);

        let json = analysis.to_json().unwrap();
        assert!(!json.contains("null"));
        assert!(json.contains("1.7976931348623157e308"));
    }

    #[test]
    fn test_analysis_is_bit_identical_across_runs() {
        let first = analyze_statement(&statement()).unwrap();
        let second = analyze_statement(&statement()).unwrap();

        assert_eq!(first, second);
        for (a, b) in first.table().iter().zip(second.table().iter()) {
            assert_eq!(a.growth_pct.to_bits(), b.growth_pct.to_bits());
            assert_eq!(a.prior_share_pct.to_bits(), b.prior_share_pct.to_bits());
            assert_eq!(a.current_share_pct.to_bits(), b.current_share_pct.to_bits());
        }
    }

    #[test]
    fn test_memo_matches_fresh_computation() {
        let mut analyzer = StatementAnalyzer::default();
        let cached_first = analyzer.analyze(&statement()).unwrap();
        let cached_second = analyzer.analyze(&statement()).unwrap();
        let fresh = analyzer.analyze_uncached(&statement()).unwrap();

        assert_eq!(cached_first, cached_second);
        assert_eq!(cached_second, fresh);
    }

    #[test]
    fn test_memo_is_replaced_for_new_table() {
        let mut analyzer = StatementAnalyzer::default();
        let first = analyzer.analyze(&statement()).unwrap();

        let other = RawTable::from_triples(vec![("TOTAL ASSETS", 10.0, 20.0)]);
        let second = analyzer.analyze(&other).unwrap();

        assert_ne!(first.fingerprint(), second.fingerprint());
        assert_eq!(second.table().len(), 1);
    }

    #[test]
    fn test_failed_analysis_clears_memo() {
        let mut analyzer = StatementAnalyzer::default();
        analyzer.analyze(&statement()).unwrap();

        let broken = RawTable::from_triples(vec![("Cash", 1.0, 2.0)]);
        assert!(matches!(
            analyzer.analyze(&broken),
            Err(AnalysisError::MissingTotals { .. })
        ));
        assert!(analyzer.last.is_none());
    }

    #[test]
    fn test_fingerprint_distinguishes_nan_from_empty() {
        let with_nan = RawTable::new(vec![vec!["x".into(), RawCell::Number(f64::NAN), RawCell::Empty]]);
        let with_empty = RawTable::new(vec![vec!["x".into(), RawCell::Empty, RawCell::Empty]]);
        assert_ne!(fingerprint(&with_nan), fingerprint(&with_empty));
        assert_eq!(fingerprint(&with_empty), fingerprint(&with_empty.clone()));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = StatementAnalysis::schema_as_json().unwrap();
        assert!(schema_json.contains("fingerprint"));
        assert!(schema_json.contains("growth_pct"));
        assert!(schema_json.contains("current_ratio_prior"));
    }

    #[test]
    fn test_analysis_serializes_to_json() {
        let analysis = analyze_statement(&statement()).unwrap();
        let json = analysis.to_json().unwrap();
        assert!(json.contains("\"total_assets_label\": \"TỔNG CỘNG TÀI SẢN\""));

        let restored: StatementAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.fingerprint(), analysis.fingerprint());
    }
}
