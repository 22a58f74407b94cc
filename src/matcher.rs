//! Locating semantically named rows ("total assets", "current liabilities", ...)
//! in a loosely structured statement.
//!
//! Matching is kept apart from the numeric engine: [`find`] takes any
//! [`LabelMatcher`], so exact, substring or alias-based strategies can be
//! swapped without touching the growth/share math.

use crate::schema::{EnrichedRow, LineItem};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no line item matches {query}")]
pub struct LabelNotFound {
    pub query: String,
}

/// Anything that carries a line-item label.
pub trait Labelled {
    fn label(&self) -> &str;
}

impl Labelled for LineItem {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labelled for EnrichedRow {
    fn label(&self) -> &str {
        &self.label
    }
}

pub trait LabelMatcher {
    fn matches(&self, label: &str) -> bool;

    /// Human readable form of the query, used in errors and warnings.
    fn describe(&self) -> String;
}

/// Lowercases, trims and collapses whitespace runs to a single space.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive substring match.
#[derive(Debug, Clone)]
pub struct ContainsIgnoreCase {
    query: String,
    needle: String,
}

impl ContainsIgnoreCase {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let needle = normalize_label(&query);
        Self { query, needle }
    }
}

impl LabelMatcher for ContainsIgnoreCase {
    fn matches(&self, label: &str) -> bool {
        normalize_label(label).contains(&self.needle)
    }

    fn describe(&self) -> String {
        format!("'{}'", self.query)
    }
}

#[derive(Debug, Clone)]
pub struct ExactIgnoreCase {
    query: String,
    expected: String,
}

impl ExactIgnoreCase {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let expected = normalize_label(&query);
        Self { query, expected }
    }
}

impl LabelMatcher for ExactIgnoreCase {
    fn matches(&self, label: &str) -> bool {
        normalize_label(label) == self.expected
    }

    fn describe(&self) -> String {
        format!("exactly '{}'", self.query)
    }
}

/// Matches when any of the inner matchers does. Used for multilingual aliases.
#[derive(Debug, Clone)]
pub struct AnyOf<M> {
    matchers: Vec<M>,
}

impl<M: LabelMatcher> AnyOf<M> {
    pub fn new(matchers: Vec<M>) -> Self {
        Self { matchers }
    }
}

impl AnyOf<ContainsIgnoreCase> {
    pub fn aliases<S: AsRef<str>>(aliases: &[S]) -> Self {
        Self::new(
            aliases
                .iter()
                .map(|alias| ContainsIgnoreCase::new(alias.as_ref()))
                .collect(),
        )
    }
}

impl<M: LabelMatcher> LabelMatcher for AnyOf<M> {
    fn matches(&self, label: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(label))
    }

    fn describe(&self) -> String {
        self.matchers
            .iter()
            .map(|m| m.describe())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Returns the first row (in table order) accepted by `matcher`.
pub fn find<'a, R, M>(rows: &'a [R], matcher: &M) -> Result<&'a R, LabelNotFound>
where
    R: Labelled,
    M: LabelMatcher + ?Sized,
{
    rows.iter()
        .find(|row| matcher.matches(row.label()))
        .ok_or_else(|| LabelNotFound {
            query: matcher.describe(),
        })
}

/// Case-insensitive substring lookup; first match wins.
pub fn find_by_label<'a, R: Labelled>(
    rows: &'a [R],
    substring: &str,
) -> Result<&'a R, LabelNotFound> {
    find(rows, &ContainsIgnoreCase::new(substring))
}
