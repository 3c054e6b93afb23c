//! Matching input and output types
//!
//! Confidence is an ordered enum, not a bare score: the signal priority
//! (national ID > tax ID > plate > name) is a total order and comparisons
//! must stay exhaustive under pattern matching.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Match confidence, lowest to highest.
///
/// Declaration order is the derive(Ord) order; `Exact` wins every
/// comparison. Ties cannot occur across signals because lookups run in
/// fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    /// No signal matched
    None,
    /// Name matched with multiple candidates
    Low,
    /// Plate matched, or exactly one name-match candidate
    Medium,
    /// Tax ID matched
    High,
    /// National ID matched
    Exact,
}

impl MatchConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchConfidence::None => "none",
            MatchConfidence::Low => "low",
            MatchConfidence::Medium => "medium",
            MatchConfidence::High => "high",
            MatchConfidence::Exact => "exact",
        }
    }
}

/// Which raw signal produced a candidate, in lookup priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSignal {
    NationalId,
    TaxId,
    Plate,
    Name,
}

/// Raw identity signals for one resolution call.
///
/// Construction trims whitespace and drops blank values, so `None` always
/// means "signal absent" downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchSignals {
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub name: Option<String>,
    pub plate: Option<String>,
}

impl MatchSignals {
    pub fn new(
        national_id: Option<String>,
        tax_id: Option<String>,
        name: Option<String>,
        plate: Option<String>,
    ) -> Self {
        Self {
            national_id: normalize_signal(national_id),
            tax_id: normalize_signal(tax_id),
            name: normalize_signal(name),
            plate: normalize_signal(plate),
        }
    }

    /// True when no signal carries a value; the call degenerates to
    /// "no candidates"
    pub fn is_empty(&self) -> bool {
        self.national_id.is_none()
            && self.tax_id.is_none()
            && self.name.is_none()
            && self.plate.is_none()
    }

    /// Re-apply trimming to signals that arrived via deserialization
    pub fn normalized(self) -> Self {
        Self::new(self.national_id, self.tax_id, self.name, self.plate)
    }
}

/// Trim a raw signal; blank values become None
pub fn normalize_signal(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a free-text name for index lookups: trimmed, lowercased,
/// inner whitespace collapsed
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One ranked candidate from the candidate finder. Transient; never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub customer_guid: Uuid,
    pub display_name: String,
    pub national_id: Option<String>,
    pub tax_id: Option<String>,
    pub confidence: MatchConfidence,
    pub matched_by: MatchSignal,
}

/// Outcome of one resolution call.
///
/// `candidates` keeps the ranked list so low-confidence results can be
/// surfaced for operator disambiguation.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub customer_guid: Option<Uuid>,
    pub confidence: MatchConfidence,
    pub matched_by: Option<MatchSignal>,
    pub auto_created: bool,
    pub candidates: Vec<MatchCandidate>,
}

impl MatchResult {
    /// Result for a call where nothing matched
    pub fn no_match() -> Self {
        Self {
            customer_guid: None,
            confidence: MatchConfidence::None,
            matched_by: None,
            auto_created: false,
            candidates: Vec::new(),
        }
    }
}
