//! Presentation tiers for scores and recommendation labels.
//!
//! Both mappings are total: every input yields a tier.

use crate::core::evaluation::RecommendationLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationTier {
    Strong,
    Favorable,
    Caution,
    Unfavorable,
    Unknown,
}

/// High from 70, Medium from 50, Low for everything else including NaN.
pub fn score_tier(score: f64) -> ScoreTier {
    if score >= 70.0 {
        ScoreTier::High
    } else if score >= 50.0 {
        ScoreTier::Medium
    } else {
        ScoreTier::Low
    }
}

/// Exact-match lookup of a raw label; unrecognized labels are `Unknown`.
pub fn recommendation_tier(label: &str) -> RecommendationTier {
    RecommendationLabel::parse(label).tier()
}
