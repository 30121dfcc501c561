//! Evaluation results computed by the remote evaluator

use crate::core::classify::{RecommendationTier, ScoreTier, score_tier};
use crate::core::numeric::{self, NumericField};
use crate::core::stock::StockCode;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;

/// Recommendation label as sent by the evaluator.
///
/// Labels outside the known set are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationLabel {
    Strong,
    Favorable,
    Caution,
    Unfavorable,
    WaitAndSee,
    Unknown(String),
}

impl RecommendationLabel {
    pub fn parse(label: &str) -> Self {
        match label {
            "強力" => RecommendationLabel::Strong,
            "推奨" => RecommendationLabel::Favorable,
            "注意" => RecommendationLabel::Caution,
            "非推奨" => RecommendationLabel::Unfavorable,
            "様子見" => RecommendationLabel::WaitAndSee,
            other => RecommendationLabel::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecommendationLabel::Strong => "強力",
            RecommendationLabel::Favorable => "推奨",
            RecommendationLabel::Caution => "注意",
            RecommendationLabel::Unfavorable => "非推奨",
            RecommendationLabel::WaitAndSee => "様子見",
            RecommendationLabel::Unknown(other) => other,
        }
    }

    pub fn tier(&self) -> RecommendationTier {
        match self {
            RecommendationLabel::Strong => RecommendationTier::Strong,
            RecommendationLabel::Favorable => RecommendationTier::Favorable,
            RecommendationLabel::Caution => RecommendationTier::Caution,
            // Sell side uses "wait and see" where buy side says "unfavorable"
            RecommendationLabel::Unfavorable | RecommendationLabel::WaitAndSee => {
                RecommendationTier::Unfavorable
            }
            RecommendationLabel::Unknown(_) => RecommendationTier::Unknown,
        }
    }
}

impl Default for RecommendationLabel {
    fn default() -> Self {
        RecommendationLabel::Unknown(String::new())
    }
}

impl Display for RecommendationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecommendationLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(RecommendationLabel::default, |s| {
            RecommendationLabel::parse(&s)
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovingAverages {
    pub ma_short: NumericField,
    pub ma_medium: NumericField,
    pub ma_long: NumericField,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Macd {
    pub macd: NumericField,
    pub signal: NumericField,
    pub histogram: NumericField,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BollingerBands {
    pub upper: NumericField,
    pub middle: NumericField,
    pub lower: NumericField,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupportResistance {
    pub support: NumericField,
    pub resistance: NumericField,
}

/// Opaque indicator payload. The evaluator sends empty objects when there
/// was not enough history, so every value may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TechnicalIndicators {
    pub moving_averages: MovingAverages,
    pub rsi: NumericField,
    pub macd: Macd,
    pub bollinger_bands: BollingerBands,
    pub support_resistance: SupportResistance,
}

/// Sub-evaluation of a single valuation ratio (PER, PBR).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricEvaluation {
    pub score: NumericField,
    pub evaluation: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FundamentalMetrics {
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub score: f64,
    #[serde(default)]
    pub evaluation: String,
    #[serde(default)]
    pub per_evaluation: MetricEvaluation,
    #[serde(default)]
    pub pbr_evaluation: MetricEvaluation,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signal {
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub score: f64,
    #[serde(default)]
    pub recommendation: RecommendationLabel,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Result of one evaluation run. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvaluationResult {
    #[serde(default)]
    pub id: Option<u64>,
    pub stock_code: StockCode,
    pub stock_name: String,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub buy_score: f64,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub sell_score: f64,
    #[serde(default)]
    pub buy_recommendation: RecommendationLabel,
    #[serde(default)]
    pub sell_recommendation: RecommendationLabel,
    #[serde(default)]
    pub technical_indicators: TechnicalIndicators,
    pub fundamental_metrics: FundamentalMetrics,
    pub buy_signal: Signal,
    pub sell_signal: Signal,
    #[serde(default)]
    pub evaluation_date: String,
}

impl EvaluationResult {
    pub fn buy_tier(&self) -> ScoreTier {
        score_tier(self.buy_score)
    }

    pub fn sell_tier(&self) -> ScoreTier {
        score_tier(self.sell_score)
    }

    /// Evaluation timestamp; the evaluator sends local time without offset,
    /// but RFC 3339 with an offset is accepted too.
    pub fn evaluated_at(&self) -> Option<NaiveDateTime> {
        let raw = self.evaluation_date.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 12,
        "stock_code": "7203",
        "stock_name": "トヨタ自動車",
        "buy_score": 82,
        "sell_score": "35",
        "buy_recommendation": "強力",
        "sell_recommendation": "様子見",
        "technical_indicators": {
            "moving_averages": {"ma_short": 2510.4, "ma_medium": "2480.1", "ma_long": 2400},
            "rsi": 41.2,
            "macd": {"macd": 1.5, "signal": 0.9, "histogram": 0.6},
            "bollinger_bands": {},
            "support_resistance": {"support": 2300, "resistance": 2700}
        },
        "fundamental_metrics": {
            "score": 70,
            "evaluation": "良好",
            "per_evaluation": {"score": 80, "evaluation": "割安", "description": "PER 8.50は割安水準です"},
            "pbr_evaluation": {"score": 60, "evaluation": "適正", "description": "PBR 1.00は適正水準です"},
            "descriptions": ["PER 8.50は割安水準です", "PBR 1.00は適正水準です"]
        },
        "buy_signal": {"score": 82, "recommendation": "強力", "reasons": ["RSIが低水準", "PERが割安"]},
        "sell_signal": {"score": 35, "recommendation": "様子見", "reasons": []},
        "evaluation_date": "2024-05-01T10:15:30.123456"
    }"#;

    #[test]
    fn test_decode_full_evaluation() {
        let eval: EvaluationResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(eval.id, Some(12));
        assert_eq!(eval.buy_score, 82.0);
        assert_eq!(eval.sell_score, 35.0);
        assert_eq!(eval.buy_recommendation, RecommendationLabel::Strong);
        assert_eq!(eval.sell_recommendation, RecommendationLabel::WaitAndSee);
        assert_eq!(
            eval.technical_indicators.moving_averages.ma_medium.finite(),
            Some(2480.1)
        );
        assert!(eval.technical_indicators.bollinger_bands.upper.is_absent());
        assert_eq!(eval.fundamental_metrics.per_evaluation.evaluation, "割安");
        assert_eq!(eval.buy_signal.reasons.len(), 2);
        assert!(eval.evaluated_at().is_some());
    }

    #[test]
    fn test_tiers_are_independent() {
        let eval: EvaluationResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(eval.buy_tier(), ScoreTier::High);
        assert_eq!(eval.buy_recommendation.tier(), RecommendationTier::Strong);
        assert_eq!(eval.sell_tier(), ScoreTier::Low);
        assert_eq!(
            eval.sell_recommendation.tier(),
            RecommendationTier::Unfavorable
        );
    }

    #[test]
    fn test_unknown_labels_are_kept() {
        let label: RecommendationLabel = serde_json::from_str(r#""不明""#).unwrap();
        assert_eq!(label, RecommendationLabel::Unknown("不明".to_string()));
        assert_eq!(label.to_string(), "不明");
        assert_eq!(label.tier(), RecommendationTier::Unknown);

        let label: RecommendationLabel = serde_json::from_str("null").unwrap();
        assert_eq!(label.tier(), RecommendationTier::Unknown);
    }

    #[test]
    fn test_evaluation_date_formats() {
        let mut eval: EvaluationResult = serde_json::from_str(SAMPLE).unwrap();
        eval.evaluation_date = "2024-05-01T10:15:30+09:00".to_string();
        assert!(eval.evaluated_at().is_some());
        eval.evaluation_date = "yesterday".to_string();
        assert!(eval.evaluated_at().is_none());
    }
}
