//! Core data layer: payload types, normalization, classification and
//! request descriptors

pub mod classify;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod log;
pub mod numeric;
pub mod request;
pub mod stock;

// Re-export main types for cleaner imports
pub use classify::{RecommendationTier, ScoreTier, recommendation_tier, score_tier};
pub use error::{ApiError, TransportError};
pub use evaluation::{EvaluationResult, RecommendationLabel};
pub use numeric::NumericField;
pub use request::{ApiRequest, Method, RawRequest, RawResponse, Transport};
pub use stock::{Period, PricePoint, PriceSeries, StockCode, StockProfile};
