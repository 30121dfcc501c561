//! Stock profile and price series types

use crate::core::numeric::{self, NumericField};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Exchange code of a listed stock, e.g. `7203`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StockCode(String);

impl StockCode {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.is_empty() {
            anyhow::bail!("Stock code must not be empty");
        }
        Ok(StockCode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StockCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StockCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockCode::new(s)
    }
}

impl<'de> Deserialize<'de> for StockCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StockCode::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Time span of a price series request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneDay,
        Period::OneWeek,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
    ];

    /// Wire token used in query strings.
    pub fn token(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::OneWeek => "1w",
            Period::OneMonth => "1m",
            Period::ThreeMonths => "3m",
            Period::SixMonths => "6m",
            Period::OneYear => "1y",
        }
    }

    /// Label shown in the period selector.
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1日",
            Period::OneWeek => "1週間",
            Period::OneMonth => "1ヶ月",
            Period::ThreeMonths => "3ヶ月",
            Period::SixMonths => "6ヶ月",
            Period::OneYear => "1年",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.token() == token)
            .ok_or_else(|| anyhow::anyhow!("Invalid period: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockProfile {
    pub code: StockCode,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: NumericField,
    #[serde(default)]
    pub current_price: NumericField,
    #[serde(default)]
    pub per: NumericField,
    #[serde(default)]
    pub pbr: NumericField,
}

/// One OHLCV bar. Consistency of high/low against open/close is not checked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub open: f64,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub high: f64,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub low: f64,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub close: f64,
    #[serde(deserialize_with = "numeric::lenient", default = "numeric::lenient_or_nan")]
    pub volume: f64,
}

/// Price history in the order received from the backend (ascending date).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceSeries {
    pub stock_code: StockCode,
    pub stock_name: String,
    pub period: Period,
    #[serde(default)]
    pub prices: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.prices.last()
    }
}
