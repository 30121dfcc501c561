//! Normalization of numeric fields that the backend encodes either as JSON
//! numbers or as decimal strings.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A numeric payload field after boundary decoding.
///
/// `Absent` means "no data" and the field should be suppressed in the UI.
/// `Unparseable` is the decoded form of textual content that is not a finite
/// decimal number; it stands in for the not-a-number sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NumericField {
    #[default]
    Absent,
    Number(f64),
    Unparseable,
}

impl NumericField {
    /// Canonical number: `None` when absent, `NaN` when unparseable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericField::Absent => None,
            NumericField::Number(n) => Some(*n),
            NumericField::Unparseable => Some(f64::NAN),
        }
    }

    /// Only real, finite numbers.
    pub fn finite(&self) -> Option<f64> {
        match self {
            NumericField::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NumericField::Absent)
    }

    fn from_text(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => NumericField::Number(n),
            _ => NumericField::Unparseable,
        }
    }
}

impl From<f64> for NumericField {
    fn from(n: f64) -> Self {
        if n.is_finite() {
            NumericField::Number(n)
        } else {
            NumericField::Unparseable
        }
    }
}

/// Normalizes a raw JSON value. `None` and `null` are absent, numbers pass
/// through, strings are parsed, anything else is unparseable.
pub fn normalize(value: Option<&Value>) -> NumericField {
    match value {
        None | Some(Value::Null) => NumericField::Absent,
        Some(Value::Number(n)) => n.as_f64().map_or(NumericField::Unparseable, NumericField::from),
        Some(Value::String(s)) => NumericField::from_text(s),
        Some(_) => NumericField::Unparseable,
    }
}

struct NumericFieldVisitor;

impl<'de> Visitor<'de> for NumericFieldVisitor {
    type Value = NumericField;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(NumericField::Absent)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(NumericField::Absent)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(NumericFieldVisitor)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(NumericField::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(NumericField::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(NumericField::Number(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(NumericField::from_text(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(NumericField::Unparseable)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(NumericField::Unparseable)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map
            .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
            .is_some()
        {}
        Ok(NumericField::Unparseable)
    }
}

impl<'de> Deserialize<'de> for NumericField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericFieldVisitor)
    }
}

/// Deserializes a required numeric field straight to `f64`.
///
/// Absent and unparseable inputs become `NaN`; callers check
/// `is_finite()` before formatting.
pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let field = NumericField::deserialize(deserializer)?;
    Ok(field.as_f64().unwrap_or(f64::NAN))
}

/// `lenient` counterpart for fields that may be missing from the payload.
pub fn lenient_or_nan() -> f64 {
    f64::NAN
}
