//! Hyperparameter values and candidate ranges.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::errors::{ParamError, VcResult};

/// A concrete hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value (`Int` widens to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they carry no fraction.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => v.to_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float(_) | Self::Int(_))
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Ordered, non-empty sequence of candidate values for one hyperparameter.
///
/// Row `i` of every score matrix produced for this range belongs to value `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParamValue>", into = "Vec<ParamValue>")]
pub struct ParamRange {
    values: Vec<ParamValue>,
}

impl ParamRange {
    pub fn from_values<I, V>(values: I) -> VcResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ParamError::EmptyRange.into());
        }
        Ok(Self { values })
    }

    /// Range of floats from any primitive numeric type.
    pub fn from_numbers<I, T>(values: I) -> VcResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        let mut floats = Vec::new();
        for (idx, value) in values.into_iter().enumerate() {
            let v = value.to_f64().ok_or_else(|| ParamError::InvalidValue {
                name: format!("range[{idx}]"),
                message: "not representable as f64".to_string(),
            })?;
            floats.push(ParamValue::Float(v));
        }
        Self::from_values(floats)
    }

    /// `n` evenly spaced floats over `[low, high]`.
    pub fn linspace(low: f64, high: f64, n: usize) -> VcResult<Self> {
        let values = match n {
            0 => Vec::new(),
            1 => vec![low],
            _ => (0..n)
                .map(|i| {
                    let t = i as f64 / (n - 1) as f64;
                    low + t * (high - low)
                })
                .collect(),
        };
        Self::from_values(values)
    }

    /// `n` floats spaced evenly on a log scale from `10^low_exp` to `10^high_exp`.
    pub fn logspace(low_exp: f64, high_exp: f64, n: usize) -> VcResult<Self> {
        let exponents = Self::linspace(low_exp, high_exp, n)?;
        let values = exponents
            .values
            .iter()
            .filter_map(ParamValue::as_f64)
            .map(|e| 10f64.powf(e));
        Self::from_values(values)
    }

    /// Every integer in `[low, high]`.
    pub fn ints(low: i64, high: i64) -> VcResult<Self> {
        Self::from_values(low..=high)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParamValue> {
        self.values.iter()
    }

    pub fn first(&self) -> &ParamValue {
        &self.values[0]
    }

    /// True when every value can be placed on a numeric axis.
    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(ParamValue::is_numeric)
    }

    /// Numeric coordinates, or `None` for categorical ranges.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.values.iter().map(ParamValue::as_f64).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(ToString::to_string).collect()
    }
}

impl TryFrom<Vec<ParamValue>> for ParamRange {
    type Error = ParamError;

    fn try_from(values: Vec<ParamValue>) -> Result<Self, Self::Error> {
        if values.is_empty() {
            return Err(ParamError::EmptyRange);
        }
        Ok(Self { values })
    }
}

impl From<ParamRange> for Vec<ParamValue> {
    fn from(range: ParamRange) -> Self {
        range.values
    }
}

impl<'a> IntoIterator for &'a ParamRange {
    type Item = &'a ParamValue;
    type IntoIter = std::slice::Iter<'a, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
