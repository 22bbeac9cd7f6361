//! The event payload value type.
//!
//! `data` on an audit entry is an open-ended bag of values. Rather than
//! carrying raw `serde_json::Value` (whose `Null` makes "absent" vs
//! "explicitly empty" ambiguous under canonical encoding), the payload is a
//! closed sum type over the shapes the canonical encoder can always
//! represent. Maps are `BTreeMap`, so keys are lexicographically sorted at
//! every nesting level by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ChronicleError, ChronicleResult};

/// A string-keyed payload map with deterministic key order.
pub type DataMap = BTreeMap<String, DataValue>;

/// A single payload value.
///
/// Serialized untagged, so exports read as natural JSON. There is no null
/// variant on purpose: an absent optional value is expressed by omitting
/// its key, never by encoding a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer, encoded as plain decimal.
    Int(i64),
    /// A finite floating-point number.
    ///
    /// Construct through [`DataValue::float`] to reject NaN/infinity up
    /// front; values smuggled in directly are still caught by the encoder.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence of values.
    List(Vec<DataValue>),
    /// A nested string-keyed mapping.
    Map(DataMap),
}

impl DataValue {
    /// Build a float value, rejecting NaN and infinities.
    pub fn float(value: f64) -> ChronicleResult<Self> {
        if value.is_finite() {
            Ok(Self::Float(value))
        } else {
            Err(ChronicleError::Encoding {
                reason: format!("non-finite float {value} is not representable"),
            })
        }
    }

    /// Check that every float reachable from this value is finite.
    ///
    /// The canonical encoder calls this before serializing so a payload
    /// that cannot be deterministically rendered fails loudly instead of
    /// silently degrading.
    pub fn ensure_encodable(&self) -> ChronicleResult<()> {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::String(_) => Ok(()),
            Self::Float(f) if f.is_finite() => Ok(()),
            Self::Float(f) => Err(ChronicleError::Encoding {
                reason: format!("non-finite float {f} is not representable"),
            }),
            Self::List(items) => items.iter().try_for_each(Self::ensure_encodable),
            Self::Map(map) => map.values().try_for_each(Self::ensure_encodable),
        }
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl TryFrom<serde_json::Value> for DataValue {
    type Error = ChronicleError;

    /// Convert arbitrary JSON into a payload value.
    ///
    /// Fails on `null` (omit the key instead) and on integers outside the
    /// `i64` range. JSON cannot carry non-finite floats, so every number
    /// that arrives here is representable as `Int` or `Float`.
    fn try_from(value: serde_json::Value) -> ChronicleResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Err(ChronicleError::Encoding {
                reason: "null is not representable; omit the key instead".to_string(),
            }),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if n.is_u64() {
                    // Encoding a u64 beyond i64::MAX through f64 would lose
                    // precision, so it is rejected rather than approximated.
                    Err(ChronicleError::Encoding {
                        reason: format!("integer {n} is outside the i64 range"),
                    })
                } else if let Some(f) = n.as_f64() {
                    Self::float(f)
                } else {
                    Err(ChronicleError::Encoding {
                        reason: format!("number {n} is not representable"),
                    })
                }
            }
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<ChronicleResult<Vec<_>>>()
                .map(Self::List),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| Ok((k, Self::try_from(v)?)))
                .collect::<ChronicleResult<DataMap>>()
                .map(Self::Map),
        }
    }
}

/// Convert a JSON object into a [`DataMap`].
///
/// The payload of an audit event is always a mapping at the top level;
/// anything else is an encoding error.
pub fn data_map_from_json(value: serde_json::Value) -> ChronicleResult<DataMap> {
    match DataValue::try_from(value)? {
        DataValue::Map(map) => Ok(map),
        other => Err(ChronicleError::Encoding {
            reason: format!("payload must be a string-keyed object, got {other:?}"),
        }),
    }
}
