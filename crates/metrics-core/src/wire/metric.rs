//! The `Metric` wire record and the `Batch` it travels in.
//!
//! Pairs a derived `Serialize` impl with a hand-written `Deserialize`/
//! `FromStr`, since the derive macro can't express the invariant that
//! exactly one of `value`/`delta` is present, chosen by `type`.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// The two metric families this system understands.
///
/// A gauge update *replaces* the stored value; a counter update *adds* to
/// it. The two kinds are namespaced independently: a gauge `X` and a
/// counter `X` are distinct entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauge" => Ok(MetricKind::Gauge),
            "counter" => Ok(MetricKind::Counter),
            other => Err(ValidationError::UnknownType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validation errors for a single metric record.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown metric type '{value}'")]
    UnknownType { value: String },

    #[error("gauge metric '{id}' is missing its 'value' field")]
    MissingValue { id: String },

    #[error("counter metric '{id}' is missing its 'delta' field")]
    MissingDelta { id: String },

    #[error("metric id must not be empty")]
    EmptyId,
}

/// A single sampled metric, exactly one of `value`/`delta` populated
/// depending on `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    id: String,
    kind: MetricKind,
    value: Option<f64>,
    delta: Option<i64>,
}

impl Metric {
    /// Construct a gauge metric. Panics are never used here — invalid input
    /// (empty id) is caught by [`Metric::validated`], the constructor the
    /// wire-deserialize path and the legacy-URL handlers both funnel through.
    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Gauge,
            value: Some(value),
            delta: None,
        }
    }

    /// Construct a counter metric with the given delta.
    pub fn counter(id: impl Into<String>, delta: i64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Counter,
            value: None,
            delta: Some(delta),
        }
    }

    /// Build a metric from its raw parts, enforcing the "exactly one of
    /// value/delta" invariant. Used by the legacy plain-text endpoints and
    /// by the custom `Deserialize` impl below, so both codepaths share one
    /// validation rule.
    pub fn validated(
        id: String,
        kind: MetricKind,
        value: Option<f64>,
        delta: Option<i64>,
    ) -> Result<Self, ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        match kind {
            MetricKind::Gauge => {
                let value = value.ok_or_else(|| ValidationError::MissingValue { id: id.clone() })?;
                Ok(Self {
                    id,
                    kind,
                    value: Some(value),
                    delta: None,
                })
            }
            MetricKind::Counter => {
                let delta = delta.ok_or_else(|| ValidationError::MissingDelta { id: id.clone() })?;
                Ok(Self {
                    id,
                    kind,
                    value: None,
                    delta: Some(delta),
                })
            }
        }
    }

    /// A read-only request carries only `id` and `kind` — `/value/`.
    pub fn read_request(id: String, kind: MetricKind) -> Self {
        Self {
            id,
            kind,
            value: None,
            delta: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn delta(&self) -> Option<i64> {
        self.delta
    }

    /// Return a copy of this metric with `value` set — used when building the
    /// canonical response record that echoes the accumulated counter value
    /// rather than the submitted delta.
    pub fn with_gauge_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self.delta = None;
        self
    }

    /// Return a copy of this metric with `delta` set to the accumulated
    /// counter total (not the submitted delta).
    pub fn with_counter_total(mut self, total: i64) -> Self {
        self.delta = Some(total);
        self.value = None;
        self
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let field_count = 2 + self.value.is_some() as usize + self.delta.is_some() as usize;
        let mut state = serializer.serialize_struct("Metric", field_count)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.kind.as_str())?;
        if let Some(value) = self.value {
            state.serialize_field("value", &value)?;
        }
        if let Some(delta) = self.delta {
            state.serialize_field("delta", &delta)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MetricVisitor;

        impl<'de> Visitor<'de> for MetricVisitor {
            type Value = Metric;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a metric object with id, type, and value or delta")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Metric, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id: Option<String> = None;
                let mut kind_str: Option<String> = None;
                let mut value: Option<f64> = None;
                let mut delta: Option<i64> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "id" => id = Some(map.next_value()?),
                        "type" => kind_str = Some(map.next_value()?),
                        "value" => value = map.next_value()?,
                        "delta" => delta = map.next_value()?,
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                let id = id.ok_or_else(|| de::Error::missing_field("id"))?;
                let kind_str = kind_str.ok_or_else(|| de::Error::missing_field("type"))?;
                let kind: MetricKind = kind_str
                    .parse()
                    .map_err(|e: ValidationError| de::Error::custom(e.to_string()))?;

                // A read request (`/value/`) carries neither value nor delta;
                // full validation of "exactly one present" is performed by
                // the ingest handlers via `Metric::validated`, not here, so
                // that the same wire type serves both read and write shapes.
                Ok(Metric {
                    id,
                    kind,
                    value,
                    delta,
                })
            }
        }

        deserializer.deserialize_map(MetricVisitor)
    }
}

/// Error constructing a [`Batch`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    #[error("batch must contain at least one metric")]
    Empty,
}

/// An ordered, non-empty sequence of metrics processed as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Metric>", into = "Vec<Metric>")]
pub struct Batch(Vec<Metric>);

impl Batch {
    pub fn metrics(&self) -> &[Metric] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Metric> {
        self.0
    }
}

impl TryFrom<Vec<Metric>> for Batch {
    type Error = BatchError;

    fn try_from(metrics: Vec<Metric>) -> Result<Self, Self::Error> {
        if metrics.is_empty() {
            return Err(BatchError::Empty);
        }
        Ok(Self(metrics))
    }
}

impl From<Batch> for Vec<Metric> {
    fn from(batch: Batch) -> Self {
        batch.0
    }
}

#[cfg(test)]
#[path = "metric_tests.rs"]
mod tests;
