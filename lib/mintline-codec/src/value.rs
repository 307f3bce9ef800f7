use std::fmt;

use crate::error::{InvalidValue, SerializeError};
use crate::metadata::{COUNT_TYPE, GAUGE_TYPE};

/// A number, either integral or floating-point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericValue {
    /// A 64-bit signed integer.
    Long(i64),

    /// A 64-bit floating-point number.
    Double(f64),
}

impl NumericValue {
    fn is_finite(&self) -> bool {
        match self {
            Self::Long(_) => true,
            Self::Double(value) => value.is_finite(),
        }
    }

    fn greater_than(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a > b,
            (a, b) => a.as_f64() > b.as_f64(),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Self::Long(value) => *value as f64,
            Self::Double(value) => *value,
        }
    }
}

impl From<i64> for NumericValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(value) => write!(f, "{}", value),
            Self::Double(value) => {
                // Switch to exponent notation at the extremes, where the plain form would be dozens of digits long.
                let magnitude = value.abs();
                if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
                    write!(f, "{:e}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
        }
    }
}

/// A metric value.
///
/// Each variant maps to one value field on the wire, written by the `Display` implementation:
///
/// - counter deltas: `count,delta=<value>`
/// - counter totals: `count,<value>`
/// - gauges: `gauge,<value>`
/// - summaries: `gauge,min=<min>,max=<max>,sum=<sum>,count=<count>`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    /// A counter, expressed as the change since the last report.
    CounterDelta {
        /// Counter delta.
        value: NumericValue,
    },

    /// A counter, expressed as its absolute total.
    CounterTotal {
        /// Counter total.
        value: NumericValue,
    },

    /// A gauge.
    Gauge {
        /// Gauge value.
        value: NumericValue,
    },

    /// A gauge summarizing a set of observations.
    Summary {
        /// Smallest observed value.
        min: NumericValue,

        /// Largest observed value.
        max: NumericValue,

        /// Sum of all observed values.
        sum: NumericValue,

        /// Number of observed values.
        count: u64,
    },
}

impl MetricValue {
    /// Creates an integral counter delta.
    pub fn long_counter_delta(value: i64) -> Self {
        Self::CounterDelta { value: value.into() }
    }

    /// Creates a floating-point counter delta.
    pub fn double_counter_delta(value: f64) -> Self {
        Self::CounterDelta { value: value.into() }
    }

    /// Creates an integral counter total.
    pub fn long_counter_total(value: i64) -> Self {
        Self::CounterTotal { value: value.into() }
    }

    /// Creates a floating-point counter total.
    pub fn double_counter_total(value: f64) -> Self {
        Self::CounterTotal { value: value.into() }
    }

    /// Creates an integral gauge.
    pub fn long_gauge(value: i64) -> Self {
        Self::Gauge { value: value.into() }
    }

    /// Creates a floating-point gauge.
    pub fn double_gauge(value: f64) -> Self {
        Self::Gauge { value: value.into() }
    }

    /// Creates an integral summary gauge.
    pub fn long_summary(min: i64, max: i64, sum: i64, count: u64) -> Self {
        Self::Summary {
            min: min.into(),
            max: max.into(),
            sum: sum.into(),
            count,
        }
    }

    /// Creates a floating-point summary gauge.
    pub fn double_summary(min: f64, max: f64, sum: f64, count: u64) -> Self {
        Self::Summary {
            min: min.into(),
            max: max.into(),
            sum: sum.into(),
            count,
        }
    }

    /// Returns the metric type to announce in metadata lines.
    pub fn metric_type(&self) -> &'static str {
        match self {
            Self::CounterDelta { .. } | Self::CounterTotal { .. } => COUNT_TYPE,
            Self::Gauge { .. } | Self::Summary { .. } => GAUGE_TYPE,
        }
    }

    /// Checks that the value can be written to a line.
    ///
    /// # Errors
    ///
    /// If any number is NaN or infinite, or if a summary's minimum is greater than its maximum, an error is returned.
    pub fn validate(&self) -> Result<(), SerializeError> {
        match self {
            Self::CounterDelta { value } | Self::CounterTotal { value } | Self::Gauge { value } => {
                ensure_finite("value", value)
            }
            Self::Summary { min, max, sum, .. } => {
                ensure_finite("min", min)?;
                ensure_finite("max", max)?;
                ensure_finite("sum", sum)?;

                if min.greater_than(max) {
                    return InvalidValue {
                        reason: format!("summary min ({}) is greater than max ({})", min, max),
                    }
                    .fail();
                }

                Ok(())
            }
        }
    }
}

fn ensure_finite(field: &str, value: &NumericValue) -> Result<(), SerializeError> {
    if value.is_finite() {
        Ok(())
    } else {
        InvalidValue {
            reason: format!("{} must be finite, got {}", field, value),
        }
        .fail()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CounterDelta { value } => write!(f, "{},delta={}", COUNT_TYPE, value),
            Self::CounterTotal { value } => write!(f, "{},{}", COUNT_TYPE, value),
            Self::Gauge { value } => write!(f, "{},{}", GAUGE_TYPE, value),
            Self::Summary { min, max, sum, count } => write!(
                f,
                "{},min={},max={},sum={},count={}",
                GAUGE_TYPE, min, max, sum, count
            ),
        }
    }
}
