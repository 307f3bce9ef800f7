//! Metadata lines.
//!
//! A metadata line describes a metric rather than carrying an observation of it:
//!
//! ```text
//! #<metric key> <metric type> dt.meta.description=<escaped description>,dt.meta.unit=<unit>
//! ```
//!
//! Either pair may be missing, but not both: without a description and without a unit, there is nothing to send.
use tracing::debug;

use crate::escape::escape_dimension_value;
use crate::normalize::normalize_dimension_value;
use crate::unit::is_valid_unit;

/// Reserved dimension key carrying the metric description.
pub const DESCRIPTION_KEY: &str = "dt.meta.description";

/// Reserved dimension key carrying the metric unit.
pub const UNIT_KEY: &str = "dt.meta.unit";

/// Metric type of counters.
pub const COUNT_TYPE: &str = "count";

/// Metric type of gauges, including summary gauges.
pub const GAUGE_TYPE: &str = "gauge";

/// The reserved keys used in metadata lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetadataKeys {
    /// Key carrying the metric description.
    pub description: &'static str,

    /// Key carrying the metric unit.
    pub unit: &'static str,
}

/// The reserved keys used in metadata lines.
pub const METADATA_KEYS: MetadataKeys = MetadataKeys {
    description: DESCRIPTION_KEY,
    unit: UNIT_KEY,
};

/// Builds the metadata line for a metric.
///
/// `metric_key` and `metric_type` are written verbatim, so the key should already be normalized. Any metric type is
/// accepted, although [`COUNT_TYPE`] and [`GAUGE_TYPE`] are the ones the ingest side understands.
///
/// The description is normalized and escaped like a dimension value, and is left out if it normalizes to nothing. The
/// unit is left out if it is not valid (see [`is_valid_unit`]); it is never rewritten.
///
/// Returns `None` if neither a description nor a unit remain.
pub fn build_metadata_line(
    metric_key: &str, description: Option<&str>, unit: Option<&str>, metric_type: &str,
) -> Option<String> {
    let description = description.and_then(|description| {
        let normalized = normalize_dimension_value(description);
        if normalized.is_empty() {
            debug!(metric_key, "Metric description is empty after normalization. Omitting.");
            return None;
        }
        Some(escape_dimension_value(&normalized).into_owned())
    });

    let unit = unit.filter(|unit| {
        let valid = is_valid_unit(unit);
        if !valid {
            debug!(metric_key, unit, "Metric unit is invalid. Omitting.");
        }
        valid
    });

    if description.is_none() && unit.is_none() {
        return None;
    }

    let mut line = String::with_capacity(64);
    line.push('#');
    line.push_str(metric_key);
    line.push(' ');
    line.push_str(metric_type);
    line.push(' ');

    if let Some(description) = &description {
        line.push_str(METADATA_KEYS.description);
        line.push('=');
        line.push_str(description);
    }

    if let Some(unit) = unit {
        if description.is_some() {
            line.push(',');
        }
        line.push_str(METADATA_KEYS.unit);
        line.push('=');
        line.push_str(unit);
    }

    Some(line)
}
