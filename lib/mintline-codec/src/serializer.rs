use snafu::{ensure, OptionExt as _};
use tracing::debug;

use crate::dimensions::DimensionList;
use crate::error::{InvalidMetricKey, SerializeError, TooManyDimensions};
use crate::escape::escape_dimension_value;
use crate::normalize::normalize_metric_key;
use crate::value::MetricValue;

/// Maximum number of dimensions on a single line.
pub const MAX_DIMENSIONS: usize = 50;

/// Serializes a metric observation into a single line.
///
/// The line has the form `<key>[,<dimension key>=<dimension value>]* <value field>[ <timestamp>]`, without a trailing
/// newline. The metric name is normalized here; dimension keys and values are already normalized by
/// [`DimensionList`], and values are escaped here. Dimensions with an empty value are left out. Without a timestamp,
/// the ingest side assigns its own.
///
/// # Errors
///
/// If the metric name cannot be normalized to a valid key, if the value is invalid, or if more than [`MAX_DIMENSIONS`]
/// dimensions would be written, an error is returned.
pub fn serialize_line(
    metric_name: &str, dimensions: &DimensionList, value: &MetricValue, timestamp_millis: Option<u64>,
) -> Result<String, SerializeError> {
    let metric_key = normalize_metric_key(metric_name).context(InvalidMetricKey { key: metric_name })?;
    value.validate()?;

    let mut line = String::with_capacity(metric_key.len() + 32 * (dimensions.len() + 1));
    line.push_str(&metric_key);

    let mut written = 0;
    for (key, value) in dimensions.iter() {
        if value.is_empty() {
            debug!(metric_key, key, "Dimension value is empty. Dropping dimension.");
            continue;
        }

        line.push(',');
        line.push_str(key);
        line.push('=');
        line.push_str(&escape_dimension_value(value));
        written += 1;
    }

    ensure!(
        written <= MAX_DIMENSIONS,
        TooManyDimensions {
            count: written,
            limit: MAX_DIMENSIONS,
        }
    );

    line.push(' ');
    line.push_str(&value.to_string());
    if let Some(timestamp_millis) = timestamp_millis {
        line.push(' ');
        line.push_str(&timestamp_millis.to_string());
    }

    Ok(line)
}
