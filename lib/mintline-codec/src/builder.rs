use std::{
    iter,
    time::{SystemTime, UNIX_EPOCH},
};

use snafu::OptionExt as _;
use tracing::warn;

use crate::config::SerializerConfiguration;
use crate::dimensions::DimensionList;
use crate::error::{InvalidMetricKey, MissingValue, SerializeError};
use crate::metadata::build_metadata_line;
use crate::normalize::normalize_metric_key;
use crate::serializer::serialize_line;
use crate::value::MetricValue;

/// Earliest accepted timestamp: 2000-01-01T00:00:00Z, in milliseconds since the Unix epoch.
const MIN_TIMESTAMP_MILLIS: u64 = 946_684_800_000;

/// Earliest rejected timestamp: 3000-01-01T00:00:00Z, in milliseconds since the Unix epoch.
const MAX_TIMESTAMP_MILLIS: u64 = 32_503_680_000_000;

/// Creates [`MetricBuilder`]s sharing a common configuration.
///
/// The default and static dimensions are normalized once, when the factory is created, rather than for every metric.
#[derive(Clone, Debug)]
pub struct MetricBuilderFactory {
    metric_prefix: String,
    default_dimensions: DimensionList,
    static_dimensions: DimensionList,
}

impl MetricBuilderFactory {
    /// Creates a new `MetricBuilderFactory` from the given configuration.
    pub fn new(config: SerializerConfiguration) -> Self {
        Self {
            metric_prefix: config.metric_prefix().to_string(),
            default_dimensions: config.default_dimensions().iter().collect(),
            static_dimensions: config.static_dimensions().iter().collect(),
        }
    }

    /// Creates a builder for a metric with the given name.
    ///
    /// The name is prefixed with the configured metric prefix, if any, and normalized when a line is serialized.
    pub fn new_metric_builder(&self, name: &str) -> MetricBuilder<'_> {
        let name = if self.metric_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.metric_prefix, name)
        };

        MetricBuilder {
            factory: self,
            name,
            dimensions: None,
            value: None,
            timestamp_millis: None,
            description: None,
            unit: None,
        }
    }
}

/// Builder for the lines of a single metric.
///
/// A value must be set before a metric line or a metadata line can be serialized. Setting a value again replaces the
/// previous one.
#[derive(Clone, Debug)]
pub struct MetricBuilder<'a> {
    factory: &'a MetricBuilderFactory,
    name: String,
    dimensions: Option<DimensionList>,
    value: Option<MetricValue>,
    timestamp_millis: Option<u64>,
    description: Option<String>,
    unit: Option<String>,
}

impl MetricBuilder<'_> {
    /// Sets the dimensions of this metric.
    pub fn set_dimensions(mut self, dimensions: DimensionList) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn set_value(mut self, value: MetricValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets an integral counter delta as the value.
    pub fn set_long_counter_delta(self, value: i64) -> Self {
        self.set_value(MetricValue::long_counter_delta(value))
    }

    /// Sets a floating-point counter delta as the value.
    pub fn set_double_counter_delta(self, value: f64) -> Self {
        self.set_value(MetricValue::double_counter_delta(value))
    }

    /// Sets an integral counter total as the value.
    pub fn set_long_counter_total(self, value: i64) -> Self {
        self.set_value(MetricValue::long_counter_total(value))
    }

    /// Sets a floating-point counter total as the value.
    pub fn set_double_counter_total(self, value: f64) -> Self {
        self.set_value(MetricValue::double_counter_total(value))
    }

    /// Sets an integral gauge as the value.
    pub fn set_long_gauge(self, value: i64) -> Self {
        self.set_value(MetricValue::long_gauge(value))
    }

    /// Sets a floating-point gauge as the value.
    pub fn set_double_gauge(self, value: f64) -> Self {
        self.set_value(MetricValue::double_gauge(value))
    }

    /// Sets an integral summary gauge as the value.
    pub fn set_long_summary(self, min: i64, max: i64, sum: i64, count: u64) -> Self {
        self.set_value(MetricValue::long_summary(min, max, sum, count))
    }

    /// Sets a floating-point summary gauge as the value.
    pub fn set_double_summary(self, min: f64, max: f64, sum: f64, count: u64) -> Self {
        self.set_value(MetricValue::double_summary(min, max, sum, count))
    }

    /// Sets the timestamp of the observation.
    ///
    /// Timestamps before 2000-01-01 or from 3000-01-01 onwards are most likely given in the wrong unit: they are dropped
    /// with a warning, and the ingest side assigns its own timestamp instead.
    pub fn set_timestamp(self, timestamp: SystemTime) -> Self {
        match timestamp.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => self.set_timestamp_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
            Err(_) => {
                warn!(metric_name = %self.name, "Timestamp is before the Unix epoch. Dropping timestamp.");
                self.clear_timestamp()
            }
        }
    }

    /// Sets the timestamp of the observation, in milliseconds since the Unix epoch.
    ///
    /// See [`set_timestamp`][Self::set_timestamp] for the accepted range.
    pub fn set_timestamp_millis(mut self, timestamp_millis: u64) -> Self {
        if !(MIN_TIMESTAMP_MILLIS..MAX_TIMESTAMP_MILLIS).contains(&timestamp_millis) {
            warn!(
                metric_name = %self.name,
                timestamp_millis,
                "Timestamp is outside of the accepted range. Dropping timestamp."
            );
            return self.clear_timestamp();
        }

        self.timestamp_millis = Some(timestamp_millis);
        self
    }

    /// Sets the timestamp of the observation to the current time.
    pub fn set_current_time(self) -> Self {
        self.set_timestamp(SystemTime::now())
    }

    fn clear_timestamp(mut self) -> Self {
        self.timestamp_millis = None;
        self
    }

    /// Sets the description written to the metadata line.
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the unit written to the metadata line.
    pub fn set_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Serializes the metric line.
    ///
    /// Dimensions are merged from the factory's default dimensions, the metric's own dimensions, and the factory's
    /// static dimensions, with later sources taking precedence.
    ///
    /// # Errors
    ///
    /// If no value was set, or if the line cannot be serialized (see [`serialize_line`]), an error is returned.
    pub fn serialize_metric_line(&self) -> Result<String, SerializeError> {
        let value = self.value.as_ref().context(MissingValue { key: &self.name })?;

        let dimensions = DimensionList::merge(
            iter::once(&self.factory.default_dimensions)
                .chain(self.dimensions.as_ref())
                .chain(iter::once(&self.factory.static_dimensions)),
        );

        serialize_line(&self.name, &dimensions, value, self.timestamp_millis)
    }

    /// Serializes the metadata line.
    ///
    /// The metric type is derived from the value: `count` for counters, `gauge` for gauges and summaries. Returns
    /// `Ok(None)` when there is neither a valid description nor a valid unit to send.
    ///
    /// # Errors
    ///
    /// If the metric name cannot be normalized to a valid key, or if no value was set, an error is returned.
    pub fn serialize_metadata_line(&self) -> Result<Option<String>, SerializeError> {
        let metric_key = normalize_metric_key(&self.name).context(InvalidMetricKey { key: &self.name })?;
        let value = self.value.as_ref().context(MissingValue { key: &self.name })?;

        Ok(build_metadata_line(
            &metric_key,
            self.description.as_deref(),
            self.unit.as_deref(),
            value.metric_type(),
        ))
    }
}
