use snafu::Snafu;

/// A metric serialization error.
///
/// Only failures that make a whole line unusable are errors. Dimensions or metadata fields that normalize to nothing
/// are dropped silently instead.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SerializeError {
    /// The metric key could not be normalized to a valid key.
    #[snafu(display("metric key '{}' cannot be normalized to a valid key", key))]
    InvalidMetricKey {
        /// The metric key as given.
        key: String,
    },

    /// No value was set for the metric.
    #[snafu(display("no value set for metric '{}'", key))]
    MissingValue {
        /// The metric name, including any prefix.
        key: String,
    },

    /// The metric value cannot be represented on the wire.
    #[snafu(display("invalid value: {}", reason))]
    InvalidValue {
        /// Why the value was rejected.
        reason: String,
    },

    /// The metric has more dimensions than a line may carry.
    #[snafu(display("metric has {} dimensions, more than the limit of {}", count, limit))]
    TooManyDimensions {
        /// Number of dimensions on the metric.
        count: usize,

        /// Maximum number of dimensions.
        limit: usize,
    },
}
