//! Line protocol encoding for metrics.
//!
//! Turns metric observations into lines of the form
//!
//! ```text
//! <metric key>[,<dimension key>=<dimension value>]* <value field>[ <timestamp>]
//! ```
//!
//! along with optional metadata lines (see [`build_metadata_line`]). Arbitrary input is accepted: metric keys,
//! dimension keys and dimension values are normalized into their legal forms and bounded in length, and dimension
//! values are escaped. Only inputs that cannot be salvaged, such as a metric key with no valid section, are rejected.
//!
//! The free functions are the core of the crate. [`MetricBuilderFactory`] and [`MetricBuilder`] layer a metric name
//! prefix and configured default and static dimensions on top.
//!
//! This crate only encodes: sending lines, batching them, and retrying are left to the caller.
#![deny(warnings)]

pub mod codepoint;

mod builder;
pub use self::builder::{MetricBuilder, MetricBuilderFactory};

mod config;
pub use self::config::SerializerConfiguration;

mod dimensions;
pub use self::dimensions::{Dimension, DimensionList};

mod error;
pub use self::error::SerializeError;

mod escape;
pub use self::escape::{escape_dimension_value, need_to_escape_dimension_value};

mod metadata;
pub use self::metadata::{
    build_metadata_line, MetadataKeys, COUNT_TYPE, DESCRIPTION_KEY, GAUGE_TYPE, METADATA_KEYS, UNIT_KEY,
};

mod normalize;
pub use self::normalize::{
    normalize_dimension_key, normalize_dimension_value, normalize_metric_key, MAX_DIMENSION_KEY_LEN,
    MAX_DIMENSION_VALUE_LEN, MAX_METRIC_KEY_LEN,
};

mod serializer;
pub use self::serializer::{serialize_line, MAX_DIMENSIONS};

mod unit;
pub use self::unit::{is_valid_unit, MAX_UNIT_LEN};

mod value;
pub use self::value::{MetricValue, NumericValue};
