use indexmap::IndexMap;
use mintline_config::GenericConfiguration;
use mintline_error::{ErrorContext as _, GenericError};
use serde::Deserialize;

/// Serializer configuration.
///
/// Controls the parts of every line that do not depend on the metric being written: the metric name prefix, and the
/// dimensions added to every line.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SerializerConfiguration {
    /// Prefix for all metric names.
    ///
    /// When not empty, metric names are written as `<prefix>.<name>`. The prefix is normalized together with the rest
    /// of the metric key.
    ///
    /// Defaults to an empty string.
    #[serde(default)]
    metric_prefix: String,

    /// Dimensions added to every line.
    ///
    /// These have the lowest precedence: a dimension with the same key on the metric itself, or in the static
    /// dimensions, replaces them.
    ///
    /// Defaults to no dimensions.
    #[serde(default)]
    default_dimensions: IndexMap<String, String>,

    /// Dimensions added to every line, which cannot be overridden.
    ///
    /// These have the highest precedence, replacing any dimension with the same key on the metric itself or in the
    /// default dimensions.
    ///
    /// Defaults to no dimensions.
    #[serde(default)]
    static_dimensions: IndexMap<String, String>,
}

impl SerializerConfiguration {
    /// Creates a new `SerializerConfiguration` from the given configuration.
    pub fn from_configuration(config: &GenericConfiguration) -> Result<Self, GenericError> {
        config
            .as_typed()
            .error_context("Failed to load serializer configuration.")
    }

    /// Sets the metric name prefix.
    pub fn with_metric_prefix<S: Into<String>>(mut self, metric_prefix: S) -> Self {
        self.metric_prefix = metric_prefix.into();
        self
    }

    /// Adds a default dimension.
    pub fn with_default_dimension<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.default_dimensions.insert(key.into(), value.into());
        self
    }

    /// Adds a static dimension.
    pub fn with_static_dimension<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.static_dimensions.insert(key.into(), value.into());
        self
    }

    /// Returns the metric name prefix.
    pub fn metric_prefix(&self) -> &str {
        &self.metric_prefix
    }

    /// Returns the default dimensions, as configured.
    pub fn default_dimensions(&self) -> &IndexMap<String, String> {
        &self.default_dimensions
    }

    /// Returns the static dimensions, as configured.
    pub fn static_dimensions(&self) -> &IndexMap<String, String> {
        &self.static_dimensions
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use mintline_config::ConfigurationLoader;

    use super::*;

    fn load_yaml(contents: &str) -> GenericConfiguration {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        ConfigurationLoader::default().from_yaml(file.path()).unwrap().into_generic()
    }

    #[test]
    fn defaults() {
        let config = SerializerConfiguration::from_configuration(&load_yaml("{}\n")).unwrap();
        assert_eq!(config, SerializerConfiguration::default());
        assert_eq!(config.metric_prefix(), "");
        assert!(config.default_dimensions().is_empty());
        assert!(config.static_dimensions().is_empty());
    }

    #[test]
    fn from_yaml() {
        let config = load_yaml(
            r#"
metric_prefix: app
default_dimensions:
  env: dev
  region: eu
static_dimensions:
  host: web01
"#,
        );

        let config = SerializerConfiguration::from_configuration(&config).unwrap();
        let expected = SerializerConfiguration::default()
            .with_metric_prefix("app")
            .with_default_dimension("env", "dev")
            .with_default_dimension("region", "eu")
            .with_static_dimension("host", "web01");
        assert_eq!(config, expected);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"metric_prefix: from_file\nstatic_dimensions:\n  host: web01\n")
            .unwrap();

        std::env::set_var("MINTLINE_CODEC_TEST_METRIC_PREFIX", "from_env");
        let config = ConfigurationLoader::default()
            .from_yaml(file.path())
            .unwrap()
            .from_environment("mintline_codec_test")
            .unwrap()
            .into_generic();

        let config = SerializerConfiguration::from_configuration(&config).unwrap();
        assert_eq!(config.metric_prefix(), "from_env");
        assert_eq!(config.static_dimensions().get("host").map(String::as_str), Some("web01"));
    }

    #[test]
    fn invalid_type() {
        let config = load_yaml("default_dimensions: [a, b]\n");
        assert!(SerializerConfiguration::from_configuration(&config).is_err());
    }
}
