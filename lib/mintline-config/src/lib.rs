//! Layered configuration loading.
//!
//! Configuration is merged from YAML files, JSON files and prefixed environment variables, in the order they are
//! added, and then deserialized as a whole into a typed value.
#![deny(warnings)]
#![deny(missing_docs)]

use std::{borrow::Cow, path::Path};

use figment::{error::Kind, providers::Env, Figment};
use mintline_error::GenericError;
use serde::Deserialize;
use snafu::{ResultExt as _, Snafu};
use tracing::debug;

mod provider;
use self::provider::FileProvider;

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// Environment variable prefix was empty.
    #[snafu(display("Environment variable prefix must not be empty."))]
    EmptyPrefix,

    /// A required field was not set by any source.
    #[snafu(display("Missing field '{}' in configuration. {}", field, help_text))]
    MissingField {
        /// How to set the field, including its environment variable if environment variables were loaded.
        help_text: String,

        /// Name of the missing field.
        field: Cow<'static, str>,
    },

    /// A field was set to a value of the wrong type.
    #[snafu(display("Expected '{}' for field '{}', got '{}'.", expected_ty, field, actual_ty))]
    InvalidFieldType {
        /// Period-separated path to the field.
        field: String,

        /// Expected data type.
        expected_ty: String,

        /// Actual data type.
        actual_ty: String,
    },

    /// Any other failure while reading a source or deserializing the configuration.
    #[snafu(display("Failed to load configuration."))]
    Generic {
        /// Error source.
        source: GenericError,
    },
}

/// A configuration loader that can pull from various sources.
///
/// Sources added later take precedence over sources added earlier. Once every source is added, the loader is turned
/// into a [`GenericConfiguration`] that typed configuration is extracted from.
pub struct ConfigurationLoader {
    figment: Figment,
    env_prefix: Option<String>,
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self {
            figment: Figment::new(),
            env_prefix: None,
        }
    }
}

impl ConfigurationLoader {
    fn add_file(mut self, provider: FileProvider) -> Self {
        self.figment = self.figment.admerge(provider);
        self
    }

    /// Loads the given YAML configuration file.
    ///
    /// # Errors
    ///
    /// If the file could not be read, or if the file is not valid YAML, an error will be returned.
    pub fn from_yaml<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigurationError> {
        let provider = FileProvider::from_yaml(&path).map_err(GenericError::from).context(Generic)?;
        Ok(self.add_file(provider))
    }

    /// Attempts to load the given YAML configuration file, ignoring any errors.
    pub fn try_from_yaml<P: AsRef<Path>>(self, path: P) -> Self {
        match FileProvider::from_yaml(&path) {
            Ok(provider) => self.add_file(provider),
            Err(e) => {
                debug!(error = %e, file_path = %path.as_ref().display(), "Skipping unreadable YAML configuration file.");
                self
            }
        }
    }

    /// Loads the given JSON configuration file.
    ///
    /// # Errors
    ///
    /// If the file could not be read, or if the file is not valid JSON, an error will be returned.
    pub fn from_json<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigurationError> {
        let provider = FileProvider::from_json(&path).map_err(GenericError::from).context(Generic)?;
        Ok(self.add_file(provider))
    }

    /// Attempts to load the given JSON configuration file, ignoring any errors.
    pub fn try_from_json<P: AsRef<Path>>(self, path: P) -> Self {
        match FileProvider::from_json(&path) {
            Ok(provider) => self.add_file(provider),
            Err(e) => {
                debug!(error = %e, file_path = %path.as_ref().display(), "Skipping unreadable JSON configuration file.");
                self
            }
        }
    }

    /// Loads configuration from environment variables starting with the given prefix.
    ///
    /// An underscore is appended to the prefix unless it already ends with one, and matching is case-insensitive: with
    /// a prefix of `mintline`, `MINTLINE_METRIC_PREFIX` sets the `metric_prefix` field.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, an error will be returned.
    pub fn from_environment(mut self, prefix: &str) -> Result<Self, ConfigurationError> {
        if prefix.is_empty() {
            return Err(ConfigurationError::EmptyPrefix);
        }

        let mut prefix = prefix.to_uppercase();
        if !prefix.ends_with('_') {
            prefix.push('_');
        }

        self.figment = self.figment.admerge(Env::prefixed(&prefix));
        self.env_prefix = Some(prefix);
        Ok(self)
    }

    /// Consumes the loader, returning the merged configuration.
    pub fn into_generic(self) -> GenericConfiguration {
        GenericConfiguration {
            figment: self.figment,
            env_prefix: self.env_prefix,
        }
    }
}

/// The merged configuration of every source added to a [`ConfigurationLoader`].
#[derive(Clone, Debug)]
pub struct GenericConfiguration {
    figment: Figment,
    env_prefix: Option<String>,
}

impl GenericConfiguration {
    /// Deserializes the entire configuration as `T`.
    ///
    /// ## Errors
    ///
    /// If a required field is missing, or if the configuration could not be deserialized into `T`, an error will be
    /// returned.
    pub fn as_typed<'a, T>(&self) -> Result<T, ConfigurationError>
    where
        T: Deserialize<'a>,
    {
        self.figment.extract().map_err(|e| self.convert_error(e))
    }

    fn convert_error(&self, e: figment::Error) -> ConfigurationError {
        match e.kind {
            Kind::MissingField(field) => {
                let help_text = match &self.env_prefix {
                    Some(prefix) => format!("Try setting `{}` or `{}{}`.", field, prefix, field.to_uppercase()),
                    None => format!("Try setting `{}`.", field),
                };
                ConfigurationError::MissingField { help_text, field }
            }
            Kind::InvalidType(actual_ty, expected_ty) => ConfigurationError::InvalidFieldType {
                field: e.path.join("."),
                expected_ty,
                actual_ty: actual_ty.to_string(),
            },
            _ => ConfigurationError::Generic { source: e.into() },
        }
    }
}
