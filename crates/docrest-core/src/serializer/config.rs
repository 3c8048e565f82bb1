use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

/// Default nesting depth for references and embedded documents.
pub const DEFAULT_DEPTH: usize = 5;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid serializer config: {0}")]
    Invalid(String),

    #[error("failed to parse serializer config: {0}")]
    Parse(#[source] toml::de::Error),
}

///
/// SerializerConfig
///
/// Declarative serializer settings, loadable from TOML:
///
/// ```toml
/// model = "garage.Car"
/// fields = ["id", "name", "manufacturer"]
/// depth = 2
///
/// [extra_kwargs.name]
/// max_length = 40
/// ```
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializerConfig {
    #[serde(default)]
    pub name: Option<String>,

    pub model: String,

    #[serde(default)]
    pub fields: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    #[serde(default = "default_depth")]
    pub depth: usize,

    #[serde(default = "default_true")]
    pub dereference: bool,

    #[serde(default)]
    pub hyperlink: bool,

    #[serde(default)]
    pub extra_kwargs: IndexMap<String, ExtraKwargs>,
}

const fn default_depth() -> usize {
    DEFAULT_DEPTH
}

const fn default_true() -> bool {
    true
}

impl SerializerConfig {
    /// A config for `model` with every other setting at its default.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            name: None,
            model: model.into(),
            fields: None,
            exclude: None,
            depth: DEFAULT_DEPTH,
            dereference: true,
            hyperlink: false,
            extra_kwargs: IndexMap::new(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.fields.is_some() && self.exclude.is_some() {
            return Err(ConfigError::Invalid(
                "cannot set both 'fields' and 'exclude'".to_string(),
            ));
        }

        Ok(())
    }

    /// Display name: the explicit one, else `{Model}Serializer`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            let model = self.model.rsplit('.').next().unwrap_or(&self.model);
            format!("{model}Serializer")
        })
    }

    #[must_use]
    pub fn fields(mut self, names: &[&str]) -> Self {
        self.fields = Some(names.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn exclude(mut self, names: &[&str]) -> Self {
        self.exclude = Some(names.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub const fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub const fn dereference(mut self, on: bool) -> Self {
        self.dereference = on;
        self
    }

    #[must_use]
    pub const fn hyperlink(mut self, on: bool) -> Self {
        self.hyperlink = on;
        self
    }

    #[must_use]
    pub fn extra(mut self, field: impl Into<String>, extras: ExtraKwargs) -> Self {
        self.extra_kwargs.insert(field.into(), extras);
        self
    }
}

///
/// ExtraKwargs
/// per-field overrides layered over the derived options
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtraKwargs {
    pub source: Option<String>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub required: Option<bool>,
    pub default: Option<JsonValue>,
    pub allow_null: Option<bool>,
    pub allow_blank: Option<bool>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}
