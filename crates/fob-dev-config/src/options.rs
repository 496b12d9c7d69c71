//! Middleware option types.
//!
//! These mirror the loosely-typed options a build tool hands to a dev
//! middleware (`index: bool | string`, `stats: bool | string | object`) but
//! normalize them into tagged enums at deserialization time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Index file served when a request resolves to a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIndex", into = "RawIndex")]
pub enum IndexOption {
    /// Serve `index.html`
    #[default]
    Default,
    /// Never serve an index file for directories
    Disabled,
    /// Serve the named file
    File(String),
}

impl IndexOption {
    pub const DEFAULT_FILE: &'static str = "index.html";

    /// Name of the index file to probe, or `None` when index serving is off.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            IndexOption::Default => Some(Self::DEFAULT_FILE),
            IndexOption::Disabled => None,
            IndexOption::File(name) => Some(name),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file_name().is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawIndex {
    Flag(bool),
    File(String),
}

impl From<RawIndex> for IndexOption {
    fn from(raw: RawIndex) -> Self {
        match raw {
            RawIndex::Flag(true) => IndexOption::Default,
            RawIndex::Flag(false) => IndexOption::Disabled,
            // An empty name is falsy: treat it the same as `false`
            RawIndex::File(name) if name.is_empty() => IndexOption::Disabled,
            RawIndex::File(name) => IndexOption::File(name),
        }
    }
}

impl From<IndexOption> for RawIndex {
    fn from(index: IndexOption) -> Self {
        match index {
            IndexOption::Default => RawIndex::Flag(true),
            IndexOption::Disabled => RawIndex::Flag(false),
            IndexOption::File(name) => RawIndex::File(name),
        }
    }
}

/// Stats rendering options after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<bool>,
}

impl StatsOptions {
    pub const NORMAL: &'static str = "normal";
    pub const NONE: &'static str = "none";

    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            ..Self::default()
        }
    }

    /// Effective preset name (`normal` when unset).
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or(Self::NORMAL)
    }

    /// Fill in `colors` when the user left it unset.
    pub fn with_default_colors(mut self, supported: bool) -> Self {
        if self.colors.is_none() {
            self.colors = Some(supported);
        }
        self
    }
}

/// User-facing stats setting: `true`/`false`, a preset name, or full options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsSetting {
    Toggle(bool),
    Preset(String),
    Full(StatsOptions),
}

impl StatsSetting {
    /// Normalize an optional setting into concrete options.
    ///
    /// Absent and `true` map to the `normal` preset, `false` to `none`.
    pub fn normalize(setting: Option<&StatsSetting>) -> StatsOptions {
        match setting {
            None | Some(StatsSetting::Toggle(true)) => StatsOptions::preset(StatsOptions::NORMAL),
            Some(StatsSetting::Toggle(false)) => StatsOptions::preset(StatsOptions::NONE),
            Some(StatsSetting::Preset(name)) => StatsOptions::preset(name.clone()),
            Some(StatsSetting::Full(options)) => options.clone(),
        }
    }
}

/// Options for the development middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Public path override applied to every child build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    pub index: IndexOption,

    /// Stats override applied to every child build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSetting>,

    /// HTTP methods the middleware answers; others fall through
    pub methods: Vec<String>,

    /// Extra response headers for served files
    pub headers: IndexMap<String, String>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            public_path: None,
            index: IndexOption::default(),
            stats: None,
            methods: default_methods(),
            headers: IndexMap::new(),
        }
    }
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string(), "HEAD".to_string()]
}

impl MiddlewareConfig {
    /// Build a config from an already-parsed JSON value (embedding use).
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: MiddlewareConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid("config", format!("Invalid structure: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML source, e.g. the contents of `fob-dev.toml`.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let toml_val: toml::Value = toml::from_str(source)
            .map_err(|e| ConfigError::invalid("toml", format!("Invalid TOML syntax: {e}")))?;

        let value = serde_json::to_value(toml_val).map_err(|e| {
            ConfigError::invalid("toml", format!("TOML to JSON conversion failed: {e}"))
        })?;

        Self::from_value(value)
    }

    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = Some(public_path.into());
        self
    }

    pub fn with_index(mut self, index: IndexOption) -> Self {
        self.index = index;
        self
    }

    pub fn with_stats(mut self, stats: StatsSetting) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Whether requests with this method are served by the middleware.
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_from_bool_and_string() {
        let on: IndexOption = serde_json::from_value(json!(true)).unwrap();
        let off: IndexOption = serde_json::from_value(json!(false)).unwrap();
        let named: IndexOption = serde_json::from_value(json!("default.htm")).unwrap();
        let empty: IndexOption = serde_json::from_value(json!("")).unwrap();

        assert_eq!(on, IndexOption::Default);
        assert_eq!(off, IndexOption::Disabled);
        assert_eq!(named, IndexOption::File("default.htm".into()));
        assert_eq!(empty, IndexOption::Disabled);
    }

    #[test]
    fn index_file_name() {
        assert_eq!(IndexOption::Default.file_name(), Some("index.html"));
        assert_eq!(IndexOption::Disabled.file_name(), None);
        assert!(!IndexOption::Disabled.is_enabled());
        assert_eq!(
            IndexOption::File("main.html".into()).file_name(),
            Some("main.html")
        );
    }

    #[test]
    fn stats_setting_shapes() {
        let toggle: StatsSetting = serde_json::from_value(json!(false)).unwrap();
        let preset: StatsSetting = serde_json::from_value(json!("minimal")).unwrap();
        let full: StatsSetting =
            serde_json::from_value(json!({ "preset": "verbose", "colors": false })).unwrap();

        assert_eq!(toggle, StatsSetting::Toggle(false));
        assert_eq!(preset, StatsSetting::Preset("minimal".into()));
        assert_eq!(
            full,
            StatsSetting::Full(StatsOptions {
                preset: Some("verbose".into()),
                colors: Some(false),
                ..StatsOptions::default()
            })
        );
    }

    #[test]
    fn stats_normalization() {
        assert_eq!(StatsSetting::normalize(None).preset_name(), "normal");
        assert_eq!(
            StatsSetting::normalize(Some(&StatsSetting::Toggle(true))).preset_name(),
            "normal"
        );
        assert_eq!(
            StatsSetting::normalize(Some(&StatsSetting::Toggle(false))).preset_name(),
            "none"
        );
        assert_eq!(
            StatsSetting::normalize(Some(&StatsSetting::Preset("errors-only".into())))
                .preset_name(),
            "errors-only"
        );
    }

    #[test]
    fn default_colors_only_fill_unset() {
        let unset = StatsOptions::preset("normal").with_default_colors(true);
        assert_eq!(unset.colors, Some(true));

        let explicit = StatsOptions {
            colors: Some(false),
            ..StatsOptions::default()
        }
        .with_default_colors(true);
        assert_eq!(explicit.colors, Some(false));
    }

    #[test]
    fn method_matching_is_case_insensitive() {
        let config = MiddlewareConfig::default();
        assert!(config.allows_method("get"));
        assert!(config.allows_method("HEAD"));
        assert!(!config.allows_method("POST"));
    }
}
