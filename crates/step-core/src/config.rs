//! Expander and worker configuration.

use std::path::Path;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Path delimiter must not be empty")]
    EmptyDelimiter,

    #[error("Cache name must not be empty")]
    EmptyCacheName,

    #[error("Invalid origin '{0}': expected scheme://host[:port]")]
    InvalidOrigin(String),

    #[error("Invalid manifest entry '{0}': expected an absolute path or a same-origin URL")]
    InvalidManifestEntry(String),

    #[error("Global step configuration was already installed")]
    AlreadyInstalled,
}

/// Load a serde type from a TOML or JSON file, chosen by extension.
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    if display.ends_with(".json") {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: display,
            source,
        })
    } else {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: display,
            source,
        })
    }
}

const DEFAULT_SPLIT_CHAR: &str = "=>";
const DEFAULT_ARROW_TEXT: &str = "→";
const DEFAULT_CONTAINER_CLASS: &str = "mk-step-container";
const DEFAULT_IMG_CLASS: &str = "mk-step-img";
const DEFAULT_ARROW_CLASS: &str = "mk-step-arrow";
const DEFAULT_IMG_WIDTH: &str = "100px";
const DEFAULT_IMG_HEIGHT: &str = "100px";
const DEFAULT_GAP: &str = "12px";
const DEFAULT_ARROW_COLOR: &str = "#2563eb";

static GLOBAL_CONFIG: OnceLock<StepConfig> = OnceLock::new();
static DEFAULT_CONFIG: OnceLock<StepConfig> = OnceLock::new();

/// Tag expander configuration.
///
/// Immutable once built. All values are CSS-compatible strings and are
/// substituted verbatim into the injected style block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    /// Delimiter between image paths in the path-list attribute.
    pub split_char: String,
    /// Text of the arrow element placed between images.
    pub arrow_text: String,
    /// Class of the generated container.
    pub container_class: String,
    /// Class of each generated image.
    pub img_class: String,
    /// Class of each arrow separator.
    pub arrow_class: String,
    /// Image width.
    pub img_width: String,
    /// Image height.
    pub img_height: String,
    /// Gap between container children.
    pub gap: String,
    /// Arrow and hover accent color.
    pub arrow_color: String,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            split_char: DEFAULT_SPLIT_CHAR.to_string(),
            arrow_text: DEFAULT_ARROW_TEXT.to_string(),
            container_class: DEFAULT_CONTAINER_CLASS.to_string(),
            img_class: DEFAULT_IMG_CLASS.to_string(),
            arrow_class: DEFAULT_ARROW_CLASS.to_string(),
            img_width: DEFAULT_IMG_WIDTH.to_string(),
            img_height: DEFAULT_IMG_HEIGHT.to_string(),
            gap: DEFAULT_GAP.to_string(),
            arrow_color: DEFAULT_ARROW_COLOR.to_string(),
        }
    }
}

impl StepConfig {
    /// The built-in defaults, shared read-only.
    pub fn defaults() -> &'static StepConfig {
        DEFAULT_CONFIG.get_or_init(StepConfig::default)
    }

    /// Build a config by applying overrides field by field over the defaults.
    pub fn from_overrides(overrides: &StepConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = &overrides.split_char {
            config.split_char = v.clone();
        }
        if let Some(v) = &overrides.arrow_text {
            config.arrow_text = v.clone();
        }
        if let Some(v) = &overrides.container_class {
            config.container_class = v.clone();
        }
        if let Some(v) = &overrides.img_class {
            config.img_class = v.clone();
        }
        if let Some(v) = &overrides.arrow_class {
            config.arrow_class = v.clone();
        }
        if let Some(v) = &overrides.img_width {
            config.img_width = v.clone();
        }
        if let Some(v) = &overrides.img_height {
            config.img_height = v.clone();
        }
        if let Some(v) = &overrides.gap {
            config.gap = v.clone();
        }
        if let Some(v) = &overrides.arrow_color {
            config.arrow_color = v.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the expander relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split_char.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(())
    }

    /// Install the process-wide configuration.
    ///
    /// Succeeds at most once, and only before anything has read
    /// [`StepConfig::global`].
    pub fn install_global(overrides: &StepConfigOverrides) -> Result<&'static StepConfig, ConfigError> {
        let config = Self::from_overrides(overrides)?;
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        Ok(Self::global())
    }

    /// The process-wide configuration.
    ///
    /// Falls back to (and freezes) the defaults when nothing was installed.
    pub fn global() -> &'static StepConfig {
        GLOBAL_CONFIG.get_or_init(|| Self::defaults().clone())
    }
}

/// Optional per-key overrides, as supplied by the host page or a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_char: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_color: Option<String>,
}

impl StepConfigOverrides {
    /// Load overrides from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_config_file(path)
    }

    /// Set the path delimiter.
    pub fn with_split_char(mut self, value: impl Into<String>) -> Self {
        self.split_char = Some(value.into());
        self
    }

    /// Set the arrow text.
    pub fn with_arrow_text(mut self, value: impl Into<String>) -> Self {
        self.arrow_text = Some(value.into());
        self
    }

    /// Set the container class.
    pub fn with_container_class(mut self, value: impl Into<String>) -> Self {
        self.container_class = Some(value.into());
        self
    }

    /// Set the arrow color.
    pub fn with_arrow_color(mut self, value: impl Into<String>) -> Self {
        self.arrow_color = Some(value.into());
        self
    }
}

/// Offline notice returned when a request is neither cached nor reachable.
pub const DEFAULT_OFFLINE_BODY: &str = "<h1>Offline: this resource has not been cached</h1>";

/// Asset cache worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Cache version name. Changing it is the upgrade mechanism.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Same-origin URLs cached at install time, in order.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Origin the worker serves (scheme://host[:port]).
    #[serde(default = "default_origin", deserialize_with = "deserialize_origin")]
    pub origin: String,

    /// Body of the synthesized offline response.
    #[serde(default = "default_offline_body")]
    pub offline_body: String,
}

fn default_cache_name() -> String {
    "step-parser-v1.0.0".to_string()
}

fn default_manifest() -> Vec<String> {
    vec![
        "/".to_string(),
        "/index.html".to_string(),
        "/step-parser.js".to_string(),
    ]
}

fn default_origin() -> String {
    "http://localhost".to_string()
}

fn normalize_origin(origin: &str) -> String {
    origin.trim_end_matches('/').to_string()
}

fn deserialize_origin<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let origin = String::deserialize(deserializer)?;
    Ok(normalize_origin(&origin))
}

fn default_offline_body() -> String {
    DEFAULT_OFFLINE_BODY.to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            manifest: default_manifest(),
            origin: default_origin(),
            offline_body: default_offline_body(),
        }
    }
}

impl WorkerConfig {
    /// Create a config for a cache version and origin with the default manifest.
    pub fn new(cache_name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            origin: normalize_origin(&origin.into()),
            ..Default::default()
        }
    }

    /// Load from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the manifest.
    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the offline notice body.
    pub fn with_offline_body(mut self, body: impl Into<String>) -> Self {
        self.offline_body = body.into();
        self
    }

    /// Validate cache name, origin and manifest entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::EmptyCacheName);
        }

        let origin: http::Uri = self
            .origin
            .parse()
            .map_err(|_| ConfigError::InvalidOrigin(self.origin.clone()))?;
        let path_is_root = matches!(origin.path(), "" | "/");
        if origin.scheme().is_none() || origin.authority().is_none() || !path_is_root {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }

        for entry in &self.manifest {
            if !self.is_same_origin_entry(entry) {
                return Err(ConfigError::InvalidManifestEntry(entry.clone()));
            }
        }

        Ok(())
    }

    /// Resolve a manifest entry to an absolute URL under the origin.
    pub fn resolve_url(&self, entry: &str) -> String {
        if entry.starts_with('/') {
            format!("{}{}", self.base(), entry)
        } else {
            entry.to_string()
        }
    }

    /// Manifest entries resolved to absolute URLs, in manifest order.
    pub fn manifest_urls(&self) -> Vec<String> {
        self.manifest.iter().map(|e| self.resolve_url(e)).collect()
    }

    fn base(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    fn is_same_origin_entry(&self, entry: &str) -> bool {
        if entry.starts_with('/') {
            return true;
        }
        match entry.strip_prefix(self.base()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}
