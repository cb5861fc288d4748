//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use step_core::{load_config_file, StepConfig, StepConfigOverrides, WorkerConfig};

/// Config file names searched from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["steps.toml", ".steps.toml", "steps.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Expander overrides, same keys as the page-level global object.
    #[serde(default)]
    pub expander: StepConfigOverrides,

    /// Offline worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl CliConfig {
    /// Load config from a TOML or JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_config_file(path)?;
        config
            .worker
            .validate()
            .with_context(|| format!("Invalid [worker] section in {}", path.display()))?;
        Ok(config)
    }

    /// Effective expander configuration.
    pub fn step_config(&self) -> Result<StepConfig> {
        StepConfig::from_overrides(&self.expander).context("Invalid [expander] section")
    }
}

#[derive(Serialize)]
struct WorkerSection<'a> {
    worker: &'a WorkerConfig,
}

/// Generate a default steps.toml config file.
pub fn generate_default_config() -> Result<String> {
    generate_config(&WorkerConfig::default())
}

/// Generate a steps.toml config file for a worker configuration.
pub fn generate_config(worker: &WorkerConfig) -> Result<String> {
    let defaults = StepConfig::defaults();
    let worker_section =
        toml::to_string(&WorkerSection { worker }).context("Failed to serialize [worker] section")?;

    Ok(format!(
        r#"# Step image parser configuration

[expander]
# splitChar = "{split}"
# arrowText = "{arrow}"
# containerClass = "{container}"
# imgClass = "{img}"
# arrowClass = "{arrow_class}"
# imgWidth = "{width}"
# imgHeight = "{height}"
# gap = "{gap}"
# arrowColor = "{color}"

# Changing the cache name is the upgrade mechanism: older caches are
# deleted when the new worker activates.
{worker_section}"#,
        split = defaults.split_char,
        arrow = defaults.arrow_text,
        container = defaults.container_class,
        img = defaults.img_class,
        arrow_class = defaults.arrow_class,
        width = defaults.img_width,
        height = defaults.img_height,
        gap = defaults.gap,
        color = defaults.arrow_color,
        worker_section = worker_section,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config().unwrap()).unwrap();
        assert_eq!(config.expander, StepConfigOverrides::default());
        assert_eq!(config.worker, WorkerConfig::default());
    }

    #[test]
    fn test_generated_config_escapes_manifest_entries() {
        let worker = WorkerConfig::new("step-parser-v2", "https://steps.dev")
            .with_manifest([r#"/say "hi".html"#, r"/dir\file.js"])
            .with_offline_body("<h1 class=\"offline\">Offline</h1>");

        let config: CliConfig = toml::from_str(&generate_config(&worker).unwrap()).unwrap();
        assert_eq!(config.worker, worker);
    }

    #[test]
    fn test_camel_case_expander_keys() {
        let config: CliConfig = toml::from_str(
            r#"
            [expander]
            splitChar = "|"
            arrowColor = "red"
            "#,
        )
        .unwrap();

        let step = config.step_config().unwrap();
        assert_eq!(step.split_char, "|");
        assert_eq!(step.arrow_color, "red");
        assert_eq!(config.worker.cache_name, "step-parser-v1.0.0");
    }
}
