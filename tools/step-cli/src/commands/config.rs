//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    let step = ctx.config.step_config()?;
    let worker = &ctx.config.worker;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "expander": step,
            "worker": worker,
        }));
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[expander]");
    ctx.output.kv("splitChar", &step.split_char);
    ctx.output.kv("arrowText", &step.arrow_text);
    ctx.output.kv("containerClass", &step.container_class);
    ctx.output.kv("imgClass", &step.img_class);
    ctx.output.kv("arrowClass", &step.arrow_class);
    ctx.output.kv("imgWidth", &step.img_width);
    ctx.output.kv("imgHeight", &step.img_height);
    ctx.output.kv("gap", &step.gap);
    ctx.output.kv("arrowColor", &step.arrow_color);

    ctx.output.info("");
    ctx.output.info("[worker]");
    ctx.output.kv("cache_name", &worker.cache_name);
    ctx.output.kv("origin", &worker.origin);
    ctx.output.kv("offline_body", &worker.offline_body);
    ctx.output.info("manifest:");
    for entry in &worker.manifest {
        ctx.output.list_item(entry);
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("steps.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config()?)?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = ctx.config.step_config() {
        errors.push(format!("{:#}", e));
    }
    if let Err(e) = ctx.config.worker.validate() {
        errors.push(format!("worker: {}", e));
    }

    let worker = &ctx.config.worker;
    if worker.manifest.is_empty() {
        warnings.push("worker.manifest is empty; nothing will be available offline".to_string());
    }
    let mut seen = std::collections::HashSet::new();
    for entry in &worker.manifest {
        if !seen.insert(worker.resolve_url(entry)) {
            warnings.push(format!("worker.manifest lists {} more than once", entry));
        }
    }

    if ctx.config_path.is_none() {
        warnings.push("No config file found; validated built-in defaults".to_string());
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
