//! Manifest inspection and verification.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use step_cache::{InMemoryCacheStore, KeyedCacheStore};
use step_worker::{AssetCacheWorker, AssetRequest, InMemoryScope, NetworkFetcher};

use super::{ManifestArgs, ManifestCommand};
use crate::context::Context;
use crate::fetcher::DirectoryFetcher;
use crate::output::format_bytes;

/// Run the manifest command.
pub async fn run(args: ManifestArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ManifestCommand::List => list_manifest(ctx).await,
        ManifestCommand::Check { root } => check_manifest(&root, ctx).await,
    }
}

#[derive(Debug, Serialize)]
struct EntryStatus {
    entry: String,
    url: String,
    status: u16,
}

async fn list_manifest(ctx: &Context) -> Result<()> {
    let worker = &ctx.config.worker;

    if ctx.output.is_json() {
        ctx.output.json(&worker.manifest_urls());
        return Ok(());
    }

    ctx.output.header(&format!("Manifest for {}", worker.cache_name));
    for url in worker.manifest_urls() {
        ctx.output.list_item(&url);
    }

    Ok(())
}

async fn check_manifest(root: &str, ctx: &Context) -> Result<()> {
    let root = ctx.resolve_path(root);
    if !root.is_dir() {
        bail!("Asset root is not a directory: {}", root.display());
    }

    let config = ctx.config.worker.clone();
    let fetcher = Arc::new(DirectoryFetcher::new(&root));
    ctx.output.header(&format!("Checking manifest against {}", root.display()));

    let mut statuses = Vec::with_capacity(config.manifest.len());
    for entry in &config.manifest {
        let url = config.resolve_url(entry);
        let request = AssetRequest::get(&url)?;
        let response = fetcher
            .fetch(&request)
            .await
            .with_context(|| format!("Failed to read {}", url))?;
        let status = response.status();

        ctx.output.check(status.is_success(), entry);
        statuses.push(EntryStatus {
            entry: entry.clone(),
            url,
            status: status.as_u16(),
        });
    }

    if ctx.output.is_json() {
        ctx.output.json(&statuses);
    }

    let missing = statuses.iter().filter(|s| s.status >= 300).count();
    if missing > 0 {
        bail!(
            "{} of {} manifest entries are missing; install would fail",
            missing,
            statuses.len()
        );
    }

    // Dry-run the install the worker would perform.
    let store = Arc::new(InMemoryCacheStore::new());
    let worker = AssetCacheWorker::new(config, store.clone(), fetcher, Arc::new(InMemoryScope::new()))?
        .with_logger(ctx.output.logger("worker"));
    let report = worker.install().await?;

    let mut total = 0u64;
    for key in &report.cached {
        if let Some(asset) = store.get(&report.cache_name, key).await? {
            total += asset.body.len() as u64;
        }
    }

    ctx.output.success(&format!(
        "{} entries would be cached in {} ({})",
        report.cached.len(),
        report.cache_name,
        format_bytes(total)
    ));

    Ok(())
}
