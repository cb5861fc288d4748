//! Path list expansion.

use anyhow::{bail, Result};
use step_core::StepConfig;
use step_dom::VirtualDocument;
use step_expander::{
    RemovalReason, StepExpander, TagOutcome, MARKER_ATTRIBUTE, PATH_ATTRIBUTE, STEP_TAG,
};

use super::ExpandArgs;
use crate::context::Context;

/// Run the expand command.
pub async fn run(args: ExpandArgs, ctx: &Context) -> Result<()> {
    let mut overrides = ctx.config.expander.clone();
    if let Some(split) = args.split {
        overrides = overrides.with_split_char(split);
    }
    let config = StepConfig::from_overrides(&overrides)?;

    let markup = expand(&args.paths, config, args.document, ctx)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "html": markup }));
    } else {
        ctx.output.raw(&markup);
    }

    Ok(())
}

fn expand(paths: &str, config: StepConfig, document: bool, ctx: &Context) -> Result<String> {
    let mut doc = VirtualDocument::new();
    let body = doc.body();
    let tag = doc.append_element(body, STEP_TAG, &[(MARKER_ATTRIBUTE, ""), (PATH_ATTRIBUTE, paths)]);

    let expander = StepExpander::new(config).with_logger(ctx.output.logger("expander"));
    if document {
        expander.inject_style(&mut doc);
    }

    let container = match expander.parse_single_tag(&mut doc, tag) {
        TagOutcome::Replaced(container) => container,
        TagOutcome::Removed(RemovalReason::MissingPaths) => bail!("Path list is empty"),
        TagOutcome::Removed(RemovalReason::NoValidPaths) => {
            bail!("Path list has no paths between delimiters: {:?}", paths)
        }
    };

    ctx.output.debug(&format!(
        "{} image(s), {} arrow(s)",
        container.images.len(),
        container.arrows.len()
    ));

    Ok(if document {
        doc.to_html()
    } else {
        doc.outer_html(container.node)
    })
}
