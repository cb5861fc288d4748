//! Style block output.

use anyhow::Result;
use step_expander::stylesheet;

use super::StyleArgs;
use crate::context::Context;

/// Run the style command.
pub async fn run(args: StyleArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config.step_config()?;
    let css = stylesheet(&config);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "css": css }));
    } else if args.element {
        ctx.output.raw(&format!("<style type=\"text/css\">\n{}\n</style>", css));
    } else {
        ctx.output.raw(&css);
    }

    Ok(())
}
