//! Handler for the `inspect` subcommand.

use anyhow::Result;

use super::Context;
use super::input::{resolve_key, resolve_token};
use crate::cli::InspectArgs;
use crate::display::report::{render_report, render_report_json};

/// Inspect an ad-hoc token. Returns `false` when the report is an error.
pub fn execute(args: &InspectArgs, ctx: &Context) -> Result<bool> {
    let token = resolve_token(&args.token)?;
    let key = resolve_key(&args.key)?;
    let mode = args.key.mode().unwrap_or(ctx.config.keys.default_mode);

    let result = ctx
        .inspector(&args.key)
        .inspect(&token, key.as_deref().map_or("", String::as_str), mode);

    if args.json {
        println!("{}", render_report_json(&result));
    } else {
        println!("{}", render_report(&result, mode, ctx.use_color));
    }
    Ok(!result.is_error)
}
