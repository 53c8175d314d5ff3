//! Status command - Show active assignments

use clap::Args;

use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::{print_key_value, render_assignments};
use crate::preflight;

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, ctx: &AppContext) -> CliResult<()> {
    preflight::check(&ctx.cli, &ctx.logger).await?;

    let mut overlay = ctx.overlay();
    let user = super::signed_in_user(ctx, &mut overlay).await?;
    if !args.json {
        print_key_value("Logged in as", user.name());
    }

    let lister = ctx.assignments();
    let active = overlay
        .run("Fetching active assignments", move |cancel| async move {
            lister.fetch_active(&cancel).await
        })
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&active)?);
    } else if active.is_empty() {
        println!("\nNo active role assignments found.");
    } else {
        println!();
        print!("{}", render_assignments(&active));
    }

    Ok(())
}
