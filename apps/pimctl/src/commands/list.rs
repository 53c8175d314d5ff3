//! List command - Show eligible roles

use clap::Args;

use crate::context::AppContext;
use crate::error::CliResult;
use crate::output::{print_key_value, render_roles};
use crate::preflight;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, ctx: &AppContext) -> CliResult<()> {
    preflight::check(&ctx.cli, &ctx.logger).await?;

    let mut overlay = ctx.overlay();
    let user = super::signed_in_user(ctx, &mut overlay).await?;
    if !args.json {
        print_key_value("Logged in as", user.name());
    }

    let aggregator = ctx.aggregator();
    let roles = overlay
        .run("Fetching eligible roles", move |cancel| async move {
            aggregator.fetch_all(&user.id, &cancel).await
        })
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&roles)?);
    } else if roles.is_empty() {
        println!("\nNo eligible role assignments found.");
    } else {
        println!();
        print!("{}", render_roles(&roles));
    }

    Ok(())
}
