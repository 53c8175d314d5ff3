//! Activate command - Discover, pick and activate an eligible role

use clap::Args;
use pimctl_core::{filter_roles, select_role, ActivationRequest};
use std::time::Instant;

use crate::context::AppContext;
use crate::error::CliResult;
use crate::interactive::{normalize_optional, prompt_justification, DialoguerSelector};
use crate::output::{print_info, print_key_value, print_success, print_warning};
use crate::preflight;

/// Arguments for the activate command
#[derive(Debug, Clone, Default, Args)]
pub struct ActivateArgs {
    /// Activation length in minutes (defaults to the configured duration)
    #[arg(short, long, value_name = "MINUTES")]
    pub duration: Option<u32>,

    /// Justification for the activation
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Ticket number to attach
    #[arg(long)]
    pub ticket_number: Option<String>,

    /// Ticket system the number belongs to
    #[arg(long)]
    pub ticket_system: Option<String>,

    /// Only consider roles whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub role: Option<String>,

    /// Only consider scopes whose name or path contains this text
    #[arg(long, value_name = "TEXT")]
    pub scope: Option<String>,
}

/// Execute the activate command
pub async fn execute(args: ActivateArgs, ctx: &AppContext) -> CliResult<()> {
    preflight::check(&ctx.cli, &ctx.logger).await?;

    let mut overlay = ctx.overlay();
    let user = super::signed_in_user(ctx, &mut overlay).await?;
    print_key_value("Logged in as", user.name());

    let aggregator = ctx.aggregator();
    let user_id = user.id.clone();
    let started = Instant::now();
    let roles = overlay
        .run("Fetching eligible roles", move |cancel| async move {
            aggregator.fetch_all(&user_id, &cancel).await
        })
        .await?;
    println!(
        "Found {} eligible role(s) in {} ms",
        roles.len(),
        started.elapsed().as_millis()
    );

    let roles = filter_roles(roles, args.role.as_deref(), args.scope.as_deref());
    let role = select_role(&DialoguerSelector, &roles, ctx.non_interactive)?;
    if roles.len() == 1 {
        print_info(&format!(
            "Auto-selecting the only eligible role: {} on {}",
            role.role_name, role.scope_name
        ));
    }

    let justification = match args.reason.as_deref().and_then(normalize_optional) {
        Some(reason) => Some(reason),
        None if !ctx.non_interactive => prompt_justification()?,
        None => None,
    };

    if justification.is_none() {
        print_warning("No justification given; the role policy may reject the request");
    }

    let duration = args.duration.unwrap_or(ctx.config.default_duration_minutes);
    let ticket_system = args
        .ticket_system
        .clone()
        .or_else(|| ctx.config.default_ticket_system.clone());

    let request = ActivationRequest::new(role, duration)
        .with_justification(justification.unwrap_or_default())
        .with_ticket(args.ticket_number.clone(), ticket_system);
    request.validate()?;

    println!(
        "\nActivating {} on {}...",
        request.role.role_name, request.role.scope_name
    );

    let builder = ctx.activation();
    let preparing = builder.clone();
    let to_prepare = request.clone();
    let prepared = overlay
        .run("Preparing activation request", move |cancel| async move {
            preparing.prepare(&to_prepare, &cancel).await
        })
        .await?;

    let receipt = overlay
        .run_shielded("Submitting activation request", move |cancel| async move {
            builder.submit(&prepared, &cancel).await
        })
        .await?;

    ctx.logger.verbose(
        "activate",
        format!(
            "request {} accepted (status: {})",
            receipt.request_id,
            receipt.status.as_deref().unwrap_or("unknown")
        ),
    );
    print_success(&format!(
        "Activated {} on {} for {} minutes",
        request.role.role_name, request.role.scope_name, request.duration_minutes
    ));

    Ok(())
}
