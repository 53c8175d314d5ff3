//! Checks that must pass before anything talks to Azure.

use pimctl_core::azcli::{AccountInfo, AzCli};
use pimctl_core::Logger;

use crate::error::CliResult;

/// `az` must be installed and signed in.
pub async fn check(cli: &AzCli, logger: &Logger) -> CliResult<AccountInfo> {
    cli.ensure_installed().await?;
    logger.verbose("preflight", format!("{} is installed", cli.program()));

    let account = cli.ensure_logged_in().await?;
    logger.verbose(
        "preflight",
        format!("signed in to tenant {} as {}", account.tenant_id, account.user.name),
    );
    Ok(account)
}
