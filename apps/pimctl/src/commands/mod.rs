//! CLI command implementations

pub mod activate;
pub mod list;
pub mod status;

use pimctl_core::{ProgressOverlay, UserInfo};

use crate::context::AppContext;
use crate::error::CliResult;

/// Look up the signed-in user for display.
async fn signed_in_user(ctx: &AppContext, overlay: &mut ProgressOverlay) -> CliResult<UserInfo> {
    let principals = ctx.principals();
    let user = overlay
        .run("Checking signed-in user", move |cancel| async move {
            principals.current_user(&cancel).await
        })
        .await?;
    Ok(user)
}
