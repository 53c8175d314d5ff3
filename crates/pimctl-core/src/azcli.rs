//! Thin wrapper over the Azure CLI for sign-in checks and token acquisition.

use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{PimError, PimResult};
use crate::models::UserInfo;

/// Install instructions shown when `az` is missing
pub const AZ_INSTALL_URL: &str = "https://learn.microsoft.com/cli/azure/install-azure-cli";

/// Azure CLI invoker.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new("az")
    }
}

/// Subset of `az account show`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub user: AccountUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUser {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl AzCli {
    /// Use a specific executable (path or name on `PATH`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run `az <args>` and return stdout.
    #[instrument(skip(self), fields(program = %self.program))]
    pub async fn run(&self, args: &[&str]) -> PimResult<String> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PimError::Precondition(format!(
                        "Azure CLI ({}) is not installed. Install it from {}",
                        self.program, AZ_INSTALL_URL
                    ))
                } else {
                    PimError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(status = ?output.status.code(), "az command failed");
            return Err(PimError::Command {
                command: format!("{} {}", self.program, args.join(" ")),
                message: if stderr.is_empty() {
                    format!("exit status {:?}", output.status.code())
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fails with a precondition error unless `az` can be executed.
    pub async fn ensure_installed(&self) -> PimResult<()> {
        self.run(&["version", "--output", "none"]).await.map(|_| ())
    }

    /// Fails with a precondition error unless a sign-in exists.
    pub async fn ensure_logged_in(&self) -> PimResult<AccountInfo> {
        self.account().await.map_err(|e| match e {
            PimError::Precondition(_) => e,
            _ => PimError::Precondition(
                "You are not logged in to Azure CLI. Please run 'az login' first".to_string(),
            ),
        })
    }

    /// `az account show`
    pub async fn account(&self) -> PimResult<AccountInfo> {
        let stdout = self.run(&["account", "show", "--output", "json"]).await?;
        serde_json::from_str(&stdout).map_err(|e| PimError::parse("az account show output", e))
    }

    /// Display-only user derived from the signed-in account.
    pub async fn account_user(&self) -> PimResult<UserInfo> {
        let account = self.account().await?;
        Ok(UserInfo {
            id: String::new(),
            display_name: account.user.name.clone(),
            mail: None,
            user_principal_name: Some(account.user.name),
        })
    }

    /// `az account get-access-token --resource <resource>`
    pub async fn access_token(&self, resource: &str) -> PimResult<String> {
        self.run(&[
            "account",
            "get-access-token",
            "--resource",
            resource,
            "--output",
            "json",
        ])
        .await
    }
}
