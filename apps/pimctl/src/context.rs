//! Wiring shared by every command.

use pimctl_core::{
    ActivationBuilder, ArmEndpoints, AssignmentLister, AzCli, AzCliTokenSource, CommandExecutor,
    EligibilityAggregator, HttpExecutor, LogConfig, Logger, PrincipalResolver, ProgressOverlay,
    ProgressStrategy,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, ConfigPaths};
use crate::error::{CliError, CliResult};
use crate::interactive::is_interactive_terminal;

/// Flags that apply to every command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GlobalArgs {
    /// Never prompt; fail instead of asking
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Show what pimctl is doing
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show HTTP requests and responses
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show HTTP bodies (tokens are redacted)
    #[arg(long, global = true)]
    pub trace: bool,

    /// Suppress diagnostic output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also append diagnostics to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_args_and_env(
            self.verbose,
            self.debug,
            self.trace,
            self.quiet,
            self.log_file.clone(),
        )
    }
}

/// Everything a command needs, built once per run.
pub struct AppContext {
    pub config: Config,
    pub logger: Arc<Logger>,
    pub endpoints: ArmEndpoints,
    pub executor: Arc<dyn CommandExecutor>,
    pub cli: AzCli,
    /// True when `--non-interactive` was given or no terminal is attached
    pub non_interactive: bool,
}

impl AppContext {
    pub fn build(global: &GlobalArgs) -> CliResult<Self> {
        let logger = Logger::new(global.log_config()).map_err(|e| {
            CliError::Config(format!("Failed to open log file: {}", e))
        })?;
        let logger = Arc::new(logger);

        let paths = ConfigPaths::new()?;
        let config = Config::load(&paths)?;
        tracing::debug!(path = %paths.config_file.display(), "configuration loaded");
        logger.verbose(
            "config",
            format!("using {}", paths.config_file.display()),
        );

        let endpoints = config.endpoints();
        let cli = AzCli::default();
        let tokens = Arc::new(AzCliTokenSource::new(cli.clone()));
        let executor = HttpExecutor::new(
            endpoints.clone(),
            tokens,
            config.timeout(),
            Arc::clone(&logger),
        )?;

        Ok(Self {
            config,
            logger,
            endpoints,
            executor: Arc::new(executor),
            cli,
            non_interactive: global.non_interactive || !is_interactive_terminal(),
        })
    }

    pub fn overlay(&self) -> ProgressOverlay {
        ProgressOverlay::new(ProgressStrategy::detect(self.non_interactive))
    }

    pub fn principals(&self) -> PrincipalResolver {
        PrincipalResolver::new(
            Arc::clone(&self.executor),
            self.endpoints.clone(),
            Arc::clone(&self.logger),
        )
        .with_account_fallback(self.cli.clone())
    }

    pub fn aggregator(&self) -> EligibilityAggregator {
        EligibilityAggregator::new(
            Arc::clone(&self.executor),
            self.endpoints.clone(),
            Arc::clone(&self.logger),
        )
    }

    pub fn assignments(&self) -> AssignmentLister {
        AssignmentLister::new(
            Arc::clone(&self.executor),
            self.endpoints.clone(),
            Arc::clone(&self.logger),
        )
    }

    pub fn activation(&self) -> ActivationBuilder {
        ActivationBuilder::new(
            Arc::clone(&self.executor),
            self.endpoints.clone(),
            Arc::clone(&self.logger),
        )
    }
}
