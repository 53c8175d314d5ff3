//! Multi-scope discovery of eligible roles.

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::endpoints::ArmEndpoints;
use crate::error::{PimError, PimResult};
use crate::executor::{collect_pages, CommandExecutor};
use crate::logging::Logger;
use crate::models::{EligibleRole, ScheduleInstance, Subscription, DEFAULT_MAX_DURATION_MINUTES};
use crate::scope::subscription_scope;

/// Collects eligible roles from tenant root and every visible subscription.
///
/// Scopes are queried one after another, so the output order is fixed for
/// a given subscription order: tenant-root rows first, then each
/// subscription's rows in enumeration order, first occurrence kept.
#[derive(Clone)]
pub struct EligibilityAggregator {
    executor: Arc<dyn CommandExecutor>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
    default_max_duration: u32,
}

impl EligibilityAggregator {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        endpoints: ArmEndpoints,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            executor,
            endpoints,
            logger,
            default_max_duration: DEFAULT_MAX_DURATION_MINUTES,
        }
    }

    /// Ceiling recorded on roles whose policy is unknown.
    pub fn with_default_max_duration(mut self, minutes: u32) -> Self {
        self.default_max_duration = minutes;
        self
    }

    /// Every subscription the caller can list, following `nextLink`.
    pub async fn list_subscriptions(
        &self,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<Subscription>> {
        let url = self.endpoints.subscriptions()?;
        collect_pages(
            self.executor.as_ref(),
            &url,
            "subscriptions",
            &self.logger,
            cancel,
        )
        .await
    }

    /// All pages of eligible instances at one scope (`""` = tenant root).
    pub async fn fetch_scope(
        &self,
        scope: &str,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<EligibleRole>> {
        let url = self.endpoints.eligible_instances(scope)?;
        let rows: Vec<ScheduleInstance> = collect_pages(
            self.executor.as_ref(),
            &url,
            "eligible role instances",
            &self.logger,
            cancel,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EligibleRole::from_instance(row, self.default_max_duration))
            .collect())
    }

    /// Query one scope, absorbing anything but an interruption.
    async fn fetch_scope_tolerant(
        &self,
        scope: &str,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<EligibleRole>> {
        let label = if scope.is_empty() { "tenant root" } else { scope };
        self.logger
            .verbose("aggregate", format!("querying eligible roles at {label}"));

        match self.fetch_scope(scope, cancel).await {
            Ok(roles) => {
                self.logger
                    .verbose("aggregate", format!("{label}: {} role(s)", roles.len()));
                Ok(roles)
            }
            Err(PimError::Interrupted) => Err(PimError::Interrupted),
            Err(e) => {
                // Callers routinely lack PIM read access on scopes they can list.
                debug!(scope = label, error = %e, "skipping scope");
                self.logger
                    .verbose("aggregate", format!("{label}: skipped ({e})"));
                Ok(Vec::new())
            }
        }
    }

    /// Eligible roles across tenant root and all visible subscriptions.
    ///
    /// Only the subscription enumeration is fatal; a failing scope query
    /// just contributes no rows.
    #[instrument(skip(self, cancel))]
    pub async fn fetch_all(
        &self,
        principal_id: &str,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<EligibleRole>> {
        self.logger.verbose(
            "aggregate",
            format!("discovering eligible roles for principal {principal_id}"),
        );

        let subscriptions = self
            .list_subscriptions(cancel)
            .await
            .map_err(|e| match e {
                PimError::Interrupted => e,
                other => PimError::Subscriptions(Box::new(other)),
            })?;
        self.logger.verbose(
            "aggregate",
            format!("{} subscription(s) visible", subscriptions.len()),
        );

        let mut all = self.fetch_scope_tolerant("", cancel).await?;
        for subscription in &subscriptions {
            let scope = subscription_scope(&subscription.subscription_id);
            all.extend(self.fetch_scope_tolerant(&scope, cancel).await?);
        }

        let unique = dedupe_by_id(all);
        self.logger
            .verbose("aggregate", format!("{} unique eligible role(s)", unique.len()));
        Ok(unique)
    }
}

/// Drop later duplicates of an instance ID, keeping first-seen order.
pub fn dedupe_by_id(roles: Vec<EligibleRole>) -> Vec<EligibleRole> {
    let mut seen = HashSet::new();
    roles
        .into_iter()
        .filter(|role| seen.insert(role.id.clone()))
        .collect()
}

/// Keep roles whose name contains `role` and whose scope name or path
/// contains `scope`, case-insensitively. `None` matches everything.
pub fn filter_roles(
    roles: Vec<EligibleRole>,
    role: Option<&str>,
    scope: Option<&str>,
) -> Vec<EligibleRole> {
    let role = role.map(str::to_lowercase);
    let scope = scope.map(str::to_lowercase);

    roles
        .into_iter()
        .filter(|r| {
            role.as_ref()
                .map_or(true, |needle| r.role_name.to_lowercase().contains(needle))
        })
        .filter(|r| {
            scope.as_ref().map_or(true, |needle| {
                r.scope_name.to_lowercase().contains(needle)
                    || r.scope.to_lowercase().contains(needle)
            })
        })
        .collect()
}
