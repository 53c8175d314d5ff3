//! Currently active role assignments.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::endpoints::ArmEndpoints;
use crate::error::PimResult;
use crate::executor::{collect_pages, CommandExecutor};
use crate::logging::Logger;
use crate::models::{ActiveAssignment, ScheduleInstance};

/// Lists the caller's active assignments at tenant root.
#[derive(Clone)]
pub struct AssignmentLister {
    executor: Arc<dyn CommandExecutor>,
    endpoints: ArmEndpoints,
    logger: Arc<Logger>,
}

impl AssignmentLister {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        endpoints: ArmEndpoints,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            executor,
            endpoints,
            logger,
        }
    }

    /// Every active assignment, following `nextLink` to the last page.
    pub async fn fetch_active(
        &self,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<ActiveAssignment>> {
        let url = self.endpoints.active_instances()?;
        let rows: Vec<ScheduleInstance> = collect_pages(
            self.executor.as_ref(),
            &url,
            "active assignments",
            &self.logger,
            cancel,
        )
        .await?;

        self.logger
            .verbose("assignments", format!("{} active assignment(s)", rows.len()));
        Ok(rows.into_iter().map(ActiveAssignment::from_instance).collect())
    }
}
