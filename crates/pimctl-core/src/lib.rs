//! Core of `pimctl`: discovery and self-activation of Azure PIM eligible roles.
//!
//! Every remote call goes through a [`CommandExecutor`], so the pieces
//! below can run against [`HttpExecutor`] in production and a scripted fake
//! in tests:
//!
//! - [`EligibilityAggregator`] lists eligible roles across tenant root and
//!   every visible subscription.
//! - [`PrincipalResolver`] identifies the signed-in user.
//! - [`ScheduleLinker`] finds the eligibility schedule an activation links to.
//! - [`ActivationBuilder`] submits the self-activation request.
//! - [`ProgressOverlay`] shows progress while one of these runs.
//!
//! Logging goes through an explicit [`Logger`] handle rather than global
//! state.

pub mod activation;
pub mod aggregator;
pub mod assignments;
pub mod auth;
pub mod azcli;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod http;
pub mod logging;
pub mod models;
pub mod principal;
pub mod progress;
pub mod schedule;
pub mod scope;
pub mod selection;

pub use activation::{ActivationBuilder, ActivationReceipt, ActivationRequest, PreparedActivation};
pub use aggregator::{dedupe_by_id, filter_roles, EligibilityAggregator};
pub use assignments::AssignmentLister;
pub use auth::{AzCliTokenSource, StaticTokenSource, TokenSource};
pub use azcli::AzCli;
pub use endpoints::ArmEndpoints;
pub use error::{PimError, PimResult};
pub use executor::CommandExecutor;
pub use http::HttpExecutor;
pub use logging::{LogConfig, LogLevel, Logger};
pub use models::{ActiveAssignment, EligibleRole, Subscription, UserInfo};
pub use principal::PrincipalResolver;
pub use progress::{OverlayState, ProgressOverlay, ProgressStrategy};
pub use schedule::ScheduleLinker;
pub use scope::ScopeType;
pub use selection::{select_role, RoleSelector};
