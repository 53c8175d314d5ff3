//! Multi-scope aggregation against a scripted executor.

mod common;

use common::*;
use pimctl_core::{ArmEndpoints, EligibilityAggregator, PimError};
use reqwest::Method;
use tokio_util::sync::CancellationToken;

const ROOT: &str = "azure.com/providers/Microsoft.Authorization/roleEligibilityScheduleInstances";
const SUBSCRIPTIONS: &str = "/subscriptions?api-version";

fn scope_fragment(subscription: &str) -> String {
    format!("/subscriptions/{subscription}/providers/Microsoft.Authorization/roleEligibilityScheduleInstances")
}

fn aggregator(executor: std::sync::Arc<ScriptedExecutor>) -> EligibilityAggregator {
    EligibilityAggregator::new(executor, ArmEndpoints::default(), quiet_logger())
}

#[tokio::test]
async fn test_failing_scope_is_skipped() {
    let executor = ScriptedExecutor::new()
        .on_get(
            SUBSCRIPTIONS,
            page(
                vec![
                    subscription("sub-a", "A"),
                    subscription("sub-b", "B"),
                    subscription("sub-c", "C"),
                ],
                None,
            ),
        )
        .on_get(ROOT, page(vec![], None))
        .on_get(
            &scope_fragment("sub-a"),
            page(vec![eligible_instance("a1", "/subscriptions/sub-a", "Reader", "user-1")], None),
        )
        .fail(
            Method::GET,
            &scope_fragment("sub-b"),
            403,
            r#"{"error":{"code":"AuthorizationFailed","message":"denied"}}"#,
        )
        .on_get(
            &scope_fragment("sub-c"),
            page(vec![eligible_instance("c1", "/subscriptions/sub-c", "Owner", "user-1")], None),
        )
        .shared();

    let roles = aggregator(executor.clone())
        .fetch_all("user-1", &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<_> = roles.iter().map(|r| r.role_name.as_str()).collect();
    assert_eq!(names, vec!["Reader", "Owner"]);
    assert_eq!(executor.calls_to(&scope_fragment("sub-b")).len(), 1);
}

#[tokio::test]
async fn test_overlapping_scopes_are_deduplicated_in_first_seen_order() {
    let shared_row = eligible_instance("shared", "/subscriptions/sub-a", "Reader", "user-1");
    let executor = ScriptedExecutor::new()
        .on_get(SUBSCRIPTIONS, page(vec![subscription("sub-a", "A")], None))
        .on_get(
            ROOT,
            page(
                vec![
                    shared_row.clone(),
                    eligible_instance("root-only", "/providers/Microsoft.Management/managementGroups/mg-1", "Owner", "user-1"),
                ],
                None,
            ),
        )
        .on_get(
            &scope_fragment("sub-a"),
            page(
                vec![
                    shared_row,
                    eligible_instance("sub-only", "/subscriptions/sub-a", "Contributor", "user-1"),
                ],
                None,
            ),
        )
        .shared();

    let roles = aggregator(executor)
        .fetch_all("user-1", &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<_> = roles
        .iter()
        .map(|r| pimctl_core::scope::last_segment(&r.id))
        .collect();
    assert_eq!(ids, vec!["shared", "root-only", "sub-only"]);
}

#[tokio::test]
async fn test_tenant_root_rows_come_first() {
    let executor = ScriptedExecutor::new()
        .on_get(
            SUBSCRIPTIONS,
            page(vec![subscription("sub-2", "Two"), subscription("sub-1", "One")], None),
        )
        .on_get(
            ROOT,
            page(vec![eligible_instance("r", "/providers/Microsoft.Management/managementGroups/mg", "Owner", "u")], None),
        )
        .on_get(
            &scope_fragment("sub-1"),
            page(vec![eligible_instance("s1", "/subscriptions/sub-1", "Reader", "u")], None),
        )
        .on_get(
            &scope_fragment("sub-2"),
            page(vec![eligible_instance("s2", "/subscriptions/sub-2", "Reader", "u")], None),
        )
        .shared();

    let roles = aggregator(executor)
        .fetch_all("u", &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<_> = roles
        .iter()
        .map(|r| pimctl_core::scope::last_segment(&r.id))
        .collect();
    assert_eq!(ids, vec!["r", "s2", "s1"]);
}

#[tokio::test]
async fn test_subscription_listing_failure_is_fatal() {
    let executor = ScriptedExecutor::new()
        .fail(
            Method::GET,
            SUBSCRIPTIONS,
            401,
            r#"{"error":{"code":"InvalidAuthenticationToken","message":"expired"}}"#,
        )
        .shared();

    let err = aggregator(executor.clone())
        .fetch_all("u", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PimError::Subscriptions(_)));
    assert!(executor.calls_to("roleEligibilityScheduleInstances").is_empty());
}

#[tokio::test]
async fn test_interruption_is_not_swallowed() {
    let executor = ScriptedExecutor::new()
        .on_get(SUBSCRIPTIONS, page(vec![], None))
        .on_get(ROOT, page(vec![], None))
        .shared();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = aggregator(executor)
        .fetch_all("u", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PimError::Interrupted));
}

#[tokio::test]
async fn test_default_max_duration_is_applied() {
    let executor = ScriptedExecutor::new()
        .on_get(SUBSCRIPTIONS, page(vec![], None))
        .on_get(
            ROOT,
            page(vec![eligible_instance("r", "/subscriptions/s", "Reader", "u")], None),
        )
        .shared();

    let roles = aggregator(executor)
        .with_default_max_duration(120)
        .fetch_all("u", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(roles[0].max_duration_minutes, 120);
    assert_eq!(roles[0].role_name, "Reader");
}

#[tokio::test]
async fn test_tenant_root_failure_is_tolerated() {
    let executor = ScriptedExecutor::new()
        .on_get(SUBSCRIPTIONS, page(vec![subscription("sub-a", "A")], None))
        .fail(
            Method::GET,
            ROOT,
            403,
            r#"{"error":{"code":"AuthorizationFailed","message":"no tenant-level access"}}"#,
        )
        .on_get(
            &scope_fragment("sub-a"),
            page(vec![eligible_instance("a1", "/subscriptions/sub-a", "Reader", "user-1")], None),
        )
        .shared();

    let roles = aggregator(executor.clone())
        .fetch_all("user-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role_name, "Reader");
    assert_eq!(executor.calls_to(ROOT).len(), 1);
}
