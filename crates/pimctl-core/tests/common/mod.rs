//! Common test utilities for pimctl-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pimctl_core::{CommandExecutor, Logger, PimError, PimResult};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One call seen by [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

impl RecordedCall {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

enum Reply {
    Body(Value),
    Status(u16, String),
}

struct Route {
    method: Method,
    fragment: String,
    reply: Reply,
}

/// Executor answering from a script of `(method, url fragment)` routes.
///
/// The first route, in registration order, whose method matches and whose
/// fragment occurs in the URL answers the call. Unmatched calls get a 404.
#[derive(Default)]
pub struct ScriptedExecutor {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
    delays: Mutex<Vec<(Method, Duration)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, fragment: &str, body: Value) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            reply: Reply::Body(body),
        });
        self
    }

    pub fn on_get(self, fragment: &str, body: Value) -> Self {
        self.on(Method::GET, fragment, body)
    }

    pub fn fail(self, method: Method, fragment: &str, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            reply: Reply::Status(status, body.to_string()),
        });
        self
    }

    /// Hold every `method` call for `delay` before answering. A cancelled
    /// token ends the wait early with `Interrupted`, like the HTTP executor.
    pub fn delay(self, method: Method, delay: Duration) -> Self {
        self.delays.lock().unwrap().push((method, delay));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.contains(fragment))
            .collect()
    }

    pub fn calls_with(&self, method: Method) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        cancel: &CancellationToken,
    ) -> PimResult<Vec<u8>> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.clone(),
            url: url.to_string(),
            body: body.map(str::to_string),
        });

        if cancel.is_cancelled() {
            return Err(PimError::Interrupted);
        }

        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(PimError::Interrupted),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let routes = self.routes.lock().unwrap();
        let route = routes
            .iter()
            .find(|r| r.method == method && url.contains(&r.fragment));

        match route.map(|r| &r.reply) {
            Some(Reply::Body(value)) => Ok(serde_json::to_vec(value).unwrap()),
            Some(Reply::Status(status, body)) => Err(PimError::from_response(*status, body.as_bytes())),
            None => Err(PimError::from_response(
                404,
                br#"{"error":{"code":"NotFound","message":"no scripted route"}}"#,
            )),
        }
    }
}

pub fn quiet_logger() -> Arc<Logger> {
    Arc::new(Logger::disabled())
}

/// Resource ID of an eligibility instance.
pub fn instance_id(scope: &str, name: &str) -> String {
    format!("{scope}/providers/Microsoft.Authorization/roleEligibilityScheduleInstances/{name}")
}

pub fn role_definition_id(scope: &str, role: &str) -> String {
    format!("{scope}/providers/Microsoft.Authorization/roleDefinitions/{role}")
}

/// Test data factory for an eligibility instance row with expanded properties.
pub fn eligible_instance(name: &str, scope: &str, role: &str, principal_id: &str) -> Value {
    json!({
        "id": instance_id(scope, name),
        "name": name,
        "type": "Microsoft.Authorization/roleEligibilityScheduleInstances",
        "properties": {
            "roleDefinitionId": role_definition_id(scope, role),
            "scope": scope,
            "principalId": principal_id,
            "principalType": "User",
            "status": "Provisioned",
            "memberType": "Direct",
            "startDateTime": "2026-01-01T00:00:00Z",
            "endDateTime": "2027-01-01T00:00:00Z",
            "expandedProperties": {
                "roleDefinition": {
                    "id": role_definition_id(scope, role),
                    "displayName": role,
                    "type": "BuiltInRole"
                },
                "scope": {
                    "id": scope,
                    "displayName": format!("{role} scope"),
                    "type": "subscription"
                },
                "principal": {
                    "id": principal_id,
                    "displayName": "Ada Lovelace",
                    "email": "ada@example.com",
                    "type": "User"
                }
            }
        }
    })
}

/// Same as [`eligible_instance`] but held through a group.
pub fn group_instance(name: &str, scope: &str, role: &str, group_id: &str) -> Value {
    let mut row = eligible_instance(name, scope, role, group_id);
    row["properties"]["memberType"] = json!("Group");
    row["properties"]["expandedProperties"]["principal"] = json!({
        "id": group_id,
        "displayName": "Platform Admins",
        "type": "Group"
    });
    row
}

pub fn subscription(id: &str, name: &str) -> Value {
    json!({
        "id": format!("/subscriptions/{id}"),
        "subscriptionId": id,
        "displayName": name,
        "state": "Enabled",
        "tenantId": "tenant-1"
    })
}

pub fn schedule(name: &str) -> Value {
    json!({
        "id": format!("/providers/Microsoft.Authorization/roleEligibilitySchedules/{name}"),
        "name": name
    })
}

/// Wraps items in an ARM collection page.
pub fn page(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["nextLink"] = json!(link);
    }
    response
}

pub fn me(id: &str) -> Value {
    json!({
        "id": id,
        "displayName": "Ada Lovelace",
        "mail": "ada@example.com",
        "userPrincipalName": "ada@example.com"
    })
}
