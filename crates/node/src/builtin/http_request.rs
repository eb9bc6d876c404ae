//! `http_request` — performs an HTTP call with `{{name}}`-interpolated URL
//! and body (spec §4.B, §6 "HTTP client").
//!
//! Network errors and non-2xx responses are both reported as `Failed`
//! (left to the node's `error_handler` to decide whether to stop, skip, or
//! continue) rather than one being silent and the other not.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use nebula_workflow::{template, Context, NodeStatus};
use serde_json::Value;

use crate::handler::{failed, succeeded, HandlerEnv, NodeHandler};

pub struct HttpRequestHandler {
    pub method: String,
    pub url: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<Value>,
    pub auth: Option<BTreeMap<String, String>>,
    pub timeout: Option<Duration>,
}

#[async_trait]
impl NodeHandler for HttpRequestHandler {
    async fn execute(
        &self,
        context: &mut Context,
        env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let vars = context.variable_values();
        let url = template::interpolate(&self.url, &vars);
        let method = match reqwest::Method::from_bytes(self.method.to_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => return failed(format!("invalid HTTP method: {}", self.method)),
        };

        let mut request = env.http_client.request(method, &url);

        if let Some(headers) = &self.headers {
            for (name, value) in headers {
                request = request.header(name, template::interpolate(value, &vars));
            }
        }
        if let Some(auth) = &self.auth {
            if let Some(bearer) = auth.get("bearer_token") {
                request = request.bearer_auth(template::interpolate(bearer, &vars));
            } else if let (Some(user), Some(pass)) = (auth.get("username"), auth.get("password")) {
                request = request.basic_auth(user, Some(pass));
            }
        }
        if let Some(body) = &self.body {
            let body = interpolate_value(body, &vars);
            request = request.json(&body);
        }

        let timeout = self.timeout.unwrap_or(env.default_http_timeout);
        let response = match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return failed(format!("request failed: {err}")),
            Err(_) => return failed(format!("request timed out after {timeout:?}")),
        };

        let status = response.status();
        let headers: serde_json::Map<String, Value> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), Value::String(v.to_string())))
            })
            .collect();

        let body_text = match response.text().await {
            Ok(text) => text,
            Err(err) => return failed(format!("failed reading response body: {err}")),
        };
        let body: Value =
            serde_json::from_str(&body_text).unwrap_or_else(|_| Value::String(body_text));

        let output = serde_json::json!({
            "status_code": status.as_u16(),
            "headers": headers,
            "body": body,
        });

        if status.is_success() {
            succeeded(output)
        } else {
            let mut map = output.as_object().unwrap().clone();
            map.insert(
                "error".into(),
                Value::String(format!("HTTP {} from {url}", status.as_u16())),
            );
            (NodeStatus::Failed, map)
        }
    }
}

fn interpolate_value(value: &Value, vars: &std::collections::BTreeMap<String, Value>) -> Value {
    match value {
        Value::String(s) => Value::String(template::interpolate(s, vars)),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate_value(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}
