use serde_json::Value;
use std::time::Duration;
use ureq::Agent;

use super::RecordSource;
use crate::config::ApiSettings;
use crate::error::{FactureError, Result};
use crate::records::Collection;

/// Blocking client for the admin REST endpoints
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
    page_limit: u32,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
            page_limit: settings.page_limit,
        }
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/admin/{}", self.base_url, collection.name())
    }

    fn get_json(&self, endpoint: &str) -> Result<Value> {
        tracing::debug!(%endpoint, "fetching");

        let mut request = self
            .agent
            .get(endpoint)
            .header("Accept", "application/json")
            .query("limit", self.page_limit.to_string());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request.call().map_err(|e| FactureError::Api {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FactureError::Api {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        if status == 401 {
            return Err(FactureError::Unauthorized(endpoint.to_string()));
        }
        if !is_json {
            return Err(FactureError::Api {
                endpoint: endpoint.to_string(),
                message: format!("invalid response (HTTP {status}): {}", snippet(&body)),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| FactureError::Json {
            what: endpoint.to_string(),
            source: e,
        })?;

        if !(200..300).contains(&status) {
            return Err(FactureError::Api {
                endpoint: endpoint.to_string(),
                message: error_message(&json, status),
            });
        }

        Ok(json)
    }
}

impl RecordSource for ApiClient {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch(&self, collection: Collection) -> Result<Value> {
        self.get_json(&self.endpoint(collection))
    }
}

/// Server-provided `message`/`error`, else a status-based fallback
fn error_message(body: &Value, status: u16) -> String {
    let server = ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    match (server, status) {
        (Some(msg), _) => msg,
        (None, 404) => "route not found, check that the backend API is reachable".to_string(),
        (None, status) => format!("HTTP {status}"),
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
