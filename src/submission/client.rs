use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::SubmitError;
use super::multipart::{encode_parts, into_form};
use super::record::SubmissionRecord;
use crate::config::{AppConfig, Environment};

/// Path of the intake endpoint, relative to the configured API URL.
pub const INTAKE_PATH: &str = "/walk-in-entry/add";

/// Posts registrations to the intake endpoint.
///
/// Each call is a single attempt with no timeout and no retry.
#[derive(Debug, Clone)]
pub struct IntakeClient {
    http: Client,
    endpoint: String,
    api_key: String,
    environment: Environment,
}

impl IntakeClient {
    /// Creates a client for the configured API URL and key.
    pub fn new(config: &AppConfig, environment: Environment) -> Result<Self, SubmitError> {
        let http = Client::builder()
            .user_agent(concat!("walkin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: intake_url(&config.api_url),
            api_key: config.api_key.clone(),
            environment,
        })
    }

    /// Returns the full intake URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the environment tag sent with every request.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Submits a record, returning the endpoint's JSON reply.
    ///
    /// Non-2xx responses fail without reading the body. A 2xx reply with a
    /// falsy body (`null`, `false`, zero, `""`) also counts as a failure.
    pub async fn submit(&self, record: &SubmissionRecord) -> Result<Value, SubmitError> {
        let form = into_form(encode_parts(record))?;
        debug!(
            endpoint = %self.endpoint,
            environment = self.environment.as_str(),
            has_photo = record.photo.is_some(),
            "posting registration"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("x-environment", self.environment.as_str())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "intake endpoint rejected registration");
            return Err(SubmitError::Rejected(status));
        }

        let body: Value = response.json().await?;
        if is_empty_reply(&body) {
            warn!(%status, "intake endpoint returned an empty body");
            return Err(SubmitError::EmptyResponse);
        }

        info!(%status, "registration submitted");
        Ok(body)
    }
}

/// `null`, `false`, zero and `""` carry no acknowledgement.
fn is_empty_reply(body: &Value) -> bool {
    match body {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn intake_url(api_url: &str) -> String {
    format!("{}{INTAKE_PATH}", api_url.trim_end_matches('/'))
}
