//! HTTP client for the plug's settings endpoints.

use std::time::Duration;

use log::{info, warn};

use super::{PlugProfile, SettingRequest, settings_plan};
use crate::error::PlugError;

/// Posts settings to one plug.
#[derive(Debug, Clone)]
pub struct ShellyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ShellyClient {
    /// Client for the plug at `base_url` (e.g. `http://192.168.33.1`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PlugError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PlugError::Client)?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one settings request. Anything but 200 is an error.
    pub async fn post(&self, request: &SettingRequest) -> Result<(), PlugError> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        let response = self
            .http
            .post(&url)
            .form(&request.fields)
            .send()
            .await
            .map_err(|source| PlugError::Http {
                endpoint: request.endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PlugError::Status {
                endpoint: request.endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Send the whole settings plan for `profile`.
    ///
    /// A failed request is logged and the rest of the plan still goes out.
    pub async fn configure(&self, profile: &PlugProfile) -> PlugReport {
        let mut report = PlugReport {
            name: profile.name.clone(),
            applied: Vec::new(),
            failed: Vec::new(),
        };

        for request in settings_plan(profile) {
            match self.post(&request).await {
                Ok(()) => {
                    info!("{}: {}", profile.name, request.describe());
                    report.applied.push(request.describe());
                }
                Err(e) => {
                    warn!("{}: {} failed: {}", profile.name, request.describe(), e);
                    report.failed.push((request.describe(), e));
                }
            }
        }

        info!(
            "{}: configuration finished ({} of {} settings applied)",
            profile.name,
            report.applied.len(),
            report.applied.len() + report.failed.len()
        );
        report
    }
}

/// What happened to each settings request for one plug.
#[derive(Debug)]
pub struct PlugReport {
    pub name: String,
    pub applied: Vec<String>,
    pub failed: Vec<(String, PlugError)>,
}

impl PlugReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
