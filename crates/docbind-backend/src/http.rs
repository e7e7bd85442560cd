//! HTTP implementation of the backend traits.
//!
//! Every endpoint takes and returns JSON except `/render`, which answers with
//! the document bytes. Non-2xx answers are turned into
//! [`BackendError::Status`] rather than transport errors so the body can be
//! reported to the user.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::http::Response;
use ureq::{Agent, Body};

use docbind_core::{BindingMap, DateRange, Dataset, Record, Settings};

use crate::error::{BackendError, Result};
use crate::traits::{ChartArtifact, ChartRenderRequest, EvaluationResults, ReportBackend, SettingsStore};

const FILTER_DATA: &str = "/filter_data";
const RENDER_PREVIEW: &str = "/render_preview";
const RENDER_CHART: &str = "/render_chart";
const COLUMNS: &str = "/columns";
const SAVE_SETTINGS: &str = "/save_settings";
const LOAD_SETTINGS: &str = "/load_settings";
const RENDER: &str = "/render";

/// Upper bound on an exported document.
const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Serialize)]
struct BindingsPayload<'a> {
    formulas: &'a BindingMap,
    data: &'a Dataset,
}

#[derive(Serialize)]
struct ExportPayload<'a> {
    formulas: &'a BindingMap,
    data: &'a Dataset,
    filename: &'a str,
}

/// Acknowledgement returned by `/render_chart`.
#[derive(Deserialize)]
struct ChartAck {
    success: bool,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Blocking HTTP client for the report backend.
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response<Body>> {
        debug!(endpoint, "POST");
        let response = self
            .agent
            .post(&self.url(endpoint))
            .send_json(body)
            .map_err(|e| BackendError::transport(endpoint, e))?;
        ensure_success(endpoint, response)
    }

    fn get(&self, endpoint: &str) -> Result<Response<Body>> {
        debug!(endpoint, "GET");
        let response = self
            .agent
            .get(&self.url(endpoint))
            .call()
            .map_err(|e| BackendError::transport(endpoint, e))?;
        ensure_success(endpoint, response)
    }
}

fn ensure_success(endpoint: &str, mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.body_mut().read_to_string().unwrap_or_default();
    if status.as_u16() == 404 {
        return Err(BackendError::NotFound(endpoint.to_string()));
    }
    Err(BackendError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn read_json<T: DeserializeOwned>(endpoint: &str, mut response: Response<Body>) -> Result<T> {
    response
        .body_mut()
        .read_json::<T>()
        .map_err(|e| BackendError::decode(endpoint, e))
}

impl ReportBackend for HttpBackend {
    fn filter(&self, range: &DateRange) -> Result<Dataset> {
        let response = self.post(FILTER_DATA, range)?;
        let records: Vec<Record> = read_json(FILTER_DATA, response)?;
        debug!(rows = records.len(), "filtered dataset received");
        Ok(Dataset::new(records))
    }

    fn evaluate(&self, bindings: &BindingMap, dataset: &Dataset) -> Result<EvaluationResults> {
        let payload = BindingsPayload {
            formulas: bindings,
            data: dataset,
        };
        let response = self.post(RENDER_PREVIEW, &payload)?;
        read_json(RENDER_PREVIEW, response)
    }

    fn render_chart(&self, request: &ChartRenderRequest) -> Result<ChartArtifact> {
        let response = self.post(RENDER_CHART, request)?;
        let ack: ChartAck = read_json(RENDER_CHART, response)?;
        if !ack.success {
            let message = ack.error.unwrap_or_else(|| "chart generation failed".to_string());
            return Err(BackendError::rejected(RENDER_CHART, message));
        }
        Ok(ChartArtifact {
            variable: request.variable.clone(),
            location: ack
                .location
                .unwrap_or_else(|| format!("{RENDER_CHART}/{}", request.variable)),
        })
    }

    fn columns(&self) -> Result<Vec<String>> {
        let response = self.get(COLUMNS)?;
        read_json(COLUMNS, response)
    }

    fn export_document(
        &self,
        bindings: &BindingMap,
        dataset: &Dataset,
        filename: &str,
    ) -> Result<Vec<u8>> {
        let payload = ExportPayload {
            formulas: bindings,
            data: dataset,
            filename,
        };
        let mut response = self.post(RENDER, &payload)?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_DOCUMENT_BYTES)
            .read_to_vec()
            .map_err(|e| BackendError::decode(RENDER, e))
    }
}

impl SettingsStore for HttpBackend {
    fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.post(SAVE_SETTINGS, settings)?;
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<Settings>> {
        match self.get(LOAD_SETTINGS) {
            Ok(response) => read_json(LOAD_SETTINGS, response).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
