//! Dataset extraction with endpoint fallback.

use std::sync::Arc;

use comext_arrow::delimited_text_to_table;
use comext_core::{
    DatasetMetadata, DecodeOptions, Dialect, DimensionCatalog, Payload, Table, decode_payload,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    error::{AttemptError, ExtractError, Stage},
    transport::{HttpRequest, HttpResponse, ResponseFormat, Transport},
};

/// Fetches datasets through a [`Transport`], falling back from the primary
/// JSON endpoint to the secondary CSV endpoint.
pub struct Extractor {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    decode_options: DecodeOptions,
}

/// Builder for configuring [`Extractor`].
pub struct ExtractorBuilder {
    config: ClientConfig,
    decode_options: DecodeOptions,
}

/// Metadata and catalogs of a dataset, as served by the primary endpoint.
#[derive(Debug, Clone)]
pub struct DatasetDimensions {
    pub dialect: Dialect,
    pub metadata: DatasetMetadata,
    pub catalogs: Vec<DimensionCatalog>,
}

enum FetchState {
    TryPrimary,
    TrySecondary,
    Decoded(Table),
    Failed(ExtractError),
}

impl Extractor {
    /// Create a builder for [`Extractor`].
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder {
            config: ClientConfig::default(),
            decode_options: DecodeOptions::default(),
        }
    }

    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::builder().build(transport)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    /// Fetch `dataset` filtered by `filters` and return it as a table.
    ///
    /// The primary endpoint is asked for JSON first. HTTP 404/406, a body
    /// that is not JSON, an unrecognized dialect or a payload without
    /// observations moves on to the secondary endpoint, which is asked for
    /// CSV. Any other failure is terminal. Each endpoint is requested at most
    /// once.
    pub fn fetch(
        &self,
        dataset: &str,
        filters: &IndexMap<String, String>,
    ) -> Result<Table, ExtractError> {
        let mut state = FetchState::TryPrimary;
        loop {
            state = match state {
                FetchState::TryPrimary => self.try_primary(dataset, filters),
                FetchState::TrySecondary => self.try_secondary(dataset, filters),
                FetchState::Decoded(table) => {
                    info!(dataset, rows = table.num_rows(), "dataset fetched");
                    return Ok(table);
                }
                FetchState::Failed(err) => return Err(err),
            };
        }
    }

    /// Fetch only the dimension catalogs and metadata of `dataset` from the
    /// primary endpoint.
    pub fn dimensions(
        &self,
        dataset: &str,
        filters: &IndexMap<String, String>,
    ) -> Result<DatasetDimensions, ExtractError> {
        let request = self.request(Stage::Primary, dataset, filters);
        let response = self.send(Stage::Primary, dataset, &request)?;
        let parsed = check_status(&response, false)
            .and_then(|_| Ok(serde_json::from_str::<Value>(&response.body)?));
        let body = parsed.map_err(|err| fail(Stage::Primary, dataset, &response, err))?;
        let payload = Payload::parse(&body)
            .map_err(|err| fail(Stage::Primary, dataset, &response, err.into()))?;

        Ok(DatasetDimensions {
            dialect: payload.dialect(),
            metadata: payload.metadata().clone(),
            catalogs: payload.into_catalogs(),
        })
    }

    fn try_primary(&self, dataset: &str, filters: &IndexMap<String, String>) -> FetchState {
        let request = self.request(Stage::Primary, dataset, filters);
        let response = match self.send(Stage::Primary, dataset, &request) {
            Ok(response) => response,
            Err(err) => return FetchState::Failed(err),
        };

        match self.decode_json(&response) {
            Ok(table) => FetchState::Decoded(table),
            Err(err) if err.allows_fallback() => {
                warn!(
                    dataset,
                    status = response.status,
                    error = %err,
                    "primary endpoint unusable, trying secondary endpoint"
                );
                FetchState::TrySecondary
            }
            Err(err) => FetchState::Failed(fail(Stage::Primary, dataset, &response, err)),
        }
    }

    fn try_secondary(&self, dataset: &str, filters: &IndexMap<String, String>) -> FetchState {
        let request = self.request(Stage::Secondary, dataset, filters);
        let response = match self.send(Stage::Secondary, dataset, &request) {
            Ok(response) => response,
            Err(err) => return FetchState::Failed(err),
        };

        let table = check_status(&response, true)
            .and_then(|_| Ok(delimited_text_to_table(&response.body)?));
        match table {
            Ok(table) => FetchState::Decoded(table),
            Err(err) => FetchState::Failed(fail(Stage::Secondary, dataset, &response, err)),
        }
    }

    fn decode_json(&self, response: &HttpResponse) -> Result<Table, AttemptError> {
        check_status(response, false)?;
        let body: Value = serde_json::from_str(&response.body)?;
        let payload = Payload::parse(&body)?;
        debug!(dialect = %payload.dialect(), "recognized response dialect");
        Ok(decode_payload(&payload, &self.decode_options)?)
    }

    fn send(
        &self,
        stage: Stage,
        dataset: &str,
        request: &HttpRequest,
    ) -> Result<HttpResponse, ExtractError> {
        info!(%stage, url = %request.url, "requesting dataset");
        let response = self
            .transport
            .get(request)
            .map_err(|err| ExtractError::new(stage, dataset, None, None, err.into()))?;
        debug!(
            %stage,
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }

    fn request(
        &self,
        stage: Stage,
        dataset: &str,
        filters: &IndexMap<String, String>,
    ) -> HttpRequest {
        let (url, format) = match stage {
            Stage::Primary => (
                format!("{}{}", self.config.primary_base_url, dataset),
                ResponseFormat::Json,
            ),
            Stage::Secondary => (
                format!("{}{}/", self.config.secondary_base_url, dataset),
                ResponseFormat::DelimitedText,
            ),
        };

        let mut headers = vec![
            ("Accept".to_string(), format.accept().to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        for (name, value) in &self.config.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            url,
            query: filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            headers,
            timeout: self.config.timeout,
            format,
        }
    }
}

impl ExtractorBuilder {
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// Build the extractor on top of `transport`.
    pub fn build(self, transport: impl Transport + 'static) -> Extractor {
        Extractor {
            transport: Arc::new(transport),
            config: self.config,
            decode_options: self.decode_options,
        }
    }
}

/// Only HTTP 200 carries a dataset. On the primary endpoint 404 and 406 mean
/// the dataset must be requested elsewhere.
fn check_status(response: &HttpResponse, secondary: bool) -> Result<(), AttemptError> {
    match response.status {
        200 => Ok(()),
        404 | 406 if !secondary => Err(AttemptError::Rejected {
            status: response.status,
        }),
        status => Err(AttemptError::UpstreamRejected { status }),
    }
}

fn fail(stage: Stage, dataset: &str, response: &HttpResponse, err: AttemptError) -> ExtractError {
    warn!(%stage, dataset, status = response.status, error = %err, "endpoint attempt failed");
    ExtractError::new(
        stage,
        dataset,
        Some(response.status),
        Some(&response.body),
        err,
    )
}
