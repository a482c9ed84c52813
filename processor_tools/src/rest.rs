use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::ProcessorError;

/// Every outbound call to a processor is bounded by this timeout.
pub const PROCESSOR_TIMEOUT: Duration = Duration::from_secs(10);

/// A small JSON-over-HTTP client shared by the processor integrations. It carries the processor's base url and
/// authentication header and maps HTTP failures onto [`ProcessorError`].
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    client: Arc<Client>,
}

impl RestClient {
    /// Creates a new client that sends `auth_header: auth_value` with every request.
    pub fn new(base_url: &str, auth_header: &'static str, auth_value: &str) -> Result<Self, ProcessorError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(auth_value).map_err(|e| ProcessorError::Initialization(e.to_string()))?;
        headers.insert(HeaderName::from_static(auth_header), val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(PROCESSOR_TIMEOUT)
            .build()
            .map_err(|e| ProcessorError::Initialization(e.to_string()))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client: Arc::new(client) })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProcessorError> {
        self.rest_query::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ProcessorError> {
        self.rest_query(Method::POST, path, Some(body)).await
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ProcessorError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            trace!("REST query successful. {status}");
            serde_json::from_str::<T>(&text).map_err(|e| ProcessorError::EncodingError(e.to_string()))
        } else {
            debug!("REST query failed. {status}: {text}");
            Err(ProcessorError::UpstreamError { status: status.as_u16(), message: text })
        }
    }
}
