//! Snapshot source backed by the collector's HTTP API.

use http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::observation::{Observation, ObservationKind, Timestamp};

use super::{
    DeviceDifference, HttpClient, HttpError, HttpRequest, SnapshotSource, SourceError,
};

const TIMELINE_PATH: &str = "api/timeline";
const DEVICES_PATH: &str = "api/devices";
const COMPARE_PATH: &str = "api/compare";

/// Reads windows, device lists and comparisons from the collector API.
///
/// Endpoints are resolved relative to the base URL, so a collector mounted
/// under a path prefix (`http://host/netmon/`) works as well as one at the
/// root. Configured headers are sent verbatim on every request.
///
/// # Type Parameters
///
/// - `H`: The HTTP client (implements [`HttpClient`])
#[derive(Debug)]
pub struct ApiSource<H> {
    client: H,
    base: Url,
    headers: HeaderMap,
}

impl<H> ApiSource<H> {
    /// Creates a source for the collector at `base`.
    ///
    /// A missing trailing slash is added so relative endpoints keep the
    /// base path.
    #[must_use]
    pub fn new(client: H, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            client,
            base,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the headers sent with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a reference to the HTTP client.
    pub const fn client(&self) -> &H {
        &self.client
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base
            .join(path)
            .map_err(|e| HttpError::InvalidUrl(e.to_string()).into())
    }

    fn timeline_url(&self, hours: u32) -> Result<Url, SourceError> {
        let mut url = self.endpoint(TIMELINE_PATH)?;
        url.query_pairs_mut()
            .append_pair("hours", &hours.to_string());
        Ok(url)
    }

    fn compare_url(
        &self,
        first: &Timestamp,
        second: &Timestamp,
        kind: ObservationKind,
    ) -> Result<Url, SourceError> {
        let mut url = self.endpoint(COMPARE_PATH)?;
        url.query_pairs_mut()
            .append_pair("timestamp1", &first.to_string())
            .append_pair("timestamp2", &second.to_string())
            .append_pair("type", kind.as_str());
        Ok(url)
    }
}

impl<H: HttpClient> ApiSource<H> {
    /// Sends a GET request and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        tracing::debug!("GET {url}");
        let request = HttpRequest::get(url).with_headers(&self.headers);
        let response = self.client.request(request).await?;

        if !response.is_success() {
            return Err(SourceError::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        serde_json::from_slice(&response.body).map_err(SourceError::Decode)
    }
}

impl<H: HttpClient> SnapshotSource for ApiSource<H> {
    async fn timeline(&self, hours: u32) -> Result<Vec<Observation>, SourceError> {
        let url = self.timeline_url(hours)?;
        self.get_json(url).await
    }

    async fn devices(&self) -> Result<Vec<String>, SourceError> {
        let url = self.endpoint(DEVICES_PATH)?;
        self.get_json(url).await
    }

    async fn compare(
        &self,
        first: &Timestamp,
        second: &Timestamp,
        kind: ObservationKind,
    ) -> Result<Vec<DeviceDifference>, SourceError> {
        let url = self.compare_url(first, second, kind)?;
        self.get_json(url).await
    }
}
