use crate::config::ArtifactoryDetails;
use crate::error::{ArtifactoryError, Result};
use crate::http::{HttpRequest, ReqwestTransport, Transport};
use crate::utils::build_artifactory_url;
use crate::ArtifactoryService;
use reqwest::StatusCode;
use std::collections::BTreeMap;
use tracing::debug;

pub const PING_API: &str = "api/system/ping";

/// Liveness check against `api/system/ping`.
#[derive(Clone, Debug)]
pub struct PingService<T: Transport = ReqwestTransport> {
    transport: T,
    details: ArtifactoryDetails,
}

impl PingService<ReqwestTransport> {
    pub fn from_details(details: ArtifactoryDetails) -> Result<Self> {
        let transport = ReqwestTransport::new(&details)?;
        Ok(Self::new(transport, details))
    }
}

impl<T: Transport> PingService<T> {
    pub fn new(transport: T, details: ArtifactoryDetails) -> Self {
        Self { transport, details }
    }

    /// Returns the response body. On a non-200 status the body is still available
    /// through [`ArtifactoryError::response_body`].
    pub async fn ping(&self) -> Result<Vec<u8>> {
        let url = build_artifactory_url(self.details.url(), PING_API, &BTreeMap::new())?;
        let request = HttpRequest::get(url, self.details.http_client_details()).strict(true);
        let response = self.transport.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(ArtifactoryError::Status {
                status: response.status,
                body: response.body,
            });
        }
        debug!("Artifactory response: {}", response.status);
        Ok(response.body)
    }
}

impl<T: Transport> ArtifactoryService for PingService<T> {
    fn details(&self) -> &ArtifactoryDetails {
        &self.details
    }

    fn transport(&self) -> &dyn Transport {
        &self.transport
    }

    fn is_dry_run(&self) -> bool {
        false
    }
}
