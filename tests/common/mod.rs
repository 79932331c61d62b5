#![allow(dead_code)]

use artifactory_client::{
    ArtifactoryDetails, ArtifactoryError, HttpRequest, HttpResponse, Result, Transport,
};
use async_trait::async_trait;
use httpmock::MockServer;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};

/// Starts a mock server, or returns `None` when the environment forbids binding sockets.
pub fn start_server() -> Option<MockServer> {
    match std::panic::catch_unwind(MockServer::start) {
        Ok(server) => Some(server),
        Err(_) => {
            eprintln!("skipping http test: unable to bind mock server in this environment");
            None
        }
    }
}

pub fn details_for(server: &MockServer) -> ArtifactoryDetails {
    ArtifactoryDetails::new(server.url("/artifactory")).unwrap()
}

/// Records every request and answers with a fixed response.
#[derive(Clone)]
pub struct RecordingTransport {
    pub requests: Arc<Mutex<Vec<HttpRequest>>>,
    status: StatusCode,
    body: Vec<u8>,
}

impl RecordingTransport {
    pub fn responding(status: StatusCode, body: &[u8]) -> Self {
        Self {
            requests: Arc::default(),
            status,
            body: body.to_vec(),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Fails every request the way a refused connection would, counting attempts.
#[derive(Clone, Default)]
pub struct FailingTransport {
    pub attempts: Arc<Mutex<usize>>,
}

pub const CONNECTION_REFUSED: &str = "connection refused";

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
        *self.attempts.lock().unwrap() += 1;
        Err(ArtifactoryError::Transport(CONNECTION_REFUSED.to_string()))
    }
}
