use crate::config::{ArtifactoryDetails, Credentials, HttpClientDetails};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};

pub const API_KEY_HEADER: &str = "X-JFrog-Art-Api";

/// A single request handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub details: HttpClientDetails,
    pub body: Option<Vec<u8>>,
    /// Enforce certificate and host validation even when the transport is configured to skip it.
    pub strict: bool,
}

impl HttpRequest {
    pub fn get(url: Url, details: HttpClientDetails) -> Self {
        Self {
            method: Method::GET,
            url,
            details,
            body: None,
            strict: false,
        }
    }

    pub fn post(url: Url, body: Vec<u8>, details: HttpClientDetails) -> Self {
        Self {
            method: Method::POST,
            url,
            details,
            body: Some(body),
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Performs one HTTP round trip. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    strict: reqwest::Client,
    relaxed: Option<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new(details: &ArtifactoryDetails) -> Result<Self> {
        let strict = Self::builder(details).build()?;
        let relaxed = if details.insecure_tls {
            Some(
                Self::builder(details)
                    .danger_accept_invalid_certs(true)
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self { strict, relaxed })
    }

    fn builder(details: &ArtifactoryDetails) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder().no_proxy();
        match details.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    fn client_for(&self, strict: bool) -> &reqwest::Client {
        match (&self.relaxed, strict) {
            (Some(relaxed), false) => relaxed,
            _ => &self.strict,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client_for(request.strict)
            .request(request.method, request.url);
        builder = match request.details.auth {
            Some(Credentials::Basic { user, password }) => builder.basic_auth(user, password),
            Some(Credentials::Bearer(token)) => builder.bearer_auth(token),
            Some(Credentials::ApiKey(key)) => builder.header(API_KEY_HEADER, key),
            None => builder,
        };
        for (name, value) in request.details.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
