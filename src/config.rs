use crate::error::{ArtifactoryError, Result};
use std::{collections::BTreeMap, fmt, time::Duration};

pub const URL_ENV: &str = "ARTIFACTORY_URL";
pub const USER_ENV: &str = "ARTIFACTORY_USER";
pub const PASSWORD_ENV: &str = "ARTIFACTORY_PASSWORD";
pub const ACCESS_TOKEN_ENV: &str = "ARTIFACTORY_ACCESS_TOKEN";
pub const API_KEY_ENV: &str = "ARTIFACTORY_API_KEY";

/// Connection details shared by every service: where the server lives and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactoryDetails {
    url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub request_timeout: Option<Duration>,
    pub insecure_tls: bool,
}

impl ArtifactoryDetails {
    /// The URL must be absolute http(s); a trailing `/` is added when missing.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let mut url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ArtifactoryError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {url}"
            )));
        }
        if !url.ends_with('/') {
            url.push('/');
        }
        Ok(Self {
            url,
            user: None,
            password: None,
            access_token: None,
            api_key: None,
            extra_headers: BTreeMap::new(),
            request_timeout: None,
            insecure_tls: false,
        })
    }

    /// Loads the URL and credentials from `ARTIFACTORY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(URL_ENV)
            .map_err(|_| ArtifactoryError::InvalidUrl(format!("{URL_ENV} is not set")))?;
        let mut details = Self::new(url)?;
        details.user = std::env::var(USER_ENV).ok();
        details.password = std::env::var(PASSWORD_ENV).ok();
        details.access_token = std::env::var(ACCESS_TOKEN_ENV).ok();
        details.api_key = std::env::var(API_KEY_ENV).ok();
        Ok(details)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    /// Per-request auth and header material. An access token wins over an API key,
    /// which wins over basic auth.
    pub fn http_client_details(&self) -> HttpClientDetails {
        let auth = if let Some(token) = &self.access_token {
            Some(Credentials::Bearer(token.clone()))
        } else if let Some(key) = &self.api_key {
            Some(Credentials::ApiKey(key.clone()))
        } else {
            self.user.as_ref().map(|user| Credentials::Basic {
                user: user.clone(),
                password: self.password.clone(),
            })
        };
        HttpClientDetails {
            auth,
            headers: self.extra_headers.clone(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic {
        user: String,
        password: Option<String>,
    },
    Bearer(String),
    ApiKey(String),
}

const REDACTED: &str = "<redacted>";

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

impl fmt::Debug for ArtifactoryDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactoryDetails")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("access_token", &redact(&self.access_token))
            .field("api_key", &redact(&self.api_key))
            .field("extra_headers", &self.extra_headers)
            .field("request_timeout", &self.request_timeout)
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { user, password } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &redact(password))
                .finish(),
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&REDACTED).finish(),
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&REDACTED).finish(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpClientDetails {
    pub auth: Option<Credentials>,
    pub headers: BTreeMap<String, String>,
}

impl HttpClientDetails {
    pub fn set_content_type(&mut self, content_type: &str) {
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
    }
}
