use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactoryError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("Artifactory response: {status}")]
    Status { status: StatusCode, body: Vec<u8> },
    #[error("Artifactory response: {status}\n{details}")]
    Rejected { status: StatusCode, details: String },
    #[error("invalid search spec: {0}")]
    InvalidSpec(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ArtifactoryError {
    /// Raw body of a non-success response, when the operation kept it.
    pub fn response_body(&self) -> Option<&[u8]> {
        match self {
            ArtifactoryError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ArtifactoryError::Status { status, .. } | ArtifactoryError::Rejected { status, .. } => {
                Some(*status)
            }
            ArtifactoryError::Http(err) => err.status(),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ArtifactoryError::InvalidUrl(_)
            | ArtifactoryError::InvalidSpec(_)
            | ArtifactoryError::Serde(_) => 2,
            ArtifactoryError::Status { .. } | ArtifactoryError::Rejected { .. } => 3,
            ArtifactoryError::Http(_) | ArtifactoryError::Transport(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtifactoryError>;
