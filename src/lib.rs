pub mod aql;
pub mod config;
pub mod error;
pub mod http;
pub mod ping;
pub mod promote;
pub mod search;
pub mod types;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

pub use aql::AqlSearchStrategies;
pub use config::{ArtifactoryDetails, Credentials, HttpClientDetails};
pub use error::{ArtifactoryError, Result};
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use ping::PingService;
pub use promote::{BuildPromotionBody, PromoteService, PromotionParams};
pub use search::{SearchParams, SearchService, SearchSpec, SearchStrategies, search_by_spec_files};
pub use types::*;

/// Capabilities every service exposes so shared helpers (the search dispatch and its
/// strategies) can reach the connection details and transport of whichever service
/// invoked them.
pub trait ArtifactoryService: Send + Sync {
    fn details(&self) -> &ArtifactoryDetails;

    fn transport(&self) -> &dyn Transport;

    fn is_dry_run(&self) -> bool;
}
