use crate::config::ArtifactoryDetails;
use crate::error::{ArtifactoryError, Result};
use crate::http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::utils::{build_artifactory_url, indent_json};
use crate::ArtifactoryService;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const PROMOTE_API: &str = "api/build/promote";
pub const PROMOTION_REQUEST_CONTENT_TYPE: &str =
    "application/vnd.org.jfrog.artifactory.build.PromotionRequest+json";

/// What to promote and where to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromotionParams {
    pub build_name: String,
    pub build_number: String,
    pub target_repo: String,
    pub source_repo: String,
    pub status: String,
    pub comment: String,
    pub copy: bool,
    pub include_dependencies: bool,
}

impl PromotionParams {
    pub fn new(build_name: impl Into<String>, build_number: impl Into<String>) -> Self {
        Self {
            build_name: build_name.into(),
            build_number: build_number.into(),
            ..Default::default()
        }
    }

    pub fn with_target_repo(mut self, repo: impl Into<String>) -> Self {
        self.target_repo = repo.into();
        self
    }

    pub fn with_source_repo(mut self, repo: impl Into<String>) -> Self {
        self.source_repo = repo.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    pub fn with_include_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }
}

/// Wire body of a promotion request. Absent fields are left off the JSON entirely;
/// empty strings and `false` are never sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPromotionBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        rename = "dependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub include_dependencies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl BuildPromotionBody {
    pub fn new(params: &PromotionParams, dry_run: bool) -> Self {
        Self {
            comment: present(&params.comment),
            source_repo: present(&params.source_repo),
            target_repo: present(&params.target_repo),
            status: present(&params.status),
            include_dependencies: params.include_dependencies.then_some(true),
            copy: params.copy.then_some(true),
            dry_run: dry_run.then_some(true),
        }
    }
}

fn present(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Promotes builds through `api/build/promote/{name}/{number}`.
#[derive(Clone, Debug)]
pub struct PromoteService<T: Transport = ReqwestTransport> {
    transport: T,
    details: ArtifactoryDetails,
    dry_run: bool,
}

impl PromoteService<ReqwestTransport> {
    pub fn from_details(details: ArtifactoryDetails) -> Result<Self> {
        let transport = ReqwestTransport::new(&details)?;
        Ok(Self::new(transport, details))
    }
}

impl<T: Transport> PromoteService<T> {
    pub fn new(transport: T, details: ArtifactoryDetails) -> Self {
        Self {
            transport,
            details,
            dry_run: false,
        }
    }

    /// In dry-run mode the request is still sent; the server is told not to apply it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn build_promote(&self, params: PromotionParams) -> Result<()> {
        let message = "Promoting build...";
        if self.dry_run {
            info!("[Dry run] {message}");
        } else {
            info!("{message}");
        }

        let rest_api = [PROMOTE_API, &params.build_name, &params.build_number]
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let url = build_artifactory_url(self.details.url(), &rest_api, &BTreeMap::new())?;
        let body = BuildPromotionBody::new(&params, self.dry_run);

        let response = self
            .post_json(url, &body, PROMOTION_REQUEST_CONTENT_TYPE)
            .await?;
        if response.status != StatusCode::OK {
            return Err(ArtifactoryError::Rejected {
                status: response.status,
                details: indent_json(&response.body),
            });
        }

        debug!("Artifactory response: {}", response.status);
        info!(
            "Promoted build {}/{} to: {} repository.",
            params.build_name, params.build_number, params.target_repo
        );
        Ok(())
    }

    async fn post_json<B: Serialize>(
        &self,
        url: Url,
        body: &B,
        content_type: &str,
    ) -> Result<HttpResponse> {
        let content = serde_json::to_vec(body)?;
        let mut details = self.details.http_client_details();
        details.set_content_type(content_type);
        self.transport
            .send(HttpRequest::post(url, content, details))
            .await
    }
}

impl<T: Transport> ArtifactoryService for PromoteService<T> {
    fn details(&self) -> &ArtifactoryDetails {
        &self.details
    }

    fn transport(&self) -> &dyn Transport {
        &self.transport
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
