use crate::aql::AqlSearchStrategies;
use crate::config::ArtifactoryDetails;
use crate::error::Result;
use crate::http::{ReqwestTransport, Transport};
use crate::types::{CommonParams, RequiredArtifactProps, ResultItem, SpecType};
use crate::ArtifactoryService;
use async_trait::async_trait;

/// A search request, classified once when it is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchSpec {
    Wildcard(CommonParams),
    Simple(CommonParams),
    Build(CommonParams),
    Aql(CommonParams),
}

impl SearchSpec {
    pub fn spec_type(&self) -> SpecType {
        match self {
            SearchSpec::Wildcard(_) => SpecType::Wildcard,
            SearchSpec::Simple(_) => SpecType::Simple,
            SearchSpec::Build(_) => SpecType::Build,
            SearchSpec::Aql(_) => SpecType::Aql,
        }
    }

    pub fn params(&self) -> &CommonParams {
        match self {
            SearchSpec::Wildcard(params)
            | SearchSpec::Simple(params)
            | SearchSpec::Build(params)
            | SearchSpec::Aql(params) => params,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParams {
    spec: SearchSpec,
}

impl SearchParams {
    pub fn new(params: CommonParams) -> Self {
        let spec = match params.spec_type() {
            SpecType::Wildcard => SearchSpec::Wildcard(params),
            SpecType::Simple => SearchSpec::Simple(params),
            SpecType::Build => SearchSpec::Build(params),
            SpecType::Aql => SearchSpec::Aql(params),
        };
        Self { spec }
    }

    pub fn spec(&self) -> &SearchSpec {
        &self.spec
    }

    pub fn spec_type(&self) -> SpecType {
        self.spec.spec_type()
    }

    pub fn file(&self) -> &CommonParams {
        self.spec.params()
    }
}

impl From<CommonParams> for SearchParams {
    fn from(params: CommonParams) -> Self {
        Self::new(params)
    }
}

impl From<SearchSpec> for SearchParams {
    fn from(spec: SearchSpec) -> Self {
        Self { spec }
    }
}

/// The three backends a search can be answered by.
#[async_trait]
pub trait SearchStrategies: Send + Sync {
    async fn search_with_pattern(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>>;

    async fn search_with_build(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
    ) -> Result<Vec<ResultItem>>;

    async fn search_with_aql(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>>;
}

/// Runs exactly one strategy, chosen by the spec kind, on behalf of `conf`.
pub async fn search_by_spec_files<S>(
    params: &SearchParams,
    conf: &dyn ArtifactoryService,
    strategies: &S,
    required: RequiredArtifactProps,
) -> Result<Vec<ResultItem>>
where
    S: SearchStrategies + ?Sized,
{
    let result_items = match params.spec() {
        SearchSpec::Wildcard(file) | SearchSpec::Simple(file) => {
            strategies.search_with_pattern(file, conf, required).await?
        }
        SearchSpec::Build(file) => strategies.search_with_build(file, conf).await?,
        SearchSpec::Aql(file) => strategies.search_with_aql(file, conf, required).await?,
    };
    Ok(result_items)
}

#[derive(Clone, Debug)]
pub struct SearchService<T: Transport = ReqwestTransport, S: SearchStrategies = AqlSearchStrategies>
{
    transport: T,
    details: ArtifactoryDetails,
    strategies: S,
}

impl SearchService<ReqwestTransport, AqlSearchStrategies> {
    pub fn from_details(details: ArtifactoryDetails) -> Result<Self> {
        let transport = ReqwestTransport::new(&details)?;
        Ok(Self::new(transport, details))
    }
}

impl<T: Transport> SearchService<T, AqlSearchStrategies> {
    pub fn new(transport: T, details: ArtifactoryDetails) -> Self {
        Self::with_strategies(transport, details, AqlSearchStrategies)
    }
}

impl<T: Transport, S: SearchStrategies> SearchService<T, S> {
    pub fn with_strategies(transport: T, details: ArtifactoryDetails, strategies: S) -> Self {
        Self {
            transport,
            details,
            strategies,
        }
    }

    pub async fn search(&self, params: SearchParams) -> Result<Vec<ResultItem>> {
        search_by_spec_files(&params, self, &self.strategies, RequiredArtifactProps::All).await
    }
}

impl<T: Transport, S: SearchStrategies> ArtifactoryService for SearchService<T, S> {
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
