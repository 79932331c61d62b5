mod common;

use artifactory_client::{
    ArtifactoryDetails, ArtifactoryError, ArtifactoryService, CommonParams, HttpRequest,
    HttpResponse, RequiredArtifactProps, Result, ResultItem, SearchParams, SearchService,
    SearchSpec, SearchStrategies, SpecType, Transport,
};
use async_trait::async_trait;
use common::{details_for, start_server};
use httpmock::Method::POST;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Invocation {
    strategy: &'static str,
    params: CommonParams,
    required: Option<RequiredArtifactProps>,
    url: String,
    dry_run: bool,
}

#[derive(Clone, Default)]
struct RecordingStrategies {
    calls: Arc<Mutex<Vec<Invocation>>>,
    fail: bool,
}

impl RecordingStrategies {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        strategy: &'static str,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: Option<RequiredArtifactProps>,
    ) -> Result<Vec<ResultItem>> {
        self.calls.lock().unwrap().push(Invocation {
            strategy,
            params: params.clone(),
            required,
            url: conf.details().url().to_string(),
            dry_run: conf.is_dry_run(),
        });
        if self.fail {
            return Err(ArtifactoryError::InvalidSpec(format!("{strategy} failed")));
        }
        Ok(vec![
            item(&format!("{strategy}-1.jar")),
            item(&format!("{strategy}-2.jar")),
        ])
    }
}

fn item(name: &str) -> ResultItem {
    ResultItem {
        repo: "libs-release-local".into(),
        path: "org/acme".into(),
        name: name.into(),
        ..ResultItem::default()
    }
}

#[async_trait]
impl SearchStrategies for RecordingStrategies {
    async fn search_with_pattern(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>> {
        self.record("pattern", params, conf, Some(required))
    }

    async fn search_with_build(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
    ) -> Result<Vec<ResultItem>> {
        self.record("build", params, conf, None)
    }

    async fn search_with_aql(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>> {
        self.record("aql", params, conf, Some(required))
    }
}

fn details() -> ArtifactoryDetails {
    ArtifactoryDetails::new("http://localhost:8081/artifactory").unwrap()
}

/// Strategies under test never touch the network.
struct NoTransport;

#[async_trait]
impl Transport for NoTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
        Err(ArtifactoryError::Transport("no network in dispatch tests".into()))
    }
}

fn service(strategies: RecordingStrategies) -> SearchService<NoTransport, RecordingStrategies> {
    SearchService::with_strategies(NoTransport, details(), strategies)
}

#[tokio::test]
async fn wildcard_and_simple_share_pattern_strategy() {
    let params = CommonParams::with_pattern("libs-release-local/org/acme/app.jar");

    let wildcard = RecordingStrategies::default();
    service(wildcard.clone())
        .search(SearchParams::from(SearchSpec::Wildcard(params.clone())))
        .await
        .unwrap();

    let simple = RecordingStrategies::default();
    service(simple.clone())
        .search(SearchParams::from(SearchSpec::Simple(params)))
        .await
        .unwrap();

    assert_eq!(wildcard.calls().len(), 1);
    assert_eq!(wildcard.calls(), simple.calls());
    assert_eq!(wildcard.calls()[0].strategy, "pattern");
    assert_eq!(wildcard.calls()[0].required, Some(RequiredArtifactProps::All));
}

#[tokio::test]
async fn aql_spec_only_runs_aql_strategy() {
    let strategies = RecordingStrategies::default();
    let params = SearchParams::new(CommonParams::with_aql(r#"{"repo":"libs-release-local"}"#));
    assert_eq!(params.spec_type(), SpecType::Aql);

    let items = service(strategies.clone()).search(params).await.unwrap();

    let calls = strategies.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].strategy, "aql");
    assert!(calls.iter().all(|c| c.strategy != "pattern" && c.strategy != "build"));
    assert_eq!(items[0].name, "aql-1.jar");
}

#[tokio::test]
async fn build_spec_runs_build_strategy_with_service_conf() {
    let strategies = RecordingStrategies::default();
    let params = SearchParams::new(CommonParams::with_build("my-app/42"));

    service(strategies.clone()).search(params).await.unwrap();

    let calls = strategies.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].strategy, "build");
    assert_eq!(calls[0].required, None);
    assert_eq!(calls[0].url, "http://localhost:8081/artifactory/");
    assert!(!calls[0].dry_run);
}

#[tokio::test]
async fn results_keep_strategy_order() {
    let strategies = RecordingStrategies::default();
    let items = service(strategies)
        .search(SearchParams::new(CommonParams::with_pattern("libs-release-local/*.jar")))
        .await
        .unwrap();
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["pattern-1.jar", "pattern-2.jar"]);
}

#[tokio::test]
async fn strategy_error_is_propagated() {
    let err = service(RecordingStrategies::failing())
        .search(SearchParams::new(CommonParams::with_build("my-app")))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid search spec: build failed");
}

#[tokio::test]
async fn default_strategies_post_aql() {
    let Some(server) = start_server() else {
        return;
    };
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/artifactory/api/search/aql")
            .header("content-type", "text/plain")
            .body_includes(r#""artifact.module.build.name":{"$eq":"my-app"}"#)
            .body_includes(r#""artifact.module.build.number":{"$eq":"42"}"#);
        then.status(200).json_body(json!({
            "results": [
                {
                    "repo": "libs-release-local",
                    "path": "org/acme/app/42",
                    "name": "app-42.jar",
                    "type": "file",
                    "size": 1024,
                    "actual_sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709",
                    "properties": [{"key": "build.name", "value": "my-app"}]
                }
            ],
            "range": {"start_pos": 0, "end_pos": 1, "total": 1}
        }));
    });

    let service = SearchService::from_details(details_for(&server)).unwrap();
    let items = service
        .search(SearchParams::new(CommonParams::with_build("my-app/42")))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].full_path(), "libs-release-local/org/acme/app/42/app-42.jar");
    assert_eq!(items[0].size, 1024);
    assert_eq!(items[0].properties[0].value, "my-app");
}

#[tokio::test]
async fn default_strategies_surface_server_rejection() {
    let Some(server) = start_server() else {
        return;
    };
    server.mock(|when, then| {
        when.method(POST).path("/artifactory/api/search/aql");
        then.status(400).body("Failed to parse query");
    });

    let service = SearchService::from_details(details_for(&server)).unwrap();
    let err = service
        .search(SearchParams::new(CommonParams::with_aql("{bad")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");
    assert!(err.to_string().contains("Failed to parse query"), "{err}");
}
