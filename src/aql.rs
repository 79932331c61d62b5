//! Default search strategies: every spec kind is turned into an AQL `items.find`
//! query and posted to `api/search/aql`.

use crate::error::{ArtifactoryError, Result};
use crate::http::HttpRequest;
use crate::search::SearchStrategies;
use crate::types::{CommonParams, RequiredArtifactProps, ResultItem, SortOrder};
use crate::utils::{build_artifactory_url, indent_json};
use crate::ArtifactoryService;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::debug;

pub const AQL_API: &str = "api/search/aql";

#[derive(Clone, Copy, Debug, Default)]
pub struct AqlSearchStrategies;

#[async_trait]
impl SearchStrategies for AqlSearchStrategies {
    async fn search_with_pattern(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>> {
        let query = pattern_query(params, required)?;
        execute_aql(conf, query).await
    }

    async fn search_with_build(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
    ) -> Result<Vec<ResultItem>> {
        let query = build_query(params, RequiredArtifactProps::All)?;
        execute_aql(conf, query).await
    }

    async fn search_with_aql(
        &self,
        params: &CommonParams,
        conf: &dyn ArtifactoryService,
        required: RequiredArtifactProps,
    ) -> Result<Vec<ResultItem>> {
        let query = aql_query(params, required)?;
        execute_aql(conf, query).await
    }
}

#[derive(Debug, Deserialize)]
struct AqlResponse {
    #[serde(default)]
    results: Vec<ResultItem>,
}

/// Posts `query` through the caller's transport and decodes the result items.
pub async fn execute_aql(conf: &dyn ArtifactoryService, query: String) -> Result<Vec<ResultItem>> {
    debug!("Searching Artifactory using AQL query:\n{query}");
    let url = build_artifactory_url(conf.details().url(), AQL_API, &BTreeMap::new())?;
    let mut details = conf.details().http_client_details();
    details.set_content_type("text/plain");
    let response = conf
        .transport()
        .send(HttpRequest::post(url, query.into_bytes(), details))
        .await?;
    if response.status != StatusCode::OK {
        return Err(ArtifactoryError::Rejected {
            status: response.status,
            details: indent_json(&response.body),
        });
    }
    debug!("Artifactory response: {}", response.status);
    let parsed: AqlResponse = serde_json::from_slice(&response.body)?;
    Ok(parsed.results)
}

pub fn pattern_query(params: &CommonParams, required: RequiredArtifactProps) -> Result<String> {
    let parts = split_pattern(&params.pattern)?;
    let mut clauses = vec![clause("repo", "$match", parts.repo)];
    let recurse = params.recursive && is_wildcard(parts.name);
    match (parts.path, recurse) {
        (None, true) => {}
        (None, false) => clauses.push(clause("path", "$match", ".")),
        (Some(dir), true) => clauses.push(json!({
            "$or": [
                clause("path", "$match", dir),
                clause("path", "$match", &format!("{dir}/*")),
            ]
        })),
        (Some(dir), false) => clauses.push(clause("path", "$match", dir)),
    }
    clauses.push(clause("name", "$match", parts.name));
    clauses.push(type_clause(params.include_dirs));

    for exclusion in &params.exclusions {
        let excluded = split_pattern(exclusion)?;
        let path = match excluded.path {
            Some(dir) if params.recursive && is_wildcard(excluded.name) => json!({
                "$and": [
                    clause("path", "$nmatch", dir),
                    clause("path", "$nmatch", &format!("{dir}/*")),
                ]
            }),
            dir => clause("path", "$nmatch", dir.unwrap_or("*")),
        };
        clauses.push(json!({
            "$or": [
                clause("repo", "$nmatch", excluded.repo),
                path,
                clause("name", "$nmatch", excluded.name),
            ]
        }));
    }
    clauses.extend(props_clauses(params.props.as_deref())?);
    if let Some(build) = params.build.as_deref() {
        clauses.extend(build_clauses(build)?);
    }
    Ok(finish(clauses, params, required))
}

pub fn build_query(params: &CommonParams, required: RequiredArtifactProps) -> Result<String> {
    let build = params
        .build
        .as_deref()
        .ok_or_else(|| ArtifactoryError::InvalidSpec("build search requires a build".into()))?;
    let mut clauses = build_clauses(build)?;
    clauses.push(type_clause(false));
    clauses.extend(props_clauses(params.props.as_deref())?);
    Ok(finish(clauses, params, required))
}

pub fn aql_query(params: &CommonParams, required: RequiredArtifactProps) -> Result<String> {
    let items_find = params
        .aql
        .as_deref()
        .map(str::trim)
        .filter(|aql| !aql.is_empty())
        .ok_or_else(|| ArtifactoryError::InvalidSpec("aql search requires a query".into()))?;
    let find = if items_find.starts_with("items.find(") {
        items_find.to_string()
    } else {
        format!("items.find({items_find})")
    };
    let modifiers = modifiers(params, required, &find);
    Ok(format!("{find}{modifiers}"))
}

fn finish(clauses: Vec<Value>, params: &CommonParams, required: RequiredArtifactProps) -> String {
    let criteria = json!({ "$and": clauses });
    format!("items.find({criteria}){}", modifiers(params, required, ""))
}

/// Modifiers already written into `query` by the caller are left alone.
fn modifiers(params: &CommonParams, required: RequiredArtifactProps, query: &str) -> String {
    let present = |modifier: &str| query.contains(&format!(").{modifier}("));
    let mut out = String::new();
    if !present("include") {
        let include = required
            .include_fields()
            .iter()
            .map(|field| format!("\"{field}\""))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!(".include({include})"));
    }
    if !params.sort_by.is_empty() && !present("sort") {
        let order = match params.sort_order.unwrap_or_default() {
            SortOrder::Asc => "$asc",
            SortOrder::Desc => "$desc",
        };
        let mut sort = Map::new();
        sort.insert(order.to_string(), json!(params.sort_by));
        out.push_str(&format!(".sort({})", Value::Object(sort)));
    }
    if let Some(offset) = params.offset.filter(|_| !present("offset")) {
        out.push_str(&format!(".offset({offset})"));
    }
    if let Some(limit) = params.limit.filter(|_| !present("limit")) {
        out.push_str(&format!(".limit({limit})"));
    }
    out
}

struct PatternParts<'a> {
    repo: &'a str,
    path: Option<&'a str>,
    name: &'a str,
}

fn split_pattern(pattern: &str) -> Result<PatternParts<'_>> {
    let pattern = pattern.trim_start_matches('/');
    let (repo, rest) = pattern.split_once('/').unwrap_or((pattern, ""));
    if repo.is_empty() {
        return Err(ArtifactoryError::InvalidSpec(format!(
            "pattern `{pattern}` must start with a repository"
        )));
    }
    let (path, name) = match rest.rsplit_once('/') {
        Some((dir, name)) if !dir.is_empty() => (Some(dir), name),
        Some((_, name)) => (None, name),
        None => (None, rest),
    };
    let name = if name.is_empty() { "*" } else { name };
    Ok(PatternParts { repo, path, name })
}

fn is_wildcard(value: &str) -> bool {
    value.contains(['*', '?'])
}

fn type_clause(include_dirs: bool) -> Value {
    let item_type = if include_dirs { "any" } else { "file" };
    json!({ "type": item_type })
}

fn props_clauses(props: Option<&str>) -> Result<Vec<Value>> {
    let Some(props) = props else {
        return Ok(Vec::new());
    };
    props
        .split(';')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ArtifactoryError::InvalidSpec(format!("property `{pair}` is not key=value"))
            })?;
            Ok(clause(&format!("@{}", key.trim()), "$match", value.trim()))
        })
        .collect()
}

/// `name[/number]`; a `/` that belongs to the name is written `\/`.
///
/// Without a number every run of the build matches. The JFrog CLI instead
/// resolves a missing number to the latest run through the builds API.
fn build_clauses(build: &str) -> Result<Vec<Value>> {
    let (name, number) = split_build(build);
    if name.is_empty() {
        return Err(ArtifactoryError::InvalidSpec("build name is empty".into()));
    }
    let mut clauses = vec![clause("artifact.module.build.name", "$eq", &name)];
    if let Some(number) = number {
        clauses.push(clause("artifact.module.build.number", "$eq", number));
    }
    Ok(clauses)
}

fn split_build(build: &str) -> (String, Option<&str>) {
    let bytes = build.as_bytes();
    let separator = (0..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b'/' && (i == 0 || bytes[i - 1] != b'\\'));
    match separator {
        Some(i) if i + 1 < build.len() => (build[..i].replace("\\/", "/"), Some(&build[i + 1..])),
        Some(i) => (build[..i].replace("\\/", "/"), None),
        None => (build.replace("\\/", "/"), None),
    }
}

fn clause(field: &str, op: &str, value: &str) -> Value {
    let mut inner = Map::new();
    inner.insert(op.to_string(), Value::String(value.to_string()));
    let mut outer = Map::new();
    outer.insert(field.to_string(), Value::Object(inner));
    Value::Object(outer)
}
