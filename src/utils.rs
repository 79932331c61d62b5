use crate::error::{ArtifactoryError, Result};
use reqwest::Url;
use std::collections::BTreeMap;

/// Joins `base` and `path` and appends `params` as the query string.
/// No query string is emitted when `params` is empty.
pub fn build_artifactory_url(
    base: &str,
    path: &str,
    params: &BTreeMap<String, String>,
) -> Result<Url> {
    let path = path.trim_start_matches('/');
    let joined = if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };
    let mut url =
        Url::parse(&joined).map_err(|e| ArtifactoryError::InvalidUrl(format!("{joined}: {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Pretty-prints a JSON body; bodies that are not JSON are returned as lossy UTF-8.
pub fn indent_json(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned()),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}
