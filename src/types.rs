use serde::{Deserialize, Serialize};

/// How a search specification should be answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecType {
    Wildcard,
    Simple,
    Build,
    Aql,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Fields shared by every file-spec driven operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonParams {
    /// `repo/path/name` pattern; `*` and `?` are wildcards.
    pub pattern: String,
    pub exclusions: Vec<String>,
    /// Body of an `items.find(...)` query.
    pub aql: Option<String>,
    /// `name` or `name/number`.
    pub build: Option<String>,
    /// `key=value;key=value` property filter.
    pub props: Option<String>,
    pub recursive: bool,
    pub include_dirs: bool,
    pub sort_by: Vec<String>,
    pub sort_order: Option<SortOrder>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Default for CommonParams {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            exclusions: Vec::new(),
            aql: None,
            build: None,
            props: None,
            recursive: true,
            include_dirs: false,
            sort_by: Vec::new(),
            sort_order: None,
            offset: None,
            limit: None,
        }
    }
}

impl CommonParams {
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_build(build: impl Into<String>) -> Self {
        Self {
            build: Some(build.into()),
            ..Default::default()
        }
    }

    pub fn with_aql(items_find: impl Into<String>) -> Self {
        Self {
            aql: Some(items_find.into()),
            ..Default::default()
        }
    }

    /// A build with no concrete pattern is a build search; an explicit query always
    /// wins otherwise; patterns without wildcards are simple lookups.
    pub fn spec_type(&self) -> SpecType {
        let open_pattern = self.pattern.is_empty() || self.pattern == "*";
        if self.build.is_some() && self.aql.is_none() && open_pattern {
            SpecType::Build
        } else if self.aql.is_some() {
            SpecType::Aql
        } else if open_pattern || self.pattern.contains(['*', '?']) {
            SpecType::Wildcard
        } else {
            SpecType::Simple
        }
    }
}

/// Which artifact fields a search backend must return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequiredArtifactProps {
    #[default]
    All,
    Symlink,
    None,
}

impl RequiredArtifactProps {
    pub fn include_fields(self) -> Vec<&'static str> {
        let mut fields = vec![
            "name",
            "repo",
            "path",
            "actual_md5",
            "actual_sha1",
            "size",
            "type",
        ];
        match self {
            RequiredArtifactProps::All => fields.extend(["created", "modified", "property"]),
            RequiredArtifactProps::Symlink => fields.push("property"),
            RequiredArtifactProps::None => {}
        }
        fields
    }
}

/// One artifact returned by a search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultItem {
    pub repo: String,
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub size: u64,
    pub created: String,
    pub modified: String,
    pub actual_md5: String,
    pub actual_sha1: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl ResultItem {
    /// `repo/path/name`, skipping the `.` path Artifactory uses for the repository root.
    pub fn full_path(&self) -> String {
        if self.path.is_empty() || self.path == "." {
            format!("{}/{}", self.repo, self.name)
        } else {
            format!("{}/{}/{}", self.repo, self.path, self.name)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    pub key: String,
    pub value: String,
}
