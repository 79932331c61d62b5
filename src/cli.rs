use crate::config::{
    ACCESS_TOKEN_ENV, API_KEY_ENV, ArtifactoryDetails, PASSWORD_ENV, URL_ENV, USER_ENV,
};
use crate::error::ArtifactoryError;
use crate::http::ReqwestTransport;
use crate::ping::PingService;
use crate::promote::{PromoteService, PromotionParams};
use crate::search::{SearchParams, SearchService};
use crate::types::{CommonParams, ResultItem};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rt-client")]
#[command(about = "Ping, promote builds and search artifacts on an Artifactory server")]
pub struct Cli {
    /// Artifactory base URL, e.g. https://example.jfrog.io/artifactory
    #[arg(long, env = URL_ENV, global = true)]
    pub url: Option<String>,
    #[arg(long, env = USER_ENV, global = true)]
    pub user: Option<String>,
    #[arg(long, env = PASSWORD_ENV, global = true, hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long, env = ACCESS_TOKEN_ENV, global = true, hide_env_values = true)]
    pub access_token: Option<String>,
    #[arg(long, env = API_KEY_ENV, global = true, hide_env_values = true)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// Skip TLS certificate validation where the operation allows it
    #[arg(long, global = true)]
    pub insecure_tls: bool,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the server is alive
    Ping,
    /// Promote a build to a target repository
    Promote(PromoteArgs),
    /// Search artifacts by pattern, build or AQL
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct PromoteArgs {
    pub build_name: String,
    pub build_number: String,
    pub target_repo: String,
    #[arg(long)]
    pub source_repo: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
    /// Copy artifacts instead of moving them
    #[arg(long)]
    pub copy: bool,
    #[arg(long)]
    pub include_dependencies: bool,
    /// Ask the server to validate the promotion without applying it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// `repo/path/name` pattern, wildcards allowed
    #[arg(conflicts_with = "aql")]
    pub pattern: Option<String>,
    /// `name` or `name/number`
    #[arg(long)]
    pub build: Option<String>,
    /// Body of an items.find(...) query
    #[arg(long)]
    pub aql: Option<String>,
    #[arg(long = "exclusion")]
    pub exclusions: Vec<String>,
    /// `key=value;key=value`
    #[arg(long)]
    pub props: Option<String>,
    #[arg(long)]
    pub no_recursive: bool,
    #[arg(long)]
    pub include_dirs: bool,
    #[arg(long)]
    pub limit: Option<u64>,
}

impl SearchArgs {
    fn into_params(self) -> CommonParams {
        CommonParams {
            pattern: self.pattern.unwrap_or_default(),
            exclusions: self.exclusions,
            aql: self.aql,
            build: self.build,
            props: self.props,
            recursive: !self.no_recursive,
            include_dirs: self.include_dirs,
            limit: self.limit,
            ..CommonParams::default()
        }
    }
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    full_path: String,
    #[serde(flatten)]
    item: &'a ResultItem,
}

pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    fn from_artifactory(err: ArtifactoryError) -> Self {
        let mut message = err.to_string();
        if let Some(body) = err.response_body().filter(|b| !b.is_empty()) {
            message.push('\n');
            message.push_str(&String::from_utf8_lossy(body));
        }
        Self {
            code: err.exit_code(),
            message,
        }
    }
}

pub async fn run_from_env() -> Result<(), CliError> {
    let cli = Cli::parse();
    run(cli).await
}

pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(cli.verbose);
    let details = details_from_cli(&cli).map_err(CliError::from_artifactory)?;
    let transport = ReqwestTransport::new(&details).map_err(CliError::from_artifactory)?;

    match cli.command {
        Commands::Ping => {
            let body = PingService::new(transport, details)
                .ping()
                .await
                .map_err(CliError::from_artifactory)?;
            println!("{}", String::from_utf8_lossy(&body));
        }
        Commands::Promote(args) => {
            let mut params = PromotionParams::new(args.build_name, args.build_number)
                .with_target_repo(args.target_repo)
                .with_copy(args.copy)
                .with_include_dependencies(args.include_dependencies);
            params.source_repo = args.source_repo.unwrap_or_default();
            params.status = args.status.unwrap_or_default();
            params.comment = args.comment.unwrap_or_default();
            PromoteService::new(transport, details)
                .with_dry_run(args.dry_run)
                .build_promote(params)
                .await
                .map_err(CliError::from_artifactory)?;
        }
        Commands::Search(args) => {
            let params = SearchParams::new(args.into_params());
            let items = SearchService::new(transport, details)
                .search(params)
                .await
                .map_err(CliError::from_artifactory)?;
            let out: Vec<_> = items
                .iter()
                .map(|item| SearchOutput {
                    full_path: item.full_path(),
                    item,
                })
                .collect();
            let rendered = serde_json::to_string_pretty(&out).map_err(|e| CliError {
                code: 10,
                message: e.to_string(),
            })?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn details_from_cli(cli: &Cli) -> Result<ArtifactoryDetails, ArtifactoryError> {
    let url = cli
        .url
        .clone()
        .ok_or_else(|| ArtifactoryError::InvalidUrl(format!("--url or {URL_ENV} is required")))?;
    let mut details = ArtifactoryDetails::new(url)?.with_insecure_tls(cli.insecure_tls);
    details.user = cli.user.clone();
    details.password = cli.password.clone();
    details.access_token = cli.access_token.clone();
    details.api_key = cli.api_key.clone();
    if let Some(secs) = cli.timeout {
        details = details.with_timeout(Duration::from_secs(secs));
    }
    Ok(details)
}
