#[tokio::main]
async fn main() {
    if let Err(err) = artifactory_client::cli::run_from_env().await {
        eprintln!("{}", err.message);
        std::process::exit(err.code);
    }
}
