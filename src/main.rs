use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitlab_digest::app::AppContext;
use gitlab_digest::cli::Cli;
use gitlab_digest::utils::print_error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = AppContext::new(&cli);

    if let Err(e) = app.run(cli.command).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
