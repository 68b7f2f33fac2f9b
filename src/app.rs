use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    cli::{Cli, Commands, ConfigCommands},
    config::{ConfigManager, DigestConfig, Overrides},
    gitlab::{GitLabApi, GitLabClient, StateFilter},
    report::{self, OutputFormat},
    utils,
};

/// Lines produced by one command, plus what they list for the empty case.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub subject: &'static str,
    pub lines: Vec<String>,
}

impl Report {
    fn new(subject: &'static str, lines: Vec<String>) -> Self {
        Self { subject, lines }
    }
}

/// The main application context.
///
/// Resolves configuration, builds the API client and dispatches commands.
/// Printing and exit status stay here; the API core only returns data or errors.
pub struct AppContext {
    config_path: Option<PathBuf>,
    overrides: Overrides,
    format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            overrides: cli.overrides(),
            format: cli.format,
        }
    }

    /// Run the application with the given command.
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Config(config_cmd) => self.handle_config_commands(&config_cmd),
            command => {
                let (_, config) = self.load_config()?;
                let settings = config.validate()?;

                let mut client = GitLabClient::new(&settings.base_url, &settings.token)
                    .context("invalid GitLab configuration")?
                    .with_cancellation(cancel_on_ctrl_c());
                if let Some(timeout) = settings.timeout {
                    client = client.with_timeout(timeout);
                }

                let report = dispatch(&client, &settings.project, &command, self.format).await?;
                print_report(&report, self.format);
                Ok(())
            }
        }
    }

    fn load_config(&self) -> Result<(ConfigManager, DigestConfig)> {
        let manager = ConfigManager::load(self.config_path.as_deref())?;
        let mut config = manager.get_config().clone();
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(&self.overrides);
        Ok((manager, config))
    }

    /// Handle configuration-related commands.
    fn handle_config_commands(&self, cmd: &ConfigCommands) -> Result<()> {
        match cmd {
            ConfigCommands::Show => {
                let (manager, config) = self.load_config()?;
                utils::print_header("gitlab-digest configuration");
                match manager.config_path() {
                    Some(path) => println!("Config file: {}", path.display()),
                    None => {
                        utils::print_warning("No config file found, using environment and flags")
                    }
                }
                println!("GitLab URL: {}", display_or_unset(&config.gitlab.url));
                println!("Project: {}", display_or_unset(&config.project.name));
                println!("Token: {}", config.masked_token());
                match config.request.timeout_secs {
                    Some(secs) => println!("Timeout: {}s", secs),
                    None => println!("Timeout: none"),
                }
            }
            ConfigCommands::Init => {
                let mut manager = match self.config_path.as_deref() {
                    Some(path) if !path.exists() => ConfigManager::empty(),
                    explicit => ConfigManager::load(explicit)?,
                };
                let path = manager.configure_interactive(self.config_path.as_deref())?;
                utils::print_success(&format!("Saved configuration to {}", path.display()));
            }
        }
        Ok(())
    }
}

/// Run one data command against `api` and render its output.
pub async fn dispatch(
    api: &dyn GitLabApi,
    project: &str,
    command: &Commands,
    format: OutputFormat,
) -> Result<Report> {
    debug!("Dispatching {:?} for project {}", command, project);

    let json = format == OutputFormat::Json;
    let report = match command {
        Commands::MergeRequests { state } => {
            let mrs = api
                .merge_requests(project, *state)
                .await
                .with_context(|| format!("can't get the {} merge requests", state))?;
            let lines = if json {
                vec![report::to_json(&mrs)?]
            } else {
                report::merge_request_lines(&mrs)
            };
            Report::new("merge requests", lines)
        }
        Commands::Branches => {
            let branches = api
                .branches(project)
                .await
                .context("can't get the branches")?;
            let lines = if json {
                vec![report::to_json(&branches)?]
            } else {
                report::branch_lines(&branches)
            };
            Report::new("branches", lines)
        }
        Commands::Commits { ref_name } => {
            let commits = api
                .commits(project, ref_name)
                .await
                .with_context(|| format!("can't get the commits of '{}'", ref_name))?;
            let lines = if json {
                vec![report::to_json(&commits)?]
            } else {
                report::commit_lines(&commits)
            };
            Report::new("commits", lines)
        }
        Commands::MergedInto => {
            let (merged, branches) = futures::future::try_join(
                async {
                    api.merge_requests(project, StateFilter::Merged)
                        .await
                        .context("can't get the merged requests")
                },
                async {
                    api.branches(project)
                        .await
                        .context("can't get the branches")
                },
            )
            .await?;

            let entries = report::merged_into(&branches, &merged);
            let lines = if json {
                vec![report::to_json(&entries)?]
            } else {
                report::merged_into_lines(&entries)
            };
            Report::new("merged branches", lines)
        }
        Commands::Config(_) => anyhow::bail!("config commands do not query GitLab"),
    };

    Ok(report)
}

fn print_report(report: &Report, format: OutputFormat) {
    if report.lines.is_empty() && format == OutputFormat::Text {
        utils::print_info(&format!("No {} found", report.subject));
        return;
    }
    for line in &report.lines {
        println!("{}", line);
    }
}

/// Flip the returned flag when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!("Unable to listen for Ctrl-C: {}", e);
                // the sender lives as long as this task, so nothing is cancelled
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}

fn display_or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "<not set>"
    } else {
        value
    }
}
