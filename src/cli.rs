use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::gitlab::StateFilter;
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "gitlab-digest",
    version,
    about = "Print merge request, branch and commit summaries for a GitLab project"
)]
pub struct Cli {
    /// Config file (defaults to ./config.toml, then the per-user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GitLab base URL, overrides gitlab.url
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Project path such as group/name, overrides project.name
    #[arg(short, long, global = true)]
    pub project: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            project: self.project.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// List merge requests of the project
    #[command(alias = "merged-requests")]
    MergeRequests {
        /// Merge request state to list
        #[arg(short, long, value_enum, default_value_t = StateFilter::Merged)]
        state: StateFilter,
    },

    /// List the branches of the project
    #[command(alias = "all-branches")]
    Branches,

    /// List the commits of a branch or tag
    Commits {
        /// Branch or tag name
        #[arg(value_name = "REF")]
        ref_name: String,
    },

    /// Show which branches were merged into which target
    MergedInto,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a config file interactively
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_requests_defaults_to_merged() {
        let cli = Cli::parse_from(["gitlab-digest", "merge-requests"]);
        assert_eq!(
            cli.command,
            Commands::MergeRequests {
                state: StateFilter::Merged
            }
        );
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_aliases_and_state() {
        let cli = Cli::parse_from(["gitlab-digest", "merged-requests", "--state", "all"]);
        assert_eq!(cli.command, Commands::MergeRequests { state: StateFilter::All });

        let cli = Cli::parse_from(["gitlab-digest", "all-branches"]);
        assert_eq!(cli.command, Commands::Branches);
    }

    #[test]
    fn test_commits_requires_ref() {
        assert!(Cli::try_parse_from(["gitlab-digest", "commits"]).is_err());

        let cli = Cli::parse_from(["gitlab-digest", "commits", "feature/x", "--format", "json"]);
        assert_eq!(
            cli.command,
            Commands::Commits {
                ref_name: "feature/x".to_string()
            }
        );
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "gitlab-digest",
            "branches",
            "--url",
            "https://gitlab.example.com",
            "-p",
            "group/name",
            "--timeout",
            "10",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.url.as_deref(), Some("https://gitlab.example.com"));
        assert_eq!(overrides.project.as_deref(), Some("group/name"));
        assert_eq!(overrides.timeout_secs, Some(10));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
