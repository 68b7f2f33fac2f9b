use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::DigestError;
use crate::utils::{get_secret_input, get_user_input, print_info};

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "gitlab-digest";

pub const ENV_TOKEN: &str = "GITLAB_TOKEN";
pub const ENV_URL: &str = "GITLAB_URL";
pub const ENV_PROJECT: &str = "GITLAB_PROJECT";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DigestConfig {
    pub gitlab: GitLabConfig,
    pub project: ProjectConfig,
    pub request: RequestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GitLabConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Full project path, e.g. `group/name`.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub project: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully merged and checked settings handed to the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub token: String,
    pub base_url: String,
    pub project: String,
    pub timeout: Option<Duration>,
}

impl DigestConfig {
    /// Overlay `GITLAB_TOKEN`, `GITLAB_URL` and `GITLAB_PROJECT` as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = var(ENV_TOKEN) {
            self.gitlab.token = token;
        }
        if let Some(url) = var(ENV_URL) {
            self.gitlab.url = url;
        }
        if let Some(project) = var(ENV_PROJECT) {
            self.project.name = project;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.url {
            self.gitlab.url = url.clone();
        }
        if let Some(project) = &overrides.project {
            self.project.name = project.clone();
        }
        if overrides.timeout_secs.is_some() {
            self.request.timeout_secs = overrides.timeout_secs;
        }
    }

    pub fn validate(&self) -> Result<Settings, DigestError> {
        let required = [
            ("gitlab.token", &self.gitlab.token, ENV_TOKEN),
            ("gitlab.url", &self.gitlab.url, ENV_URL),
            ("project.name", &self.project.name, ENV_PROJECT),
        ];
        for (key, value, env) in required {
            if value.trim().is_empty() {
                return Err(DigestError::ConfigError {
                    message: format!(
                        "'{}' is missing (set it in {} or via {})",
                        key, CONFIG_FILE, env
                    ),
                });
            }
        }

        let timeout = match self.request.timeout_secs {
            Some(0) => {
                return Err(DigestError::ConfigError {
                    message: "'request.timeout_secs' must be greater than zero".to_string(),
                })
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Settings {
            token: self.gitlab.token.trim().to_string(),
            base_url: self.gitlab.url.trim().to_string(),
            project: self.project.name.trim().to_string(),
            timeout,
        })
    }

    /// The token with everything but its last four characters hidden.
    pub fn masked_token(&self) -> String {
        let token = self.gitlab.token.trim();
        if token.is_empty() {
            return "<not set>".to_string();
        }
        let chars: Vec<char> = token.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", visible)
    }
}

pub struct ConfigManager {
    config_path: Option<PathBuf>,
    config: DigestConfig,
}

impl ConfigManager {
    /// Load the first config file found. An explicit path must exist; the
    /// implicit locations may all be missing, leaving an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DigestError::ConfigError {
                    message: format!("config file {:?} not found", path),
                }
                .into());
            }
            let config = Self::load_config(path)?;
            return Ok(Self {
                config_path: Some(path.to_path_buf()),
                config,
            });
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                debug!("Loading config from {:?}", candidate);
                let config = Self::load_config(&candidate)?;
                return Ok(Self {
                    config_path: Some(candidate),
                    config,
                });
            }
        }

        debug!("No config file found, relying on environment and flags");
        Ok(Self::empty())
    }

    /// A manager with no backing file yet, e.g. before `config init`.
    pub fn empty() -> Self {
        Self {
            config_path: None,
            config: DigestConfig::default(),
        }
    }

    pub fn get_config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// `<config dir>/gitlab-digest/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(user_path) = Self::user_config_path() {
            paths.push(user_path);
        }
        paths
    }

    /// Prompt for every setting and write the result to `target`, or to the
    /// loaded file, or to the per-user location.
    pub fn configure_interactive(&mut self, target: Option<&Path>) -> Result<PathBuf> {
        print_info("Let's configure gitlab-digest for your project");

        let path = match target.map(Path::to_path_buf).or_else(|| self.config_path.clone()) {
            Some(path) => path,
            None => Self::user_config_path().ok_or_else(|| DigestError::IoError {
                message: "Could not determine config directory".to_string(),
            })?,
        };

        let current = self.config.clone();
        let url = get_user_input("GitLab URL", non_empty(&current.gitlab.url))?;
        let project =
            get_user_input("Project (namespace/name)", non_empty(&current.project.name))?;
        let token = get_secret_input("Private token (leave empty to keep the current one)")?;

        self.config.gitlab.url = url.trim().to_string();
        self.config.project.name = project.trim().to_string();
        if !token.trim().is_empty() {
            self.config.gitlab.token = token.trim().to_string();
        }

        Self::save_config(&path, &self.config)?;
        self.config_path = Some(path.clone());
        print_info(&format!("Configuration written to {:?}", path));
        Ok(path)
    }

    pub fn load_config(path: &Path) -> Result<DigestConfig> {
        let content = fs::read_to_string(path).map_err(|e| DigestError::IoError {
            message: format!("Failed to read {:?}: {}", path, e),
        })?;
        let config: DigestConfig =
            toml::from_str(&content).map_err(|e| DigestError::SerializationError {
                message: format!("Failed to parse config {:?}: {}", path, e),
            })?;
        Ok(config)
    }

    pub fn save_config(path: &Path, config: &DigestConfig) -> Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                info!("Created config directory: {:?}", dir);
            }
        }

        let content =
            toml::to_string_pretty(config).map_err(|e| DigestError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
