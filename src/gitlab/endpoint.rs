use std::fmt;

use url::Url;

use crate::errors::ApiError;

const API_PREFIX: &str = "api/v3/projects";

/// The `state` filter accepted by the merge request listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StateFilter {
    Opened,
    #[default]
    Merged,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Opened => "opened",
            StateFilter::Merged => "merged",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project-scoped list endpoint: the path below `projects/:id` plus its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    project: String,
    path: &'static str,
    query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn merge_requests(project: &str, state: StateFilter) -> Self {
        Self {
            project: project.to_string(),
            path: "merge_requests",
            query: vec![("state", state.as_str().to_string())],
        }
    }

    pub fn branches(project: &str) -> Self {
        Self {
            project: project.to_string(),
            path: "repository/branches",
            query: Vec::new(),
        }
    }

    pub fn commits(project: &str, ref_name: &str) -> Self {
        Self {
            project: project.to_string(),
            path: "repository/commits",
            query: vec![("ref_name", ref_name.to_string())],
        }
    }

    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        self.path
    }

    /// Resolve against `base_url`. The project is percent-encoded into a single
    /// path segment, query values are encoded independently of it.
    pub fn url(&self, base_url: &Url) -> Result<Url, ApiError> {
        let base = base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{}/{}/{}/{}",
            base,
            API_PREFIX,
            encode_project(&self.project),
            self.path
        ))
        .map_err(|e| ApiError::RequestBuild {
            message: format!("invalid request URL for {}: {}", self.path, e),
        })?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// GitLab addresses projects by their URL-encoded `namespace/name` path.
pub fn encode_project(project: &str) -> String {
    urlencoding::encode(project).into_owned()
}

/// Parse and check a base URL. Only http and https origins are accepted.
pub fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url.trim()).map_err(|e| ApiError::RequestBuild {
        message: format!("invalid base URL '{}': {}", base_url, e),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::RequestBuild {
                message: format!("unsupported URL scheme '{}' in '{}'", other, base_url),
            })
        }
    }

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ApiError::RequestBuild {
            message: format!("base URL '{}' has no host", base_url),
        });
    }

    // the API path is appended after the base path
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ApiError::RequestBuild {
            message: format!("base URL '{}' must not carry a query or fragment", base_url),
        });
    }

    Ok(url)
}
