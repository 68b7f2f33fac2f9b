//! Plain-text and JSON rendering of fetched records.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gitlab::{Branch, Commit, MergeRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A source branch that ended up in a target through a merged merge request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedInto {
    pub branch: String,
    pub target: String,
    pub merged_at: Option<DateTime<Utc>>,
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}

pub fn merge_request_lines(mrs: &[MergeRequest]) -> Vec<String> {
    let mut lines = Vec::with_capacity(mrs.len() * 5);
    for mr in mrs {
        lines.push(format!("merged requests title = {}", mr.title));
        lines.push(format!("                status = {}", mr.state));
        lines.push(format!("                created at = {}", timestamp(mr.created_at)));
        lines.push(format!("                source branch = {}", mr.source_branch));
        lines.push(format!("                target branch = {}", mr.target_branch));
    }
    lines
}

pub fn branch_lines(branches: &[Branch]) -> Vec<String> {
    branches
        .iter()
        .map(|branch| format!("branch name = {}", branch.name))
        .collect()
}

pub fn commit_lines(commits: &[Commit]) -> Vec<String> {
    commits
        .iter()
        .map(|commit| {
            format!(
                "commit date = {}  title = {}",
                timestamp(commit.created_at),
                commit.title
            )
        })
        .collect()
}

/// Match every branch against the source branches of merged merge requests.
/// Output follows branch order, then merge request order.
pub fn merged_into(branches: &[Branch], merged: &[MergeRequest]) -> Vec<MergedInto> {
    branches
        .iter()
        .flat_map(|branch| {
            merged
                .iter()
                .filter(move |mr| mr.source_branch == branch.name)
                .map(move |mr| MergedInto {
                    branch: branch.name.clone(),
                    target: mr.target_branch.clone(),
                    merged_at: mr.updated_at,
                })
        })
        .collect()
}

pub fn merged_into_lines(entries: &[MergedInto]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let when = entry
                .merged_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "an unknown date".to_string());
            format!(
                "branch '{}' was merged into branch '{}' on {}",
                entry.branch, entry.target, when
            )
        })
        .collect()
}

pub fn to_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::MergeRequestState;
    use chrono::TimeZone;

    fn mr(source: &str, target: &str, day: u32) -> MergeRequest {
        MergeRequest {
            title: format!("Merge {}", source),
            state: MergeRequestState::Merged,
            source_branch: source.to_string(),
            target_branch: target.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2017, 5, day, 8, 0, 0).unwrap()),
            updated_at: Some(Utc.with_ymd_and_hms(2017, 5, day, 9, 30, 0).unwrap()),
            ..Default::default()
        }
    }

    fn branch(name: &str) -> Branch {
        Branch {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_request_lines() {
        let lines = merge_request_lines(&[mr("feature", "master", 2)]);
        assert_eq!(
            lines,
            vec![
                "merged requests title = Merge feature",
                "                status = merged",
                "                created at = 2017-05-02T08:00:00+00:00",
                "                source branch = feature",
                "                target branch = master",
            ]
        );
    }

    #[test]
    fn test_branch_and_commit_lines() {
        assert_eq!(
            branch_lines(&[branch("master"), branch("dev")]),
            vec!["branch name = master", "branch name = dev"]
        );

        let commits = vec![
            Commit {
                title: "Fix build".to_string(),
                created_at: Some(Utc.with_ymd_and_hms(2020, 1, 3, 10, 0, 0).unwrap()),
                ..Default::default()
            },
            Commit {
                title: "No date".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(
            commit_lines(&commits),
            vec![
                "commit date = 2020-01-03T10:00:00+00:00  title = Fix build",
                "commit date = -  title = No date",
            ]
        );
    }

    #[test]
    fn test_merged_into_follows_branch_order() {
        let branches = vec![branch("b"), branch("a"), branch("unmerged")];
        let merged = vec![mr("a", "master", 1), mr("b", "develop", 2), mr("a", "release", 3)];

        let entries = merged_into(&branches, &merged);
        let lines = merged_into_lines(&entries);
        assert_eq!(
            lines,
            vec![
                "branch 'b' was merged into branch 'develop' on 2017-05-02 09:30",
                "branch 'a' was merged into branch 'master' on 2017-05-01 09:30",
                "branch 'a' was merged into branch 'release' on 2017-05-03 09:30",
            ]
        );
    }

    #[test]
    fn test_merged_into_without_date() {
        let mut merge = mr("x", "master", 1);
        merge.updated_at = None;
        let lines = merged_into_lines(&merged_into(&[branch("x")], &[merge]));
        assert_eq!(lines, vec!["branch 'x' was merged into branch 'master' on an unknown date"]);
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&[branch("master")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "master");
        assert_eq!(value[0]["protected"], false);

        assert_eq!(to_json::<Branch>(&[]).unwrap(), "[]");
    }
}
