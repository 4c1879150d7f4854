use crate::route::{Encoding, PageToken, Params, Route, decode_json};
use crate::types::github::{Commit, CommitStatus};
use crate::{Configuration, Error, RepoSlug, Sha};
use http::{Method, StatusCode};
use std::{borrow::Cow, sync::Arc};

fn repo_segments(repo: &RepoSlug) -> Vec<Cow<'_, str>> {
    vec![
        Cow::Borrowed("repos"),
        Cow::Borrowed(repo.owner.as_str()),
        Cow::Borrowed(repo.name.as_str()),
    ]
}

/// Repository commit operations of a `GitHub`-style host.
#[derive(Debug, Clone)]
pub enum RepositoryRoute {
    /// `GET repos/<owner>/<repo>/commits`
    ListCommits {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        /// Branch name or SHA to start listing from.
        sha: Option<String>,
        since: Option<String>,
        until: Option<String>,
        per_page: Option<u32>,
        page: Option<PageToken>,
    },
    /// `GET repos/<owner>/<repo>/commits/<sha>`
    GetCommit {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        sha: Sha,
    },
    /// `GET repos/<owner>/<repo>/commits/<ref>/statuses`
    ListStatuses {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        git_ref: String,
        page: Option<PageToken>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryPayload {
    Commits(Vec<Commit>),
    Commit(Box<Commit>),
    Statuses(Vec<CommitStatus>),
}

impl RepositoryRoute {
    #[must_use]
    pub fn list_commits(config: &Arc<Configuration>, repo: impl Into<RepoSlug>) -> Self {
        Self::ListCommits {
            config: Some(Arc::clone(config)),
            repo: repo.into(),
            sha: None,
            since: None,
            until: None,
            per_page: None,
            page: None,
        }
    }
}

impl Route for RepositoryRoute {
    type Output = RepositoryPayload;

    fn configuration(&self) -> Option<&Arc<Configuration>> {
        match self {
            Self::ListCommits { config, .. }
            | Self::GetCommit { config, .. }
            | Self::ListStatuses { config, .. } => config.as_ref(),
        }
    }

    fn method(&self) -> Method {
        match self {
            Self::ListCommits { .. } | Self::GetCommit { .. } | Self::ListStatuses { .. } => {
                Method::GET
            }
        }
    }

    fn encoding(&self) -> Encoding {
        match self {
            Self::ListCommits { .. } | Self::GetCommit { .. } | Self::ListStatuses { .. } => {
                Encoding::Query
            }
        }
    }

    fn segments(&self) -> Vec<Cow<'_, str>> {
        match self {
            Self::ListCommits { repo, .. } => {
                let mut segments = repo_segments(repo);
                segments.push(Cow::Borrowed("commits"));
                segments
            }
            Self::GetCommit { repo, sha, .. } => {
                let mut segments = repo_segments(repo);
                segments.extend([Cow::Borrowed("commits"), Cow::Borrowed(sha.as_str())]);
                segments
            }
            Self::ListStatuses { repo, git_ref, .. } => {
                let mut segments = repo_segments(repo);
                segments.extend([
                    Cow::Borrowed("commits"),
                    Cow::Borrowed(git_ref.as_str()),
                    Cow::Borrowed("statuses"),
                ]);
                segments
            }
        }
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::ListCommits {
                sha,
                since,
                until,
                per_page,
                ..
            } => {
                params
                    .push_opt("sha", sha.as_deref())
                    .push_opt("since", since.as_deref())
                    .push_opt("until", until.as_deref())
                    .push_opt("per_page", *per_page);
            }
            Self::GetCommit { .. } | Self::ListStatuses { .. } => {}
        }
        params
    }

    fn page_token(&self) -> Option<&PageToken> {
        match self {
            Self::ListCommits { page, .. } | Self::ListStatuses { page, .. } => page.as_ref(),
            Self::GetCommit { .. } => None,
        }
    }

    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<RepositoryPayload, Error> {
        Ok(match self {
            Self::ListCommits { .. } => RepositoryPayload::Commits(decode_json(status, body)?),
            Self::GetCommit { .. } => RepositoryPayload::Commit(Box::new(decode_json(status, body)?)),
            Self::ListStatuses { .. } => RepositoryPayload::Statuses(decode_json(status, body)?),
        })
    }
}
