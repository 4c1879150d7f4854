use crate::route::{Encoding, PageToken, Params, Route, decode_json};
use crate::types::gitlab::{Commit, CommitComment, CommitStatus, Diff};
use crate::{Configuration, Error, ProjectId, Sha};
use http::{Method, StatusCode};
use std::{borrow::Cow, sync::Arc};

/// Which side of a diff a line comment refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    New,
    Old,
}

impl LineType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
        }
    }
}

impl std::fmt::Display for LineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit operations of a `GitLab`-style repository.
#[derive(Debug, Clone)]
pub enum CommitRoute {
    /// `GET project/<id>/repository/commits`
    ListCommits {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        ref_name: Option<String>,
        since: Option<String>,
        until: Option<String>,
        page: Option<PageToken>,
    },
    /// `GET project/<id>/repository/commits/<sha>`
    GetCommit {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        sha: Sha,
    },
    /// `GET project/<id>/repository/commits/<sha>/diff`
    GetDiff {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        sha: Sha,
    },
    /// `GET project/<id>/repository/commits/<sha>/comments`
    GetComments {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        sha: Sha,
        page: Option<PageToken>,
    },
    /// `GET project/<id>/repository/commits/<sha>/statuses`
    GetStatuses {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        sha: Sha,
        ref_name: Option<String>,
        stage: Option<String>,
        name: Option<String>,
        all: Option<bool>,
        page: Option<PageToken>,
    },
    /// `POST project/<id>/repository/commits/<sha>/comments`
    PostComment {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        sha: Sha,
        note: String,
        path: Option<String>,
        line: Option<u64>,
        line_type: Option<LineType>,
    },
}

/// Decoded body of a [`CommitRoute`], one variant per operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitPayload {
    Commits(Vec<Commit>),
    Commit(Box<Commit>),
    Diffs(Vec<Diff>),
    Comments(Vec<CommitComment>),
    Statuses(Vec<CommitStatus>),
    Comment(Box<CommitComment>),
}

impl CommitRoute {
    /// `list-commits` on the project's default branch.
    #[must_use]
    pub fn list(config: &Arc<Configuration>, id: impl Into<ProjectId>) -> Self {
        Self::ListCommits {
            config: Some(Arc::clone(config)),
            id: id.into(),
            ref_name: None,
            since: None,
            until: None,
            page: None,
        }
    }

    #[must_use]
    pub fn get(config: &Arc<Configuration>, id: impl Into<ProjectId>, sha: impl Into<Sha>) -> Self {
        Self::GetCommit {
            config: Some(Arc::clone(config)),
            id: id.into(),
            sha: sha.into(),
        }
    }

    /// Attach (or replace) the configuration carried by this route.
    #[must_use]
    pub fn attach(mut self, configuration: Arc<Configuration>) -> Self {
        match &mut self {
            Self::ListCommits { config, .. }
            | Self::GetCommit { config, .. }
            | Self::GetDiff { config, .. }
            | Self::GetComments { config, .. }
            | Self::GetStatuses { config, .. }
            | Self::PostComment { config, .. } => *config = Some(configuration),
        }
        self
    }
}

impl Route for CommitRoute {
    type Output = CommitPayload;

    fn configuration(&self) -> Option<&Arc<Configuration>> {
        match self {
            Self::ListCommits { config, .. }
            | Self::GetCommit { config, .. }
            | Self::GetDiff { config, .. }
            | Self::GetComments { config, .. }
            | Self::GetStatuses { config, .. }
            | Self::PostComment { config, .. } => config.as_ref(),
        }
    }

    fn method(&self) -> Method {
        match self {
            Self::ListCommits { .. }
            | Self::GetCommit { .. }
            | Self::GetDiff { .. }
            | Self::GetComments { .. }
            | Self::GetStatuses { .. } => Method::GET,
            Self::PostComment { .. } => Method::POST,
        }
    }

    fn encoding(&self) -> Encoding {
        match self {
            Self::ListCommits { .. }
            | Self::GetCommit { .. }
            | Self::GetDiff { .. }
            | Self::GetComments { .. }
            | Self::GetStatuses { .. } => Encoding::Query,
            Self::PostComment { .. } => Encoding::Form,
        }
    }

    fn segments(&self) -> Vec<Cow<'_, str>> {
        let (id, sha, tail) = match self {
            Self::ListCommits { id, .. } => (id, None, None),
            Self::GetCommit { id, sha, .. } => (id, Some(sha), None),
            Self::GetDiff { id, sha, .. } => (id, Some(sha), Some("diff")),
            Self::GetComments { id, sha, .. } | Self::PostComment { id, sha, .. } => {
                (id, Some(sha), Some("comments"))
            }
            Self::GetStatuses { id, sha, .. } => (id, Some(sha), Some("statuses")),
        };

        let mut segments = vec![
            Cow::Borrowed("project"),
            Cow::Borrowed(id.as_str()),
            Cow::Borrowed("repository"),
            Cow::Borrowed("commits"),
        ];
        segments.extend(sha.map(|sha| Cow::Borrowed(sha.as_str())));
        segments.extend(tail.map(Cow::Borrowed));
        segments
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::ListCommits {
                ref_name,
                since,
                until,
                ..
            } => {
                params
                    .push_opt("ref_name", ref_name.as_deref())
                    .push_opt("since", since.as_deref())
                    .push_opt("until", until.as_deref());
            }
            Self::GetCommit { .. } | Self::GetDiff { .. } | Self::GetComments { .. } => {}
            Self::GetStatuses {
                ref_name,
                stage,
                name,
                all,
                ..
            } => {
                params
                    .push_opt("ref", ref_name.as_deref())
                    .push_opt("stage", stage.as_deref())
                    .push_opt("name", name.as_deref());
                if let Some(all) = all {
                    params.push_bool("all", *all);
                }
            }
            Self::PostComment {
                note,
                path,
                line,
                line_type,
                ..
            } => {
                params
                    .push("note", note.as_str())
                    .push_opt("path", path.as_deref())
                    .push_opt("line", *line)
                    .push_opt("line_type", *line_type);
            }
        }
        params
    }

    fn page_token(&self) -> Option<&PageToken> {
        match self {
            Self::ListCommits { page, .. }
            | Self::GetComments { page, .. }
            | Self::GetStatuses { page, .. } => page.as_ref(),
            Self::GetCommit { .. } | Self::GetDiff { .. } | Self::PostComment { .. } => None,
        }
    }

    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<CommitPayload, Error> {
        Ok(match self {
            Self::ListCommits { .. } => CommitPayload::Commits(decode_json(status, body)?),
            Self::GetCommit { .. } => CommitPayload::Commit(Box::new(decode_json(status, body)?)),
            Self::GetDiff { .. } => CommitPayload::Diffs(decode_json(status, body)?),
            Self::GetComments { .. } => CommitPayload::Comments(decode_json(status, body)?),
            Self::GetStatuses { .. } => CommitPayload::Statuses(decode_json(status, body)?),
            Self::PostComment { .. } => {
                CommitPayload::Comment(Box::new(decode_json(status, body)?))
            }
        })
    }
}
