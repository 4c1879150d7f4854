use crate::route::{Encoding, PageToken, Params, Route, decode_json};
use crate::types::github::{Issue, IssueComment};
use crate::{Configuration, Error, RepoSlug};
use http::{Method, StatusCode};
use serde_json::{Map, Value};
use std::{borrow::Cow, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
    All,
}

impl IssueState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Issue operations of a `GitHub`-style host.
#[derive(Debug, Clone)]
pub enum IssueRoute {
    /// `GET repos/<owner>/<repo>/issues`
    ListIssues {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        state: Option<IssueState>,
        /// Sent comma-separated; omitted when empty.
        labels: Vec<String>,
        page: Option<PageToken>,
    },
    /// `POST repos/<owner>/<repo>/issues`
    CreateIssue {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        title: String,
        body: Option<String>,
        labels: Vec<String>,
    },
    /// `POST repos/<owner>/<repo>/issues/<number>/comments`
    CreateComment {
        config: Option<Arc<Configuration>>,
        repo: RepoSlug,
        number: u64,
        body: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuePayload {
    Issues(Vec<Issue>),
    Issue(Box<Issue>),
    Comment(Box<IssueComment>),
}

impl Route for IssueRoute {
    type Output = IssuePayload;

    fn configuration(&self) -> Option<&Arc<Configuration>> {
        match self {
            Self::ListIssues { config, .. }
            | Self::CreateIssue { config, .. }
            | Self::CreateComment { config, .. } => config.as_ref(),
        }
    }

    fn method(&self) -> Method {
        match self {
            Self::ListIssues { .. } => Method::GET,
            Self::CreateIssue { .. } | Self::CreateComment { .. } => Method::POST,
        }
    }

    fn encoding(&self) -> Encoding {
        match self {
            Self::ListIssues { .. } => Encoding::Query,
            Self::CreateIssue { .. } | Self::CreateComment { .. } => Encoding::Json,
        }
    }

    fn segments(&self) -> Vec<Cow<'_, str>> {
        let (repo, number) = match self {
            Self::ListIssues { repo, .. } | Self::CreateIssue { repo, .. } => (repo, None),
            Self::CreateComment { repo, number, .. } => (repo, Some(*number)),
        };
        let mut segments = vec![
            Cow::Borrowed("repos"),
            Cow::Borrowed(repo.owner.as_str()),
            Cow::Borrowed(repo.name.as_str()),
            Cow::Borrowed("issues"),
        ];
        if let Some(number) = number {
            segments.extend([Cow::Owned(number.to_string()), Cow::Borrowed("comments")]);
        }
        segments
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::ListIssues { state, labels, .. } => {
                params.push_opt("state", state.map(IssueState::as_str));
                if !labels.is_empty() {
                    params.push("labels", labels.join(","));
                }
            }
            Self::CreateIssue { title, body, .. } => {
                params
                    .push("title", title.as_str())
                    .push_opt("body", body.as_deref());
            }
            Self::CreateComment { body, .. } => {
                params.push("body", body.as_str());
            }
        }
        params
    }

    fn json_body(&self) -> Option<Value> {
        match self {
            Self::ListIssues { .. } => None,
            Self::CreateIssue {
                title,
                body,
                labels,
                ..
            } => {
                let mut object = Map::new();
                object.insert("title".into(), Value::String(title.clone()));
                if let Some(body) = body {
                    object.insert("body".into(), Value::String(body.clone()));
                }
                if !labels.is_empty() {
                    object.insert(
                        "labels".into(),
                        Value::Array(labels.iter().cloned().map(Value::String).collect()),
                    );
                }
                Some(Value::Object(object))
            }
            Self::CreateComment { .. } => Some(self.params().into_json()),
        }
    }

    fn page_token(&self) -> Option<&PageToken> {
        match self {
            Self::ListIssues { page, .. } => page.as_ref(),
            Self::CreateIssue { .. } | Self::CreateComment { .. } => None,
        }
    }

    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<IssuePayload, Error> {
        Ok(match self {
            Self::ListIssues { .. } => IssuePayload::Issues(decode_json(status, body)?),
            Self::CreateIssue { .. } => IssuePayload::Issue(Box::new(decode_json(status, body)?)),
            Self::CreateComment { .. } => {
                IssuePayload::Comment(Box::new(decode_json(status, body)?))
            }
        })
    }
}
