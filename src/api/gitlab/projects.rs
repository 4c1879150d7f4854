use crate::route::{Encoding, Params, Part, Route, decode_json};
use crate::types::gitlab::{Project, Upload};
use crate::{Configuration, Error, ProjectId};
use http::{Method, StatusCode};
use std::{borrow::Cow, sync::Arc};

/// Project-level operations of a `GitLab`-style host.
#[derive(Debug, Clone)]
pub enum ProjectRoute {
    /// `GET project/<id>`
    GetProject {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
    },
    /// `POST project/<id>/uploads` (multipart, field `file`)
    UploadFile {
        config: Option<Arc<Configuration>>,
        id: ProjectId,
        file_name: String,
        content: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectPayload {
    Project(Box<Project>),
    Upload(Upload),
}

impl Route for ProjectRoute {
    type Output = ProjectPayload;

    fn configuration(&self) -> Option<&Arc<Configuration>> {
        match self {
            Self::GetProject { config, .. } | Self::UploadFile { config, .. } => config.as_ref(),
        }
    }

    fn method(&self) -> Method {
        match self {
            Self::GetProject { .. } => Method::GET,
            Self::UploadFile { .. } => Method::POST,
        }
    }

    fn encoding(&self) -> Encoding {
        match self {
            Self::GetProject { .. } => Encoding::Query,
            Self::UploadFile { .. } => Encoding::Multipart,
        }
    }

    fn segments(&self) -> Vec<Cow<'_, str>> {
        match self {
            Self::GetProject { id, .. } => vec![Cow::Borrowed("project"), Cow::Borrowed(id.as_str())],
            Self::UploadFile { id, .. } => vec![
                Cow::Borrowed("project"),
                Cow::Borrowed(id.as_str()),
                Cow::Borrowed("uploads"),
            ],
        }
    }

    fn params(&self) -> Params {
        match self {
            Self::GetProject { .. } | Self::UploadFile { .. } => Params::new(),
        }
    }

    fn parts(&self) -> Vec<Part> {
        match self {
            Self::GetProject { .. } => Vec::new(),
            Self::UploadFile {
                file_name, content, ..
            } => vec![Part {
                name: "file",
                file_name: file_name.clone(),
                mime: None,
                bytes: content.clone(),
            }],
        }
    }

    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<ProjectPayload, Error> {
        Ok(match self {
            Self::GetProject { .. } => ProjectPayload::Project(Box::new(decode_json(status, body)?)),
            Self::UploadFile { .. } => ProjectPayload::Upload(decode_json(status, body)?),
        })
    }
}
