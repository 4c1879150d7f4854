//! Identifier newtypes shared by route families.

use serde::{Deserialize, Serialize};

/// A project id or URL-path (`group/project`); the SDK percent-encodes it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ProjectId {
    fn from(value: u64) -> Self {
        Self::new(value.to_string())
    }
}

/// A commit SHA (full or abbreviated) or any ref a provider resolves to a commit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Sha {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Sha {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// `owner/name` coordinates of a `GitHub`-style repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl<O: Into<String>, N: Into<String>> From<(O, N)> for RepoSlug {
    fn from((owner, name): (O, N)) -> Self {
        Self::new(owner, name)
    }
}
