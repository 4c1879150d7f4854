//! Per-account connection settings.

use crate::{Credential, Error, util::url::normalize_base_url};
use std::sync::Arc;
use url::Url;

/// REST dialect spoken by the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Provider {
    GitLab,
    GitHub,
}

/// Immutable connection settings for one connected account.
///
/// Build once, wrap in an [`Arc`], and attach to as many routes as needed.
#[derive(Debug, Clone)]
pub struct Configuration {
    base_url: Url,
    provider: Provider,
    credential: Option<Credential>,
    api_version: Option<String>,
}

impl Configuration {
    pub fn builder(provider: Provider, base: impl AsRef<str>) -> Result<ConfigurationBuilder, Error> {
        ConfigurationBuilder::try_new(provider, base)
    }

    /// `https://gitlab.com/api/v4/` with the given token.
    pub fn gitlab(token: impl Into<String>) -> Result<Arc<Self>, Error> {
        Ok(Self::builder(Provider::GitLab, "https://gitlab.com/api/v4")?
            .credential(Credential::token(token))
            .api_version("v4")
            .build())
    }

    /// `https://api.github.com/` with the given token.
    pub fn github(token: impl Into<String>) -> Result<Arc<Self>, Error> {
        Ok(Self::builder(Provider::GitHub, "https://api.github.com")?
            .credential(Credential::token(token))
            .build())
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }
}

/// Configures and constructs [`Configuration`].
pub struct ConfigurationBuilder {
    base_url: Url,
    provider: Provider,
    credential: Option<Credential>,
    api_version: Option<String>,
}

impl ConfigurationBuilder {
    fn try_new(provider: Provider, base: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: normalize_base_url(base.as_ref())?,
            provider,
            credential: None,
            api_version: None,
        })
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn token(self, token: impl Into<String>) -> Self {
        self.credential(Credential::token(token))
    }

    pub fn basic(self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credential(Credential::basic(user, password))
    }

    pub fn oauth(self, access_token: impl Into<String>) -> Self {
        self.credential(Credential::oauth(access_token))
    }

    /// API version tag, e.g. `v4` or `2022-11-28`.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Configuration> {
        Arc::new(Configuration {
            base_url: self.base_url,
            provider: self.provider,
            credential: self.credential,
            api_version: self.api_version,
        })
    }
}
