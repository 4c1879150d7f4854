//! List the latest commits of a GitLab project.
//!
//! ```bash
//! cargo run --example list_commits
//! ```
//!
//! Env vars:
//! - `GITLAB_URL` (defaults to `https://gitlab.com/api/v4`)
//! - `GITLAB_PROJECT` (id or `group/name` path)
//! - `GITLAB_TOKEN` (optional)

use githost_sdk::{
    Configuration, Provider, Session,
    api::gitlab::{CommitPayload, CommitRoute},
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = env_or("GITLAB_URL", "https://gitlab.com/api/v4");
    let project = env_or("GITLAB_PROJECT", "gitlab-org/gitlab");

    let mut builder = Configuration::builder(Provider::GitLab, &base_url)?.api_version("v4");
    if let Some(token) = env_opt("GITLAB_TOKEN") {
        builder = builder.token(token);
    }
    let config = builder.build();

    let session = Session::builder()
        .no_system_proxy()
        .timeout(Duration::from_secs(30))
        .build()?;

    let response = session
        .execute(&CommitRoute::list(&config, project.as_str()))
        .await?;
    if let CommitPayload::Commits(commits) = response.data {
        for commit in commits {
            println!("{} {}", commit.short_id, commit.title);
        }
    }
    if let Some(page) = response.next_page {
        println!("more available: {page}");
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
