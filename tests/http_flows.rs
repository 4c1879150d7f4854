use std::{sync::Arc, time::Duration};

use anyhow::Result;
use githost_sdk::{
    Configuration, Credential, Error, ErrorKind, Provider, Session,
    api::github::{IssuePayload, IssueRoute, IssueState},
    api::gitlab::{CommitPayload, CommitRoute, LineType},
};
use http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string, header, method, path, query_param, query_param_is_missing},
};

fn gitlab_config(server: &MockServer) -> Result<Arc<Configuration>> {
    Ok(
        Configuration::builder(Provider::GitLab, format!("{}/api/v4", server.uri()))?
            .token("glpat-secret")
            .build(),
    )
}

fn github_config(server: &MockServer) -> Result<Arc<Configuration>> {
    Ok(Configuration::builder(Provider::GitHub, server.uri())?
        .oauth("gho-secret")
        .api_version("2022-11-28")
        .build())
}

fn session() -> Result<Session> {
    Ok(Session::builder()
        .no_system_proxy()
        .timeout(Duration::from_secs(5))
        .build()?)
}

fn commit_json(sha: &str) -> serde_json::Value {
    json!({
        "id": sha,
        "short_id": &sha[..8],
        "title": "Sanitize for network graph",
        "message": "Sanitize for network graph\n",
        "author_name": "randx",
        "author_email": "user@example.com",
        "authored_date": "2021-09-20T09:06:12.201+00:00",
        "committer_name": "Dmitriy",
        "committer_email": "user@example.com",
        "committed_date": "2021-09-20T09:06:12.201+00:00",
        "created_at": "2021-09-20T09:06:12.201+00:00",
        "parent_ids": [],
        "web_url": "https://gitlab.example.com/g/p/-/commit/x"
    })
}

fn github_user() -> serde_json::Value {
    json!({
        "login": "octocat",
        "id": 1,
        "avatar_url": "https://github.com/images/error/octocat_happy.gif",
        "html_url": "https://github.com/octocat"
    })
}

fn issue_json(number: u64, title: &str) -> serde_json::Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": title,
        "body": null,
        "state": "open",
        "user": github_user(),
        "labels": [{"id": 7, "name": "bug", "color": "f29513"}],
        "comments": 0,
        "html_url": format!("https://github.com/octo/hello/issues/{number}"),
        "created_at": "2011-04-22T13:33:48Z"
    })
}

#[tokio::test]
async fn list_commits_sends_filters_and_private_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/42/repository/commits"))
        .and(query_param("ref_name", "main"))
        .and(query_param("since", "2020-01-01"))
        .and(query_param("until", "2020-12-31"))
        .and(header("private-token", "glpat-secret"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .insert_header("x-request-id", "01HXYZ")
                .set_body_json(json!([commit_json("6104942438c14ec7bd21")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let route = CommitRoute::ListCommits {
        config: Some(gitlab_config(&server)?),
        id: "42".into(),
        ref_name: Some("main".into()),
        since: Some("2020-01-01".into()),
        until: Some("2020-12-31".into()),
        page: None,
    };
    let resp = session()?.execute(&route).await?;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.request_id.as_deref(), Some("01HXYZ"));
    assert_eq!(resp.next_page.as_ref().and_then(|t| t.get("page")), Some("2"));
    match resp.data {
        CommitPayload::Commits(commits) => {
            assert_eq!(commits.len(), 1);
            assert_eq!(commits[0].short_id, "61049424");
            assert!(commits[0].stats.is_none());
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn statuses_query_uses_ref_key_and_boolean_text() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/7/repository/commits/abc/statuses"))
        .and(query_param("ref", "main"))
        .and(query_param("stage", "test"))
        .and(query_param("name", "ci"))
        .and(query_param("all", "true"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let route = CommitRoute::GetStatuses {
        config: Some(gitlab_config(&server)?),
        id: "7".into(),
        sha: "abc".into(),
        ref_name: Some("main".into()),
        stage: Some("test".into()),
        name: Some("ci".into()),
        all: Some(true),
        page: None,
    };
    let resp = session()?.execute(&route).await?;
    assert_eq!(resp.data, CommitPayload::Statuses(Vec::new()));
    assert!(resp.next_page.is_none());
    Ok(())
}

#[tokio::test]
async fn not_found_with_html_body_is_http_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/1/repository/commits/abc"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&server)
        .await;

    let route = CommitRoute::get(&gitlab_config(&server)?, "1", "abc");
    let err = session()?.execute(&route).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    match err {
        Error::Http { ref body, .. } => assert_eq!(&**body, b"<html>Not Found</html>"),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn structured_error_body_becomes_api_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/1/repository/commits/abc/diff"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "req-9")
                .set_body_json(json!({"message": "404 Project Not Found"})),
        )
        .mount(&server)
        .await;

    let route = CommitRoute::GetDiff {
        config: Some(gitlab_config(&server)?),
        id: "1".into(),
        sha: "abc".into(),
    };
    let err = session()?.execute(&route).await.unwrap_err();
    match err {
        Error::Api(api) => {
            assert_eq!(api.status, StatusCode::NOT_FOUND);
            assert_eq!(&*api.message, "404 Project Not Found");
            assert_eq!(api.request_id.as_deref(), Some("req-9"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn success_body_that_does_not_match_reports_field_path() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/1/repository/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a", "short_id": 7}])))
        .mount(&server)
        .await;

    let err = session()?
        .execute(&CommitRoute::list(&gitlab_config(&server)?, 1u64))
        .await
        .unwrap_err();
    match err {
        Error::Decoding {
            status, field_path, ..
        } => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(&*field_path, "[0].short_id");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn comment_is_posted_as_form_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/project/group%2Fapp/repository/commits/abc/comments"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("note=ship+it&line=3&line_type=new"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "note": "ship it",
            "path": null,
            "line": 3,
            "line_type": "new",
            "author": {
                "id": 1,
                "username": "root",
                "name": "Administrator",
                "state": "active",
                "avatar_url": null,
                "web_url": "https://gitlab.example.com/root"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let route = CommitRoute::PostComment {
        config: Some(gitlab_config(&server)?),
        id: "group/app".into(),
        sha: "abc".into(),
        note: "ship it".into(),
        path: None,
        line: Some(3),
        line_type: Some(LineType::New),
    };
    let resp = session()?.execute(&route).await?;
    assert_eq!(resp.status, StatusCode::CREATED);
    match resp.data {
        CommitPayload::Comment(comment) => {
            assert_eq!(comment.note, "ship it");
            assert_eq!(comment.author.username, "root");
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn basic_credentials_are_sent() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/1/repository/commits"))
        .and(header("authorization", "Basic dXNlcjp0b2tlbg=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = Configuration::builder(Provider::GitLab, format!("{}/api/v4", server.uri()))?
        .credential(Credential::basic("user", "token"))
        .build();
    let resp = session()?.execute(&CommitRoute::list(&config, 1u64)).await?;
    assert_eq!(resp.data, CommitPayload::Commits(Vec::new()));
    Ok(())
}

#[tokio::test]
async fn github_issue_is_created_with_json_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues"))
        .and(header("authorization", "Bearer gho-secret"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(body_json(json!({"title": "Found a bug", "labels": ["bug"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(1347, "Found a bug")))
        .expect(1)
        .mount(&server)
        .await;

    let route = IssueRoute::CreateIssue {
        config: Some(github_config(&server)?),
        repo: ("octo", "hello").into(),
        title: "Found a bug".into(),
        body: None,
        labels: vec!["bug".into()],
    };
    let resp = session()?.execute(&route).await?;
    match resp.data {
        IssuePayload::Issue(issue) => {
            assert_eq!(issue.number, 1347);
            assert_eq!(issue.labels[0].name, "bug");
            assert_eq!(issue.user.login, "octocat");
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn link_header_page_can_be_followed_explicitly() -> Result<()> {
    let server = MockServer::start().await;
    let next = format!("<{}/repos/octo/hello/issues?state=open&page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues"))
        .and(query_param("state", "open"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(2, "second")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues"))
        .and(query_param("state", "open"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([issue_json(1, "first")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = github_config(&server)?;
    let session = session()?;
    let first = IssueRoute::ListIssues {
        config: Some(Arc::clone(&config)),
        repo: ("octo", "hello").into(),
        state: Some(IssueState::Open),
        labels: Vec::new(),
        page: None,
    };
    let page_one = session.execute(&first).await?;
    let token = page_one.next_page.clone();
    assert!(token.is_some());

    let second = IssueRoute::ListIssues {
        config: Some(config),
        repo: ("octo", "hello").into(),
        state: Some(IssueState::Open),
        labels: Vec::new(),
        page: token,
    };
    let page_two = session.execute(&second).await?;
    assert!(page_two.next_page.is_none());
    match page_two.data {
        IssuePayload::Issues(issues) => assert_eq!(issues[0].title, "second"),
        other => panic!("unexpected payload: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn keyset_link_cursor_is_replayed_on_the_next_request() -> Result<()> {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/api/v4/project/42/repository/commits?id_after=42&pagination=keyset&ref_name=main>; rel=\"next\"",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/api/v4/project/42/repository/commits"))
        .and(query_param("ref_name", "main"))
        .and(query_param("id_after", "42"))
        .and(query_param("pagination", "keyset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([commit_json("b2b2b2b2b2b2")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/42/repository/commits"))
        .and(query_param_is_missing("id_after"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([commit_json("a1a1a1a1a1a1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = gitlab_config(&server)?;
    let session = session()?;
    let route = |page| CommitRoute::ListCommits {
        config: Some(Arc::clone(&config)),
        id: "42".into(),
        ref_name: Some("main".into()),
        since: None,
        until: None,
        page,
    };

    let first = session.execute(&route(None)).await?;
    let token = first.next_page.clone();
    assert_eq!(
        token.as_ref().map(ToString::to_string).as_deref(),
        Some("id_after=42&pagination=keyset&ref_name=main")
    );

    let second = session.execute(&route(token)).await?;
    assert!(second.next_page.is_none());
    match second.data {
        CommitPayload::Commits(commits) => assert_eq!(commits[0].short_id, "b2b2b2b2"),
        other => panic!("unexpected payload: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn unavailable_is_reported_after_a_single_attempt() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/project/1/repository/commits"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = session()?
        .execute(&CommitRoute::list(&gitlab_config(&server)?, 1u64))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    Ok(())
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() -> Result<()> {
    let config = Configuration::builder(Provider::GitLab, "http://127.0.0.1:9/api/v4")?.build();
    let err = Session::builder()
        .no_system_proxy()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(3))
        .build()?
        .execute(&CommitRoute::list(&config, 1u64))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}
