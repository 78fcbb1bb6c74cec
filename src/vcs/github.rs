// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitHub REST client for the fork + pull request push flow.
//!
//! ```text
//! push (github flavor)
//!   create_fork(owner, repo)            POST /repos/{owner}/{repo}/forks
//!   git push --force fork HEAD:<branch>
//!   create_pull_request(owner, repo)    POST /repos/{owner}/{repo}/pulls
//!     422 "A pull request already exists" --> Ok(None)
//! ```

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NetworkError, SyncResult, VcsError};

/// Parses `owner/repo` out of an HTTPS or SSH GitHub URL.
#[must_use]
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("git@github.com:"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Repository created by a fork request.
#[derive(Debug, Clone, Deserialize)]
pub struct ForkInfo {
    pub full_name: String,
    pub clone_url: String,
    #[serde(default)]
    pub ssh_url: String,
}

/// Pull request to open.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    /// `user:branch` of the fork.
    pub head: String,
    pub base: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Minimal GitHub API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api: String,
    token: String,
}

impl GitHubClient {
    /// Client for `api` (e.g. `https://api.github.com`) using `token`.
    #[must_use]
    pub fn new(api: &str, token: &str) -> Self {
        let http = Client::builder()
            .user_agent(format!("transync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api: api.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Forks `owner/repo` into the token's account; existing forks are returned.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::HttpError` for a non-success response.
    pub async fn create_fork(&self, owner: &str, repo: &str) -> SyncResult<ForkInfo> {
        let url = format!("{}/repos/{owner}/{repo}/forks", self.api);
        debug!(owner, repo, "requesting fork");

        let response = self
            .post(&url)
            .send()
            .await
            .map_err(NetworkError::Reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                url,
                body,
            }
            .into());
        }
        Ok(response.json().await.map_err(NetworkError::Reqwest)?)
    }

    /// Opens a pull request; returns its URL, or `None` if one already exists.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::PullRequest` when GitHub rejects the request, or
    /// `NetworkError::HttpError` for other non-success responses.
    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> SyncResult<Option<String>> {
        let url = format!("{}/repos/{owner}/{repo}/pulls", self.api);
        debug!(owner, repo, head = %request.head, base = %request.base, "opening pull request");

        let response = self
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(NetworkError::Reqwest)?;
        let status = response.status();

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            let parsed: Option<ErrorResponse> = serde_json::from_str(&body).ok();
            let messages: Vec<String> = parsed
                .map(|p| p.errors.into_iter().map(|e| e.message).collect())
                .unwrap_or_default();
            if messages.iter().any(|m| m.starts_with("A pull request already exists")) {
                info!(owner, repo, head = %request.head, "pull request already open");
                return Ok(None);
            }
            return Err(VcsError::PullRequest {
                message: if messages.is_empty() { body } else { messages.join(", ") },
            }
            .into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                url,
                body,
            }
            .into());
        }

        let created: PullRequestResponse = response.json().await.map_err(NetworkError::Reqwest)?;
        info!(url = %created.html_url, "pull request opened");
        Ok(Some(created.html_url))
    }
}
