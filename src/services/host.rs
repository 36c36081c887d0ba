//! Repository hosts: file listings and raw file text

use crate::config::HostConfig;
use crate::{Error, Result};
use ignore::WalkBuilder;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of repository file listings and contents
pub trait RepositoryHost {
    /// Every file path of the repository at `branch`, relative, `/`-separated
    fn list_paths(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<String>>;

    /// Text of one file
    fn fetch_text(&self, owner: &str, repo: &str, path: &str, branch: &str) -> Result<String>;
}

/// GitHub: git tree API for listings, raw content host for file text
pub struct GithubHost {
    client: Client,
    api_url: String,
    raw_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GithubHost {
    /// Create a host client; `GITHUB_TOKEN` is used when set
    pub fn new(config: &HostConfig) -> Result<Self> {
        Self::with_token(config, std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }

    pub fn with_token(config: &HostConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("repolens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }

        let resp = request.send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(Error::Host(format!("GET {} failed ({}): {}", url, status, body)));
        }
        Ok(resp)
    }
}

impl RepositoryHost for GithubHost {
    fn list_paths(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<String>> {
        let url = format!("{}/repos/{}/{}/git/trees/{}?recursive=1", self.api_url, owner, repo, branch);
        let tree: TreeResponse = self.get(&url)?.json()?;

        if tree.truncated {
            tracing::warn!("Tree listing for {}/{}@{} was truncated by the host", owner, repo, branch);
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect())
    }

    fn fetch_text(&self, owner: &str, repo: &str, path: &str, branch: &str) -> Result<String> {
        let url = format!("{}/{}/{}/{}/{}", self.raw_url, owner, repo, branch, path);
        Ok(self.get(&url)?.text()?)
    }
}

/// A directory on disk. Owner, repository and branch are labels only.
pub struct LocalHost {
    root: PathBuf,
}

impl LocalHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RepositoryHost for LocalHost {
    fn list_paths(&self, _owner: &str, _repo: &str, _branch: &str) -> Result<Vec<String>> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();
        let mut paths = Vec::new();

        for entry in walker {
            let entry = entry.map_err(|e| Error::Host(e.to_string()))?;

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let segments: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
            paths.push(segments.join("/"));
        }

        paths.sort();
        Ok(paths)
    }

    fn fetch_text(&self, _owner: &str, _repo: &str, path: &str, _branch: &str) -> Result<String> {
        let bytes = std::fs::read(self.root.join(path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
