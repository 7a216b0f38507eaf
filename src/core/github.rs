//! GitHub Releases access.
//!
//! [`ReleaseSource`] is the seam between the catalog/installer and the network.
//! [`GitHubSource`] implements it against the GitHub REST API with a blocking
//! `reqwest` client; tests substitute an in-memory source.

use crate::core::config::Repository;
use crate::core::error::{OpavmError, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::io::{self, Read, Write};
use std::time::Duration;

const GITHUB_API_ROOT: &str = "https://api.github.com/repos";
const USER_AGENT: &str = concat!("opavm/", env!("CARGO_PKG_VERSION"));
const API_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const PROXY_ENV_VARS: [&str; 6] = [
    "HTTPS_PROXY",
    "https_proxy",
    "HTTP_PROXY",
    "http_proxy",
    "ALL_PROXY",
    "all_proxy",
];

/// Requested release: the upstream "latest" release or an exact tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTag {
    Latest,
    Exact(String),
}

impl ReleaseTag {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("latest") {
            ReleaseTag::Latest
        } else {
            ReleaseTag::Exact(version_from_tag(token).to_string())
        }
    }

    /// Tag as published upstream (`v`-prefixed)
    pub fn api_tag(&self) -> String {
        match self {
            ReleaseTag::Latest => "latest".to_string(),
            ReleaseTag::Exact(version) => format!("v{version}"),
        }
    }
}

/// Strip a leading `v` from a release tag
pub fn version_from_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn version(&self) -> &str {
        version_from_tag(&self.tag)
    }
}

/// Upstream release index and artifact transport
pub trait ReleaseSource {
    fn fetch_release(&self, repo: &Repository, tag: &ReleaseTag) -> Result<Release>;

    /// One page of releases, most recent first. `page` starts at 1.
    fn fetch_release_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Release>>;

    /// Stream `url` into `sink`, returning the number of bytes written
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;

    fn fetch_text(&self, url: &str) -> Result<String>;
}

impl<S: ReleaseSource + ?Sized> ReleaseSource for &S {
    fn fetch_release(&self, repo: &Repository, tag: &ReleaseTag) -> Result<Release> {
        (**self).fetch_release(repo, tag)
    }

    fn fetch_release_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Release>> {
        (**self).fetch_release_page(repo, page, per_page)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        (**self).download(url, sink)
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        (**self).fetch_text(url)
    }
}

pub struct GitHubSource {
    client: Client,
    token: Option<String>,
}

impl GitHubSource {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| {
                OpavmError::invalid_response(
                    GITHUB_API_ROOT,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self { client, token })
    }

    fn api_request(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .timeout(API_TIMEOUT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        repo: &Repository,
        tag: &str,
    ) -> Result<T> {
        log::debug!("GET {url}");
        let response = self
            .api_request(url)
            .send()
            .map_err(|e| classify_transport_error(url, &e))?;
        let response = check_status(response, url, StatusContext::Release { repo, tag })?;
        response
            .json()
            .map_err(|e| OpavmError::invalid_response(url, e.to_string()))
    }
}

impl ReleaseSource for GitHubSource {
    fn fetch_release(&self, repo: &Repository, tag: &ReleaseTag) -> Result<Release> {
        let url = match tag {
            ReleaseTag::Latest => format!("{GITHUB_API_ROOT}/{repo}/releases/latest"),
            ReleaseTag::Exact(_) => {
                format!("{GITHUB_API_ROOT}/{repo}/releases/tags/{}", tag.api_tag())
            }
        };
        self.get_json(&url, repo, &tag.api_tag())
    }

    fn fetch_release_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Release>> {
        let url = format!("{GITHUB_API_ROOT}/{repo}/releases?per_page={per_page}&page={page}");
        self.get_json(&url, repo, "releases")
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        log::debug!("Downloading {url}");
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .map_err(|e| classify_transport_error(url, &e))?;
        let mut response = check_status(response, url, StatusContext::Download)?;

        let mut buffer = vec![0_u8; 64 * 1024];
        let mut written: u64 = 0;
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|e| classify_stream_error(url, &e))?;
            if read == 0 {
                break;
            }
            sink.write_all(&buffer[..read])?;
            written += read as u64;
        }
        Ok(written)
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(API_TIMEOUT)
            .send()
            .map_err(|e| classify_transport_error(url, &e))?;
        check_status(response, url, StatusContext::Download)?
            .text()
            .map_err(|e| OpavmError::invalid_response(url, e.to_string()))
    }
}

fn proxy_configured() -> bool {
    proxy_configured_in(|var| std::env::var(var).ok())
}

fn proxy_configured_in(lookup: impl Fn(&str) -> Option<String>) -> bool {
    PROXY_ENV_VARS
        .iter()
        .any(|var| lookup(var).is_some_and(|value| !value.trim().is_empty()))
}

fn classify_transport_error(url: &str, error: &reqwest::Error) -> OpavmError {
    log::debug!("Request to {url} failed: {error}");
    classify_transport(url, error.is_timeout(), error.is_connect(), proxy_configured())
}

/// A connect failure is blamed on the proxy only when one is configured
fn classify_transport(url: &str, timeout: bool, connect: bool, proxy: bool) -> OpavmError {
    let url = url.to_string();
    if timeout {
        OpavmError::Timeout { url }
    } else if connect && proxy {
        OpavmError::ProxyFailure { url }
    } else {
        OpavmError::ConnectionFailed { url }
    }
}

/// Read failure while streaming a response body
fn classify_stream_error(url: &str, error: &io::Error) -> OpavmError {
    log::debug!("Stream error for {url}: {error}");
    let timed_out = error.kind() == io::ErrorKind::TimedOut
        || error
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);
    classify_transport(url, timed_out, false, false)
}

/// What a request was for, which decides how a 404 or 401/403 reads
#[derive(Debug, Clone, Copy)]
enum StatusContext<'a> {
    Release { repo: &'a Repository, tag: &'a str },
    Download,
}

fn check_status(response: Response, url: &str, context: StatusContext<'_>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok());
    Err(classify_status(status, remaining, url, context))
}

fn classify_status(
    status: StatusCode,
    ratelimit_remaining: Option<&str>,
    url: &str,
    context: StatusContext<'_>,
) -> OpavmError {
    let exhausted = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && ratelimit_remaining.map(str::trim) == Some("0"));
    if exhausted {
        return OpavmError::RateLimited;
    }
    match (status, context) {
        (StatusCode::NOT_FOUND, StatusContext::Release { repo, tag }) => {
            OpavmError::release_not_found(repo.to_string(), tag)
        }
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, StatusContext::Release { repo, .. }) => {
            OpavmError::Unauthorized {
                repo: repo.to_string(),
            }
        }
        _ => OpavmError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        },
    }
}
