//! GitHub REST backend for [`ReleaseHost`]

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{NewRelease, Release, ReleaseAsset, ReleaseHost};
use crate::config::HostingConfig;
use crate::error::{self, Result};
use crate::http;
use crate::runtime;

const PER_PAGE: usize = 100;
const MEDIA_TYPE: &str = "application/vnd.github+json";

pub struct GitHubHost {
    client: Client,
    api_url: String,
    owner: String,
    repository: String,
    token: String,
}

impl GitHubHost {
    /// Requires organization, repository and token to be resolved
    pub fn new(config: &HostingConfig) -> Result<Self> {
        let owner = required(&config.organization, "hosting.organization")?;
        let repository = required(&config.repository, "hosting.repository")?;
        let token = required(&config.token, "a hosting API token")?;
        Ok(Self {
            client: http::client()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner,
            repository,
            token,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repository, path
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, MEDIA_TYPE)
    }

    /// Send and decode; `None` for the given "absent" statuses
    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        absent: &[StatusCode],
    ) -> Result<Option<T>> {
        runtime::block_on(async move {
            let response = request.send().await.map_err(http::transport_error)?;
            let status = response.status();
            if absent.contains(&status) {
                return Ok(None);
            }
            if !status.is_success() {
                let (status, message) = http::failure(response).await;
                return Err(error::release::hosting_api(status, message));
            }
            response
                .json::<T>()
                .await
                .map(Some)
                .map_err(http::transport_error)
        })?
    }

    fn send_required<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send(request, &[])?
            .ok_or_else(|| error::release::hosting_api(0, format!("empty response for {what}")))
    }

    /// GET every page of a list endpoint
    fn list_all<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Vec<T>> {
        collect_pages(PER_PAGE, |page| {
            self.send_required(
                self.request(Method::GET, url)
                    .query(&[("per_page", PER_PAGE), ("page", page)]),
                what,
            )
        })
    }
}

/// Fetch pages starting at 1 until one comes back short
fn collect_pages<T, F>(per_page: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    for page in 1.. {
        let batch = fetch(page)?;
        let done = batch.len() < per_page;
        items.extend(batch);
        if done {
            break;
        }
    }
    Ok(items)
}

fn required(value: &Option<String>, what: &str) -> Result<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| error::config::invalid(format!("{what} is required for release operations")))
}

impl ReleaseHost for GitHubHost {
    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        tracing::debug!(tag, repository = %self.repository, "looking up release");
        let url = self.repo_url(&format!("releases/tags/{tag}"));
        self.send(self.request(Method::GET, &url), &[StatusCode::NOT_FOUND])
    }

    fn list_releases(&self) -> Result<Vec<Release>> {
        self.list_all(&self.repo_url("releases"), "release list")
    }

    fn create_release(&self, release: &NewRelease) -> Result<Release> {
        let mut body = json!({
            "tag_name": release.tag,
            "name": release.name,
            "body": release.body,
        });
        if let Some(target) = &release.target {
            body["target_commitish"] = json!(target);
        }
        let url = self.repo_url("releases");
        self.send_required(self.request(Method::POST, &url).json(&body), "new release")
    }

    fn update_release_body(&self, release: &Release, body: &str) -> Result<Release> {
        let url = self.repo_url(&format!("releases/{}", release.id));
        self.send_required(
            self.request(Method::PATCH, &url).json(&json!({ "body": body })),
            "release update",
        )
    }

    fn commit_exists(&self, sha: &str) -> Result<bool> {
        let url = self.repo_url(&format!("commits/{sha}"));
        let found: Option<serde_json::Value> = self.send(
            self.request(Method::GET, &url),
            &[StatusCode::NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY],
        )?;
        Ok(found.is_some())
    }

    fn list_assets(&self, release: &Release) -> Result<Vec<ReleaseAsset>> {
        let url = self.repo_url(&format!("releases/{}/assets", release.id));
        self.list_all(&url, "asset list")
    }

    fn delete_asset(&self, asset: &ReleaseAsset) -> Result<()> {
        let url = self.repo_url(&format!("releases/assets/{}", asset.id));
        let request = self.request(Method::DELETE, &url);
        runtime::block_on(async move {
            let response = request.send().await.map_err(http::transport_error)?;
            if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
                return Ok(());
            }
            let (status, message) = http::failure(response).await;
            Err(error::release::hosting_api(status, message))
        })?
    }

    fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        label: &str,
        bytes: &[u8],
    ) -> Result<ReleaseAsset> {
        // upload_url is a URI template: ".../assets{?name,label}"
        let url = release
            .upload_url
            .split('{')
            .next()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                error::release::hosting_api(0, format!("release {} has no upload URL", release.tag))
            })?;
        let request = self
            .request(Method::POST, url)
            .query(&[("name", name), ("label", label)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec());
        self.send_required(request, "asset upload")
    }
}
