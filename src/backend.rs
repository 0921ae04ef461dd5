use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::session::{BoxError, ProfileDirectory};
use crate::types::{Handle, ProfileRecord, TeamMember, WalletAddress};

const DEFAULT_AVATAR_BASE_URL: &str =
    "https://raw.githubusercontent.com/code-423n4/code423n4.com/main/_data/handles/";

/// Warden backend endpoints.
///
/// ```rust,ignore
/// use warden_login::BackendConfig;
///
/// let config = BackendConfig::new("https://example.com/.netlify/functions/".parse()?)?;
/// // Optional overrides via chaining:
/// let config = config
///     .with_avatar_base_url("https://cdn.example.com/avatars/".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BackendConfig {
    pub(crate) user_url: Url,
    pub(crate) team_url: Url,
    pub(crate) handles_url: Url,
    pub(crate) avatar_base_url: Url,
}

impl BackendConfig {
    /// Endpoints under `api_base`: `get-user`, `get-team` and `get-handles`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_base` can't be used as a base URL.
    pub fn new(api_base: Url) -> Result<Self, Error> {
        let api_base = with_trailing_slash(api_base);
        let endpoint = |name: &str| {
            api_base
                .join(name)
                .map_err(|e| Error::Config(format!("{name}: {e}")))
        };

        Ok(Self {
            user_url: endpoint("get-user")?,
            team_url: endpoint("get-team")?,
            handles_url: endpoint("get-handles")?,
            avatar_base_url: DEFAULT_AVATAR_BASE_URL
                .parse()
                .map_err(|e| Error::Config(format!("avatar base: {e}")))?,
        })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `WARDEN_API_URL`: base URL of the backend functions
    ///
    /// # Optional env vars
    /// - `WARDEN_USER_URL`: Override the profile endpoint
    /// - `WARDEN_TEAM_URL`: Override the team endpoint
    /// - `WARDEN_HANDLES_URL`: Override the address-to-handles endpoint
    /// - `WARDEN_AVATAR_BASE_URL`: Override where avatar images are probed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, Error> {
        let api_base = std::env::var("WARDEN_API_URL")
            .map_err(|_| Error::Config("WARDEN_API_URL is required".into()))?;
        let api_base: Url = api_base
            .parse()
            .map_err(|e| Error::Config(format!("WARDEN_API_URL: {e}")))?;

        let mut config = Self::new(api_base)?;

        if let Some(url) = env_url("WARDEN_USER_URL")? {
            config = config.with_user_url(url);
        }
        if let Some(url) = env_url("WARDEN_TEAM_URL")? {
            config = config.with_team_url(url);
        }
        if let Some(url) = env_url("WARDEN_HANDLES_URL")? {
            config = config.with_handles_url(url);
        }
        if let Some(url) = env_url("WARDEN_AVATAR_BASE_URL")? {
            config = config.with_avatar_base_url(url);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_user_url(mut self, url: Url) -> Self {
        self.user_url = url;
        self
    }

    #[must_use]
    pub fn with_team_url(mut self, url: Url) -> Self {
        self.team_url = url;
        self
    }

    #[must_use]
    pub fn with_handles_url(mut self, url: Url) -> Self {
        self.handles_url = url;
        self
    }

    /// Avatar paths resolve under `url`; a trailing `/` is added if missing.
    #[must_use]
    pub fn with_avatar_base_url(mut self, url: Url) -> Self {
        self.avatar_base_url = with_trailing_slash(url);
        self
    }

    /// Profile endpoint (`?id=<handle>`).
    #[must_use]
    pub fn user_url(&self) -> &Url {
        &self.user_url
    }

    /// Team endpoint (`?id=<handle>`).
    #[must_use]
    pub fn team_url(&self) -> &Url {
        &self.team_url
    }

    /// Address-to-handles endpoint (`?address=<address>`).
    #[must_use]
    pub fn handles_url(&self) -> &Url {
        &self.handles_url
    }

    /// Base URL avatar paths are resolved against.
    #[must_use]
    pub fn avatar_base_url(&self) -> &Url {
        &self.avatar_base_url
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn env_url(name: &str) -> Result<Option<Url>, Error> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[derive(Deserialize)]
struct HandleEntry {
    username: Handle,
}

/// HTTP client for the warden backend.
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Fetch the profile registered under `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::Backend`] for any status other than 200 and 404.
    pub async fn get_user(&self, handle: &Handle) -> Result<Option<ProfileRecord>, Error> {
        let mut url = self.config.user_url.clone();
        url.query_pairs_mut().append_pair("id", handle.as_str());

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::ensure_success(response, "profile lookup").await?;
        response.json::<ProfileRecord>().await.map(Some).map_err(Into::into)
    }

    /// Fetch the team memberships of `handle`.
    ///
    /// Any non-success status yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or an undecodable body.
    pub async fn get_team(&self, handle: &Handle) -> Result<Vec<TeamMember>, Error> {
        let mut url = self.config.team_url.clone();
        url.query_pairs_mut().append_pair("id", handle.as_str());

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(status = response.status().as_u16(), handle = %handle, "No team data");
            return Ok(Vec::new());
        }
        response.json::<Vec<TeamMember>>().await.map_err(Into::into)
    }

    /// Handles previously registered with `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::Backend`] for any status other than 200 and 404.
    pub async fn get_handles(&self, address: &WalletAddress) -> Result<Vec<Handle>, Error> {
        let mut url = self.config.handles_url.clone();
        url.query_pairs_mut().append_pair("address", address.as_str());

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = Self::ensure_success(response, "handle lookup").await?;
        let entries = response.json::<Vec<HandleEntry>>().await?;
        Ok(entries.into_iter().map(|e| e.username).collect())
    }

    /// Probe the public URL for a stored avatar path.
    ///
    /// Returns the resolved URL when it answers with a success status,
    /// otherwise `image` unchanged. Absolute URLs and paths that would
    /// escape the avatar base are never requested.
    pub async fn resolve_avatar(&self, image: &str) -> String {
        if Url::parse(image).is_ok() {
            return image.to_owned();
        }
        let base = &self.config.avatar_base_url;
        let relative = image.trim_start_matches("./").trim_start_matches('/');
        let Ok(url) = base.join(relative) else {
            return image.to_owned();
        };
        if !url.as_str().starts_with(base.as_str()) {
            tracing::debug!(%url, "Avatar path outside the avatar base");
            return image.to_owned();
        }

        match self.http.get(url.clone()).send().await {
            Ok(response) if response.status().is_success() => url.into(),
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), %url, "Avatar not found");
                image.to_owned()
            }
            Err(e) => {
                tracing::debug!(error = %e, %url, "Avatar probe failed");
                image.to_owned()
            }
        }
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            operation,
            status,
            detail,
        })
    }
}

impl ProfileDirectory for BackendClient {
    async fn find_profile(&self, handle: &Handle) -> Result<Option<ProfileRecord>, BoxError> {
        Ok(self.get_user(handle).await?)
    }

    async fn find_team(&self, handle: &Handle) -> Result<Vec<TeamMember>, BoxError> {
        Ok(self.get_team(handle).await?)
    }

    async fn handles_for_address(&self, address: &WalletAddress) -> Result<Vec<Handle>, BoxError> {
        Ok(self.get_handles(address).await?)
    }

    async fn resolve_avatar(&self, image: &str) -> String {
        BackendClient::resolve_avatar(self, image).await
    }
}
