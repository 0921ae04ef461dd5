use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Platform handle of a registered warden.
///
/// Never empty: surrounding whitespace is trimmed and a blank string is rejected.
/// Use `"alice".parse::<Handle>()` or `Handle::try_from(string)` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Into)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Handle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for Handle {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidHandle(s));
        }
        if trimmed.len() == s.len() {
            Ok(Self(s))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

/// Identifier of the wallet-auth account backing a warden profile.
///
/// Stored by the backend once the warden's wallet has been linked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Into)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalUserId(String);

impl ExternalUserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ExternalUserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for ExternalUserId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            Err(Error::InvalidUserId(s))
        } else {
            Ok(Self(s))
        }
    }
}

/// EVM wallet address (`0x` followed by 40 hex digits).
///
/// Normalized to lowercase so addresses compare equal regardless of checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Into)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let valid = s.len() == 42
            && (s.starts_with("0x") || s.starts_with("0X"))
            && s.bytes().skip(2).all(|b| b.is_ascii_hexdigit());
        if valid {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidAddress(s))
        }
    }
}

/// Profile record returned by the backend `get-user` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct ProfileRecord {
    #[serde(default, rename = "moralisId")]
    pub external_user_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl ProfileRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_external_user_id(mut self, id: impl Into<String>) -> Self {
        self.external_user_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// The linked wallet-auth account, if the registration has one.
    ///
    /// A blank id is treated as missing.
    #[must_use]
    pub fn linked_user_id(&self) -> Option<ExternalUserId> {
        self.external_user_id
            .clone()
            .and_then(|id| ExternalUserId::try_from(id).ok())
    }
}

/// Member of a warden team, as returned by the backend `get-team` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TeamMember {
    #[serde(rename = "username")]
    pub handle: Handle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, rename = "img", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl TeamMember {
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            address: None,
            avatar_url: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// The authenticated warden, or the empty sentinel when nobody is logged in.
///
/// A logged-in session can only be built through [`Session::new`], which
/// requires both a handle and a linked user id. Sessions are replaced
/// wholesale; there are no setters on a live value.
///
/// Serializes with the backend's field names plus a derived `isLoggedIn` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    handle: Option<Handle>,
    external_user_id: Option<ExternalUserId>,
    address: Option<WalletAddress>,
    discord_handle: Option<String>,
    github_handle: Option<String>,
    email: Option<String>,
    teams: Vec<TeamMember>,
    avatar_url: Option<String>,
    profile_link: Option<String>,
}

impl Session {
    /// Logged-in session for `handle`, backed by `external_user_id`.
    #[must_use]
    pub fn new(handle: Handle, external_user_id: ExternalUserId) -> Self {
        Self {
            handle: Some(handle),
            external_user_id: Some(external_user_id),
            ..Self::default()
        }
    }

    /// The unauthenticated sentinel.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.handle.is_some() && self.external_user_id.is_some()
    }

    #[must_use]
    pub fn with_address(mut self, address: WalletAddress) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn with_discord_handle(mut self, handle: Option<String>) -> Self {
        self.discord_handle = handle;
        self
    }

    #[must_use]
    pub fn with_github_handle(mut self, handle: Option<String>) -> Self {
        self.github_handle = handle;
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    #[must_use]
    pub fn with_teams(mut self, teams: Vec<TeamMember>) -> Self {
        self.teams = teams;
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: Option<String>) -> Self {
        self.avatar_url = url;
        self
    }

    #[must_use]
    pub fn with_profile_link(mut self, link: Option<String>) -> Self {
        self.profile_link = link;
        self
    }

    #[must_use]
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    #[must_use]
    pub fn external_user_id(&self) -> Option<&ExternalUserId> {
        self.external_user_id.as_ref()
    }

    #[must_use]
    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    #[must_use]
    pub fn discord_handle(&self) -> Option<&str> {
        self.discord_handle.as_deref()
    }

    #[must_use]
    pub fn github_handle(&self) -> Option<&str> {
        self.github_handle.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn teams(&self) -> &[TeamMember] {
        &self.teams
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    #[must_use]
    pub fn profile_link(&self) -> Option<&str> {
        self.profile_link.as_deref()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    username: Option<&'a Handle>,
    moralis_id: Option<&'a ExternalUserId>,
    address: Option<&'a WalletAddress>,
    discord_handle: Option<&'a str>,
    github_handle: Option<&'a str>,
    email: Option<&'a str>,
    teams: &'a [TeamMember],
    img: Option<&'a str>,
    link: Option<&'a str>,
    is_logged_in: bool,
}

impl Serialize for Session {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SessionView {
            username: self.handle(),
            moralis_id: self.external_user_id(),
            address: self.address(),
            discord_handle: self.discord_handle(),
            github_handle: self.github_handle(),
            email: self.email(),
            teams: self.teams(),
            img: self.avatar_url(),
            link: self.profile_link(),
            is_logged_in: self.is_logged_in(),
        }
        .serialize(serializer)
    }
}
