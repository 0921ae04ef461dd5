/// Why a wallet identity could not be turned into a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No profile exists for the identity's handle.
    #[error("Registration pending")]
    PendingRegistration,

    /// Profile exists but no wallet account has been linked to it yet.
    #[error("Account linking pending review")]
    PendingLinking,

    /// Local identity is missing something the flow needs.
    #[error("Invalid local state: {0}")]
    InvalidLocalState(&'static str),

    /// The user was logged out before the session could be committed.
    #[error("Logged out while resolving the session")]
    Superseded,

    /// Network, server or wallet failure.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ResolveError {
    pub(crate) fn unknown(e: impl std::fmt::Display) -> Self {
        Self::Unknown(e.to_string())
    }
}

impl From<crate::error::Error> for ResolveError {
    fn from(e: crate::error::Error) -> Self {
        Self::unknown(e)
    }
}
