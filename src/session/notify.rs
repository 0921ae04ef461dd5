use std::time::Duration;

const SHORT_DISMISS: Duration = Duration::from_secs(5);
const LONG_DISMISS: Duration = Duration::from_secs(10);

/// Community channel where pending registrations are followed up.
pub(crate) const REGISTRATION_CHANNEL: &str = "#i-want-to-be-a-warden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A toast for the host's notification sink.
///
/// `auto_dismiss` of `None` means the toast stays until the user closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub auto_dismiss: Option<Duration>,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            auto_dismiss: Some(SHORT_DISMISS),
        }
    }

    #[must_use]
    pub fn with_auto_dismiss(mut self, after: Option<Duration>) -> Self {
        self.auto_dismiss = after;
        self
    }

    pub(crate) fn logged_in() -> Self {
        Self::new("Successfully logged in.", Severity::Success)
    }

    pub(crate) fn must_sign() -> Self {
        Self::new(
            "You must sign the message to connect your wallet.",
            Severity::Error,
        )
    }

    pub(crate) fn must_register() -> Self {
        Self::new(
            "You must register as a warden before you can log in.",
            Severity::Info,
        )
    }

    pub(crate) fn registration_pending() -> Self {
        Self::new(
            format!(
                "Your registration is still being processed. If you haven't already, \
                 ask for help in the {REGISTRATION_CHANNEL} channel on Discord."
            ),
            Severity::Info,
        )
        .with_auto_dismiss(None)
    }

    pub(crate) fn linking_pending() -> Self {
        Self::new(
            "Your request is pending review. You will be able to log in once it is approved.",
            Severity::Info,
        )
        .with_auto_dismiss(Some(LONG_DISMISS))
    }

    pub(crate) fn failed() -> Self {
        Self::new(
            "Something went wrong. Please refresh the page and try again.",
            Severity::Error,
        )
        .with_auto_dismiss(Some(LONG_DISMISS))
    }

    pub(crate) fn wallet_disconnected() -> Self {
        Self::new(
            "Your wallet was disconnected. Please log in again.",
            Severity::Error,
        )
    }

    pub(crate) fn registered_users_only() -> Self {
        Self::new(
            "Only registered wardens can switch wallet accounts. You have been logged out.",
            Severity::Error,
        )
        .with_auto_dismiss(Some(LONG_DISMISS))
    }

    pub(crate) fn address_linked(address: &crate::types::WalletAddress) -> Self {
        Self::new(
            format!("{address} is now linked to your account."),
            Severity::Success,
        )
    }
}

/// Recovery screens the flow can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Register,
    ConfirmAccount,
}

impl Route {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::ConfirmAccount => "confirm-account",
        }
    }
}

/// Host-provided toast sink.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Host-provided router.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: Route);
}
