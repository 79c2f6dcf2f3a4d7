//! Connection credentials as the review-server client consumes them.

use gerrit_config::BlockingPolicy;
use gerrit_credentials::{CredentialResult, Secret};

use crate::settings::GerritSettings;

/// Everything a REST client needs to authenticate against the server.
pub trait AuthData: Send + Sync {
    /// Server base URL.
    fn host(&self) -> String;

    /// Account name, if configured.
    fn login(&self) -> Option<String>;

    /// Password or HTTP token for `login`.
    ///
    /// # Errors
    ///
    /// Returns [`PreloadRequired`](gerrit_credentials::CredentialError::PreloadRequired)
    /// when called with [`BlockingPolicy::MustNotBlock`] before a preload.
    fn password(&self, blocking: BlockingPolicy) -> CredentialResult<Option<Secret>>;

    /// Whether a login is configured.
    fn is_login_and_password_available(&self) -> bool;

    /// Whether the password is a generated HTTP password rather than the
    /// account password.
    fn is_http_password(&self) -> bool {
        false
    }
}

impl AuthData for GerritSettings {
    fn host(&self) -> String {
        Self::host(self)
    }

    fn login(&self) -> Option<String> {
        Self::login(self)
    }

    fn password(&self, blocking: BlockingPolicy) -> CredentialResult<Option<Secret>> {
        Self::password(self, blocking)
    }

    fn is_login_and_password_available(&self) -> bool {
        Self::is_login_and_password_available(self)
    }
}
