//! Secret key derivation per scope.
//!
//! Named scopes use the standard base64 alphabet with padding stripped.
//! Unpadded base64 is injective, so distinct names never share a key, and
//! the standard alphabet has no `_`, so no derived key can equal
//! [`GLOBAL_SECRET_KEY`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use gerrit_config::Scope;

/// Owner tag under which all credentials are filed.
pub const DEFAULT_OWNER: &str = "GerritSettings";

/// Key of the global (default) credential.
pub const GLOBAL_SECRET_KEY: &str = "GERRIT_SETTINGS_PASSWORD_KEY";

/// The secret store key for `scope`.
#[must_use]
pub fn secret_key(scope: &Scope) -> String {
    match scope.name() {
        None => GLOBAL_SECRET_KEY.to_owned(),
        Some(name) => STANDARD_NO_PAD.encode(name.as_bytes()),
    }
}
