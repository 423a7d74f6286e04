use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::errors::{ServiceError, ServiceResult};
use crate::models::Credential;

/// Reads the API login from `path`: one line, surrounding whitespace trimmed.
///
/// An absent, unreadable or blank file is a `MissingCredential`.
pub fn load_api_login(path: &Path) -> ServiceResult<Credential> {
    let raw = fs::read_to_string(path).map_err(|err| {
        let reason = match err.kind() {
            ErrorKind::NotFound => "file not found".to_string(),
            _ => err.to_string(),
        };
        ServiceError::missing_credential(path, reason)
    })?;

    let login = raw.trim();
    if login.is_empty() {
        return Err(ServiceError::missing_credential(path, "file is empty"));
    }

    debug!(path = %path.display(), "API login loaded");
    Ok(Credential::new(login))
}
