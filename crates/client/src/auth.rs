//! Token storage.
//!
//! Reads/writes ~/.config/collecta/auth.json (0600 on Unix).
//! `COLLECTA_TOKEN` in the environment wins over the saved token.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::ClientError;

pub const TOKEN_ENV: &str = "COLLECTA_TOKEN";

/// Authentication credentials stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Bearer token for the collections API
    pub token: String,
    /// API base URL (e.g., "https://api.example.cl/v1")
    pub api_base: String,
    /// Account email (for display)
    #[serde(default)]
    pub user_email: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: String, api_base: String) -> Self {
        Self { token, api_base, user_email: None }
    }
}

/// Returns the path to the auth credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("collecta/auth.json"))
}

/// Load saved credentials from the default location.
pub fn load_auth() -> Option<AuthCredentials> {
    load_auth_from(&auth_file_path()?)
}

/// Load credentials from an explicit file.
/// Returns None if the file is absent or unreadable as credentials.
pub fn load_auth_from(path: &Path) -> Option<AuthCredentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(creds) => Some(creds),
        Err(e) => {
            log::warn!("ignoring invalid credentials file {}: {}", path.display(), e);
            None
        }
    }
}

/// Saved credentials, with the token replaced by `COLLECTA_TOKEN` when set.
///
/// With only the environment token, `default_api_base` supplies the URL.
pub fn resolve_credentials(default_api_base: &str) -> Option<AuthCredentials> {
    let saved = load_auth();
    match std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
        Some(token) => {
            let api_base = saved
                .as_ref()
                .map(|c| c.api_base.clone())
                .unwrap_or_else(|| default_api_base.to_string());
            Some(AuthCredentials {
                token,
                api_base,
                user_email: saved.and_then(|c| c.user_email),
            })
        }
        None => saved,
    }
}

/// Save credentials to the default location.
pub fn save_auth(creds: &AuthCredentials) -> Result<PathBuf, ClientError> {
    let path = auth_file_path()
        .ok_or_else(|| ClientError::Io("could not determine config directory".into()))?;
    save_auth_to(&path, creds)?;
    Ok(path)
}

/// Save credentials to an explicit file.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_auth_to(path: &Path, creds: &AuthCredentials) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ClientError::Io(format!("failed to create config directory: {e}")))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| ClientError::Parse(format!("failed to serialize credentials: {e}")))?;

    std::fs::write(path, &contents)
        .map_err(|e| ClientError::Io(format!("failed to write auth file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| ClientError::Io(format!("failed to set file permissions: {e}")))?;
    }

    Ok(())
}

/// Delete saved credentials. Missing file is not an error.
pub fn delete_auth() -> Result<(), ClientError> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| ClientError::Io(format!("failed to delete auth file: {e}")))?;
    }
    Ok(())
}
