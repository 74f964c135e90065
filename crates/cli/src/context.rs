//! Settings + client wiring shared by every networked command.

use std::sync::Arc;
use std::time::Duration;

use collecta_client::{resolve_credentials, ClientError, ClientOptions, CollectionsClient};
use collecta_config::settings::ENV_API_BASE;
use collecta_config::Settings;

use crate::CliError;

pub struct Context {
    pub settings: Settings,
    pub client: Arc<CollectionsClient>,
}

pub fn load_settings() -> Result<Settings, CliError> {
    Settings::load().map_err(CliError::config)
}

pub fn client_options(settings: &Settings) -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_secs(settings.api.timeout_secs),
        list_retries: settings.api.list_retries,
        initial_backoff: Duration::from_millis(settings.api.retry_backoff_ms),
    }
}

/// Load settings and credentials, then build the API client.
///
/// `COLLECTA_API_BASE` wins over the URL saved at login time.
pub fn connect() -> Result<Context, CliError> {
    let settings = load_settings()?;

    let mut creds = resolve_credentials(&settings.api.base_url)
        .ok_or_else(|| CliError::client(ClientError::NotAuthenticated))?;
    if std::env::var(ENV_API_BASE).map(|v| !v.is_empty()).unwrap_or(false) {
        creds.api_base = settings.api.base_url.clone();
    }
    log::debug!("using API at {}", creds.api_base);

    let client = CollectionsClient::new(creds, client_options(&settings)).map_err(CliError::client)?;
    Ok(Context { settings, client: Arc::new(client) })
}
