//! `collecta login` / `collecta logout`.

use std::io::{self, BufRead, Write};

use collecta_client::{delete_auth, save_auth, AuthCredentials, TOKEN_ENV};

use crate::context::load_settings;
use crate::CliError;

pub fn cmd_login(token: Option<String>, api_base: Option<String>) -> Result<(), CliError> {
    // --token flag (or COLLECTA_TOKEN via clap) > prompt / piped stdin
    let token = match token.filter(|t| !t.trim().is_empty()) {
        Some(t) => t.trim().to_string(),
        None => read_token()?,
    };

    let api_base = match api_base {
        Some(base) => base,
        None => load_settings()?.api.base_url,
    };
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
        return Err(CliError::usage(format!("invalid API base URL: {api_base}"))
            .with_hint("use an http:// or https:// URL"));
    }

    let creds = AuthCredentials::new(token, api_base.trim_end_matches('/').to_string());
    let path = save_auth(&creds).map_err(CliError::client)?;

    eprintln!("Token saved to {}", path.display());
    eprintln!("  API: {}", creds.api_base);
    Ok(())
}

fn read_token() -> Result<String, CliError> {
    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        eprint!("Collections API token: ");
        io::stderr().flush().ok();
    }

    let mut buf = String::new();
    io::stdin()
        .lock()
        .read_line(&mut buf)
        .map_err(|e| CliError::other(e.to_string()))?;

    let trimmed = buf.trim().to_string();
    if trimmed.is_empty() {
        let msg = if interactive {
            "No token provided"
        } else {
            "No token provided and stdin is empty"
        };
        return Err(CliError::usage(msg).with_hint(format!("pass --token or set {TOKEN_ENV}")));
    }
    Ok(trimmed)
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(CliError::client)?;
    eprintln!("Logged out");
    Ok(())
}
