// Collecta CLI - debtor document netting from the terminal

mod account;
mod context;
mod documents;
mod exit_codes;
mod netting;
mod notify;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use collecta_client::ClientError;
use collecta_config::ConfigError;
use collecta_netting::GatewayError;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_NETWORK, EXIT_NOT_AUTH, EXIT_SUCCESS, EXIT_UPSTREAM, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "collecta")]
#[command(about = "Accounts-receivable netting: match invoices against payments per debtor")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the API bearer token
    #[command(after_help = "\
Examples:
  collecta login --token $TOKEN
  collecta login --token $TOKEN --api-base https://cobranza.example.cl/api
  echo $TOKEN | collecta login")]
    Login {
        /// Bearer token (prompted on a TTY when omitted)
        #[arg(long, env = "COLLECTA_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// API base URL (defaults to settings api.base_url)
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Remove the stored token
    Logout,

    /// List a debtor's outstanding invoices
    #[command(after_help = "\
Examples:
  collecta invoices 76.123.456-7
  collecta invoices 76.123.456-7 --json")]
    Invoices {
        /// Debtor id
        debtor: String,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List a debtor's payments and credit notes
    #[command(after_help = "\
Examples:
  collecta payments 76.123.456-7")]
    Payments {
        /// Debtor id
        debtor: String,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Preview, submit, or dispute a netting
    #[command(subcommand)]
    Netting(netting::NettingCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: collecta <command> [options]");
            eprintln!("       collecta --help for more information");
            Ok(())
        }
        Some(Commands::Login { token, api_base }) => account::cmd_login(token, api_base),
        Some(Commands::Logout) => account::cmd_logout(),
        Some(Commands::Invoices { debtor, json }) => {
            documents::cmd_list(&debtor, collecta_netting::ListKind::Invoices, json)
        }
        Some(Commands::Payments { debtor, json }) => {
            documents::cmd_list(&debtor, collecta_netting::ListKind::Payments, json)
        }
        Some(Commands::Netting(cmd)) => netting::cmd_netting(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Also installs the `log` bridge, so library crates' records show up here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Error already shown to the user (e.g. by a notification).
    pub fn silent(code: u8) -> Self {
        Self::new(code, "")
    }

    pub fn config(err: ConfigError) -> Self {
        Self::new(EXIT_CONFIG, err.to_string())
            .with_hint(format!("check {}", collecta_config::Settings::config_path().display()))
    }

    pub fn client(err: ClientError) -> Self {
        match err {
            ClientError::NotAuthenticated => Self::new(EXIT_NOT_AUTH, err.to_string())
                .with_hint("run `collecta login` or set COLLECTA_TOKEN"),
            ClientError::Http(401, _) | ClientError::Http(403, _) => {
                Self::new(EXIT_NOT_AUTH, "API token was rejected")
                    .with_hint("run `collecta login` with a fresh token")
            }
            ClientError::Network(_) => Self::new(EXIT_NETWORK, err.to_string()),
            ClientError::Io(_) => Self::other(err.to_string()),
            _ => Self::new(EXIT_UPSTREAM, err.to_string()),
        }
    }

    pub fn gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::Network(_) => Self::new(EXIT_NETWORK, err.to_string()),
            GatewayError::Rejected { status: 401 | 403, .. } => {
                Self::new(EXIT_NOT_AUTH, "API token was rejected")
                    .with_hint("run `collecta login` with a fresh token")
            }
            _ => Self::new(EXIT_UPSTREAM, err.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_netting_preview() {
        let cli = Cli::try_parse_from([
            "collecta", "netting", "preview", "d1", "--invoice", "i1", "--invoice", "i2",
            "--all-payments", "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Netting(_))));
    }

    #[test]
    fn client_errors_map_to_exit_codes() {
        assert_eq!(CliError::client(ClientError::NotAuthenticated).code, EXIT_NOT_AUTH);
        assert_eq!(CliError::client(ClientError::Http(403, String::new())).code, EXIT_NOT_AUTH);
        assert_eq!(CliError::client(ClientError::Network("x".into())).code, EXIT_NETWORK);
        assert_eq!(CliError::client(ClientError::Http(500, String::new())).code, EXIT_UPSTREAM);
        assert_eq!(CliError::client(ClientError::Validation("bad".into())).code, EXIT_UPSTREAM);
    }

    #[test]
    fn gateway_errors_map_to_exit_codes() {
        let e = GatewayError::Rejected { status: 401, message: String::new() };
        assert_eq!(CliError::gateway(e).code, EXIT_NOT_AUTH);
        assert_eq!(CliError::gateway(GatewayError::Malformed("x".into())).code, EXIT_UPSTREAM);
    }
}
