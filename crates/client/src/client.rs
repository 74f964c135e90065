//! Collections backend HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! List fetches retry transient failures; mutations are sent exactly once.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use collecta_netting::{
    Balance, CompensationRequest, DisputeRequest, DocumentSource, DocumentType, GatewayError,
    LitigationGateway, ReconciliationGateway, SelectableDocument, ServerReply,
};

use crate::auth::{resolve_credentials, AuthCredentials};

pub const USER_AGENT: &str = concat!("collecta/", env!("CARGO_PKG_VERSION"));

/// Error type for backend operations.
#[derive(Debug)]
pub enum ClientError {
    /// No auth credentials configured
    NotAuthenticated,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// File I/O error
    Io(String),
    /// Server returned a validation error (400/422 with message)
    Validation(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotAuthenticated => {
                write!(f, "Not authenticated; run `collecta login` first")
            }
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::Io(msg) => write!(f, "I/O error: {}", msg),
            ClientError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for GatewayError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Network(msg) => GatewayError::Network(msg),
            ClientError::Http(status, message) => GatewayError::Rejected { status, message },
            ClientError::Validation(message) => GatewayError::Rejected { status: 422, message },
            ClientError::NotAuthenticated => GatewayError::Rejected {
                status: 401,
                message: "not authenticated".into(),
            },
            ClientError::Parse(msg) | ClientError::Io(msg) => GatewayError::Malformed(msg),
        }
    }
}

/// Transport knobs, normally filled from settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Extra attempts for list fetches after the first one.
    pub list_retries: u32,
    /// Wait before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            list_retries: 2,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

/// Collections API client (blocking).
#[derive(Clone)]
pub struct CollectionsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
    options: ClientOptions,
}

impl CollectionsClient {
    /// Create a client from saved credentials (or `COLLECTA_TOKEN`).
    pub fn from_saved_auth(default_api_base: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let creds = resolve_credentials(default_api_base).ok_or(ClientError::NotAuthenticated)?;
        Self::new(creds, options)
    }

    /// Create a client with explicit credentials.
    pub fn new(creds: AuthCredentials, options: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: creds.api_base.trim_end_matches('/').to_string(),
            token: creds.token,
            options,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Outstanding invoices (debits) of a debtor.
    pub fn list_invoices(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, ClientError> {
        let url = format!("{}/debtors/{}/invoices", self.api_base, debtor_id);
        let json = self.get_with_retry(&url)?;
        parse_document_list(&json, debtor_id, DocumentType::Invoice)
    }

    /// Payments and credit notes (credits) of a debtor.
    pub fn list_payments(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, ClientError> {
        let url = format!("{}/debtors/{}/payments", self.api_base, debtor_id);
        let json = self.get_with_retry(&url)?;
        parse_document_list(&json, debtor_id, DocumentType::Payment)
    }

    /// Record a compensation. Sent once, no idempotency key.
    pub fn create_reconciliation(&self, req: &CompensationRequest) -> Result<ServerReply, ClientError> {
        let url = format!("{}/reconciliations", self.api_base);
        self.post_for_reply(&url, req)
    }

    /// File a dispute (litigation) for an uncovered balance.
    pub fn create_litigation(&self, req: &DisputeRequest) -> Result<ServerReply, ClientError> {
        let url = format!("{}/litigations", self.api_base);
        self.post_for_reply(&url, req)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get_with_retry(&self, url: &str) -> Result<serde_json::Value, ClientError> {
        let mut backoff = self.options.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.get(url) {
                Ok(resp) => {
                    return resp.json().map_err(|e| ClientError::Parse(e.to_string()));
                }
                Err(e) if is_transient(&e) && attempt < self.options.list_retries => {
                    attempt += 1;
                    log::warn!(
                        "retry {}/{} in {}ms ({})",
                        attempt,
                        self.options.list_retries,
                        backoff.as_millis(),
                        e
                    );
                    thread::sleep(backoff);
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// POST a mutation and read the `{ success, message }` reply.
    ///
    /// A rejection whose body is itself a reply (`success: false`) is
    /// returned as `Ok` so the caller can show the server's message.
    fn post_for_reply<T: serde::Serialize>(&self, url: &str, body: &T) -> Result<ServerReply, ClientError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| ClientError::Network(e.to_string()))?;

        if (200..300).contains(&status) {
            return serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()));
        }

        match serde_json::from_str::<ServerReply>(&text) {
            Ok(reply) if !reply.success => {
                log::debug!("server rejected {} with HTTP {}: {}", url, status, reply.message);
                Ok(reply)
            }
            _ => Err(status_error(status, text)),
        }
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ClientError> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, body));
        }

        Ok(response)
    }
}

fn status_error(status: u16, body: String) -> ClientError {
    if status == 422 || status == 400 {
        return ClientError::Validation(body);
    }
    ClientError::Http(status, body)
}

fn is_transient(e: &ClientError) -> bool {
    match e {
        ClientError::Network(_) => true,
        ClientError::Http(status, _) => *status == 429 || *status >= 500,
        _ => false,
    }
}

// ── Wire parsing ────────────────────────────────────────────────────

/// Accepts a bare array or `{ "data": [...] }`. Items without an id are skipped.
fn parse_document_list(
    json: &serde_json::Value,
    debtor_id: &str,
    default_type: DocumentType,
) -> Result<Vec<SelectableDocument>, ClientError> {
    let items = json
        .as_array()
        .or_else(|| json["data"].as_array())
        .ok_or_else(|| ClientError::Parse("expected a list of documents".into()))?;

    let docs = items
        .iter()
        .filter_map(|item| {
            let Some(id) = id_value(&item["id"]) else {
                log::warn!("skipping document without id: {}", item);
                return None;
            };
            let balance = serde_json::from_value::<Balance>(item["balance"].clone())
                .unwrap_or(Balance::Missing);
            let document_type = item["type"]
                .as_str()
                .and_then(|t| serde_json::from_value(serde_json::Value::String(t.to_string())).ok())
                .unwrap_or_else(|| default_type.clone());
            let owner = id_value(&item["debtor_id"])
                .or_else(|| id_value(&item["debtorId"]))
                .unwrap_or_else(|| debtor_id.to_string());
            let due_date = item["due_date"]
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok());

            Some(SelectableDocument {
                id,
                balance,
                debtor_id: owner,
                document_type,
                due_date,
            })
        })
        .collect();

    Ok(docs)
}

fn id_value(v: &serde_json::Value) -> Option<String> {
    v.as_i64()
        .map(|n| n.to_string())
        .or_else(|| v.as_str().filter(|s| !s.is_empty()).map(String::from))
}

// ── Engine seams ────────────────────────────────────────────────────

impl DocumentSource for CollectionsClient {
    fn list_invoices(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
        CollectionsClient::list_invoices(self, debtor_id).map_err(GatewayError::from)
    }

    fn list_payments(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
        CollectionsClient::list_payments(self, debtor_id).map_err(GatewayError::from)
    }
}

impl ReconciliationGateway for CollectionsClient {
    fn create_reconciliation(&self, req: &CompensationRequest) -> Result<ServerReply, GatewayError> {
        CollectionsClient::create_reconciliation(self, req).map_err(GatewayError::from)
    }
}

impl LitigationGateway for CollectionsClient {
    fn create_litigation(&self, req: &DisputeRequest) -> Result<ServerReply, GatewayError> {
        CollectionsClient::create_litigation(self, req).map_err(GatewayError::from)
    }
}
