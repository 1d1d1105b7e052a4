// # Dyn Managed DNS Provider
//
// This crate provides a read-only Dyn Managed DNS provider for the dyncheck
// scanner.
//
// ## Scope
//
// - Opens and closes one REST session per run
// - Lists zones, zone metadata, record paths, and record details
// - Performs exactly one HTTP request per trait call
// - Never retries (the catalog retry is owned by the scan engine)
// - Never modifies zones
//
// ## Security Requirements
//
// - Password and session token NEVER appear in logs or Debug output
// - Credentials are expected to come from the configuration file,
//   optionally interpolated from the environment
//
// ## API Reference
//
// - Open session: POST `/Session/` `{customer_name, user_name, password}`
// - Close session: DELETE `/Session/`
// - List zones: GET `/Zone/` -> `["/REST/Zone/example.com/", ...]`
// - Zone metadata: GET `/Zone/:zone/` -> `{zone, serial, ...}`
// - List records: GET `/AllRecord/:zone/` -> `["/REST/ARecord/:zone/:fqdn/:id", ...]`
// - Record detail: GET `/:Kind/:zone/:fqdn/:id` -> `{zone, fqdn, ttl, rdata, record_type}`

use async_trait::async_trait;
use dyncheck_core::config::ProviderConfig;
use dyncheck_core::traits::{RecordData, RecordDetail, ZoneInfo, ZoneProvider, ZoneProviderFactory};
use dyncheck_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;

/// Dyn REST API base URL
pub const DYN_API_BASE: &str = "https://api.dynect.net/REST";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the session token
const AUTH_HEADER: &str = "Auth-Token";

/// Prefix every path returned by the API carries
const REST_PREFIX: &str = "/REST/";

/// Common response envelope
///
/// `data` stays untyped until `status` is known: failures carry `{}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    msgs: Vec<ApiMessage>,
}

impl Envelope {
    fn is_success(&self) -> bool {
        self.status == "success"
    }

    fn into_data<T: DeserializeOwned>(self, what: &str) -> Result<T> {
        if !self.is_success() {
            return Err(Error::provider(
                "dyn",
                format!("{} failed: {}", what, describe(&self.msgs)),
            ));
        }

        serde_json::from_value(self.data).map_err(|e| {
            Error::provider("dyn", format!("Invalid response format for {}: {}", what, e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(rename = "INFO", default)]
    info: String,
    #[serde(rename = "ERR_CD", default)]
    err_cd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionData {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ZoneData {
    zone: String,
    serial: u64,
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    zone: String,
    fqdn: String,
    ttl: u32,
    #[serde(default)]
    record_type: String,
    #[serde(default)]
    rdata: RData,
}

#[derive(Debug, Default, Deserialize)]
struct RData {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    cname: Option<String>,
}

impl RecordPayload {
    fn into_detail(self) -> RecordDetail {
        let data = match (self.record_type.as_str(), self.rdata) {
            ("A", RData { address: Some(address), .. }) => RecordData::Address(address),
            ("CNAME", RData { cname: Some(cname), .. }) => RecordData::Alias(cname),
            _ => RecordData::Other,
        };

        RecordDetail {
            zone: self.zone,
            fqdn: self.fqdn,
            ttl: self.ttl,
            data,
        }
    }
}

/// Dyn Managed DNS provider
///
/// # Session
///
/// [`ZoneProvider::login()`] stores the session token; every later call
/// sends it in the `Auth-Token` header. Calls made before login fail with
/// an authentication error.
///
/// # Security
///
/// The Debug implementation does NOT expose the password or session token.
pub struct DynProvider {
    customer: String,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for DynProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynProvider")
            .field("customer", &self.customer)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DynProvider {
    /// Create a new Dyn provider
    ///
    /// # Parameters
    ///
    /// - `customer`: Dyn customer (account) name
    /// - `username`: API user
    /// - `password`: API password
    /// - `base_url`: REST endpoint override; defaults to [`DYN_API_BASE`]
    pub fn new(
        customer: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider("dyn", format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url
            .unwrap_or_else(|| DYN_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            customer: customer.into(),
            username: username.into(),
            password: password.into(),
            base_url,
            client,
            token: RwLock::new(None),
        })
    }

    /// Endpoint the provider talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path, with or without the `/REST/` prefix
    fn url(&self, resource: &str) -> String {
        let resource = resource
            .strip_prefix(REST_PREFIX)
            .unwrap_or(resource)
            .trim_start_matches('/');
        format!("{}/{}", self.base_url, resource)
    }

    async fn session_token(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::auth("Dyn session is not open"))
    }

    /// GET a resource and unwrap the `data` member
    async fn get<T: DeserializeOwned>(&self, resource: &str, what: &str) -> Result<T> {
        let token = self.session_token().await?;
        let url = self.url(resource);
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("dyn", format!("HTTP request failed: {}", e)))?;

        Self::envelope(response, what).await?.into_data(what)
    }

    /// Check the status code and decode the envelope
    async fn envelope(response: reqwest::Response, what: &str) -> Result<Envelope> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &error_text, what));
        }

        response
            .json()
            .await
            .map_err(|e| Error::provider("dyn", format!("Failed to parse {}: {}", what, e)))
    }
}

/// Map an HTTP error status to a crate error
fn status_error(status: reqwest::StatusCode, body: &str, what: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Dyn rejected the session or credentials. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{} not found", what)),
        429 => Error::provider(
            "dyn",
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            "dyn",
            format!("Dyn server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider("dyn", format!("{} failed: {} - {}", what, status, body)),
    }
}

fn describe(msgs: &[ApiMessage]) -> String {
    if msgs.is_empty() {
        return "no details".to_string();
    }
    msgs.iter()
        .map(|m| match &m.err_cd {
            Some(code) => format!("{} ({})", m.info, code),
            None => m.info.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl ZoneProvider for DynProvider {
    /// Open a session
    ///
    /// ```http
    /// POST /Session/
    /// {"customer_name": "...", "user_name": "...", "password": "..."}
    /// ```
    async fn login(&self) -> Result<()> {
        tracing::debug!("Opening Dyn session for {}/{}", self.customer, self.username);

        let response = self
            .client
            .post(self.url("Session/"))
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "customer_name": self.customer,
                "user_name": self.username,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| Error::provider("dyn", format!("HTTP request failed: {}", e)))?;

        let envelope = Self::envelope(response, "session").await?;
        if !envelope.is_success() {
            return Err(Error::auth(format!(
                "Dyn refused the session: {}",
                describe(&envelope.msgs)
            )));
        }

        let session: SessionData = envelope.into_data("session")?;

        *self.token.write().await = Some(session.token);
        Ok(())
    }

    async fn list_zones(&self) -> Result<Vec<String>> {
        self.get("Zone/", "zone list").await
    }

    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo> {
        let uri = zone_id.strip_prefix("/REST/Zone/").unwrap_or(zone_id);
        let data: ZoneData = self.get(&format!("Zone/{}", uri), "zone").await?;

        Ok(ZoneInfo {
            name: data.zone,
            serial: data.serial,
        })
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<String>> {
        let uri = zone_id.strip_prefix("/REST/Zone/").unwrap_or(zone_id);
        self.get(&format!("AllRecord/{}", uri), "record list").await
    }

    async fn get_record(&self, record_path: &str) -> Result<RecordDetail> {
        let payload: RecordPayload = self.get(record_path, "record").await?;
        Ok(payload.into_detail())
    }

    /// Close the session; a provider that never logged in has nothing to close
    async fn logout(&self) -> Result<()> {
        let Some(token) = self.token.write().await.take() else {
            return Ok(());
        };

        let response = self
            .client
            .delete(self.url("Session/"))
            .header(AUTH_HEADER, token)
            .send()
            .await
            .map_err(|e| Error::provider("dyn", format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text, "logout"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "dyn"
    }
}

/// Factory for creating Dyn providers
pub struct DynFactory;

impl ZoneProviderFactory for DynFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneProvider>> {
        let ProviderConfig::Dyn {
            customer,
            username,
            password,
            base_url,
        } = config;

        if customer.is_empty() || username.is_empty() || password.is_empty() {
            return Err(Error::config(
                "Dyn provider requires customer, username and password",
            ));
        }

        Ok(Box::new(DynProvider::new(
            customer.clone(),
            username.clone(),
            password.clone(),
            base_url.clone(),
        )?))
    }
}

/// Register the Dyn provider with a registry
///
/// # Example
///
/// ```rust
/// use dyncheck_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dyncheck_provider_dyn::register(&registry);
/// assert!(registry.has_provider("dyn"));
/// ```
pub fn register(registry: &dyncheck_core::ProviderRegistry) {
    registry.register_provider("dyn", Box::new(DynFactory));
}
