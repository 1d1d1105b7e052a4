//! Configuration types for the zone scanner
//!
//! This module defines all configuration structures used throughout the crate.
//! A configuration is loaded once per run and passed by reference afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::policy::RedirectExclusion;

/// Main scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// TTL policy configuration
    pub policy: PolicyConfig,

    /// Scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,

    /// Result delivery
    #[serde(default)]
    pub report: ReportConfig,

    /// Raise log verbosity to debug
    #[serde(default)]
    pub verbose: bool,
}

impl CheckConfig {
    /// Create a configuration for the given provider and minimum TTL, defaults elsewhere
    pub fn new(provider: ProviderConfig, min_ttl: u32) -> Self {
        Self {
            provider,
            policy: PolicyConfig::new(min_ttl),
            scan: ScanConfig::default(),
            report: ReportConfig::default(),
            verbose: false,
        }
    }

    /// Load, interpolate and validate a YAML configuration file
    ///
    /// `${NAME}` placeholders are resolved from the process environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content, |name| std::env::var(name).ok())
    }

    /// Parse a YAML configuration, resolving `${NAME}` placeholders with `lookup`
    pub fn from_yaml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rendered = interpolate_env(content, lookup)?;
        let config: CheckConfig = serde_yaml::from_str(&rendered)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        self.scan.validate()?;
        self.report.validate()?;

        // Surfaces malformed CIDR blocks before any provider call is made
        RedirectExclusion::from_blocks(&self.policy.redirect_blocks)?;

        Ok(())
    }
}

/// Replace every `${NAME}` in `content` with `lookup(NAME)`
///
/// A placeholder whose variable is unset is a configuration error, so a
/// missing secret is never silently rendered as an empty string.
///
/// Substitution runs over the raw text before YAML parsing, so placeholders
/// inside `#` comments are resolved too and must also be set.
pub fn interpolate_env<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| Error::config("Unterminated ${...} placeholder in config"))?;

        let name = after[..end].trim();
        if name.is_empty() {
            return Err(Error::config("Empty ${} placeholder in config"));
        }

        let value = lookup(name).ok_or_else(|| {
            Error::config(format!(
                "Environment variable {} referenced by config is not set",
                name
            ))
        })?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Dyn Managed DNS
    Dyn {
        /// Customer (account) name
        customer: String,
        /// API user name
        username: String,
        /// API password
        password: String,
        /// Override of the REST endpoint (tests, proxies)
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Dyn {
                customer,
                username,
                password,
                ..
            } => {
                if customer.is_empty() {
                    return Err(Error::config("Dyn customer name cannot be empty"));
                }
                if username.is_empty() {
                    return Err(Error::config("Dyn username cannot be empty"));
                }
                if password.is_empty() {
                    return Err(Error::config("Dyn password cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Dyn { .. } => "dyn",
        }
    }
}

// Credentials stay out of Debug output
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Dyn {
                customer,
                username,
                base_url,
                ..
            } => f
                .debug_struct("Dyn")
                .field("customer", customer)
                .field("username", username)
                .field("password", &"<REDACTED>")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// TTL policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimum acceptable TTL in seconds
    pub min_ttl: u32,

    /// CIDR blocks of the provider's HTTP-redirect service
    ///
    /// Address records resolving into one of these blocks are exempt from
    /// TTL evaluation and from the reverse index.
    #[serde(default = "default_redirect_blocks")]
    pub redirect_blocks: Vec<String>,
}

impl PolicyConfig {
    /// Create a policy with the default redirect blocks
    pub fn new(min_ttl: u32) -> Self {
        Self {
            min_ttl,
            redirect_blocks: default_redirect_blocks(),
        }
    }
}

/// What to do with a zone whose serial matches the checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Carry the checkpoint entry forward and fetch no records
    #[default]
    SkipUnchanged,
    /// Scan every zone; the checkpoint reflects this pass only
    AlwaysRescan,
}

/// Scan behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Handling of zones with an unchanged serial
    #[serde(default)]
    pub skip_policy: SkipPolicy,

    /// Attempts made at listing the zone catalog before the run aborts
    #[serde(default = "default_catalog_attempts")]
    pub catalog_attempts: usize,
}

impl ScanConfig {
    /// Validate the scan configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog_attempts == 0 {
            return Err(Error::config("scan.catalog_attempts must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_policy: SkipPolicy::default(),
            catalog_attempts: default_catalog_attempts(),
        }
    }
}

/// Result delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print the report to stdout
    #[serde(default = "default_print")]
    pub print: bool,

    /// Append the reverse index (target -> zones) to the report
    #[serde(default)]
    pub include_reverse_index: bool,

    /// Slack delivery
    #[serde(default)]
    pub slack: SlackConfig,
}

impl ReportConfig {
    /// Validate the report configuration
    pub fn validate(&self) -> Result<()> {
        self.slack.validate()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            print: default_print(),
            include_reverse_index: false,
            slack: SlackConfig::default(),
        }
    }
}

/// Slack delivery configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Post the report to Slack
    #[serde(default)]
    pub enabled: bool,

    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Channel to post into
    #[serde(default)]
    pub channel_id: String,
}

impl SlackConfig {
    /// Validate the Slack configuration
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.token.is_empty() {
            return Err(Error::config("report.slack.token is required when Slack is enabled"));
        }
        if self.channel_id.is_empty() {
            return Err(Error::config(
                "report.slack.channel_id is required when Slack is enabled",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("enabled", &self.enabled)
            .field("token", &"<REDACTED>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

fn default_redirect_blocks() -> Vec<String> {
    vec!["216.146.0.0/16".to_string()]
}

fn default_catalog_attempts() -> usize {
    crate::engine::DEFAULT_CATALOG_ATTEMPTS
}

fn default_print() -> bool {
    true
}
