// # Zone Provider Trait
//
// Defines the read-only interface the scanner needs from a DNS provider.
//
// ## Implementations
//
// - Dyn Managed DNS: `dyncheck-provider-dyn` crate
//
// ## Usage
//
// ```rust,ignore
// use dyncheck_core::ZoneProvider;
//
// async fn dump(provider: &dyn ZoneProvider) -> dyncheck_core::Result<()> {
//     provider.login().await?;
//     for zone_id in provider.list_zones().await? {
//         let zone = provider.get_zone(&zone_id).await?;
//         println!("{} serial {}", zone.name, zone.serial);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Zone metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    /// Zone name (e.g. "example.com")
    pub name: String,
    /// Provider-assigned serial, incremented on every content change
    pub serial: u64,
}

/// Type-specific record payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// Address record pointing at an IP
    Address(String),
    /// Alias record pointing at another name
    Alias(String),
    /// Payload the scanner does not interpret
    Other,
}

/// Detail of a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDetail {
    /// Owning zone
    pub zone: String,
    /// Fully-qualified record name
    pub fqdn: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Type-specific payload
    pub data: RecordData,
}

/// Trait for DNS provider implementations
///
/// Implementations translate these calls into provider API requests and
/// nothing else.
///
/// # Single-shot
///
/// Providers never retry, back off, or cache between calls. Every failure is
/// returned to the caller; the scanner owns the decision of whether a failure
/// is retried (zone catalog), skipped (zone or record), or fatal (login).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Open an authenticated session
    ///
    /// Failures should be reported as `Error::Authentication` when the
    /// credentials were rejected.
    async fn login(&self) -> Result<(), crate::Error>;

    /// List zone identifiers in catalog order
    async fn list_zones(&self) -> Result<Vec<String>, crate::Error>;

    /// Fetch metadata for a zone identifier returned by [`list_zones`](Self::list_zones)
    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo, crate::Error>;

    /// List record identifiers of a zone in listing order
    async fn list_records(&self, zone_id: &str) -> Result<Vec<String>, crate::Error>;

    /// Fetch the detail of a record identifier returned by [`list_records`](Self::list_records)
    async fn get_record(&self, record_path: &str) -> Result<RecordDetail, crate::Error>;

    /// Close the session
    async fn logout(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone providers from configuration
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ZoneProvider>, crate::Error>;
}
