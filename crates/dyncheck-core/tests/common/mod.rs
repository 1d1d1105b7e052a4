//! Test doubles and common utilities for scanner contract tests
//!
//! The scripted provider serves a fixed catalog and counts every call so
//! tests can assert on which provider operations were (not) performed.

#![allow(dead_code)]

use dyncheck_core::config::{CheckConfig, ProviderConfig};
use dyncheck_core::error::{Error, Result};
use dyncheck_core::traits::{RecordData, RecordDetail, ZoneInfo, ZoneProvider};
use dyncheck_core::{CheckpointStore, ScanRunner};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How `login()` should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// Credentials rejected
    Rejected,
    /// Transport error on the first `n` attempts
    Transient(usize),
}

#[derive(Default)]
struct Script {
    zones: Vec<(String, ZoneInfo)>,
    records: HashMap<String, Vec<String>>,
    details: HashMap<String, RecordDetail>,
    catalog_failures: usize,
    failing_zones: HashSet<String>,
    failing_listings: HashSet<String>,
    failing_records: HashSet<String>,
    login_failure: Option<LoginFailure>,
    next_id: u64,
}

/// Call counters shared between a provider and its clones
#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub logout: AtomicUsize,
    pub list_zones: AtomicUsize,
    pub get_zone: AtomicUsize,
    pub list_records: AtomicUsize,
    pub get_record: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

/// A ZoneProvider serving a scripted catalog
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
    pub calls: Arc<Calls>,
}

/// Catalog identifier of a zone
pub fn zone_id(zone: &str) -> String {
    format!("/REST/Zone/{}/", zone)
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with the given serial
    pub fn zone(self, name: &str, serial: u64) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.zones.push((
                zone_id(name),
                ZoneInfo {
                    name: name.to_string(),
                    serial,
                },
            ));
            script.records.entry(zone_id(name)).or_default();
        }
        self
    }

    /// Add an address record
    pub fn address(self, zone: &str, fqdn: &str, address: &str, ttl: u32) -> Self {
        self.record(zone, "A", fqdn, ttl, RecordData::Address(address.to_string()))
    }

    /// Add an alias record
    pub fn alias(self, zone: &str, fqdn: &str, target: &str, ttl: u32) -> Self {
        self.record(zone, "CNAME", fqdn, ttl, RecordData::Alias(target.to_string()))
    }

    /// Add a record of another kind (e.g. "MX", "TXT", "AAAA")
    pub fn other(self, zone: &str, kind: &str, fqdn: &str, ttl: u32) -> Self {
        self.record(zone, kind, fqdn, ttl, RecordData::Other)
    }

    /// Add a record with an explicit kind segment and payload
    pub fn record(self, zone: &str, kind: &str, fqdn: &str, ttl: u32, data: RecordData) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.next_id += 1;
            let path = format!("/REST/{}Record/{}/{}/{}", kind, zone, fqdn, script.next_id);
            script
                .records
                .entry(zone_id(zone))
                .or_default()
                .push(path.clone());
            script.details.insert(
                path,
                RecordDetail {
                    zone: zone.to_string(),
                    fqdn: fqdn.to_string(),
                    ttl,
                    data,
                },
            );
        }
        self
    }

    /// Fail the next `n` catalog listings
    pub fn failing_catalog(self, n: usize) -> Self {
        self.script.lock().unwrap().catalog_failures = n;
        self
    }

    /// Fail metadata fetches for a zone
    pub fn failing_zone(self, zone: &str) -> Self {
        self.script.lock().unwrap().failing_zones.insert(zone_id(zone));
        self
    }

    /// Fail record listing for a zone
    pub fn failing_listing(self, zone: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .failing_listings
            .insert(zone_id(zone));
        self
    }

    /// Fail detail fetches for a record name
    pub fn failing_record(self, fqdn: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .failing_records
            .insert(fqdn.to_string());
        self
    }

    /// Make `login()` fail
    pub fn failing_login(self, failure: LoginFailure) -> Self {
        self.script.lock().unwrap().login_failure = Some(failure);
        self
    }

    /// Change a zone's serial (provider-side edit between runs)
    pub fn set_serial(&self, zone: &str, serial: u64) {
        let mut script = self.script.lock().unwrap();
        for (_, info) in script.zones.iter_mut() {
            if info.name == zone {
                info.serial = serial;
            }
        }
    }

    /// Change a record's TTL (provider-side edit between runs)
    pub fn set_ttl(&self, fqdn: &str, ttl: u32) {
        let mut script = self.script.lock().unwrap();
        for detail in script.details.values_mut() {
            if detail.fqdn == fqdn {
                detail.ttl = ttl;
            }
        }
    }

    /// Record paths passed to `get_record()`, in call order
    pub fn fetched_records(&self) -> Vec<String> {
        self.calls.fetched.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn list_zones_calls(&self) -> usize {
        Self::count(&self.calls.list_zones)
    }

    pub fn list_records_calls(&self) -> usize {
        Self::count(&self.calls.list_records)
    }

    pub fn get_record_calls(&self) -> usize {
        Self::count(&self.calls.get_record)
    }

    pub fn login_calls(&self) -> usize {
        Self::count(&self.calls.login)
    }

    pub fn logout_calls(&self) -> usize {
        Self::count(&self.calls.logout)
    }
}

#[async_trait::async_trait]
impl ZoneProvider for ScriptedProvider {
    async fn login(&self) -> Result<()> {
        let attempt = self.calls.login.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script.lock().unwrap().login_failure {
            Some(LoginFailure::Rejected) => Err(Error::auth("bad credentials")),
            Some(LoginFailure::Transient(n)) if attempt <= n => {
                Err(Error::provider("scripted", "connection reset"))
            }
            _ => Ok(()),
        }
    }

    async fn list_zones(&self) -> Result<Vec<String>> {
        self.calls.list_zones.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.catalog_failures > 0 {
            script.catalog_failures -= 1;
            return Err(Error::provider("scripted", "HTTP 503"));
        }
        Ok(script.zones.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn get_zone(&self, zone_id: &str) -> Result<ZoneInfo> {
        self.calls.get_zone.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        if script.failing_zones.contains(zone_id) {
            return Err(Error::provider("scripted", "HTTP 500"));
        }
        script
            .zones
            .iter()
            .find(|(id, _)| id == zone_id)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| Error::not_found(zone_id))
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<String>> {
        self.calls.list_records.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        if script.failing_listings.contains(zone_id) {
            return Err(Error::provider("scripted", "HTTP 500"));
        }
        Ok(script.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn get_record(&self, record_path: &str) -> Result<RecordDetail> {
        self.calls.get_record.fetch_add(1, Ordering::SeqCst);
        self.calls
            .fetched
            .lock()
            .unwrap()
            .push(record_path.to_string());
        let script = self.script.lock().unwrap();
        let detail = script
            .details
            .get(record_path)
            .cloned()
            .ok_or_else(|| Error::not_found(record_path))?;
        if script.failing_records.contains(&detail.fqdn) {
            return Err(Error::provider("scripted", "HTTP 500"));
        }
        Ok(detail)
    }

    async fn logout(&self) -> Result<()> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Minimal configuration with the given minimum TTL
pub fn minimal_config(min_ttl: u32) -> CheckConfig {
    CheckConfig::new(
        ProviderConfig::Dyn {
            customer: "acme".to_string(),
            username: "auditor".to_string(),
            password: "test-password".to_string(),
            base_url: None,
        },
        min_ttl,
    )
}

/// Build a runner over clones of `provider` and `store`
pub fn runner<S>(provider: &ScriptedProvider, store: &S, config: &CheckConfig) -> ScanRunner
where
    S: CheckpointStore + Clone + 'static,
{
    ScanRunner::new(Box::new(provider.clone()), Box::new(store.clone()), config)
        .expect("runner construction succeeds")
}
