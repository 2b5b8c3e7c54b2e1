//! Test doubles and common utilities for pipeline contract tests
//!
//! Every double appends to a shared [`CallLog`], so tests can assert on the
//! exact order of backend calls across stages. Doubles are `Clone`: a test
//! keeps one handle and hands another to the code under test.

#![allow(dead_code)]

use async_trait::async_trait;
use dnslink_core::config::{DeployConfig, DnsConfig, DnsProviderConfig, PinningConfig, PublishConfig};
use dnslink_core::error::{Error, Result};
use dnslink_core::traits::{
    DnsProvider, DnsRecord, Gateway, NewDnsRecord, Pin, PinFilter, PinningService, UploadOptions,
};
use dnslink_core::ContentId;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

pub const ZONE: &str = "zone-1";
pub const HOST: &str = "_dnslink.app.example.com";
pub const ALIAS: &str = "app";

/// A backend call as seen by the doubles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate,
    ListPins(String),
    Upload(String),
    Unpin(String),
    Probe(String),
    ListRecords(String),
    CreateRecord(String),
    DeleteRecord(String),
}

impl Call {
    /// Whether the call mutates DNS
    pub fn is_dns_mutation(&self) -> bool {
        matches!(self, Call::CreateRecord(_) | Call::DeleteRecord(_))
    }

    /// Whether the call touches DNS at all
    pub fn is_dns(&self) -> bool {
        matches!(
            self,
            Call::ListRecords(_) | Call::CreateRecord(_) | Call::DeleteRecord(_)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn dns_mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_dns_mutation).collect()
    }

    pub fn dns_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_dns).collect()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub fn cid(s: &str) -> ContentId {
    ContentId::new(s).unwrap()
}

pub fn txt(id: &str, hostname: &str, value: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: "TXT".to_string(),
        hostname: hostname.to_string(),
        value: value.to_string(),
        ttl: Some(300),
    }
}

/// A pinning service with scripted pins and failures
#[derive(Clone)]
pub struct MockPinningService {
    log: CallLog,
    previous: Arc<Vec<String>>,
    uploaded: String,
    fail_auth: bool,
    fail_upload: bool,
    fail_unpin: Arc<HashSet<String>>,
    transient_list_failures: Arc<AtomicU32>,
}

impl MockPinningService {
    pub fn new(log: &CallLog, previous: &[&str], uploaded: &str) -> Self {
        Self {
            log: log.clone(),
            previous: Arc::new(previous.iter().map(|s| s.to_string()).collect()),
            uploaded: uploaded.to_string(),
            fail_auth: false,
            fail_upload: false,
            fail_unpin: Arc::new(HashSet::new()),
            transient_list_failures: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing_auth(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_unpin(mut self, cids: &[&str]) -> Self {
        self.fail_unpin = Arc::new(cids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_transient_list_failures(self, n: u32) -> Self {
        self.transient_list_failures.store(n, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl PinningService for MockPinningService {
    async fn authenticate(&self) -> Result<()> {
        self.log.push(Call::Authenticate);
        if self.fail_auth {
            return Err(Error::auth("invalid key"));
        }
        Ok(())
    }

    async fn list_pins(&self, filter: &PinFilter) -> Result<Vec<Pin>> {
        self.log.push(Call::ListPins(filter.alias.clone()));
        let remaining = self.transient_list_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_list_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::api("mock", 503, "busy"));
        }
        Ok(self
            .previous
            .iter()
            .map(|c| Pin {
                cid: cid(c),
                alias: Some(filter.alias.clone()),
            })
            .collect())
    }

    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<ContentId> {
        self.log.push(Call::Upload(options.alias.clone()));
        assert!(path.exists());
        if self.fail_upload {
            return Err(Error::api("mock", 500, "upload failed"));
        }
        ContentId::new(self.uploaded.clone())
    }

    async fn unpin(&self, cid: &ContentId) -> Result<()> {
        self.log.push(Call::Unpin(cid.to_string()));
        if self.fail_unpin.contains(cid.as_str()) {
            return Err(Error::api("mock", 500, format!("cannot unpin {}", cid)));
        }
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "mock"
    }
}

/// A gateway that succeeds from a given attempt on, or never
#[derive(Clone)]
pub struct MockGateway {
    log: CallLog,
    succeed_on: Option<u32>,
    probes: Arc<Mutex<Vec<Instant>>>,
}

impl MockGateway {
    pub fn always_ok(log: &CallLog) -> Self {
        Self::succeeding_on(log, 1)
    }

    pub fn succeeding_on(log: &CallLog, attempt: u32) -> Self {
        Self {
            log: log.clone(),
            succeed_on: Some(attempt),
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn never_ok(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            succeed_on: None,
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn probe_times(&self) -> Vec<Instant> {
        self.probes.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn probe(&self, cid: &ContentId) -> Result<()> {
        self.log.push(Call::Probe(cid.to_string()));
        let attempt = {
            let mut probes = self.probes.lock().unwrap();
            probes.push(Instant::now());
            probes.len() as u32
        };
        match self.succeed_on {
            Some(n) if attempt >= n => Ok(()),
            // Alternate failure shapes: both must count as retryable
            _ if attempt % 2 == 0 => Err(Error::http("connection reset")),
            _ => Err(Error::unavailable("gateway returned 504")),
        }
    }

    fn base_url(&self) -> &str {
        "https://gateway.test"
    }
}

/// A DNS provider backed by an in-memory zone
#[derive(Clone)]
pub struct MockDnsProvider {
    log: CallLog,
    zone: Arc<Mutex<Vec<DnsRecord>>>,
    next_id: Arc<AtomicU32>,
    fail_create: bool,
    fail_list: bool,
    fail_delete: Arc<HashSet<String>>,
}

impl MockDnsProvider {
    pub fn new(log: &CallLog, records: Vec<DnsRecord>) -> Self {
        Self {
            log: log.clone(),
            zone: Arc::new(Mutex::new(records)),
            next_id: Arc::new(AtomicU32::new(1)),
            fail_create: false,
            fail_list: false,
            fail_delete: Arc::new(HashSet::new()),
        }
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_delete(mut self, ids: &[&str]) -> Self {
        self.fail_delete = Arc::new(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.zone.lock().unwrap().clone()
    }

    /// dnslink TXT records currently at `hostname`
    pub fn dnslink_values(&self, hostname: &str) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.is_txt() && r.matches_hostname(hostname) && r.is_dnslink())
            .map(|r| r.value)
            .collect()
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.log.push(Call::ListRecords(zone_id.to_string()));
        if self.fail_list {
            return Err(Error::auth("token rejected"));
        }
        Ok(self.records())
    }

    async fn create_record(&self, _zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord> {
        self.log.push(Call::CreateRecord(record.value.clone()));
        if self.fail_create {
            return Err(Error::api("mock", 422, "{\"message\":\"invalid record\"}"));
        }
        let created = DnsRecord {
            id: format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            record_type: record.record_type.clone(),
            hostname: record.hostname.clone(),
            value: record.value.clone(),
            ttl: Some(record.ttl),
        };
        self.zone.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_record(&self, _zone_id: &str, record_id: &str) -> Result<()> {
        self.log.push(Call::DeleteRecord(record_id.to_string()));
        if self.fail_delete.contains(record_id) {
            return Err(Error::api("mock", 500, "delete failed"));
        }
        self.zone.lock().unwrap().retain(|r| r.id != record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Minimal DNS-only config with fast verification for tests
pub fn dns_config() -> DeployConfig {
    let mut config = DeployConfig::new(DnsConfig::new(
        DnsProviderConfig::Netlify {
            api_token: "test-token".to_string(),
        },
        ZONE,
        HOST,
    ));
    config.verify.max_attempts = 3;
    config.verify.interval_secs = 1;
    config
}

/// DNS config plus a pinning service
pub fn publish_config() -> DeployConfig {
    let mut publish = PublishConfig::new(ALIAS);
    publish.read_interval_secs = 1;
    dns_config().with_pinning(
        PinningConfig::Pinata {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        },
        publish,
    )
}
