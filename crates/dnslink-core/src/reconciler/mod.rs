//! DNS record reconciler
//!
//! Converges a zone to exactly one dnslink TXT record at a hostname.
//!
//! ## State sequence
//!
//! ```text
//! Start ──fetch──▶ Fetched ──already correct──▶ NoOp
//!                     │
//!                     ├──create──▶ Created ──retire stale──▶ Done
//!                     │
//!                     └──desired present, stale duplicates──▶ Done
//! ```
//!
//! The new record is always created before any stale record is deleted, so
//! an observer never sees the hostname without a dnslink record. The price
//! is a short window with two records, which the 300s TTL bounds. If a
//! stale delete fails the window stays open; that residue is reported in
//! [`ReconcileOutcome::warnings`] and there is no rollback.

use std::fmt;
use tracing::{debug, info, warn};

use crate::cid::ContentId;
use crate::config::DEFAULT_DNSLINK_TTL;
use crate::error::{CleanupReport, Result};
use crate::traits::{DnsProvider, DnsRecord, NewDnsRecord};

/// Reconciler progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// Nothing observed yet
    Start,
    /// Zone records listed
    Fetched,
    /// Zone already correct, nothing mutated (terminal)
    NoOp,
    /// New record created
    Created,
    /// Stale records retired (terminal)
    Done,
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconcileState::Start => "start",
            ReconcileState::Fetched => "fetched",
            ReconcileState::NoOp => "no-op",
            ReconcileState::Created => "created",
            ReconcileState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of one reconcile run
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// Terminal state ([`ReconcileState::NoOp`] or [`ReconcileState::Done`])
    pub state: ReconcileState,

    /// The desired TXT value
    pub desired: String,

    /// Record created by this run, if any
    pub created: Option<DnsRecord>,

    /// Stale dnslink records found at the hostname
    pub stale: Vec<DnsRecord>,

    /// One report per stale record deletion attempted
    pub retired: Vec<CleanupReport>,

    /// Mutations were logged, not executed
    pub dry_run: bool,
}

impl ReconcileOutcome {
    /// Whether the zone was already correct
    pub fn is_noop(&self) -> bool {
        self.state == ReconcileState::NoOp
    }

    /// Warnings for every stale record that could not be deleted
    pub fn warnings(&self) -> Vec<String> {
        self.retired
            .iter()
            .filter_map(|report| {
                report.warning().map(|w| {
                    format!("{} (stale dnslink record may linger next to the new one)", w)
                })
            })
            .collect()
    }
}

/// Converges a DNS zone to one dnslink record
pub struct DnsReconciler<'a> {
    provider: &'a dyn DnsProvider,
    ttl: u32,
    dry_run: bool,
}

impl<'a> DnsReconciler<'a> {
    /// Create a reconciler using the default 300s TTL
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self {
            provider,
            ttl: DEFAULT_DNSLINK_TTL,
            dry_run: false,
        }
    }

    /// Override the TTL of created records
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Log mutations instead of performing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Point `hostname` in `zone_id` at `cid`
    ///
    /// # Errors
    ///
    /// Listing and creation failures are fatal and surfaced unretried. A
    /// failed creation means no deletion is attempted, so the old record
    /// keeps serving. Deletion failures are reported in the outcome only.
    pub async fn reconcile(
        &self,
        zone_id: &str,
        hostname: &str,
        cid: &ContentId,
    ) -> Result<ReconcileOutcome> {
        let provider = self.provider.provider_name();
        let desired = cid.dnslink_value();
        let mut state = ReconcileState::Start;

        info!(
            provider,
            hostname,
            desired = %desired,
            mode = if self.dry_run { "DRY-RUN" } else { "LIVE" },
            "Updating dnslink"
        );

        let records = self.provider.list_records(zone_id).await?;
        transition(&mut state, ReconcileState::Fetched);

        let located: Vec<DnsRecord> = records
            .into_iter()
            .filter(|r| r.is_txt() && r.matches_hostname(hostname) && r.is_dnslink())
            .collect();

        for record in &located {
            info!(record_id = %record.id, value = %record.value, "Found previous dnslink");
        }
        if located.len() > 1 {
            warn!(
                hostname,
                count = located.len(),
                "Multiple dnslink records at hostname, retiring all but the desired one"
            );
        }

        let mut current = None;
        let mut stale = Vec::new();
        for record in located {
            if current.is_none() && record.value == desired {
                current = Some(record);
            } else {
                stale.push(record);
            }
        }

        if current.is_some() && stale.is_empty() {
            info!(hostname, "Target dnslink is already set");
            transition(&mut state, ReconcileState::NoOp);
            return Ok(ReconcileOutcome {
                state,
                desired,
                created: None,
                stale,
                retired: Vec::new(),
                dry_run: self.dry_run,
            });
        }

        let mut created = None;
        if current.is_none() {
            let new_record = NewDnsRecord::txt(hostname, desired.as_str(), self.ttl);
            if self.dry_run {
                info!(
                    "[DRY-RUN] Would create record: {}",
                    serde_json::to_string(&new_record)?
                );
            } else {
                let record = self.provider.create_record(zone_id, &new_record).await?;
                info!(record_id = %record.id, "Created dnslink record");
                created = Some(record);
            }
            transition(&mut state, ReconcileState::Created);
        }

        let mut retired = Vec::with_capacity(stale.len());
        for record in &stale {
            if self.dry_run {
                info!(record_id = %record.id, value = %record.value, "[DRY-RUN] Would delete stale dnslink record");
                continue;
            }

            let result = self.provider.delete_record(zone_id, &record.id).await;
            match &result {
                Ok(()) => info!(record_id = %record.id, "Deleted stale dnslink record"),
                Err(e) => warn!(
                    record_id = %record.id,
                    error = %e,
                    "Failed to delete stale dnslink record; it will linger until removed by hand"
                ),
            }
            retired.push(CleanupReport::new(record.id.as_str(), result));
        }
        transition(&mut state, ReconcileState::Done);

        Ok(ReconcileOutcome {
            state,
            desired,
            created,
            stale,
            retired,
            dry_run: self.dry_run,
        })
    }
}

fn transition(state: &mut ReconcileState, next: ReconcileState) {
    debug!(from = %state, to = %next, "Reconcile state");
    *state = next;
}
