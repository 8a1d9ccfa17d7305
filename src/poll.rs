//! The fetch → select → deliver → persist loop.
//!
//! [`PollLoop::step`] runs exactly one cycle and reports what happened;
//! [`PollLoop::run_until`] drives it on a fixed sleep between cycles.
//! Cycles are awaited one after another, so they never overlap.
//!
//! ## Sequencing
//!
//! An id is appended to the sent set only after the notifier reports
//! success, and the set is written to disk right after that.  A failed
//! delivery therefore leaves no trace and the same entry is retried next
//! cycle.  A failed write keeps the id in memory (this process will not send
//! it again) and is retried at the start of every following cycle; only a
//! restart before that retry succeeds can produce a duplicate.
//!
//! ## For contributors
//!
//! Nothing returned by `step` stops the loop.  Startup problems (bad config,
//! corrupt store) are handled before the loop exists, in `main`.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{RelayError, Result};
use crate::filter::select_newest;
use crate::notify::Notifier;
use crate::source::FeedSource;
use crate::store::{IdStore, SentIds};

/// What one successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every fetched entry was already known (or malformed).
    NoNewEntries,
    /// This id was delivered and recorded.
    Delivered { id: String },
}

/// Owns the sent-id set and every collaborator for the life of the process.
pub struct PollLoop<F, N, S> {
    source: F,
    notifier: N,
    store: S,
    sent: SentIds,
    /// The in-memory set is ahead of what is on disk.
    pending_save: bool,
    interval: Duration,
}

impl<F, N, S> PollLoop<F, N, S>
where
    F: FeedSource,
    N: Notifier,
    S: IdStore,
{
    /// Load the persisted set and build the loop.
    ///
    /// Fails if the store is unreadable or corrupt; history is never
    /// silently discarded.
    pub fn new(source: F, notifier: N, store: S, interval: Duration) -> Result<Self> {
        let sent = store.load()?;
        if sent.is_empty() {
            info!("no sent ids on record, starting fresh");
        } else {
            info!("loaded {} previously sent ids", sent.len());
        }

        Ok(Self {
            source,
            notifier,
            store,
            sent,
            pending_save: false,
            interval,
        })
    }

    pub fn sent(&self) -> &SentIds {
        &self.sent
    }

    /// Run one cycle.
    pub async fn step(&mut self) -> Result<CycleOutcome> {
        if self.pending_save {
            match self.persist() {
                Ok(()) => info!("recovered pending write of sent ids"),
                Err(e) => error!("still cannot persist sent ids: {e}"),
            }
        }

        let entries = self.source.fetch().await?;
        debug!(source = self.source.name(), "fetched {} entries", entries.len());

        let Some(selected) = select_newest(&entries, &self.sent) else {
            return Ok(CycleOutcome::NoNewEntries);
        };

        let entry = selected.entry;
        self.notifier
            .deliver(&entry.title, entry.link.as_deref().unwrap_or_default())
            .await?;
        info!(id = %selected.id, published = ?entry.published, "relayed {:?}", entry.title);

        self.sent.push(selected.id.clone());
        self.pending_save = true;
        self.persist()?;

        Ok(CycleOutcome::Delivered { id: selected.id })
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.sent)?;
        self.pending_save = false;
        Ok(())
    }

    /// Run one cycle and log its result.  Never fails.
    async fn cycle(&mut self) {
        match self.step().await {
            Ok(CycleOutcome::NoNewEntries) => debug!("no new entries"),
            Ok(CycleOutcome::Delivered { id }) => debug!("cycle done, {id} recorded"),
            Err(e @ RelayError::StoreWrite { .. }) => {
                error!("delivered but not persisted: {e}")
            }
            Err(e) => warn!(source = self.source.name(), "cycle failed: {e}"),
        }
    }

    /// Poll forever, sleeping the configured interval after every cycle,
    /// until `shutdown` resolves.  Shutdown is only observed between cycles.
    ///
    /// `shutdown` is polled once before the first cycle so that listeners it
    /// sets up (such as a Ctrl-C handler) are installed before any delivery.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("shutdown requested before the first cycle");
                return;
            }
            _ = std::future::ready(()) => {}
        }

        info!(
            source = self.source.name(),
            known = self.sent().len(),
            "polling every {}s",
            self.interval.as_secs()
        );

        loop {
            self.cycle().await;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
