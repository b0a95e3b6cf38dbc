//! View invalidation.
//!
//! Every successful lifecycle mutation announces which cached admin views
//! it made stale. Cached views live under generation-versioned keys
//! (`view:<name>:<generation>`). Emitting bumps the generation before the
//! mutation returns, so the next read misses and a load that started
//! before the mutation writes back to a key nobody reads. The broadcast
//! consumer only reclaims the retired entries.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::CACHE_PREFIX_VIEW;
use crate::errors::AppResult;
use crate::infra::Cache;

/// A cached view that can go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewInvalidation {
    PendingList,
    ApprovedList,
}

impl ViewInvalidation {
    pub fn name(&self) -> &'static str {
        match self {
            ViewInvalidation::PendingList => "pending-users",
            ViewInvalidation::ApprovedList => "approved-users",
        }
    }

    /// Redis key of this view at `generation`.
    pub fn cache_key(&self, generation: u64) -> String {
        format!("{}{}:{}", CACHE_PREFIX_VIEW, self.name(), generation)
    }
}

/// Receiver side of lifecycle events, as seen by the lifecycle manager.
pub trait InvalidationSink: Send + Sync {
    fn emit(&self, view: ViewInvalidation);
}

/// Current generation of each view.
#[derive(Debug, Default)]
pub struct ViewGenerations {
    pending: AtomicU64,
    approved: AtomicU64,
}

impl ViewGenerations {
    fn counter(&self, view: ViewInvalidation) -> &AtomicU64 {
        match view {
            ViewInvalidation::PendingList => &self.pending,
            ViewInvalidation::ApprovedList => &self.approved,
        }
    }

    pub fn current(&self, view: ViewInvalidation) -> u64 {
        self.counter(view).load(Ordering::SeqCst)
    }

    /// Move to a new generation, returning the retired one.
    pub fn bump(&self, view: ViewInvalidation) -> u64 {
        self.counter(view).fetch_add(1, Ordering::SeqCst)
    }
}

/// A view generation that was retired by an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidated {
    pub view: ViewInvalidation,
    pub retired: u64,
}

/// In-process invalidation: bumps generations synchronously, then
/// broadcasts the retired generation for cleanup.
#[derive(Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidated>,
    generations: Arc<ViewGenerations>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            generations: Arc::new(ViewGenerations::default()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidated> {
        self.sender.subscribe()
    }

    /// Generations shared with the `ViewCache` that serves these views.
    pub fn generations(&self) -> Arc<ViewGenerations> {
        self.generations.clone()
    }
}

impl InvalidationSink for InvalidationBus {
    fn emit(&self, view: ViewInvalidation) {
        let retired = self.generations.bump(view);
        // No subscribers just means nothing gets reclaimed early.
        if self.sender.send(Invalidated { view, retired }).is_err() {
            tracing::debug!(view = view.name(), "Invalidation emitted with no listeners");
        }
    }
}

/// Redis-backed cache of rendered admin views.
#[derive(Clone)]
pub struct ViewCache {
    cache: Cache,
    generations: Arc<ViewGenerations>,
}

impl ViewCache {
    pub fn new(cache: Cache, generations: Arc<ViewGenerations>) -> Self {
        Self { cache, generations }
    }

    /// Return the cached view, or load and cache it. Cache failures fall
    /// back to the loader. A load overtaken by an invalidation is returned
    /// but not cached.
    pub async fn get_or_load<T, F, Fut>(&self, view: ViewInvalidation, load: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let generation = self.generations.current(view);
        let key = view.cache_key(generation);
        match self.cache.get::<T>(&key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!(view = view.name(), error = %e, "View cache read failed"),
        }

        let fresh = load().await?;
        if self.generations.current(view) != generation {
            tracing::debug!(view = view.name(), "View changed while loading, not caching");
            return Ok(fresh);
        }
        if let Err(e) = self.cache.set(&key, &fresh).await {
            tracing::warn!(view = view.name(), error = %e, "View cache write failed");
        }
        Ok(fresh)
    }

    /// Drop the entry of a retired generation.
    pub async fn reclaim(&self, event: Invalidated) {
        let key = event.view.cache_key(event.retired);
        match self.cache.delete(&key).await {
            Ok(()) => tracing::debug!(view = event.view.name(), generation = event.retired, "View reclaimed"),
            Err(e) => tracing::warn!(view = event.view.name(), error = %e, "View reclaim failed"),
        }
    }

    async fn reclaim_all(&self) {
        let pattern = format!("{}*", CACHE_PREFIX_VIEW);
        if let Err(e) = self.cache.delete_pattern(&pattern).await {
            tracing::warn!(error = %e, "Failed to drop cached views");
        }
    }

    /// Consume events until the bus closes.
    pub async fn run(self, mut events: broadcast::Receiver<Invalidated>) {
        loop {
            match events.recv().await {
                Ok(event) => self.reclaim(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Invalidation consumer lagged, dropping all views");
                    self.reclaim_all().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Invalidation consumer stopped");
    }

    pub fn spawn(self, events: broadcast::Receiver<Invalidated>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_have_distinct_versioned_keys() {
        assert_eq!(ViewInvalidation::PendingList.cache_key(0), "view:pending-users:0");
        assert_eq!(ViewInvalidation::ApprovedList.cache_key(3), "view:approved-users:3");
    }

    #[test]
    fn emit_moves_the_read_key_before_returning() {
        let bus = InvalidationBus::new(8);
        let generations = bus.generations();
        let view = ViewInvalidation::ApprovedList;
        let before = view.cache_key(generations.current(view));

        bus.emit(view);

        // No consumer has run; readers already use a fresh key.
        assert_ne!(view.cache_key(generations.current(view)), before);
        assert_eq!(generations.current(ViewInvalidation::PendingList), 0);
    }

    #[test]
    fn load_started_before_emit_sees_a_newer_generation() {
        let bus = InvalidationBus::new(8);
        let generations = bus.generations();
        let view = ViewInvalidation::PendingList;

        let started_at = generations.current(view);
        bus.emit(view);

        // The write-back guard in get_or_load compares exactly this.
        assert_ne!(generations.current(view), started_at);
    }

    #[tokio::test]
    async fn bus_reports_retired_generations_in_order() {
        let bus = InvalidationBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(ViewInvalidation::PendingList);
        bus.emit(ViewInvalidation::ApprovedList);
        bus.emit(ViewInvalidation::ApprovedList);

        let expected = [
            (ViewInvalidation::PendingList, 0),
            (ViewInvalidation::ApprovedList, 0),
            (ViewInvalidation::ApprovedList, 1),
        ];
        for (view, retired) in expected {
            assert_eq!(rx.recv().await.unwrap(), Invalidated { view, retired });
        }
    }

    #[test]
    fn emitting_without_listeners_still_bumps() {
        let bus = InvalidationBus::new(8);
        bus.emit(ViewInvalidation::ApprovedList);
        assert_eq!(bus.generations().current(ViewInvalidation::ApprovedList), 1);
    }
}
