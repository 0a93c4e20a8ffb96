//! Keeps the displayed [`AggregateView`] in step with backend writes:
//! mutate, then re-read, as one explicit call sequence.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    gateway::BackendGateway,
    mutation::{handle_mutation, MutationIntent, MutationKind, MutationResult},
    orchestrator::{load_aggregate_view, AggregateView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Submitting,
    Resyncing,
}

type PhaseTable = Arc<Mutex<HashMap<MutationKind, SyncPhase>>>;

#[derive(Default)]
struct DisplayedView {
    view: AggregateView,
    refreshed_at: Option<DateTime<Utc>>,
    /// Start order of the read cycle that produced `view`.
    generation: u64,
}

pub struct ViewSynchronizer {
    gateway: Arc<dyn BackendGateway>,
    displayed: RwLock<DisplayedView>,
    next_generation: AtomicU64,
    phases: PhaseTable,
}

impl ViewSynchronizer {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            gateway,
            displayed: RwLock::new(DisplayedView::default()),
            next_generation: AtomicU64::new(1),
            phases: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs one read cycle and replaces the displayed view with its result,
    /// unless a cycle that started later has already been displayed.
    pub async fn refresh(&self) -> AggregateView {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let view = load_aggregate_view(self.gateway.as_ref()).await;
        let mut displayed = self.displayed.write().await;
        if generation < displayed.generation {
            debug!(
                generation,
                shown = displayed.generation,
                "discarding read cycle overtaken by a newer one"
            );
            return view;
        }
        displayed.view = view.clone();
        displayed.refreshed_at = Some(Utc::now());
        displayed.generation = generation;
        info!(degraded = view.is_degraded(), "dashboard view refreshed");
        view
    }

    pub async fn current_view(&self) -> AggregateView {
        self.displayed.read().await.view.clone()
    }

    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.displayed.read().await.refreshed_at
    }

    pub fn phase(&self, kind: MutationKind) -> SyncPhase {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Executes the mutation and, only when it succeeded, re-reads the view
    /// exactly once. A second submission of the same kind while one is still
    /// in flight is rejected without touching the backend.
    pub async fn submit(&self, intent: MutationIntent) -> MutationResult {
        let kind = intent.kind();
        let Some(guard) = PhaseGuard::begin(Arc::clone(&self.phases), kind) else {
            warn!(%kind, "rejected submission while previous one is in flight");
            return MutationResult::failed(format!("{kind} already in progress"));
        };

        let result = handle_mutation(self.gateway.as_ref(), intent).await;
        if result.is_success() {
            guard.set(SyncPhase::Resyncing);
        }
        self.resync_after(&result).await;
        result
    }

    /// Re-reads after a successful mutation; returns the fresh view, or
    /// `None` when the result was a failure and the stale view stays.
    async fn resync_after(&self, result: &MutationResult) -> Option<AggregateView> {
        match result {
            MutationResult::Failed { reason } => {
                warn!(%reason, "mutation failed; keeping displayed view");
                None
            }
            MutationResult::UploadAccepted | MutationResult::QueryAnswered { .. } => {
                Some(self.refresh().await)
            }
        }
    }
}

/// Holds a mutation category out of `Idle` for as long as it lives.
struct PhaseGuard {
    phases: PhaseTable,
    kind: MutationKind,
}

impl PhaseGuard {
    fn begin(phases: PhaseTable, kind: MutationKind) -> Option<Self> {
        {
            let mut map = phases.lock().unwrap_or_else(PoisonError::into_inner);
            let phase = map.entry(kind).or_default();
            if *phase != SyncPhase::Idle {
                return None;
            }
            *phase = SyncPhase::Submitting;
        }
        Some(Self { phases, kind })
    }

    fn set(&self, phase: SyncPhase) {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.kind, phase);
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.set(SyncPhase::Idle);
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
