//! Data orchestration for the MerchantLens dashboard: typed backend access,
//! the concurrent aggregate read cycle, user-triggered mutations and the
//! re-synchronisation of the displayed view after a successful write.

pub mod config;
pub mod gateway;
pub mod mutation;
pub mod orchestrator;
pub mod sync;

pub use config::{ConfigError, DashboardConfig, DEFAULT_BACKEND_BASE_URL};
pub use gateway::{BackendGateway, HttpBackendGateway};
pub use mutation::{handle_mutation, MutationIntent, MutationKind, MutationResult};
pub use orchestrator::{load_aggregate_view, AggregateFailure, AggregateSection, AggregateView};
pub use sync::{SyncPhase, ViewSynchronizer};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
