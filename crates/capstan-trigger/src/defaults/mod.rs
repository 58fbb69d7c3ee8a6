//! Default implementations for the collaborator contracts.
//!
//! These allow a server to start with zero external infrastructure and
//! give tests real, concurrency-safe collaborators. Each can be replaced
//! by wiring a different implementation into the
//! [`Triggerer`](crate::trigger::Triggerer).

pub mod file_config;
pub mod in_memory_scheduler;
pub mod in_memory_store;

pub use file_config::FileConfigService;
pub use in_memory_scheduler::InMemoryScheduler;
pub use in_memory_store::{InMemoryBuildStore, InMemoryRepoStore, InMemoryUserStore};
