//! Store setup for integration tests

use pollbox::storage::{MemoryStore, PollStore};
use std::sync::Arc;

/// Fresh, empty in-memory store. Each test gets its own, so tests never
/// share state and can run in parallel.
pub fn setup_test_store() -> Arc<dyn PollStore> {
    Arc::new(MemoryStore::new())
}
