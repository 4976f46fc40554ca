//! Single-writer gate for SQLite
//!
//! SQLite allows one writer at a time. Two deferred transactions that both
//! read before writing cannot both upgrade their locks, and the loser gets
//! `SQLITE_BUSY` at once instead of waiting on the busy timeout. Every
//! repository write goes through this gate so that only one write
//! transaction in the process is open at any moment. Plain reads never take
//! it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct WriteGate {
    inner: Arc<Mutex<()>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}
