//! Reader that can park one read after it has taken its snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::ports::{SheetAddress, SheetReadError, SheetReader, SheetRows};

/// Wraps another reader; when armed, the next read snapshots the rows and
/// then waits for [`GatedSheetReader::release`] before returning them.
pub struct GatedSheetReader {
    inner: Arc<dyn SheetReader>,
    armed: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl GatedSheetReader {
    /// Gate reads of `inner`; starts disarmed.
    pub fn new(inner: Arc<dyn SheetReader>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            entered: Notify::new(),
            released: Notify::new(),
        }
    }

    /// Park the next read.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until the parked read has taken its snapshot.
    pub async fn wait_for_parked_read(&self) {
        self.entered.notified().await;
    }

    /// Let the parked read return.
    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl SheetReader for GatedSheetReader {
    async fn read_range(&self, address: &SheetAddress) -> Result<SheetRows, SheetReadError> {
        let rows = self.inner.read_range(address).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.released.notified().await;
        }
        rows
    }
}
