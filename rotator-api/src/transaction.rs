use std::sync::atomic::{AtomicU64, Ordering};

/// Source of server transaction ids. One instance is shared by every device
/// and every request for the lifetime of the process.
#[derive(Debug, Default)]
pub struct TransactionCounter {
    last: AtomicU64,
}

impl TransactionCounter {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Returns the next id. The first call yields 1.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Opens the context for one request/response pair.
    pub fn begin(&self, client_transaction_id: u64) -> TransactionContext {
        TransactionContext {
            client_transaction_id,
            server_transaction_id: self.next(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionContext {
    /// Correlation id echoed back to the caller
    pub client_transaction_id: u64,
    /// Freshly minted server id
    pub server_transaction_id: u64,
}
