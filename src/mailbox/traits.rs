//! Errors produced by mailbox operations.

use thiserror::Error;

/// Errors surfaced by `Mailbox` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailboxError {
    /// `enqueue` was attempted after `close` had already been called.
    #[error("mailbox is closed")]
    Closed,

    /// `try_block` raced a concurrent enqueue and lost; the caller should retry
    /// by popping again instead of blocking.
    #[error("mailbox transitioned back to open before the block could take effect")]
    ConcurrentUnblock,

    /// `enqueue` was rejected because the mailbox already holds `capacity`
    /// elements (see `Mailbox::bounded`).
    #[error("mailbox is at capacity")]
    CapacityReached,
}

impl MailboxError {
    /// True when the failure reflects a closed mailbox rather than a transient
    /// scheduling race.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// True when the failure reflects backpressure rather than a closed
    /// mailbox or a scheduling race.
    pub fn is_capacity_reached(&self) -> bool {
        matches!(self, Self::CapacityReached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_error_reports_is_closed() {
        let err = MailboxError::Closed;
        assert!(err.is_closed());
    }

    #[test]
    fn concurrent_unblock_is_not_closed() {
        let err = MailboxError::ConcurrentUnblock;
        assert!(!err.is_closed());
    }

    #[test]
    fn capacity_reached_reports_itself_and_not_closed() {
        let err = MailboxError::CapacityReached;
        assert!(err.is_capacity_reached());
        assert!(!err.is_closed());
    }
}
