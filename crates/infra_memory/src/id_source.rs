//! Sequential payment id source

use std::sync::atomic::{AtomicU32, Ordering};

use core_kernel::{PaymentId, PaymentIdSource, PortError};

/// Hands out dense, monotonic payment ids starting at 1
#[derive(Debug)]
pub struct SequentialIdSource {
    next: AtomicU32,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Starts counting from the given id, e.g. after loading existing data
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentIdSource for SequentialIdSource {
    fn next_id(&self) -> Result<PaymentId, PortError> {
        Ok(PaymentId::new(self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_unique() {
        let source = SequentialIdSource::new();
        let first = source.next_id().unwrap();
        let second = source.next_id().unwrap();
        assert_eq!(first, PaymentId::new(1));
        assert_eq!(second, PaymentId::new(2));
    }

    #[test]
    fn test_starting_at() {
        let source = SequentialIdSource::starting_at(100);
        assert_eq!(source.next_id().unwrap(), PaymentId::new(100));
    }
}
