//! Transaction index lookup
//!
//! Resolves every provider transaction id known for a payment and, for
//! recurring PayPal families, for its parent and follow-ups. Also answers
//! whether a bare transaction id is already known, which the booking use
//! cases use to detect duplicate inbound notifications.

use std::collections::HashMap;
use std::sync::Arc;

use core_kernel::PaymentId;

use crate::error::PaymentError;
use crate::payment::Payment;
use crate::ports::PaymentStore;

/// Lookup over the payment store for transaction ids
pub struct TransactionIndex {
    store: Arc<dyn PaymentStore>,
}

impl TransactionIndex {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Returns all transaction ids of the payment and its recurring family,
    /// keyed by transaction id with the owning payment id as value
    ///
    /// One-time payments short-circuit to their own entry without querying
    /// the store; only recurring PayPal payments have families.
    pub async fn transaction_ids_for(
        &self,
        payment: &Payment,
    ) -> Result<HashMap<String, PaymentId>, PaymentError> {
        let mut ids = HashMap::new();
        if let Some(transaction_id) = payment.transaction_id() {
            ids.insert(transaction_id.to_string(), payment.id());
        }

        let family_root = match payment {
            Payment::PayPal(p) if p.interval.is_recurring() => p.family_root(),
            _ => return Ok(ids),
        };

        if family_root != payment.id() {
            let root = self.store.get_payment(family_root).await?;
            if let Some(transaction_id) = root.transaction_id() {
                ids.insert(transaction_id.to_string(), root.id());
            }
        }
        for follow_up in self.store.find_follow_ups(family_root).await? {
            if follow_up.id() == payment.id() {
                continue;
            }
            if let Some(transaction_id) = follow_up.transaction_id() {
                ids.insert(transaction_id.to_string(), follow_up.id());
            }
        }

        Ok(ids)
    }

    /// Returns true if any payment has recorded this transaction id
    pub async fn transaction_exists(&self, transaction_id: &str) -> Result<bool, PaymentError> {
        Ok(self
            .store
            .find_by_transaction_id(transaction_id)
            .await?
            .is_some())
    }

    /// Returns the payment that recorded this transaction id, if any
    pub async fn find_payment(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PaymentError> {
        Ok(self.store.find_by_transaction_id(transaction_id).await?)
    }
}
