//! In-memory payment store
//!
//! Implements both the payment persistence port and the reference-code
//! existence check: the uniqueness scope of reference codes is "all persisted
//! code-bearing payments", which is exactly the store's content.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, PaymentId, PortError};
use domain_payment::{Payment, PaymentStore};
use domain_refcode::CodeExistence;

/// Thread-safe in-memory implementation of [`PaymentStore`]
#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store for tests
    pub async fn with_payments(payments: Vec<Payment>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.payments.write().await;
            for payment in payments {
                guard.insert(payment.id(), payment);
            }
        }
        store
    }

    /// Returns the number of stored payments
    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

impl DomainPort for InMemoryPaymentStore {}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.payments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Payment", id))
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        self.payments
            .write()
            .await
            .insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn find_follow_ups(&self, root_id: PaymentId) -> Result<Vec<Payment>, PortError> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .filter(|payment| payment.parent_payment_id() == Some(root_id))
            .cloned()
            .collect())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PortError> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|payment| payment.transaction_id() == Some(transaction_id))
            .cloned())
    }
}

#[async_trait]
impl CodeExistence for InMemoryPaymentStore {
    async fn code_exists(&self, formatted_code: &str) -> Result<bool, PortError> {
        Ok(self.payments.read().await.values().any(|payment| {
            payment
                .reference_code()
                .is_some_and(|code| code.formatted() == formatted_code)
        }))
    }
}
