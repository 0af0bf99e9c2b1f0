//! In-memory adapters for the payment domain ports
//!
//! Used by the test suites and by embedding applications that do not need a
//! database. The store keeps payments in a `HashMap` behind a `tokio`
//! read-write lock and additionally answers the reference-code existence
//! checks of the uniqueness enforcer.

pub mod id_source;
pub mod store;

pub use id_source::SequentialIdSource;
pub use store::InMemoryPaymentStore;
