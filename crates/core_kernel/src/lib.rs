//! Core Kernel - Foundational types for the donation payment system
//!
//! This crate provides the building blocks shared by all domain modules:
//! - Euro amounts stored as integer cents with fail-closed validation
//! - The payment identifier and its id-source abstraction
//! - Common port error types for adapter implementations

pub mod identifiers;
pub mod money;
pub mod ports;

pub use identifiers::{PaymentId, PaymentIdSource};
pub use money::{Euro, MoneyError};
pub use ports::{DomainPort, PortError};
