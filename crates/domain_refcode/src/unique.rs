//! Uniqueness enforcement for reference codes
//!
//! Wraps the generator in a check-and-retry loop against the set of already
//! issued codes. The check and the eventual insert are not atomic; with the
//! 19-character alphabet and six code characters the collision window is
//! accepted as best-effort, but a retry ceiling guards against a broken
//! existence predicate reporting everything as taken.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use core_kernel::{DomainPort, PortError};

use crate::code::ReferenceCode;
use crate::error::RefCodeError;
use crate::generator::ReferenceCodeGenerator;

/// Default number of generation attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Existence check over all persisted reference codes
///
/// Scoped across every code-bearing payment type combined (bank transfer and
/// Sofort), not per type.
#[async_trait]
pub trait CodeExistence: DomainPort {
    async fn code_exists(&self, formatted_code: &str) -> Result<bool, PortError>;
}

/// Generates reference codes that are unique among persisted payments
///
/// Read-only: the caller persists the returned code together with the new
/// payment in the same operation.
pub struct UniqueReferenceCodeGenerator {
    generator: ReferenceCodeGenerator,
    existing_codes: Arc<dyn CodeExistence>,
    max_attempts: u32,
}

impl UniqueReferenceCodeGenerator {
    pub fn new(generator: ReferenceCodeGenerator, existing_codes: Arc<dyn CodeExistence>) -> Self {
        Self {
            generator,
            existing_codes,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the retry ceiling
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generates a code for the prefix that no persisted payment uses yet
    ///
    /// Colliding candidates are discarded and never re-checked.
    pub async fn new_payment_reference(
        &mut self,
        prefix: &str,
    ) -> Result<ReferenceCode, RefCodeError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.new_payment_reference(prefix)?;
            if !self.existing_codes.code_exists(&candidate.formatted()).await? {
                return Ok(candidate);
            }
            debug!(
                code = %candidate.formatted(),
                attempt,
                "reference code collision, generating a new candidate"
            );
        }
        Err(RefCodeError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SequentialIndexSource;
    use std::sync::Mutex;

    /// Reports one specific code as taken and records every query
    struct SingleCollision {
        taken: String,
        queried: Mutex<Vec<String>>,
    }

    impl SingleCollision {
        fn new(taken: &str) -> Self {
            Self {
                taken: taken.to_string(),
                queried: Mutex::new(Vec::new()),
            }
        }
    }

    impl DomainPort for SingleCollision {}

    #[async_trait]
    impl CodeExistence for SingleCollision {
        async fn code_exists(&self, formatted_code: &str) -> Result<bool, PortError> {
            self.queried
                .lock()
                .map_err(|_| PortError::internal("query log poisoned"))?
                .push(formatted_code.to_string());
            Ok(formatted_code == self.taken)
        }
    }

    struct EverythingTaken;

    impl DomainPort for EverythingTaken {}

    #[async_trait]
    impl CodeExistence for EverythingTaken {
        async fn code_exists(&self, _formatted_code: &str) -> Result<bool, PortError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_collision_skips_to_next_candidate() {
        // With a sequential index source the first candidate is AA-ACD-EFK-K
        // and the second continues through the alphabet.
        let existence = Arc::new(SingleCollision::new("AA-ACD-EFK-K"));
        let mut generator = UniqueReferenceCodeGenerator::new(
            ReferenceCodeGenerator::new(Box::new(SequentialIndexSource::new())),
            existence.clone(),
        );

        let code = generator.new_payment_reference("AA").await.unwrap();
        assert_ne!(code.formatted(), "AA-ACD-EFK-K");

        let queried = existence.queried.lock().unwrap().clone();
        assert_eq!(queried.len(), 2);
        assert_eq!(queried[0], "AA-ACD-EFK-K");
        // The colliding candidate is never retried.
        assert_ne!(queried[1], "AA-ACD-EFK-K");
    }

    #[tokio::test]
    async fn test_no_collision_returns_first_candidate() {
        let existence = Arc::new(SingleCollision::new("ZZ-ZZZ-ZZZ-Z"));
        let mut generator = UniqueReferenceCodeGenerator::new(
            ReferenceCodeGenerator::new(Box::new(SequentialIndexSource::new())),
            existence,
        );

        let code = generator.new_payment_reference("AA").await.unwrap();
        assert_eq!(code.formatted(), "AA-ACD-EFK-K");
    }

    #[tokio::test]
    async fn test_retry_ceiling_yields_generation_exhausted() {
        let mut generator = UniqueReferenceCodeGenerator::new(
            ReferenceCodeGenerator::new(Box::new(SequentialIndexSource::new())),
            Arc::new(EverythingTaken),
        )
        .with_max_attempts(5);

        let result = generator.new_payment_reference("AA").await;
        assert!(matches!(
            result,
            Err(RefCodeError::GenerationExhausted { attempts: 5 })
        ));
    }
}
