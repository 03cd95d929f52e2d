//! The match stage's capability: a direct call into the disease lookup.

use super::{Capability, CapabilityInput};
use crate::errors::CapabilityError;
use crate::lookup::DiseaseLookup;
use async_trait::async_trait;

/// Wraps [`DiseaseLookup`] as a stage capability.
///
/// The upstream stage's comma-separated symptom text drives the search;
/// the instruction is not forwarded anywhere, since the lookup is a
/// deterministic function rather than a prompted role.
#[derive(Debug, Clone)]
pub struct LookupCapability {
    lookup: DiseaseLookup,
}

impl LookupCapability {
    /// Creates a capability over the given lookup.
    #[must_use]
    pub const fn new(lookup: DiseaseLookup) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Capability for LookupCapability {
    async fn invoke(&self, input: &CapabilityInput<'_>) -> Result<String, CapabilityError> {
        Ok(self.lookup.search_text(input.upstream_text()))
    }
}
