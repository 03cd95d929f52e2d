//! Recording capability mocks for tests.

use crate::capability::{Capability, CapabilityInput};
use crate::errors::CapabilityError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// A mock capability that records calls and returns a scripted reply.
#[derive(Debug)]
pub struct MockCapability {
    reply: Mutex<Result<String, String>>,
    call_count: Mutex<usize>,
    inputs: Mutex<Vec<String>>,
}

impl MockCapability {
    /// Creates a mock that replies with the given text.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Ok(text.into())),
            call_count: Mutex::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that fails with the given reason.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Err(reason.into())),
            call_count: Mutex::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the scripted reply.
    pub fn set_reply(&self, text: impl Into<String>) {
        *self.reply.lock() = Ok(text.into());
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the flattened input of each invocation.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl Capability for MockCapability {
    async fn invoke(&self, input: &CapabilityInput<'_>) -> Result<String, CapabilityError> {
        *self.call_count.lock() += 1;
        self.inputs.lock().push(input.user_text());
        self.reply
            .lock()
            .clone()
            .map_err(CapabilityError::Request)
    }
}

/// A capability that sleeps before replying, for timeout tests.
#[derive(Debug)]
pub struct SlowCapability {
    delay: Duration,
    reply: String,
}

impl SlowCapability {
    /// Creates a capability that replies after `delay`.
    #[must_use]
    pub fn new(delay: Duration, reply: impl Into<String>) -> Self {
        Self {
            delay,
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl Capability for SlowCapability {
    async fn invoke(&self, _input: &CapabilityInput<'_>) -> Result<String, CapabilityError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}
