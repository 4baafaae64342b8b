//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for exercising
//! the synchronizer without API keys or network access. Every call is
//! recorded so tests can assert how requests were dispatched.
//!
//! # Example
//!
//! ```ignore
//! use locale_sync_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "français").await.unwrap();
//!     assert_eq!(result, "hello_français");
//! }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" -> "hello_français"
    Suffix,

    /// Use predefined mappings; unknown texts fall back to `Suffix`
    /// (text, target_language) -> translation
    Mappings(HashMap<(String, String), String>),

    /// Return input unchanged
    NoOp,

    /// Fail every call with a backend error
    Error(String),

    /// Fail every call as throttled
    RateLimited,

    /// Answer batches with one translation fewer than requested
    Truncated,
}

/// One request received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Single(String),
    Batch(Vec<String>),
}

/// Mock translator that simulates various backend behaviors
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix | MockMode::Truncated => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::NoOp => Ok(text.to_string()),
            MockMode::Error(msg) => Err(MtError::BackendError(msg.clone())),
            MockMode::RateLimited => Err(MtError::RateLimited("429 Too Many Requests".to_string())),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> MtResult<String> {
        self.record(MockCall::Single(text.to_string()));
        self.apply_delay().await;
        self.apply_translation(text, target_language)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> MtResult<Vec<String>> {
        self.record(MockCall::Batch(texts.to_vec()));
        // Delay once per batch, not per string
        self.apply_delay().await;

        let mut results = texts
            .iter()
            .map(|text| self.apply_translation(text, target_language))
            .collect::<MtResult<Vec<String>>>()?;
        if matches!(self.mode, MockMode::Truncated) {
            results.pop();
        }
        Ok(results)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
