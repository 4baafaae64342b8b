//! Machine Translation trait
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the client pool can rotate over real chat-completion clients or over a
//! mock without knowing which one it holds.

use crate::error::MtResult;
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// One value of an implementing type stands for one backend credential.
/// Target languages are passed by display name (`"français"`), which is what
/// the prompts are phrased with.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text into the target language
    async fn translate(&self, text: &str, target_language: &str) -> MtResult<String>;

    /// Translate several texts with one request
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length, or the call fails
    /// - The batch succeeds or fails as a whole
    async fn translate_batch(&self, texts: &[String], target_language: &str)
    -> MtResult<Vec<String>>;

    /// Name used in logs to identify the provider
    fn provider_name(&self) -> &str;
}
