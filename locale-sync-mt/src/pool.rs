//! Round-robin dispatch over translation clients
//!
//! The pool holds one [`MachineTranslator`] per backend credential. Every
//! dispatch takes the next client in turn, bounds the request with the
//! pool's timeout and races it against the caller's cancellation token.
//! The rotation index is the only state shared between dispatches.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

pub struct ClientPool {
    clients: Vec<Arc<dyn MachineTranslator>>,
    next: Mutex<usize>,
    timeout: Duration,
}

impl ClientPool {
    /// Create a pool over `clients`, used in the given order
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when `clients` is empty.
    pub fn new(clients: Vec<Arc<dyn MachineTranslator>>, timeout: Duration) -> MtResult<Self> {
        if clients.is_empty() {
            return Err(MtError::ConfigurationError(
                "at least one translation client is required".to_string(),
            ));
        }
        Ok(Self {
            clients,
            next: Mutex::new(0),
            timeout,
        })
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Take the next client and advance the rotation, whatever happens next
    fn next_client(&self) -> (usize, Arc<dyn MachineTranslator>) {
        let mut next = match self.next.lock() {
            Ok(guard) => guard,
            // The index is always left valid, so a poisoned lock is still usable
            Err(poisoned) => poisoned.into_inner(),
        };
        let index = *next % self.clients.len();
        *next = (index + 1) % self.clients.len();
        (index, Arc::clone(&self.clients[index]))
    }

    async fn dispatch<T, F>(&self, cancel: &CancellationToken, request: F) -> MtResult<T>
    where
        F: Future<Output = MtResult<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MtError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, request) => match outcome {
                Ok(result) => result,
                Err(_) => Err(MtError::RateLimited(format!(
                    "request exceeded timeout of {:?}",
                    self.timeout
                ))),
            },
        }
    }

    /// Translate one text; the result is trimmed of surrounding whitespace
    pub async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        cancel: &CancellationToken,
    ) -> MtResult<String> {
        let (index, client) = self.next_client();
        debug!(
            "Dispatching single request to client #{} ({})",
            index,
            client.provider_name()
        );

        let translated = self
            .dispatch(cancel, client.translate(text, target_language))
            .await?;
        Ok(translated.trim().to_string())
    }

    /// Translate `texts` with one request; `result[i]` translates `texts[i]`
    ///
    /// # Errors
    ///
    /// `BackendError` when the backend answers with a different number of
    /// translations; no partial result is ever returned.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        cancel: &CancellationToken,
    ) -> MtResult<Vec<String>> {
        let (index, client) = self.next_client();
        debug!(
            "Dispatching batch of {} to client #{} ({})",
            texts.len(),
            index,
            client.provider_name()
        );

        let translated = self
            .dispatch(cancel, client.translate_batch(texts, target_language))
            .await?;

        if translated.len() != texts.len() {
            return Err(MtError::BackendError(format!(
                "batch returned {} translations for {} texts",
                translated.len(),
                texts.len()
            )));
        }
        Ok(translated)
    }
}

impl std::fmt::Debug for ClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool")
            .field("clients", &self.clients.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
