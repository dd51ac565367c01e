//! One-time initialization slot for the loaded artifact.
//!
//! The slot is either filled at startup (eager loading) or on first use
//! (lazy loading). Concurrent first users wait on a single loader; a load
//! that fails is remembered and never attempted again.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;

use crate::core::error::{Result, SentimentError};

/// Observable state of an [`ArtifactSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing has been loaded yet.
    Pending,
    Ready,
    /// Loading failed; the message is the load error.
    Failed(String),
}

struct Inner<T> {
    cell: OnceCell<Arc<T>>,
    failure: OnceLock<String>,
}

pub struct ArtifactSlot<T> {
    inner: Arc<Inner<T>>,
}

impl<T> ArtifactSlot<T> {
    /// An empty slot, filled by the first call to [`ArtifactSlot::get_or_load`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cell: OnceCell::new(),
                failure: OnceLock::new(),
            }),
        }
    }

    /// A slot holding an already loaded value.
    pub fn ready(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                cell: OnceCell::new_with(Some(Arc::new(value))),
                failure: OnceLock::new(),
            }),
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.cell.get().cloned()
    }

    pub fn state(&self) -> SlotState {
        if self.inner.cell.initialized() {
            SlotState::Ready
        } else if let Some(reason) = self.inner.failure.get() {
            SlotState::Failed(reason.clone())
        } else {
            SlotState::Pending
        }
    }
}

impl<T: Send + Sync + 'static> ArtifactSlot<T> {
    /// Return the loaded value, running `loader` if the slot is still empty.
    ///
    /// At most one loader runs at a time. If it fails, the error is recorded
    /// and every later call fails with [`SentimentError::ModelUnavailable`]
    /// without running its loader.
    ///
    /// The load runs on its own task: dropping the returned future does not
    /// abort it, and later callers pick up its result.
    pub async fn get_or_load<F, Fut>(&self, loader: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(value) = self.inner.cell.get() {
            return Ok(value.clone());
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let state = inner.clone();
            let value = inner
                .cell
                .get_or_try_init(move || async move {
                    // Initializers are serialized, so this check cannot race with a failing load.
                    if let Some(reason) = state.failure.get() {
                        return Err(SentimentError::ModelUnavailable(reason.clone()));
                    }
                    match loader().await {
                        Ok(value) => Ok(Arc::new(value)),
                        Err(e) => {
                            let _ = state.failure.set(e.to_string());
                            Err(e)
                        }
                    }
                })
                .await?;
            Ok(value.clone())
        })
        .await?
    }
}

impl<T> Default for ArtifactSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
