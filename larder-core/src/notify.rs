//! Push-subscription store.
//!
//! Holds at most one subscription in memory. Delivery to the push service is not
//! performed; `notify` keeps the latest message so callers and tests can observe it.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotifyError {
    #[error("No subscription available")]
    NoSubscription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

pub trait SubscriptionStore: Send + Sync {
    /// Replace the current subscription.
    fn subscribe(&self, subscription: PushSubscription);

    fn unsubscribe(&self);

    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscription: Mutex<Option<PushSubscription>>,
    last_delivered: Mutex<Option<String>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PushSubscription> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent message accepted by `notify`.
    pub fn last_delivered(&self) -> Option<String> {
        self.last_delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    fn subscribe(&self, subscription: PushSubscription) {
        tracing::debug!(endpoint = %subscription.endpoint, "Push subscription stored");
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);
    }

    fn unsubscribe(&self) {
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let Some(subscription) = self.current() else {
            return Err(NotifyError::NoSubscription);
        };
        tracing::info!(endpoint = %subscription.endpoint, "Push notification queued");
        *self
            .last_delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
        Ok(())
    }
}
