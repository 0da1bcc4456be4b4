//! The subscription form controller: input value, busy flag, last error, and
//! the short-lived success flag.
//!
//! ```text
//! idle --submit--> submitting --(ok)--> success --(dismiss delay)--> idle
//!                             \-(err)-> error   --submit--> submitting
//! ```
//!
//! The controller is independent of the web framework; `routes::subscribe`
//! drives one per request, and tests drive it directly.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::NewSubscriber;
use crate::store_client::InsertError;
use crate::store_client::StoreFailure;
use crate::store_client::SubscriberStore;
use crate::utils::error_chain_fmt;

pub const SUBSCRIBED_MESSAGE: &str = "Thank you for subscribing!";
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "This email is already subscribed!";
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// Everything the page needs to render the form. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub email: String,
    pub busy: bool,
    pub submitted: bool,
    pub error: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    InvalidEmail(String),
    #[error("Email is already subscribed")]
    AlreadySubscribed(#[source] StoreFailure),
    #[error("The store rejected the subscription")]
    Rejected(#[source] StoreFailure),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SubscribeError {
    /// The inline text shown under the form
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => INVALID_EMAIL_MESSAGE.to_string(),
            Self::AlreadySubscribed(_) => ALREADY_SUBSCRIBED_MESSAGE.to_string(),
            // the store's own wording is surfaced verbatim
            Self::Rejected(failure) => format!("Error: {}", failure.message),
            // transport details stay in the logs
            Self::Unexpected(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<InsertError> for SubscribeError {
    fn from(e: InsertError) -> Self {
        match e {
            InsertError::Rejected(failure) if failure.is_unique_violation() => {
                Self::AlreadySubscribed(failure)
            }
            InsertError::Rejected(failure) => Self::Rejected(failure),
            InsertError::Transport(e) => {
                Self::Unexpected(anyhow::Error::new(e).context("Could not reach the store"))
            }
            InsertError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Subscribed,
    Failed(SubscribeError),
    /// A previous submission has not settled yet; nothing was sent
    AlreadyInFlight,
}

pub struct SubscriptionForm<S> {
    store: Arc<S>,
    /// `send_if_modified` gives us an atomic check-and-set on `busy`
    state: Arc<watch::Sender<FormState>>,
    success_dismiss: Duration,
    dismiss_timer: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SubscriberStore> SubscriptionForm<S> {
    pub fn new(
        store: Arc<S>,
        success_dismiss: Duration,
    ) -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self {
            store,
            state: Arc::new(state),
            success_dismiss,
            dismiss_timer: Mutex::new(None),
        }
    }

    pub fn state(&self) -> FormState { self.state.borrow().clone() }

    pub fn watch(&self) -> watch::Receiver<FormState> { self.state.subscribe() }

    /// Returns false (and leaves the value alone) while a submission is in
    /// flight, like a disabled input.
    pub fn set_email(
        &self,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.state.send_if_modified(|s| {
            if s.busy {
                return false;
            }
            s.email = value;
            true
        })
    }

    /// Exactly one insert attempt per call, no retry. `busy` is cleared in
    /// every branch before this returns.
    #[tracing::instrument(
        name = "Submitting subscription form",
        skip(self),
        fields(subscriber_email = tracing::field::Empty)
    )]
    pub async fn submit(&self) -> SubmitOutcome {
        let mut email = None;
        self.state.send_if_modified(|s| {
            if s.busy {
                return false;
            }
            s.busy = true;
            s.error = None;
            email = Some(s.email.clone());
            true
        });
        let Some(email) = email else {
            tracing::warn!("submission already in flight, ignoring");
            return SubmitOutcome::AlreadyInFlight;
        };

        tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

        match self.try_subscribe(email).await {
            Ok(()) => {
                self.finish_success().await;
                tracing::info!("new subscriber added");
                SubmitOutcome::Subscribed
            }
            Err(e) => {
                match &e {
                    SubscribeError::Unexpected(_) => tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "subscription failed"
                    ),
                    _ => tracing::warn!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "subscription refused"
                    ),
                }
                let message = e.user_message();
                self.state.send_modify(|s| {
                    // the input is kept, so the visitor can correct it
                    s.busy = false;
                    s.error = Some(message);
                });
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn try_subscribe(
        &self,
        email: String,
    ) -> Result<(), SubscribeError> {
        let new_sub = NewSubscriber::try_from(email).map_err(SubscribeError::InvalidEmail)?;
        self.store.insert(&new_sub).await?;
        Ok(())
    }

    /// Arm the timer that lowers `submitted`, then clear the input, raise
    /// `submitted` and release `busy`. A newer success replaces (aborts) the
    /// older timer. The timer is stored before `busy` drops, so a follow-up
    /// submission can never have its timer overwritten by this one.
    async fn finish_success(&self) {
        let mut dismiss_timer = self.dismiss_timer.lock().await;

        // weak, so a pending timer never keeps a dropped form alive
        let state = Arc::downgrade(&self.state);
        let delay = self.success_dismiss;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(state) = state.upgrade() {
                state.send_modify(|s| s.submitted = false);
            }
        });
        if let Some(previous) = dismiss_timer.replace(timer) {
            previous.abort();
        }

        self.state.send_modify(|s| {
            s.busy = false;
            s.email.clear();
            s.submitted = true;
        });
    }
}

impl<S> Drop for SubscriptionForm<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.dismiss_timer.get_mut().take() {
            timer.abort();
        }
    }
}
