use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;

use crate::domain::NewSubscriber;
use crate::utils::error_chain_fmt;

/// Postgres error code for `unique_violation`, passed through verbatim by the
/// store's REST layer
pub const UNIQUE_VIOLATION: &str = "23505";

/// Anything that can take a one-shot insert into the `subscribers` collection.
/// The form controller only ever sees this trait, so tests can swap the remote
/// store for an in-process fake.
pub trait SubscriberStore: Send + Sync + 'static {
    fn insert(
        &self,
        new_sub: &NewSubscriber,
    ) -> impl Future<Output = Result<Vec<SubscriberRow>, InsertError>> + Send;
}

/// A row echoed back by the store after a successful insert. Only `email` is
/// ours; generated columns (id, created_at, ...) are kept as-is.
#[derive(Debug, Deserialize)]
pub struct SubscriberRow {
    pub email: String,
    #[serde(flatten)]
    pub generated: serde_json::Map<String, serde_json::Value>,
}

/// Structured failure body returned by the store on a rejected write
#[derive(thiserror::Error, Debug, Clone, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreFailure {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreFailure {
    pub fn is_unique_violation(&self) -> bool { self.code.as_deref() == Some(UNIQUE_VIOLATION) }
}

#[derive(thiserror::Error)]
pub enum InsertError {
    #[error("The store rejected the insert")]
    Rejected(#[source] StoreFailure),
    #[error("Could not reach the store")]
    Transport(#[source] reqwest::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for InsertError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Client for the hosted table's REST endpoint (`{base_url}/rest/v1/{table}`).
///
/// Building a `reqwest::Client` sets up a connection pool, so one instance is
/// built at startup and shared by all workers via `web::Data`.
pub struct RestStoreClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    table: String,
}

impl RestStoreClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        table: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    fn table_url(&self) -> String { format!("{}/rest/v1/{}", self.base_url, self.table) }
}

impl SubscriberStore for RestStoreClient {
    /// `POST` a single-row array and ask for the inserted rows back. No retry:
    /// a second attempt could only ever hit the uniqueness constraint or the
    /// same outage.
    #[tracing::instrument(
        name = "Inserting subscriber into remote store",
        skip_all,
        fields(subscriber_email = %new_sub.email)
    )]
    async fn insert(
        &self,
        new_sub: &NewSubscriber,
    ) -> Result<Vec<SubscriberRow>, InsertError> {
        let resp = self
            .http_client
            .post(self.table_url())
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .header("Prefer", "return=representation")
            .json(&[new_sub])
            .send()
            .await
            .map_err(InsertError::Transport)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(InsertError::Transport)?;

        if status.is_success() {
            let rows = serde_json::from_slice(&body).context("Failed to decode inserted rows")?;
            return Ok(rows);
        }

        match serde_json::from_slice::<StoreFailure>(&body) {
            Ok(failure) => {
                tracing::warn!(
                    failure.code = ?failure.code,
                    failure.message = %failure.message,
                    failure.details = ?failure.details,
                    failure.hint = ?failure.hint,
                    "store rejected insert with {status}"
                );
                Err(InsertError::Rejected(failure))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Store answered {status} with an undecodable body"))
                .into()),
        }
    }
}
