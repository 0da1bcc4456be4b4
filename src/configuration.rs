use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::store_client::RestStoreClient;

/// Global configuration, loaded from `configuration/*.yaml`. See
/// `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub subscriber_store: SubscriberStoreSettings,
    pub landing: LandingSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Connection to the hosted `subscribers` table. The url/key pair is what the
/// hosting dashboard hands out; only the key is secret.
#[derive(Deserialize, Clone)]
pub struct SubscriberStoreSettings {
    /// Project url, without the `/rest/v1` suffix
    pub base_url: String,
    pub api_key: Secret<String>,
    pub table: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl SubscriberStoreSettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn client(self) -> Result<RestStoreClient, reqwest::Error> {
        let timeout = self.timeout();
        RestStoreClient::new(self.base_url, self.api_key, self.table, timeout)
    }
}

/// Timings of the cosmetic parts of the page
#[derive(Deserialize, Clone)]
pub struct LandingSettings {
    /// How long "Thank you for subscribing!" stays up
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub success_dismiss_milliseconds: u64,

    /// Period of the headline/feature rotation
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub rotation_milliseconds: u64,
}

impl LandingSettings {
    pub fn success_dismiss(&self) -> Duration {
        Duration::from_millis(self.success_dismiss_milliseconds)
    }

    pub fn rotation_period(&self) -> Duration { Duration::from_millis(self.rotation_milliseconds) }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("{e} is not a supported environment; use `local` or `production`")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`.
///
/// `base.yaml` is read first, then `{APP_ENVIRONMENT}.yaml` (defaults to
/// `local`), then `APP_`-prefixed env vars. All fields must be present after
/// layering, otherwise the server will not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::info!("loading config for {env} env");

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for the numeric fields
            //
            // `APP_SUBSCRIBER_STORE__API_KEY=...` -> `Settings.subscriber_store.api_key`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
