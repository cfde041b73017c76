use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use fitlog::{
    FitnessRecord, NewRecord, RecordStore,
    config::Config,
    credentials::CredentialStore,
    db,
    remote::ApiClient,
};
use serde::Serialize;
use tracing::debug;

pub mod auth;
pub mod config;
pub mod log;
pub mod stats;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Print `value` as JSON, or run `text` to print it for humans.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, text: impl FnOnce()) -> Result<()> {
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Text => text(),
    }
    Ok(())
}

/// Everything a command needs from the global flags and the config file.
pub struct Env {
    pub fmt: OutputFmt,
    pub remote: bool,
    pub db_override: Option<String>,
    pub config_path: PathBuf,
    pub config: Config,
}

impl Env {
    pub fn load(fmt: OutputFmt, remote: bool, db_override: Option<String>) -> Result<Self> {
        let config_path = fitlog::config::default_config_path()?;
        let config = Config::load(&config_path)?;
        Ok(Self { fmt, remote, db_override, config_path, config })
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        Ok(CredentialStore::default_location()?)
    }

    /// Backend client without a token, for login and register.
    pub fn anonymous_api(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(self.config.api_base_url(), self.config.timeout()?)?)
    }

    /// Backend client carrying the stored bearer token.
    pub fn api(&self) -> Result<ApiClient> {
        let session = self.credentials()?.require()?;
        Ok(self.anonymous_api()?.with_token(session.token))
    }

    pub async fn store(&self) -> Result<RecordStore> {
        let path = match &self.db_override {
            Some(p) => p.clone(),
            None => self.config.db_path()?,
        };
        debug!(path = %path, "opening local store");
        let pool = db::open(&path)
            .await
            .with_context(|| format!("could not open database `{path}`"))?;
        Ok(RecordStore::open_with_timeout(pool, self.config.timeout()?).await?)
    }

    /// Local store or backend, depending on `--remote`.
    pub async fn source(&self) -> Result<Source> {
        if self.remote {
            Ok(Source::Remote(self.api()?))
        } else {
            Ok(Source::Local(self.store().await?))
        }
    }
}

/// Where records are read from and written to.
pub enum Source {
    Local(RecordStore),
    Remote(ApiClient),
}

impl Source {
    pub async fn list(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<FitnessRecord>> {
        let records = match self {
            Self::Local(store) if from.is_none() && to.is_none() => store.list().await?.to_vec(),
            Self::Local(store) => store.list_range(from, to).await?,
            Self::Remote(api) => api.list_records(from, to).await?,
        };
        Ok(records)
    }

    pub async fn create(&mut self, new: NewRecord) -> Result<FitnessRecord> {
        Ok(match self {
            Self::Local(store) => store.create(new).await?,
            Self::Remote(api) => api.create_record(new).await?,
        })
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(match self {
            Self::Local(store) => store.delete(id).await?,
            Self::Remote(api) => api.delete_record(id).await?,
        })
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
