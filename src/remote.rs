//! Client for the fitness backend's REST API.
//!
//! The backend owns user accounts and a per-user copy of the record log. This
//! module only speaks its JSON; nothing here is retried.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    credentials::UserProfile,
    error::{Error, Result},
    models::{DATE_FMT, FitnessRecord, NewRecord, Payload},
    types::BodyPart,
};

pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const USER_INFO: &str = "/users/me";
pub const FITNESS_RECORDS: &str = "/fitness-records";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `detail` the backend sends with a 404 for an unknown record id.
const RECORD_NOT_FOUND: &str = "健身记录不存在";

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: i64,
}

/// Fields accepted by `PUT /users/me`. Unset fields are sent as null, which
/// clears them on the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub birth_date: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(p: &UserProfile) -> Self {
        Self { birth_date: p.birth_date.clone(), height: p.height, weight: p.weight }
    }
}

/// Record as the backend sends and accepts it: one nullable column per
/// quantity, like the local table.
#[derive(Debug, Serialize, Deserialize)]
struct WireRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    date: String,
    part: String,
    exercise: Option<String>,
    sets: Option<i64>,
    reps: Option<i64>,
    distance: Option<f64>,
    minutes: Option<i64>,
    seconds: Option<i64>,
}

impl WireRecord {
    fn from_new(rec: &NewRecord) -> Self {
        let (sets, reps, distance, minutes, seconds) = Payload::columns(rec.payload.as_ref());
        Self {
            id: None,
            date: rec.date.format(DATE_FMT).to_string(),
            part: rec.part.label().to_string(),
            exercise: rec.exercise.clone(),
            sets,
            reps,
            distance,
            minutes,
            seconds,
        }
    }

    fn into_record(self) -> Result<FitnessRecord> {
        let id = self
            .id
            .ok_or_else(|| Error::BadResponse("record without id".into()))?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FMT).map_err(|e| {
            Error::BadResponse(format!("record {id} has invalid date `{}`: {e}", self.date))
        })?;
        let part = self
            .part
            .parse::<BodyPart>()
            .map_err(|e| Error::BadResponse(format!("record {id}: {e}")))?;

        let payload = Payload::from_columns(self.sets, self.reps, self.distance, self.minutes, self.seconds)
            .map_err(|e| Error::BadResponse(format!("record {id} has an invalid quantity: {e}")))?;

        Ok(FitnessRecord {
            id: id.to_string(),
            date,
            part,
            exercise: self.exercise.filter(|e| !e.is_empty()),
            payload,
        })
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

/// Turn a non-2xx answer into `Error::Api`, keeping the body for the message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api { status: status.as_u16(), body })
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::NotLoggedIn)
    }

    /// Exchange username and password for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.url(LOGIN))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let token: TokenResponse = check(resp).await?.json().await?;
        info!(username, "logged in");
        Ok(token.access_token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url(REGISTER))
            .json(&Credentials { username, password })
            .send()
            .await?;
        check(resp).await?;
        info!(username, "registered");
        Ok(())
    }

    pub async fn me(&self) -> Result<UserProfile> {
        let resp = self
            .http
            .get(self.url(USER_INFO))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let resp = self
            .http
            .put(self.url(USER_INFO))
            .bearer_auth(self.token()?)
            .json(update)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    /// Records with `from <= date <= to` (either bound optional), newest first.
    pub async fn list_records(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<FitnessRecord>> {
        let mut query = Vec::new();
        if let Some(d) = from {
            query.push(("start_date", d.format(DATE_FMT).to_string()));
        }
        if let Some(d) = to {
            query.push(("end_date", d.format(DATE_FMT).to_string()));
        }

        let resp = self
            .http
            .get(self.url(FITNESS_RECORDS))
            .bearer_auth(self.token()?)
            .query(&query)
            .send()
            .await?;
        let rows: Vec<WireRecord> = check(resp).await?.json().await?;
        debug!(rows = rows.len(), "fetched remote records");
        rows.into_iter().map(WireRecord::into_record).collect()
    }

    /// Validate locally, then post. Returns the record with the id the
    /// backend assigned.
    pub async fn create_record(&self, new: NewRecord) -> Result<FitnessRecord> {
        let new = new.validate()?;
        let token = self.token()?;

        let resp = self
            .http
            .post(self.url(FITNESS_RECORDS))
            .bearer_auth(token)
            .json(&WireRecord::from_new(&new))
            .send()
            .await?;
        let created: CreatedResponse = check(resp).await?.json().await?;
        info!(id = created.id, "remote record created");
        Ok(new.into_record(created.id.to_string()))
    }

    /// Remove a record. Returns `false` when the backend says the record does
    /// not exist. Any other 404 (for example an unknown user) is an error.
    pub async fn delete_record(&self, id: &str) -> Result<bool> {
        let resp = self
            .http
            .delete(self.url(&format!("{FITNESS_RECORDS}/{id}")))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorDetail>(&body).ok().map(|d| d.detail);
            if detail.as_deref() == Some(RECORD_NOT_FOUND) {
                debug!(id, "remote delete: no such record");
                return Ok(false);
            }
            return Err(Error::Api { status: StatusCode::NOT_FOUND.as_u16(), body });
        }
        check(resp).await?;
        info!(id, "remote record deleted");
        Ok(true)
    }
}
