use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Profile as returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub birth_date: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Key-value JSON file holding the bearer token and the cached profile.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(crate::config::config_dir()?.join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", self.path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", self.path.display())))
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("creating {}: {e}", parent.display())))?;
        }
        let text = serde_json::to_string_pretty(map).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| Error::Config(format!("writing {}: {e}", self.path.display())))
    }

    /// The stored session, if both the token and the profile are present.
    pub fn load(&self) -> Result<Option<Session>> {
        let map = self.read_map()?;
        let token = map.get(TOKEN_KEY).and_then(Value::as_str);
        let user = map.get(USER_KEY).cloned();

        match (token, user) {
            (Some(token), Some(user)) => {
                let user: UserProfile = serde_json::from_value(user)
                    .map_err(|e| Error::Config(format!("stored profile is invalid: {e}")))?;
                Ok(Some(Session { token: token.to_string(), user }))
            }
            _ => Ok(None),
        }
    }

    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or(Error::NotLoggedIn)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        // A fresh login replaces whatever was there, even an unreadable file.
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "credential file unreadable, overwriting");
                Map::new()
            }
        };
        map.insert(TOKEN_KEY.into(), Value::String(session.token.clone()));
        map.insert(
            USER_KEY.into(),
            serde_json::to_value(&session.user).map_err(|e| Error::Config(e.to_string()))?,
        );
        self.write_map(&map)?;
        debug!(path = %self.path.display(), user = %session.user.username, "credentials saved");
        Ok(())
    }

    /// Replace the cached profile, keeping the token.
    pub fn update_user(&self, user: &UserProfile) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(
            USER_KEY.into(),
            serde_json::to_value(user).map_err(|e| Error::Config(e.to_string()))?,
        );
        self.write_map(&map)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| Error::Config(format!("removing {}: {e}", self.path.display())))?;
        }
        Ok(())
    }
}
