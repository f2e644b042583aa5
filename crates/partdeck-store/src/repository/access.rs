//! # Access Repository
//!
//! Durable state of the verification gate.
//!
//! ## Keys
//! ```text
//! partdeck.gate.token            AccessToken JSON
//! partdeck.gate.failed_attempts  integer text
//! partdeck.gate.locked_until     RFC 3339 timestamp
//! partdeck.gate.local_code       plain text
//! partdeck.gate.remote_code      RemoteCode JSON (code + fetch time)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use partdeck_core::gate::{AccessToken, GateState};

use crate::error::StoreResult;
use crate::repository::kv::KvRepository;

const TOKEN_KEY: &str = "partdeck.gate.token";
const ATTEMPTS_KEY: &str = "partdeck.gate.failed_attempts";
const LOCKED_UNTIL_KEY: &str = "partdeck.gate.locked_until";
const LOCAL_CODE_KEY: &str = "partdeck.gate.local_code";
const REMOTE_CODE_KEY: &str = "partdeck.gate.remote_code";

/// A verification code fetched from the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCode {
    pub code: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccessRepository {
    kv: KvRepository,
}

impl AccessRepository {
    pub fn new(kv: KvRepository) -> Self {
        AccessRepository { kv }
    }

    /// Loads the gate state. Unreadable entries count as absent.
    pub async fn load_state(&self) -> StoreResult<GateState> {
        let token = match self.kv.get_json::<AccessToken>(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable access token");
                None
            }
        };

        let failed_attempts = self
            .kv
            .get(ATTEMPTS_KEY)
            .await?
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let locked_until = self
            .kv
            .get(LOCKED_UNTIL_KEY)
            .await?
            .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(GateState {
            failed_attempts,
            locked_until,
            token,
        })
    }

    /// Writes every field of the state, deleting the absent ones.
    pub async fn save_state(&self, state: &GateState) -> StoreResult<()> {
        match &state.token {
            Some(token) => self.kv.set_json(TOKEN_KEY, token).await?,
            None => {
                self.kv.delete(TOKEN_KEY).await?;
            }
        }

        if state.failed_attempts > 0 {
            self.kv
                .set(ATTEMPTS_KEY, &state.failed_attempts.to_string())
                .await?;
        } else {
            self.kv.delete(ATTEMPTS_KEY).await?;
        }

        match state.locked_until {
            Some(until) => self.kv.set(LOCKED_UNTIL_KEY, &until.to_rfc3339()).await?,
            None => {
                self.kv.delete(LOCKED_UNTIL_KEY).await?;
            }
        }
        Ok(())
    }

    pub async fn local_code(&self) -> StoreResult<Option<String>> {
        Ok(self.kv.get(LOCAL_CODE_KEY).await?.filter(|c| !c.is_empty()))
    }

    pub async fn set_local_code(&self, code: &str) -> StoreResult<()> {
        self.kv.set(LOCAL_CODE_KEY, code).await
    }

    pub async fn remote_code(&self) -> StoreResult<Option<RemoteCode>> {
        match self.kv.get_json::<RemoteCode>(REMOTE_CODE_KEY).await {
            Ok(cached) => Ok(cached),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable remote code cache");
                Ok(None)
            }
        }
    }

    pub async fn set_remote_code(&self, remote: &RemoteCode) -> StoreResult<()> {
        self.kv.set_json(REMOTE_CODE_KEY, remote).await
    }
}
