//! # Access State
//!
//! The verification gate in front of the catalog.
//!
//! ## Expected Code Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Remote code cached less than remote_cache_secs ago ──► use it      │
//! │  2. GET remote_url  {"code": "..."}  ──► cache it, store as local      │
//! │  3. Stale remote cache                                                  │
//! │  4. Locally set code                                                    │
//! │  5. gate.default_code                                                   │
//! │                                                                         │
//! │  Steps 1-3 apply only when gate.remote_url is configured.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Attempt counters, the lock deadline and the access token are persisted
//! through [`AccessRepository`], so they survive between invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use partdeck_core::gate::{
    code_from_bytes, format_remaining, prepare_new_code, resolve_expected_code, sanitize_input,
    GatePolicy, VerifyOutcome,
};
use partdeck_store::{AccessRepository, RemoteCode};

use crate::config::GateSettings;
use crate::error::ApiError;

/// Length of generated verification codes.
const GENERATED_CODE_LENGTH: usize = 6;

/// Gate summary for `partdeck status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    pub enabled: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub failed_attempts: u32,
    /// Time left on a lockout, formatted like `4m 30s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_for: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteCodeDocument {
    #[serde(default)]
    code: Option<String>,
}

pub struct AccessState {
    repo: AccessRepository,
    settings: GateSettings,
    policy: GatePolicy,
    http: reqwest::Client,
}

impl AccessState {
    pub fn new(repo: AccessRepository, settings: GateSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("partdeck/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(AccessState {
            repo,
            policy: settings.policy(),
            settings,
            http,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub async fn status(&self, now: DateTime<Utc>) -> Result<GateStatus, ApiError> {
        let mut state = self.repo.load_state().await?;
        let locked = self.policy.check_lock(&mut state, now);
        let authenticated = self.policy.is_authenticated(&state, now);

        Ok(GateStatus {
            enabled: self.is_enabled(),
            authenticated,
            expires_at: state.token.filter(|_| authenticated).map(|t| t.expires_at),
            failed_attempts: state.failed_attempts,
            locked_for: locked.map(format_remaining),
        })
    }

    /// Fails with `AccessDenied` unless the gate is off or a token is valid.
    pub async fn require_access(&self, now: DateTime<Utc>) -> Result<(), ApiError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let state = self.repo.load_state().await?;
        if self.policy.is_authenticated(&state, now) {
            Ok(())
        } else {
            Err(ApiError::access_denied(
                "Verification required. Run `partdeck login <code>` first.",
            ))
        }
    }

    /// Checks a verification code and records the attempt.
    pub async fn verify(&self, input: &str, now: DateTime<Utc>) -> Result<VerifyOutcome, ApiError> {
        let mut state = self.repo.load_state().await?;

        // A locked gate answers without resolving the code
        if let Some(remaining) = self.policy.check_lock(&mut state, now) {
            return Ok(VerifyOutcome::Locked { remaining });
        }
        if sanitize_input(input).is_empty() {
            return Ok(VerifyOutcome::Empty);
        }

        let expected = self.expected_code(now).await?;
        let outcome = self.policy.verify(&mut state, input, &expected, now);
        self.repo.save_state(&state).await?;

        match &outcome {
            VerifyOutcome::Granted(token) => info!(expires_at = %token.expires_at, "Access granted"),
            VerifyOutcome::Rejected { remaining_attempts } => {
                warn!(remaining_attempts, "Verification code rejected")
            }
            VerifyOutcome::Locked { remaining } => {
                warn!(locked_for = %format_remaining(*remaining), "Verification locked")
            }
            VerifyOutcome::Empty => {}
        }
        Ok(outcome)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let mut state = self.repo.load_state().await?;
        self.policy.logout(&mut state);
        self.repo.save_state(&state).await?;
        info!("Logged out");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Codes
    // -------------------------------------------------------------------------

    /// Stores a new local verification code.
    ///
    /// ## Errors
    /// - `ValidationError` if the sanitised code is too short
    pub async fn set_code(&self, input: &str) -> Result<String, ApiError> {
        let code = prepare_new_code(input)?;
        self.repo.set_local_code(&code).await?;
        info!("Local verification code updated");
        Ok(code)
    }

    /// Generates and stores a random local code.
    pub async fn generate_code(&self) -> Result<String, ApiError> {
        let random = uuid::Uuid::new_v4();
        let code = code_from_bytes(&random.as_bytes()[..GENERATED_CODE_LENGTH]);
        self.repo.set_local_code(&code).await?;
        info!("Generated a new local verification code");
        Ok(code)
    }

    /// The code a verification attempt is compared against.
    pub async fn expected_code(&self, now: DateTime<Utc>) -> Result<String, ApiError> {
        let local = self.repo.local_code().await?;

        let remote = match &self.settings.remote_url {
            Some(url) => self.remote_code(url, now).await?,
            None => None,
        };

        Ok(resolve_expected_code(
            remote.as_deref(),
            local.as_deref(),
            &self.settings.default_code,
        )
        .to_string())
    }

    async fn remote_code(&self, url: &str, now: DateTime<Utc>) -> Result<Option<String>, ApiError> {
        let cached = self.repo.remote_code().await?;

        if let Some(cached) = &cached {
            if now - cached.fetched_at <= self.settings.remote_cache_ttl() {
                debug!("Using cached remote verification code");
                return Ok(Some(cached.code.clone()));
            }
        }

        match self.fetch_remote(url).await {
            Some(code) => {
                let remote = RemoteCode {
                    code: code.clone(),
                    fetched_at: now,
                };
                self.repo.set_remote_code(&remote).await?;
                self.repo.set_local_code(&code).await?;
                Ok(Some(code))
            }
            None => Ok(cached.map(|c| c.code)),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Option<String> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Remote verification code unavailable");
                return None;
            }
        };

        let document = match response.error_for_status() {
            Ok(response) => response.json::<RemoteCodeDocument>().await,
            Err(e) => Err(e),
        };

        match document {
            Ok(document) => {
                let code = sanitize_input(document.code.as_deref().unwrap_or_default());
                (!code.is_empty()).then_some(code)
            }
            Err(e) => {
                warn!(error = %e, "Remote verification code unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use partdeck_store::{Database, StoreConfig};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn access(settings: GateSettings) -> (Database, AccessState) {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let state = AccessState::new(db.access(), settings).unwrap();
        (db, state)
    }

    /// Serves one HTTP response with `body`, returns the URL.
    async fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/code.json", addr)
    }

    #[tokio::test]
    async fn test_default_then_local_code() {
        let (_db, access) = access(GateSettings::default()).await;
        let now = Utc::now();

        assert_eq!(access.expected_code(now).await.unwrap(), "PD2024");

        access.set_code("  <b>NEW1</b> ").await.unwrap();
        assert_eq!(access.expected_code(now).await.unwrap(), "NEW1");

        assert!(access.set_code("ab").await.is_err());
    }

    #[tokio::test]
    async fn test_login_flow_and_lockout() {
        let (_db, access) = access(GateSettings::default()).await;
        let now = Utc::now();

        assert!(access.require_access(now).await.is_err());

        assert_eq!(access.verify("  ", now).await.unwrap(), VerifyOutcome::Empty);
        assert_eq!(
            access.verify("WRONG", now).await.unwrap(),
            VerifyOutcome::Rejected { remaining_attempts: 2 }
        );
        access.verify("WRONG", now).await.unwrap();
        assert!(matches!(
            access.verify("WRONG", now).await.unwrap(),
            VerifyOutcome::Locked { .. }
        ));

        // Correct code is refused while locked
        assert!(matches!(
            access.verify("PD2024", now).await.unwrap(),
            VerifyOutcome::Locked { .. }
        ));
        let status = access.status(now).await.unwrap();
        assert_eq!(status.locked_for.as_deref(), Some("5m"));

        let later = now + Duration::minutes(6);
        assert!(matches!(
            access.verify("PD2024", later).await.unwrap(),
            VerifyOutcome::Granted(_)
        ));
        access.require_access(later).await.unwrap();

        access.logout().await.unwrap();
        assert!(access.require_access(later).await.is_err());
    }

    #[tokio::test]
    async fn test_token_expires() {
        let (_db, access) = access(GateSettings::default()).await;
        let now = Utc::now();
        access.verify("PD2024", now).await.unwrap();

        assert!(access.status(now).await.unwrap().authenticated);
        let next_day = now + Duration::hours(25);
        assert!(access.require_access(next_day).await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_gate_allows_everything() {
        let settings = GateSettings {
            enabled: false,
            ..GateSettings::default()
        };
        let (_db, access) = access(settings).await;
        access.require_access(Utc::now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_generated_code_is_stored() {
        let (_db, access) = access(GateSettings::default()).await;
        let code = access.generate_code().await.unwrap();
        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(access.expected_code(Utc::now()).await.unwrap(), code);
    }

    #[tokio::test]
    async fn test_remote_code_fetched_and_cached() {
        let url = serve_once(r#"{"code":"REMOTE9"}"#).await;
        let settings = GateSettings {
            remote_url: Some(url),
            ..GateSettings::default()
        };
        let (db, access) = access(settings).await;
        let now = Utc::now();

        assert_eq!(access.expected_code(now).await.unwrap(), "REMOTE9");
        assert_eq!(db.access().local_code().await.unwrap().as_deref(), Some("REMOTE9"));

        // Server is gone; the fresh cache answers
        let soon = now + Duration::seconds(60);
        assert_eq!(access.expected_code(soon).await.unwrap(), "REMOTE9");

        // Stale cache still wins over local when the fetch fails
        access.set_code("LOCAL1").await.unwrap();
        let later = now + Duration::minutes(10);
        assert_eq!(access.expected_code(later).await.unwrap(), "REMOTE9");
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back_to_local() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = GateSettings {
            remote_url: Some(format!("http://{}/code.json", addr)),
            ..GateSettings::default()
        };
        let (_db, access) = access(settings).await;
        access.set_code("LOCAL1").await.unwrap();

        assert_eq!(access.expected_code(Utc::now()).await.unwrap(), "LOCAL1");
    }
}
