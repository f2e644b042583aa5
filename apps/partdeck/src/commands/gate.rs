//! # Gate Commands
//!
//! `login`, `logout`, `status` and `set-code`.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  partdeck login <code>                                                  │
//! │       │                                                                 │
//! │       ├── locked? ───────────────► "Locked, try again in 4m 30s"        │
//! │       ├── blank after sanitising ► "Please enter a verification code"   │
//! │       ├── matches expected code ─► token valid for token_ttl_hours      │
//! │       └── wrong ─────────────────► attempts left, or a new lockout      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use partdeck_core::gate::{format_remaining, VerifyOutcome};

use crate::error::ApiError;
use crate::state::{AccessState, GateStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub granted: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDto {
    pub code: String,
    pub generated: bool,
}

/// Checks a verification code.
///
/// ## Errors
/// A refused code is not an error; only store failures are.
pub async fn login(access: &AccessState, code: &str) -> Result<LoginDto, ApiError> {
    let outcome = access.verify(code, Utc::now()).await?;
    Ok(match outcome {
        VerifyOutcome::Granted(token) => LoginDto {
            granted: true,
            message: "Verification successful".to_string(),
            expires_at: Some(token.expires_at),
            remaining_attempts: None,
        },
        VerifyOutcome::Rejected { remaining_attempts } => LoginDto {
            granted: false,
            message: format!(
                "Incorrect verification code, {} attempt(s) left",
                remaining_attempts
            ),
            expires_at: None,
            remaining_attempts: Some(remaining_attempts),
        },
        VerifyOutcome::Locked { remaining } => LoginDto {
            granted: false,
            message: format!(
                "Too many failed attempts, try again in {}",
                format_remaining(remaining)
            ),
            expires_at: None,
            remaining_attempts: Some(0),
        },
        VerifyOutcome::Empty => LoginDto {
            granted: false,
            message: "Please enter a verification code".to_string(),
            expires_at: None,
            remaining_attempts: None,
        },
    })
}

pub async fn logout(access: &AccessState) -> Result<(), ApiError> {
    access.logout().await
}

pub async fn status(access: &AccessState) -> Result<GateStatus, ApiError> {
    access.status(Utc::now()).await
}

/// Stores `code` as the local verification code, or a random one.
///
/// ## Errors
/// - `ValidationError` if `code` is shorter than four characters
/// - `ValidationError` if neither a code nor `generate` is given
pub async fn set_code(
    access: &AccessState,
    code: Option<&str>,
    generate: bool,
) -> Result<CodeDto, ApiError> {
    match (code, generate) {
        (_, true) => Ok(CodeDto {
            code: access.generate_code().await?,
            generated: true,
        }),
        (Some(code), false) => Ok(CodeDto {
            code: access.set_code(code).await?,
            generated: false,
        }),
        (None, false) => Err(ApiError::validation(
            "Give a new code or pass --generate",
        )),
    }
}
