//! # Verification Gate
//!
//! Policy for the access-code gate in front of the catalog. The clock is
//! passed in; storing the state is the caller's job.
//!
//! ## Attempt Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  verify(input)                                                          │
//! │       │                                                                 │
//! │       ├── locked and lock not expired? ──► Locked { remaining }         │
//! │       │   (expired lock: counters cleared, continue)                    │
//! │       ▼                                                                 │
//! │  sanitize(input) ── empty? ──► Empty                                    │
//! │       │                                                                 │
//! │       ├── equals expected code ──► Granted { token valid 24h }          │
//! │       │                            counters cleared                     │
//! │       ▼                                                                 │
//! │  attempts += 1                                                          │
//! │       ├── attempts >= 3 ──► Locked { 5 minutes }                        │
//! │       └── otherwise     ──► Rejected { remaining_attempts }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expected Code Priority
//! remote override (cached) → locally stored code → configured default

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::{validate_verification_code, ValidationResult};
use crate::MAX_INPUT_LENGTH;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));
static QUOTE_OR_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>"'`]"#).expect("static pattern"));
static EVENT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+=").expect("static pattern"));
static SCRIPT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("static pattern"));

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Strips markup and script fragments, trims, and caps the length.
///
/// ## Example
/// ```rust
/// use partdeck_core::gate::sanitize_input;
///
/// assert_eq!(sanitize_input("  <b>AB12</b> "), "AB12");
/// assert_eq!(sanitize_input("javascript:alert(1)"), "alert(1)");
/// ```
pub fn sanitize_input(input: &str) -> String {
    let clean = TAG.replace_all(input, "");
    let clean = QUOTE_OR_BRACKET.replace_all(&clean, "");
    let clean = EVENT_ATTR.replace_all(&clean, "");
    let clean = SCRIPT_URL.replace_all(&clean, "");
    clean.trim().chars().take(MAX_INPUT_LENGTH).collect()
}

/// Sanitises and validates a new local verification code.
pub fn prepare_new_code(input: &str) -> ValidationResult<String> {
    let code = sanitize_input(input);
    validate_verification_code(&code)?;
    Ok(code)
}

/// Builds a code from random bytes, one character per byte.
pub fn code_from_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
        .collect()
}

/// Picks the code that unlocks the gate.
pub fn resolve_expected_code<'a>(
    remote: Option<&'a str>,
    local: Option<&'a str>,
    default: &'a str,
) -> &'a str {
    remote
        .filter(|c| !c.is_empty())
        .or(local.filter(|c| !c.is_empty()))
        .unwrap_or(default)
}

/// Formats a lock duration as `4m 30s` / `45s`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let (minutes, seconds) = (secs / 60, secs % 60);
    match (minutes, seconds) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}

// =============================================================================
// State
// =============================================================================

/// Proof of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Persisted gate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateState {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub token: Option<AccessToken>,
}

/// Result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Granted(AccessToken),
    Rejected { remaining_attempts: u32 },
    Locked { remaining: Duration },
    Empty,
}

// =============================================================================
// Policy
// =============================================================================

/// Gate limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub max_attempts: u32,
    pub lockout: Duration,
    pub token_ttl: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        GatePolicy {
            max_attempts: 3,
            lockout: Duration::minutes(5),
            token_ttl: Duration::hours(24),
        }
    }
}

impl GatePolicy {
    pub fn is_authenticated(&self, state: &GateState, now: DateTime<Utc>) -> bool {
        state.token.is_some_and(|t| t.is_valid_at(now))
    }

    /// Remaining lock time. An expired lock clears the counters.
    pub fn check_lock(&self, state: &mut GateState, now: DateTime<Utc>) -> Option<Duration> {
        match state.locked_until {
            Some(until) if now < until => Some(until - now),
            Some(_) => {
                state.failed_attempts = 0;
                state.locked_until = None;
                None
            }
            None => None,
        }
    }

    /// Checks `input` against `expected` and updates the counters.
    pub fn verify(
        &self,
        state: &mut GateState,
        input: &str,
        expected: &str,
        now: DateTime<Utc>,
    ) -> VerifyOutcome {
        if let Some(remaining) = self.check_lock(state, now) {
            return VerifyOutcome::Locked { remaining };
        }

        let code = sanitize_input(input);
        if code.is_empty() {
            return VerifyOutcome::Empty;
        }

        if code == expected {
            state.failed_attempts = 0;
            state.locked_until = None;
            let token = AccessToken {
                issued_at: now,
                expires_at: now + self.token_ttl,
            };
            state.token = Some(token);
            return VerifyOutcome::Granted(token);
        }

        state.failed_attempts += 1;
        if state.failed_attempts >= self.max_attempts {
            state.locked_until = Some(now + self.lockout);
            VerifyOutcome::Locked {
                remaining: self.lockout,
            }
        } else {
            VerifyOutcome::Rejected {
                remaining_attempts: self.max_attempts - state.failed_attempts,
            }
        }
    }

    /// Drops the token and clears the counters.
    pub fn logout(&self, state: &mut GateState) {
        state.token = None;
        state.failed_attempts = 0;
        state.locked_until = None;
    }
}
