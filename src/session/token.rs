//! Token pair and expiry inspection

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access/refresh credential pair as exchanged with the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Freshness of an access token relative to the refresh threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    ExpiringSoon,
}

/// Source of "now", swappable in tests
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Read the `exp` claim without verifying the signature.
///
/// The backend is the only party that can verify tokens; the console only
/// needs to know when to ask for a new pair.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// Undecodable tokens and tokens without `exp` count as expiring
pub fn token_state(access_token: &str, now: i64, threshold_seconds: i64) -> TokenState {
    match token_expiry(access_token) {
        Some(exp) if exp - now > threshold_seconds => TokenState::Valid,
        _ => TokenState::ExpiringSoon,
    }
}
