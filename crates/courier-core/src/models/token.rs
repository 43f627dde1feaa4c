use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// base64url without padding on encode, tolerant of padding on decode
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the payload segment of an identity token.
///
/// Only `exp` is interpreted; every other claim is kept as-is so that decoding
/// reproduces the issued payload exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn new(exp: i64) -> Self {
        Self {
            exp,
            extra: Map::new(),
        }
    }

    pub fn with_claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    /// Expired when `exp` in milliseconds is strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.saturating_mul(1000) < now.timestamp_millis()
    }

    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(Value::as_str)
    }
}

/// Decode a base64url payload segment into claims.
pub fn decode_payload_segment(segment: &str) -> Result<TokenClaims, AppError> {
    let bytes = PAYLOAD_ENGINE
        .decode(segment)
        .map_err(|e| AppError::MalformedToken(format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::MalformedToken(format!("payload is not a claims object: {}", e)))
}

/// Encode claims as a base64url payload segment.
pub fn encode_payload_segment(claims: &TokenClaims) -> Result<String, AppError> {
    let json = serde_json::to_vec(claims)?;
    Ok(PAYLOAD_ENGINE.encode(json))
}

/// Signed identity token (`header.payload.signature`), kept opaque apart from its claims.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the middle segment. The signature is not verified here; the
    /// federation pool verifies it when the token is presented.
    pub fn claims(&self) -> Result<TokenClaims, AppError> {
        let mut segments = self.0.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AppError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };
        decode_payload_segment(payload)
    }
}

impl std::fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IdentityToken")
            .field(&format!("<{} bytes>", self.0.len()))
            .finish()
    }
}

/// Single-use code from the hosted login redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Extract the `code` parameter from a raw query string (with or without a leading `?`).
    pub fn from_query(raw_query: &str) -> Option<Self> {
        raw_query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == "code")
            .map(|(_, value)| {
                urlencoding::decode(&value.replace('+', " "))
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string())
            })
            .filter(|code| !code.is_empty())
            .map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// JSON body returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}
