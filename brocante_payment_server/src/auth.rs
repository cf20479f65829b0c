//! Admin session tokens.
//!
//! There is a single administrator identity, authenticated by a shared passphrase. A successful login issues a
//! token of the form `nonce.issued_at.signature`, where the nonce and signature are URL-safe base64 and
//! `issued_at` is a unix epoch in seconds. The signature is HMAC-SHA256 over `nonce.issued_at` under the server's
//! auth secret. Tokens are bearer credentials: they cannot be revoked, and simply expire once their TTL passes.
//!
//! Handlers gate admin endpoints by taking [`AdminClaims`] as an extractor argument. The extractor accepts the
//! token from an `Authorization: Bearer` header or from the `admin_token` cookie that login sets, so both API
//! clients and the admin UI in a browser can authenticate.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use bpg_common::Secret;
use chrono::{DateTime, Duration, Utc};
use log::*;
use rand::{thread_rng, RngCore};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
    helpers::{constant_time_eq, hmac_sha256},
};

pub const ADMIN_COOKIE_NAME: &str = "admin_token";

/// Proof that a request carried a valid, unexpired admin token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClaims {
    pub issued_at: DateTime<Utc>,
}

/// Issues and validates admin tokens. One instance is shared with the app as `web::Data<AdminTokens>`.
#[derive(Clone)]
pub struct AdminTokens {
    admin_password: Secret<String>,
    auth_secret: Secret<String>,
    token_ttl: Duration,
}

impl AdminTokens {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            admin_password: config.admin_password.clone(),
            auth_secret: config.auth_secret.clone(),
            token_ttl: config.token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Checks the passphrase and issues a fresh token. The comparison is constant-time so that the passphrase
    /// cannot be guessed letter by letter.
    pub fn login(&self, passphrase: &str) -> Result<String, AuthError> {
        if !constant_time_eq(passphrase.as_bytes(), self.admin_password.reveal().as_bytes()) {
            return Err(AuthError::IncorrectPassword);
        }
        Ok(self.issue_token())
    }

    pub fn issue_token(&self) -> String {
        self.issue_token_at(Utc::now())
    }

    /// Issues a token with an explicit issue time. Token lifetimes are measured from this instant.
    pub fn issue_token_at(&self, issued_at: DateTime<Utc>) -> String {
        let mut nonce = [0u8; 16];
        thread_rng().fill_bytes(&mut nonce);
        let nonce = base64::encode_config(nonce, base64::URL_SAFE_NO_PAD);
        let payload = format!("{nonce}.{}", issued_at.timestamp());
        let signature =
            base64::encode_config(hmac_sha256(self.auth_secret.reveal(), payload.as_bytes()), base64::URL_SAFE_NO_PAD);
        format!("{payload}.{signature}")
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validates a token against an explicit "now". The signature is checked before anything in the token is
    /// interpreted, so a forged token learns nothing from the error it gets back.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminClaims, AuthError> {
        let mut parts = token.split('.');
        let (Some(nonce), Some(epoch), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::PoorlyFormattedToken("expected nonce.issued_at.signature".to_string()));
        };
        let payload = format!("{nonce}.{epoch}");
        let expected = hmac_sha256(self.auth_secret.reveal(), payload.as_bytes());
        let provided = base64::decode_config(signature, base64::URL_SAFE_NO_PAD)
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("signature is not base64: {e}")))?;
        if !constant_time_eq(&expected, &provided) {
            return Err(AuthError::ValidationError("signature mismatch".to_string()));
        }
        let epoch = epoch
            .parse::<i64>()
            .map_err(|e| AuthError::PoorlyFormattedToken(format!("issued_at is not an epoch: {e}")))?;
        let issued_at = DateTime::from_timestamp(epoch, 0)
            .ok_or_else(|| AuthError::PoorlyFormattedToken("issued_at is out of range".to_string()))?;
        if now - issued_at > self.token_ttl {
            return Err(AuthError::TokenExpired);
        }
        Ok(AdminClaims { issued_at })
    }
}

impl FromRequest for AdminClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<AdminClaims, ServerError> {
    let Some(tokens) = req.app_data::<web::Data<AdminTokens>>() else {
        error!("🔐️ AdminTokens is not registered on the app. All admin requests will fail.");
        return Err(ServerError::InitializeError("admin token support is not configured".to_string()));
    };
    let token = bearer_token(req).map(str::to_string).or_else(|| cookie_token(req));
    let Some(token) = token else {
        debug!("🔐️ No admin token on {} {}", req.method(), req.path());
        return Err(AuthError::MissingToken.into());
    };
    let claims = tokens.validate_token(&token)?;
    Ok(claims)
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

fn cookie_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ADMIN_COOKIE_NAME).map(|c| c.value().to_string())
}
