//! Bearer-token verification
//!
//! Checks the Authorization header syntax with a single anchored
//! pattern, then performs one POST to the configured verification
//! endpoint. Every request verifies afresh; nothing is cached, so
//! there is no invalidation problem either.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::Deserialize;

use crate::error::VerifyError;

// b64token = 1*( ALPHA / DIGIT / "-" / "." / "_" / "~" / "+" / "/" ) *"="
static BEARER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Bearer ([A-Za-z0-9\-._~+/]+=*)$").unwrap());

const VALIDATE_GRANT_TYPE: &str = "urn:pingidentity.com:oauth2:grant_type:validate_bearer";

/// The verification endpoint's answer for a valid token,
/// request-scoped and never persisted
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedToken {
    pub resource_owner_id: String,
    pub scope: String,
}

/// Client for the remote token verification endpoint
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    endpoint: String,
    client: reqwest::Client,
}

impl TokenVerifier {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Verify the full Authorization header value and return the token
    /// record the endpoint vouches for.
    pub async fn verify(&self, authorization_header: &str) -> Result<VerifiedToken, VerifyError> {
        let captures = BEARER_TOKEN.captures(authorization_header).ok_or_else(|| {
            VerifyError::InvalidToken("the access token is malformed".to_string())
        })?;
        let access_token = &captures[1];

        let form = [
            ("token", access_token),
            ("grant_type", VALIDATE_GRANT_TYPE),
        ];
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("Token verification call to {} failed: {}", self.endpoint, e);
                VerifyError::InvalidToken("unable to verify the access token".to_string())
            })?;

        if response.status() != reqwest::StatusCode::OK {
            warn!(
                "Token verification endpoint returned {}",
                response.status()
            );
            return Err(VerifyError::InvalidToken(
                "the access token is invalid".to_string(),
            ));
        }

        // A response that does not parse is never partially trusted
        response.json::<VerifiedToken>().await.map_err(|e| {
            warn!("Unparseable token verification response: {}", e);
            VerifyError::InvalidToken("the access token is invalid".to_string())
        })
    }
}
