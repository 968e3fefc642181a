#![cfg(feature = "web")]

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, REMOTE_TIMEOUT_SECS, Result, from_transport};
use crate::secrets::ServiceAccountKey;

/// Scopes requested for the service identity: spreadsheet feeds and drive.
pub const SCOPES: [&str; 2] = [
    "https://spreadsheets.google.com/feeds",
    "https://www.googleapis.com/auth/drive",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const USER_AGENT: &str = concat!("worldcup-dashboard/", env!("CARGO_PKG_VERSION"));

/// Authorized handle on the remote spreadsheet service for one render cycle.
pub struct Session {
    pub(crate) http: Client,
    pub(crate) token: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// HTTP client shared by the token exchange and the spreadsheet calls.
pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
        .build()
        .map_err(|e| DashboardError::Auth(format!("cannot build HTTP client: {}", e)))
}

/// Signs the RS256 assertion presented to the token endpoint.
pub fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DashboardError::Auth(format!("private key is not a valid RSA PEM: {}", e)))?;

    encode(&header, &claims, &signing_key)
        .map_err(|e| DashboardError::Auth(format!("cannot sign assertion: {}", e)))
}

/// Exchanges the service-account credential for an access token.
///
/// Attempted once; any rejection by the identity provider is an `Auth` error.
pub fn authorize(key: &ServiceAccountKey) -> Result<Session> {
    let http = http_client()?;
    let assertion = sign_assertion(key, Utc::now().timestamp())?;

    let resp = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .map_err(|e| from_transport(e, "token exchange", DashboardError::Auth))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(DashboardError::Auth(format!(
            "identity provider rejected credential ({}): {}",
            status, body
        )));
    }

    let token: TokenResponse = resp
        .json()
        .map_err(|e| DashboardError::Auth(format!("unreadable token response: {}", e)))?;

    info!(
        "authorized as {} (token valid {}s)",
        key.client_email,
        token.expires_in.unwrap_or(0)
    );

    Ok(Session {
        http,
        token: token.access_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pem: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "bot@piala.iam.gserviceaccount.com".into(),
            private_key: pem.into(),
            private_key_id: Some("k1".into()),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            project_id: None,
        }
    }

    #[test]
    fn garbage_private_key_is_an_auth_error() {
        let err = sign_assertion(&key("not a pem"), 0).unwrap_err();
        assert!(matches!(err, DashboardError::Auth(_)));
    }

    #[test]
    fn scopes_cover_sheets_and_drive() {
        let scope = SCOPES.join(" ");
        assert!(scope.contains("spreadsheets.google.com/feeds"));
        assert!(scope.contains("auth/drive"));
    }
}
