// OAuth for the Web API - authorization code grant, PKCE when there's no client secret
// Tokens only ever live in memory; every run authorizes again or starts from REFRESH_TOKEN

use super::{SpotifyError, ACCOUNTS_BASE_URL, SCOPE};
use crate::config::SpotifyConfig;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Refresh this long before Spotify would reject the token.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// Everything needed to finish the flow once the user comes back from the browser.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub url: String,
    pub state: String,
    pub verifier: Option<String>,
}

pub struct Authorizer {
    http: reqwest::Client,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
    accounts_base: String,
    token: Mutex<Option<Token>>,
}

impl Authorizer {
    pub fn new(http: reqwest::Client, config: &SpotifyConfig) -> Self {
        Self::with_accounts_base(http, config, ACCOUNTS_BASE_URL)
    }

    pub fn with_accounts_base(
        http: reqwest::Client,
        config: &SpotifyConfig,
        accounts_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    /// Pre-authorized, used by tests and by callers that already hold a token.
    pub fn with_token(self, token: Token) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            ..self
        }
    }

    pub fn uses_pkce(&self) -> bool {
        self.client_secret.is_none()
    }

    pub fn authorize_request(&self) -> Result<AuthorizeRequest, SpotifyError> {
        let state = random_string(16);
        let verifier = self.uses_pkce().then(|| random_string(64));

        let mut params = vec![
            ("client_id", self.client_id.clone()),
            ("response_type", "code".to_string()),
            ("redirect_uri", self.redirect_uri.clone()),
            ("scope", SCOPE.to_string()),
            ("state", state.clone()),
        ];
        if let Some(verifier) = &verifier {
            params.push(("code_challenge_method", "S256".to_string()));
            params.push(("code_challenge", pkce_challenge(verifier)));
        }

        let url = Url::parse_with_params(&format!("{}/authorize", self.accounts_base), &params)
            .map_err(|e| SpotifyError::Auth(format!("bad authorize url: {}", e)))?;

        Ok(AuthorizeRequest {
            url: url.into(),
            state,
            verifier,
        })
    }

    pub async fn exchange_code(&self, code: &str, verifier: Option<&str>) -> Result<(), SpotifyError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if let Some(verifier) = verifier {
            form.push(("code_verifier", verifier));
        }

        let token = self.request_token(&form, None).await?;
        info!("Authorized with Spotify, token valid until {}", token.expires_at);
        *self.token.lock().await = Some(token);
        Ok(())
    }

    /// Start from a stored refresh token; the first API call refreshes it.
    pub async fn use_refresh_token(&self, refresh_token: String) {
        *self.token.lock().await = Some(Token {
            access_token: String::new(),
            refresh_token: Some(refresh_token),
            expires_at: Utc::now(),
        });
    }

    /// A valid access token, refreshed on the way if it's about to expire.
    pub async fn access_token(&self) -> Result<String, SpotifyError> {
        let mut guard = self.token.lock().await;
        let token = guard
            .as_ref()
            .ok_or_else(|| SpotifyError::Auth("not authorized yet".to_string()))?;

        if !token.needs_refresh(Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| SpotifyError::Auth("token expired and no refresh token".to_string()))?;

        debug!("Refreshing Spotify access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let refreshed = self.request_token(&form, Some(refresh_token.clone())).await?;
        let access_token = refreshed.access_token.clone();
        *guard = Some(refreshed);
        Ok(access_token)
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<Token, SpotifyError> {
        let mut form: Vec<(&str, &str)> = form.to_vec();
        let mut request = self.http.post(format!("{}/api/token", self.accounts_base));

        request = match &self.client_secret {
            Some(secret) => request.basic_auth(&self.client_id, Some(secret)),
            None => {
                form.push(("client_id", self.client_id.as_str()));
                request
            }
        };

        let response = request.form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let parsed: TokenResponse = response.json().await?;
        Ok(Token {
            access_token: parsed.access_token,
            // Spotify doesn't always rotate the refresh token
            refresh_token: parsed.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }
}

/// Pull the authorization code out of the URL the browser was redirected to.
pub fn extract_code(redirected: &str, expected_state: &str) -> Result<String, SpotifyError> {
    let url = Url::parse(redirected.trim())
        .map_err(|e| SpotifyError::Auth(format!("not a URL ({}): {}", e, redirected.trim())))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(SpotifyError::Auth(format!("authorization denied: {}", value))),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(SpotifyError::Auth("state mismatch in redirect".to_string()));
    }
    code.ok_or_else(|| SpotifyError::Auth("redirect has no code parameter".to_string()))
}

/// S256 code challenge for a PKCE verifier.
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(secret: Option<&str>) -> SpotifyConfig {
        SpotifyConfig {
            client_id: "client-123".to_string(),
            client_secret: secret.map(str::to_string),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            refresh_token: None,
        }
    }

    #[test]
    fn test_pkce_challenge_matches_rfc7636() {
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuxmKm1qpWM"
        );
    }

    #[test]
    fn test_authorize_url_with_secret() {
        let auth = Authorizer::new(reqwest::Client::new(), &config(Some("shh")));
        let request = auth.authorize_request().unwrap();

        let url = Url::parse(&request.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(request.url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("scope".into(), SCOPE.into())));
        assert!(pairs.contains(&("state".into(), request.state.clone())));
        assert!(!pairs.iter().any(|(k, _)| k == "code_challenge"));
        assert!(request.verifier.is_none());
    }

    #[test]
    fn test_authorize_url_without_secret_uses_pkce() {
        let auth = Authorizer::new(reqwest::Client::new(), &config(None));
        let request = auth.authorize_request().unwrap();

        let verifier = request.verifier.clone().unwrap();
        assert_eq!(verifier.len(), 64);
        let url = Url::parse(&request.url).unwrap();
        let challenge = url
            .query_pairs()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.into_owned());
        assert_eq!(challenge, Some(pkce_challenge(&verifier)));
    }

    #[test]
    fn test_extract_code() {
        let code = extract_code("http://127.0.0.1:8888/callback?code=abc123&state=xyz\n", "xyz").unwrap();
        assert_eq!(code, "abc123");
    }

    #[test]
    fn test_extract_code_rejects_bad_redirects() {
        assert!(extract_code("http://127.0.0.1:8888/callback?code=abc&state=other", "xyz").is_err());
        assert!(extract_code("http://127.0.0.1:8888/callback?error=access_denied&state=xyz", "xyz").is_err());
        assert!(extract_code("http://127.0.0.1:8888/callback?state=xyz", "xyz").is_err());
        assert!(extract_code("not a url", "xyz").is_err());
    }

    #[test]
    fn test_token_refresh_window() {
        let now = Utc::now();
        let fresh = Token {
            access_token: "a".into(),
            refresh_token: None,
            expires_at: now + Duration::seconds(3600),
        };
        let stale = Token {
            expires_at: now + Duration::seconds(30),
            ..fresh.clone()
        };
        assert!(!fresh.needs_refresh(now));
        assert!(stale.needs_refresh(now));
    }

    #[tokio::test]
    async fn test_exchange_code_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-me"
            })))
            .mount(&server)
            .await;

        let auth = Authorizer::with_accounts_base(reqwest::Client::new(), &config(Some("shh")), server.uri());
        auth.exchange_code("abc123", None).await.unwrap();

        assert_eq!(auth.access_token().await.unwrap(), "fresh-token");
    }

    #[tokio::test]
    async fn test_refresh_token_is_exchanged_on_first_use() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=client-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "refreshed",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Authorizer::with_accounts_base(reqwest::Client::new(), &config(None), server.uri());
        auth.use_refresh_token("stored-refresh".to_string()).await;

        assert_eq!(auth.access_token().await.unwrap(), "refreshed");
        // second call reuses the cached token
        assert_eq!(auth.access_token().await.unwrap(), "refreshed");
    }

    #[tokio::test]
    async fn test_unauthorized_access_token_errors() {
        let auth = Authorizer::new(reqwest::Client::new(), &config(None));
        assert!(matches!(auth.access_token().await, Err(SpotifyError::Auth(_))));
    }

    #[tokio::test]
    async fn test_token_endpoint_failure_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\":\"invalid_grant\"}"))
            .mount(&server)
            .await;

        let auth = Authorizer::with_accounts_base(reqwest::Client::new(), &config(Some("shh")), server.uri());
        let err = auth.exchange_code("bad", None).await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
