use super::models::{CurrentlyPlaying, ErrorEnvelope, PlayerState};
use super::{Authorizer, PlaybackClient, SpotifyError, API_BASE_URL};
use crate::state::Playback;
use reqwest::{Method, Response, StatusCode};
use tracing::debug;

pub struct SpotifyClient {
    http: reqwest::Client,
    auth: Authorizer,
    api_base: String,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, auth: Authorizer) -> Self {
        Self::with_base_url(http, auth, API_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, auth: Authorizer, api_base: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.auth
    }

    async fn send(&self, method: Method, endpoint: &str) -> Result<Response, SpotifyError> {
        let token = self.auth.access_token().await?;
        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.api_base, endpoint))
            .bearer_auth(token);

        // Player commands are bodiless, but Spotify wants an explicit length
        if method != Method::GET {
            request = request.header(reqwest::header::CONTENT_LENGTH, "0");
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn command(&self, method: Method, endpoint: &str) -> Result<(), SpotifyError> {
        debug!("Spotify command {} {}", method, endpoint);
        self.send(method, endpoint).await?;
        Ok(())
    }
}

async fn api_error(response: Response) -> SpotifyError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    SpotifyError::Api { status, message }
}

impl PlaybackClient for SpotifyClient {
    async fn query(&self) -> Result<Option<Playback>, SpotifyError> {
        let response = self.send(Method::GET, "/v1/me/player/currently-playing").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let current: CurrentlyPlaying = response.json().await?;
        Ok(current.into_playback())
    }

    async fn is_currently_playing(&self) -> Result<bool, SpotifyError> {
        let response = self.send(Method::GET, "/v1/me/player").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(false);
        }
        let state: PlayerState = response.json().await?;
        Ok(state.is_playing)
    }

    async fn pause(&self) -> Result<(), SpotifyError> {
        self.command(Method::PUT, "/v1/me/player/pause").await
    }

    async fn resume(&self) -> Result<(), SpotifyError> {
        self.command(Method::PUT, "/v1/me/player/play").await
    }

    async fn skip_next(&self) -> Result<(), SpotifyError> {
        self.command(Method::POST, "/v1/me/player/next").await
    }

    async fn skip_previous(&self) -> Result<(), SpotifyError> {
        self.command(Method::POST, "/v1/me/player/previous").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpotifyConfig;
    use crate::spotify::Token;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SpotifyClient {
        let config = SpotifyConfig {
            client_id: "client-123".to_string(),
            client_secret: None,
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            refresh_token: None,
        };
        let auth = Authorizer::new(reqwest::Client::new(), &config).with_token(Token {
            access_token: "test-token".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        });
        SpotifyClient::with_base_url(reqwest::Client::new(), auth, server.uri())
    }

    #[tokio::test]
    async fn test_query_nothing_playing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert!(client(&server).query().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_parses_track() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "is_playing": false,
                "progress_ms": 1234,
                "item": {
                    "id": "abc",
                    "name": "Song",
                    "duration_ms": 180000,
                    "artists": [{ "name": "Band" }],
                    "album": { "name": "Record", "images": [{ "url": "https://img/1" }] }
                }
            })))
            .mount(&server)
            .await;

        let playback = client(&server).query().await.unwrap().unwrap();
        assert_eq!(playback.track.name, "Song");
        assert_eq!(playback.track.progress_ms, 1234);
        assert!(!playback.state.is_playing);
    }

    #[tokio::test]
    async fn test_is_currently_playing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_playing": true })))
            .mount(&server)
            .await;

        assert!(client(&server).is_currently_playing().await.unwrap());
    }

    #[tokio::test]
    async fn test_commands_hit_player_endpoints() {
        let server = MockServer::start().await;
        for (verb, endpoint) in [
            ("PUT", "/v1/me/player/pause"),
            ("PUT", "/v1/me/player/play"),
            ("POST", "/v1/me/player/next"),
            ("POST", "/v1/me/player/previous"),
        ] {
            Mock::given(method(verb))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client(&server);
        client.pause().await.unwrap();
        client.resume().await.unwrap();
        client.skip_next().await.unwrap();
        client.skip_previous().await.unwrap();
    }

    #[tokio::test]
    async fn test_command_error_carries_spotify_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/me/player/pause"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "status": 404,
                    "message": "Player command failed: No active device found",
                    "reason": "NO_ACTIVE_DEVICE"
                }
            })))
            .mount(&server)
            .await;

        match client(&server).pause().await {
            Err(SpotifyError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Player command failed: No active device found");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client(&server).query().await.unwrap_err();
        assert!(matches!(err, SpotifyError::Api { status: 503, .. }));
    }
}
