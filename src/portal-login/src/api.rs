//! Client for the authentication API.

use async_trait::async_trait;
use portal_common::Config;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::LOGIN_PATH;
use crate::types::{LoginPayload, LoginResponse, LoginResponseBody};
use crate::utils::mask_phone;

/// Errors returned by the authentication API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, timeout...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server returned {status}")]
    Status {
        status: u16,
        /// Parsed JSON body, if the response carried one.
        body: Option<serde_json::Value>,
    },

    /// A 2xx response whose body is not a login response.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Human-readable message sent by the server, if any.
    ///
    /// Looks for a non-empty string at `message` in the error response body
    /// and returns it as sent.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                body: Some(body), ..
            } => body
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// The authentication operations the login screen depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse>;
}

/// HTTP implementation of [`AuthApi`].
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client for the given base URL (e.g. "http://localhost:2003/api").
    ///
    /// No request timeout is applied unless one is given.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = portal_common::create_client(timeout).map_err(ApiError::Client)?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client from the resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse> {
        let url = self.endpoint(LOGIN_PATH);
        debug!(url = %url, phone = %mask_phone(&payload.phone), "Sending login request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => serde_json::from_str(&text).ok(),
                Err(e) => {
                    debug!(error = %e, "Failed to read error response body");
                    None
                }
            };
            warn!(status = %status, has_body = body.is_some(), "Login request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;

        debug!(status = %status, body_len = body.len(), "Received login response");
        serde_json::from_str::<LoginResponseBody>(&body)
            .map(LoginResponse::from)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AuthClient {
        AuthClient::new(format!("{}/api", server.uri()), None).expect("client")
    }

    #[tokio::test]
    async fn test_login_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "phone": "0938123456",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "abc",
                "user": {"id": "u1", "phone": "0938123456", "name": "Lan"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .login(&LoginPayload::new("0938123456", "secret1"))
            .await
            .expect("login");
        assert_eq!(response.token.expose_secret(), "abc");
        assert_eq!(response.user.id, "u1");
    }

    #[tokio::test]
    async fn test_login_rejected_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginPayload::new("0938123456", "wrong-pass"))
            .await
            .expect_err("should be rejected");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_rejected_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginPayload::new("0938123456", "secret1"))
            .await
            .expect_err("should be rejected");
        assert!(matches!(err, ApiError::Status { status: 500, body: None }));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_login_undecodable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginPayload::new("0938123456", "secret1"))
            .await
            .expect_err("should fail to decode");
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_login_connection_refused() {
        // Grab a free port, then close the listener so nothing is listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let client = AuthClient::new(format!("http://127.0.0.1:{port}/api"), None).expect("client");
        let err = client
            .login(&LoginPayload::new("0938123456", "secret1"))
            .await
            .expect_err("should fail to connect");
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_login_rejected_with_truncated_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.ends_with(b"}") {
                let n = socket.read(&mut chunk).await.expect("read");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            // Announce more body than is sent, then hang up.
            socket
                .write_all(
                    b"HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\n\
                      content-length: 100\r\n\r\n{\"mess",
                )
                .await
                .expect("write");
            socket.shutdown().await.expect("shutdown");
        });

        let client = AuthClient::new(format!("http://127.0.0.1:{port}/api"), None).expect("client");
        let err = client
            .login(&LoginPayload::new("0938123456", "secret1"))
            .await
            .expect_err("should be rejected");
        assert!(matches!(err, ApiError::Status { status: 401, body: None }));
        server.await.expect("server");
    }

    #[test]
    fn test_server_message_returned_as_sent() {
        let padded = ApiError::Status {
            status: 400,
            body: Some(serde_json::json!({"message": "  Sai mật khẩu  "})),
        };
        assert_eq!(padded.server_message(), Some("  Sai mật khẩu  "));

        let blank = ApiError::Status {
            status: 400,
            body: Some(serde_json::json!({"message": "  "})),
        };
        assert_eq!(blank.server_message(), Some("  "));
    }

    #[test]
    fn test_client_error_message_has_single_prefix() {
        let err = ApiError::Client("builder error".to_string());
        assert_eq!(err.to_string(), "Failed to build HTTP client: builder error");
    }

    #[test]
    fn test_server_message_ignores_empty_and_non_string() {
        let empty = ApiError::Status {
            status: 400,
            body: Some(serde_json::json!({"message": ""})),
        };
        assert_eq!(empty.server_message(), None);

        let numeric = ApiError::Status {
            status: 400,
            body: Some(serde_json::json!({"message": 42})),
        };
        assert_eq!(numeric.server_message(), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AuthClient::new("http://localhost:2003/api/", None).expect("client");
        assert_eq!(client.base_url(), "http://localhost:2003/api");
        assert_eq!(
            client.endpoint(LOGIN_PATH),
            "http://localhost:2003/api/auth/login"
        );
    }
}
