//! Global webhook sender.
//!
//! Broadcasts build lifecycle events to a fixed set of HTTP endpoints.
//! Every request is integrity-protected: the body is summarized in a
//! `Digest` header and the `date`/`digest` pair is signed with an
//! HMAC-SHA256 HTTP signature so receivers can authenticate the sender
//! without TLS client certificates.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest as _, Sha256};

use crate::errors::WebhookError;
use crate::traits::WebhookSender;
use crate::types::WebhookData;

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends JSON-encoded webhooks to the globally configured endpoints.
pub struct HttpWebhookSender {
    client: reqwest::Client,
    endpoints: Vec<String>,
    secret: String,
}

impl HttpWebhookSender {
    pub fn new(endpoints: Vec<String>, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, data: &WebhookData) -> Result<(), WebhookError> {
        if self.endpoints.is_empty() {
            return Ok(());
        }

        let body = serde_json::to_vec(data).map_err(|err| WebhookError::Send {
            message: err.to_string(),
        })?;

        for endpoint in &self.endpoints {
            self.post(endpoint, &data.event, &body).await?;
        }
        Ok(())
    }
}

impl HttpWebhookSender {
    async fn post(&self, endpoint: &str, event: &str, body: &[u8]) -> Result<(), WebhookError> {
        let digest = format!("SHA-256={}", digest(body));
        let date = http_date();
        let signature = sign(&self.secret, &date, &digest)?;

        self.client
            .post(endpoint)
            .timeout(REQUEST_TIMEOUT)
            .header("X-Capstan-Event", event)
            .header("Content-Type", "application/json")
            .header("Digest", &digest)
            .header("Date", &date)
            .header("Signature", &signature)
            .body(body.to_vec())
            .send()
            .await?;
        Ok(())
    }
}

/// Base64 SHA-256 digest of the request body.
fn digest(body: &[u8]) -> String {
    BASE64.encode(Sha256::digest(body))
}

/// Current time in RFC 7231 IMF-fixdate form.
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Build the HTTP-Signatures header over the `date` and `digest` headers.
fn sign(secret: &str, date: &str, digest: &str) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        WebhookError::Send {
            message: "invalid webhook secret".to_string(),
        }
    })?;
    mac.update(signing_string(date, digest).as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    Ok(format!(
        "keyId=\"hmac-key\",algorithm=\"hmac-sha256\",headers=\"date digest\",signature=\"{signature}\""
    ))
}

/// The canonical string covered by the signature: each signed header on
/// its own line as `name: value`, lowercase names, in declared order.
fn signing_string(date: &str, digest: &str) -> String {
    format!("date: {date}\ndigest: {digest}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Build, Event, Repository, Status, TriggerSource, User};
    use chrono::Utc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn payload() -> WebhookData {
        WebhookData {
            event: "build".to_string(),
            action: "created".to_string(),
            user: User {
                id: 1,
                login: "octocat".to_string(),
                active: true,
                token: String::new(),
            },
            repo: Repository {
                id: 1,
                slug: "octocat/hello-world".to_string(),
                ..Repository::default()
            },
            build: Build {
                repo_id: 1,
                number: 1,
                trigger: TriggerSource::Hook,
                parent: 0,
                status: Status::Pending,
                error: None,
                event: Event::Push,
                action: String::new(),
                link: String::new(),
                title: String::new(),
                message: String::new(),
                before: String::new(),
                after: String::new(),
                reference: "refs/heads/main".to_string(),
                fork: String::new(),
                source: String::new(),
                target: String::new(),
                author_login: String::new(),
                author_name: String::new(),
                author_email: String::new(),
                author_avatar: String::new(),
                sender: String::new(),
                deploy: String::new(),
                params: Default::default(),
                created: Utc::now(),
                updated: Utc::now(),
                finished: None,
            },
        }
    }

    #[test]
    fn digest_is_base64_sha256() {
        // printf 'hello' | sha256sum | xxd -r -p | base64
        assert_eq!(digest(b"hello"), "LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=");
    }

    #[test]
    fn signature_header_shape() {
        let header = sign("secret", "Mon, 01 Jan 2024 00:00:00 GMT", "SHA-256=abc")
            .expect("sign");
        assert!(header.starts_with("keyId=\"hmac-key\",algorithm=\"hmac-sha256\""));
        assert!(header.contains("headers=\"date digest\""));
        assert!(header.contains("signature=\""));
    }

    #[test]
    fn signing_string_is_stable() {
        assert_eq!(
            signing_string("D", "SHA-256=x"),
            "date: D\ndigest: SHA-256=x"
        );
    }

    #[tokio::test]
    async fn no_endpoints_is_a_noop() {
        let sender = HttpWebhookSender::new(Vec::new(), "secret");
        sender.send(&payload()).await.expect("send");
    }

    /// Minimal single-request HTTP server that captures the raw request
    /// and replies 200.
    async fn capture_one_request(listener: tokio::net::TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.expect("read");
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| line.to_lowercase().strip_prefix("content-length:").map(str::trim).map(str::to_string))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .await
            .expect("write");
        String::from_utf8_lossy(&raw).to_string()
    }

    #[tokio::test]
    async fn sends_signed_request() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(capture_one_request(listener));

        let sender = HttpWebhookSender::new(vec![format!("http://{addr}/hook")], "secret");
        sender.send(&payload()).await.expect("send");

        let request = server.await.expect("join");
        let lower = request.to_lowercase();
        assert!(lower.starts_with("post /hook"));
        assert!(lower.contains("x-capstan-event: build"));
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("digest: sha-256="));
        assert!(lower.contains("signature: keyid=\"hmac-key\""));
        assert!(lower.contains("date:"));
        assert!(request.contains("\"action\":\"created\""));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        // Port 1 on loopback refuses connections.
        let sender = HttpWebhookSender::new(
            vec!["http://127.0.0.1:1/hook".to_string()],
            "secret",
        );
        assert!(sender.send(&payload()).await.is_err());
    }
}
