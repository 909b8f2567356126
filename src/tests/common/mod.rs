// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use rcgen::CertifiedKey;
use reqwest::Url;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use crate::cache::credentials::CredentialIdentity;
use crate::helpers::time::Clock;
use crate::sources::transport::{HttpTransport, TlsPolicy};
use crate::store::CredentialStore;

pub const CLIENT_ID: &str = "client_id";
pub const CLIENT_SECRET: &str = "client_secret";
pub const SKEW: u64 = 60;

pub type TestStore = CredentialStore<HttpTransport, Arc<FakeClock>>;

/// Manually driven clock.
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn shared() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Arc::new(Self { now: Mutex::new(start) })
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::seconds(seconds);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn basic_auth_header(id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", id, secret)))
}

pub fn token_body(token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": token,
        "expires_in": expires_in,
        "jti": format!("jti-{}", token),
        "scope": "cloud_controller.read",
        "token_type": "bearer"
    })
}

pub fn identity_for(server: &MockServer) -> CredentialIdentity {
    let issuer = Url::parse(&server.base_url()).unwrap();
    CredentialIdentity::new(issuer, false, CLIENT_ID, CLIENT_SECRET).unwrap()
}

pub fn store_with_timeout(server: &MockServer, clock: Arc<FakeClock>, timeout: Duration) -> TestStore {
    let transport = HttpTransport::new(TlsPolicy::Verify, timeout).unwrap();
    CredentialStore::with_parts(identity_for(server), transport, clock, SKEW)
}

pub fn test_store(server: &MockServer, clock: Arc<FakeClock>) -> TestStore {
    store_with_timeout(server, clock, Duration::from_secs(5))
}

/// Issuer answering the UAA client_credentials request with `body`.
pub async fn mock_issuer<'a>(server: &'a MockServer, status: u16, body: Value, delay: Duration) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/oauth/token")
                .query_param("grant_type", "client_credentials")
                .header("authorization", basic_auth_header(CLIENT_ID, CLIENT_SECRET));
            then.status(status)
                .header("content-type", "application/json")
                .body(body.to_string())
                .delay(delay);
        })
        .await
}

pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> Mock<'a> {
    mock_issuer(server, 200, token_body(token, expires_in), Duration::ZERO).await
}

/// Address nothing listens on.
pub fn closed_issuer() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap()
}

/// HTTPS issuer presenting a freshly generated self-signed certificate.
pub struct SelfSignedIssuer {
    pub url: Url,
    served: Arc<AtomicUsize>,
}

impl SelfSignedIssuer {
    /// Token requests answered after a completed TLS handshake.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

pub async fn self_signed_issuer(body: Value) -> SelfSignedIssuer {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("https://127.0.0.1:{}", listener.local_addr().unwrap().port())).unwrap();
    let served = Arc::new(AtomicUsize::new(0));
    let counter = served.clone();
    let expected_auth = format!("authorization: {}", basic_auth_header(CLIENT_ID, CLIENT_SECRET)).to_lowercase();
    let payload = body.to_string();

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            let counter = counter.clone();
            let expected_auth = expected_auth.clone();
            let payload = payload.clone();
            tokio::spawn(async move {
                // clients that distrust the certificate abort the handshake
                let Ok(mut tls) = acceptor.accept(tcp).await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request).to_lowercase();
                let response = if request.starts_with("get /oauth/token?grant_type=client_credentials ")
                    && request.contains(&expected_auth)
                {
                    counter.fetch_add(1, Ordering::SeqCst);
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        payload.len(),
                        payload
                    )
                } else {
                    "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string()
                };
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    SelfSignedIssuer { url, served }
}
