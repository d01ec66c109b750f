//! HTTP(S) transport
//!
//! Every request is a `POST` of the JSON envelope to the device's control
//! endpoint. The API key, when set, travels as a query parameter.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Certificate, Client};
use tracing::{debug, trace, warn};
use url::Url;

use bioterm_core::constants::{API_KEY_PARAM, CONTROL_PATH};

use crate::error::{Error, Result};
use crate::{Request, Transport};

/// HTTP transport for biometric terminals
///
/// Cheap to share: the underlying connection pool is built on first use and
/// reused by every request.
pub struct HttpTransport {
    host: String,
    port: Option<u16>,
    https: bool,
    path: String,
    accept_invalid_certs: bool,
    root_certificates: Vec<Vec<u8>>,
    client: Mutex<Option<Client>>,
}

impl HttpTransport {
    /// Create new HTTP transport
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            https: false,
            path: CONTROL_PATH.to_string(),
            accept_invalid_certs: true,
            root_certificates: Vec::new(),
            client: Mutex::new(None),
        }
    }

    /// Use HTTPS instead of HTTP
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Set a non-default port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the control endpoint path (default: `/control`)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Accept certificates that fail verification
    ///
    /// Defaults to `true`: devices ship with self-signed certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Trust an additional PEM-encoded root certificate
    pub fn with_root_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Build the endpoint URL, with the API key if given
    pub fn url(&self, api_key: Option<&str>) -> Result<Url> {
        let scheme = if self.https { "https" } else { "http" };
        let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        let raw = format!("{scheme}://{}{port}{path}", self.host);
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidEndpoint(format!("{raw}: {e}")))?;

        if let Some(key) = api_key {
            url.query_pairs_mut().append_pair(API_KEY_PARAM, key);
        }

        Ok(url)
    }

    fn client(&self) -> Result<Client> {
        let mut cached = self.client.lock();
        if let Some(client) = cached.as_ref() {
            return Ok(client.clone());
        }

        let mut builder = Client::builder();
        if self.https {
            if self.accept_invalid_certs {
                warn!("Certificate verification disabled for {}", self.host);
            }
            builder = builder.danger_accept_invalid_certs(self.accept_invalid_certs);
            for pem in &self.root_certificates {
                let cert = Certificate::from_pem(pem).map_err(|e| Error::Tls(e.to_string()))?;
                builder = builder.add_root_certificate(cert);
            }
        }

        let client = builder.build().map_err(|e| Error::Tls(e.to_string()))?;
        debug!("HTTP client ready for {}", self.endpoint());

        *cached = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Bytes> {
        let url = self.url(request.api_key.as_deref())?;
        let client = self.client()?;

        trace!(
            "POST {} ({} bytes): {}",
            self.endpoint(),
            request.body.len(),
            String::from_utf8_lossy(&request.body[..request.body.len().min(128)])
        );

        let response = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(request.timeout)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered HTTP {}", self.endpoint(), status.as_u16());
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.bytes().await?;

        trace!(
            "Received {} bytes: {}",
            body.len(),
            String::from_utf8_lossy(&body[..body.len().min(128)])
        );

        Ok(body)
    }

    fn endpoint(&self) -> String {
        self.url(None)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.host, self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, capture the request, answer with `response`
    async fn serve_once(response: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });

        (addr, handle)
    }

    fn local(addr: SocketAddr) -> HttpTransport {
        HttpTransport::new(addr.ip().to_string()).with_port(addr.port())
    }

    #[test]
    fn test_url_default() {
        let transport = HttpTransport::new("192.168.1.100");
        assert_eq!(transport.url(None).unwrap().as_str(), "http://192.168.1.100/control");
        assert_eq!(transport.endpoint(), "http://192.168.1.100/control");
    }

    #[test]
    fn test_url_https_with_port_and_key() {
        let transport = HttpTransport::new("device.local").with_https(true).with_port(8443);
        let url = transport.url(Some("s3cr=t")).unwrap();
        assert_eq!(url.as_str(), "https://device.local:8443/control?api_key=s3cr%3Dt");
    }

    #[test]
    fn test_url_custom_path() {
        let transport = HttpTransport::new("10.0.0.5").with_path("api/control");
        assert_eq!(transport.url(None).unwrap().as_str(), "http://10.0.0.5/api/control");
    }

    #[test]
    fn test_endpoint_hides_key() {
        let transport = HttpTransport::new("10.0.0.5");
        assert!(!transport.endpoint().contains("api_key"));
    }

    #[test]
    fn test_invalid_host() {
        let transport = HttpTransport::new("bad host name");
        assert!(matches!(transport.url(None), Err(Error::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn test_send_round_trip() {
        let body = r#"{"mid":"abcd1234","result":"Success","payload":{}}"#;
        let response: &'static str = Box::leak(
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .into_boxed_str(),
        );
        let (addr, server) = serve_once(response).await;

        let request = Request::new(Bytes::from_static(br#"{"mid":"abcd1234"}"#), Duration::from_secs(5))
            .with_api_key(Some("k1".into()));
        let reply = local(addr).send(request).await.unwrap();
        assert_eq!(reply.as_ref(), body.as_bytes());

        let captured = server.await.unwrap();
        assert!(captured.starts_with("POST /control?api_key=k1 HTTP/1.1"));
        assert!(captured.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(captured.ends_with(r#"{"mid":"abcd1234"}"#));
    }

    #[tokio::test]
    async fn test_send_http_status_error() {
        let (addr, _server) =
            serve_once("HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;

        let request = Request::new(Bytes::from_static(b"{}"), Duration::from_secs(5));
        let result = local(addr).send(request).await;
        assert!(matches!(result, Err(Error::Status(401))));
    }

    #[tokio::test]
    async fn test_send_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            // Accept and hold the connection without answering
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let request = Request::new(Bytes::from_static(b"{}"), Duration::from_millis(100));
        let result = local(addr).send(request).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

        let request = Request::new(Bytes::from_static(b"{}"), Duration::from_secs(2));
        let result = local(addr).send(request).await;
        assert!(matches!(result, Err(Error::Connect(_))));
    }
}
