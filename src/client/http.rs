use super::{Transport, TransportError};
use crate::models::SensorReading;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// Primary transport: direct HTTP GET, JSON body.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<SensorReading, TransportError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        // Non-2xx counts as a transport failure
        let response = response.error_for_status()?;
        let reading = response
            .json::<SensorReading>()
            .await
            .map_err(TransportError::Parse)?;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    // One-shot HTTP server returning a canned response.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/api/sensors.php", addr)
    }

    #[tokio::test]
    async fn test_fetch_parses_json_body() {
        let url = serve_once(http_response(
            "200 OK",
            r#"{"col_value":"21.5","col_unit":"°C","col_datetime":"2024-01-01 10:00"}"#,
        ))
        .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let reading = transport.fetch(&url).await.unwrap();

        assert_eq!(reading.col_value.as_deref(), Some("21.5"));
        assert_eq!(reading.col_unit.as_deref(), Some("°C"));
        assert_eq!(reading.col_datetime.as_deref(), Some("2024-01-01 10:00"));
    }

    #[tokio::test]
    async fn test_non_2xx_status_is_a_failure() {
        let url = serve_once(http_response("500 Internal Server Error", "{}")).await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let result = transport.fetch(&url).await;

        assert!(matches!(result, Err(TransportError::Request(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_failure() {
        let url = serve_once(http_response("200 OK", "<html>not json</html>")).await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let result = transport.fetch(&url).await;

        assert!(matches!(result, Err(TransportError::Parse(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_failure() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        let result = transport
            .fetch(&format!("http://{}/api/sensors.php", addr))
            .await;

        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
