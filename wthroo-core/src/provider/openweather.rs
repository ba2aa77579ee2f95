use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::{
    error::WeatherError,
    model::{OutputFormat, WeatherQuery},
};

use super::WeatherSource;

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/";

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    http: Client,
    base_url: Url,
}

impl OpenWeatherSource {
    /// Build a source with its own HTTP client. Without a timeout a request
    /// may wait on the server indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(WeatherError::Client)?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, WeatherError> {
        // Url::join drops the last segment unless the base ends with a slash.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&normalized).map_err(|e| WeatherError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { http, base_url })
    }

    pub fn request_url(&self, query: &WeatherQuery) -> Result<Url, WeatherError> {
        let mut url =
            self.base_url.join(query.forecast.path()).map_err(|e| WeatherError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.location)
                .append_pair("units", query.units.as_str())
                .append_pair("appid", &query.api_key);

            if query.output == OutputFormat::Xml {
                pairs.append_pair("mode", "xml");
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Vec<u8>, WeatherError> {
        let url = self.request_url(query)?;
        tracing::debug!(
            message = "requesting weather",
            path = url.path(),
            location = %query.location,
            units = %query.units,
        );

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(message = "OpenWeatherMap returned an error status", status = %status);
        }

        let body = res.bytes().await.map_err(|e| WeatherError::Transport(e.without_url()))?;
        tracing::debug!(message = "received response", status = %status, bytes = body.len());

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Forecast, Units};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn source(base_url: &str) -> OpenWeatherSource {
        let http = Client::builder().no_proxy().build().unwrap();
        OpenWeatherSource::with_client(http, base_url).unwrap()
    }

    /// Accept one connection, answer it with `status` and `body`, and hand
    /// back the request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;

            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{addr}/data/2.5/"), handle)
    }

    #[test]
    fn builds_current_weather_url() {
        let source = source(DEFAULT_API_URL);
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY");

        let url = source.request_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?q=Paris&units=metric&appid=KEY"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_is_normalized() {
        let source = source("https://api.openweathermap.org/data/2.5");
        let query = WeatherQuery::new("Oslo", Units::Imperial, "KEY");

        let url = source.request_url(&query).unwrap();
        assert_eq!(url.path(), "/data/2.5/weather");
        assert_eq!(url.query(), Some("q=Oslo&units=imperial&appid=KEY"));
    }

    #[test]
    fn location_is_encoded_by_url_library() {
        let source = source(DEFAULT_API_URL);
        let query = WeatherQuery::new("New York", Units::Standard, "KEY");

        let url = source.request_url(&query).unwrap();
        assert_eq!(url.query(), Some("q=New+York&units=standard&appid=KEY"));
    }

    #[test]
    fn forecast_and_xml_change_path_and_mode() {
        let source = source(DEFAULT_API_URL);
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY")
            .with_forecast(Forecast::Daily)
            .with_output(OutputFormat::Xml);

        let url = source.request_url(&query).unwrap();
        assert_eq!(url.path(), "/data/2.5/forecast/daily");
        assert_eq!(url.query(), Some("q=Paris&units=metric&appid=KEY&mode=xml"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = OpenWeatherSource::new("not a url", None).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidBaseUrl { .. }));
    }

    #[tokio::test]
    async fn fetch_returns_body_and_sends_expected_request() {
        let (base, server) = serve_once("200 OK", r#"{"main":{"temp":20}}"#).await;
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY");

        let body = source(&base).fetch(&query).await.unwrap();
        assert_eq!(body, br#"{"main":{"temp":20}}"#.to_vec());

        let head = server.await.unwrap();
        assert!(
            head.starts_with("GET /data/2.5/weather?q=Paris&units=metric&appid=KEY HTTP/1.1\r\n"),
            "unexpected request head: {head}"
        );
    }

    #[tokio::test]
    async fn fetch_passes_error_payload_through() {
        let payload = r#"{"cod":401,"message":"Invalid API key."}"#;
        let (base, server) = serve_once("401 Unauthorized", payload).await;
        let query = WeatherQuery::new("Paris", Units::Metric, "BAD");

        let body = source(&base).fetch(&query).await.unwrap();
        assert_eq!(body, payload.as_bytes().to_vec());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let query = WeatherQuery::new("Paris", Units::Metric, "SECRET");
        let err = source(&format!("http://{addr}/")).fetch(&query).await.unwrap_err();

        assert!(matches!(err, WeatherError::Transport(_)));
        let chain = format!("{:?}", anyhow::Error::from(err));
        assert!(!chain.contains("SECRET"));
    }
}
