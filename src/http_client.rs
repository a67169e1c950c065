use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const ERROR_BODY_PREVIEW: usize = 200;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide blocking client. The timeout of the first call sticks.
pub fn http_client(timeout: Duration) -> Result<&'static Client, FetchError> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Transport {
                url: String::new(),
                status: None,
                message: format!("failed to build http client: {err}"),
            })
    })
}

/// A GET-with-query capability. Implemented over HTTP in production and by
/// scripted fakes in tests.
pub trait Transport {
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        (**self).get_text(url, query)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: &'static Client,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
            headers: HeaderMap::new(),
        })
    }

    /// Adds a header sent with every request, e.g. an API key.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, FetchError> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchError::Config(format!("invalid header name {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| FetchError::Config(format!("invalid value for header {name}")))?;
        self.headers.insert(header, value);
        Ok(self)
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        debug!(url, params = query.len(), "GET");
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .map_err(|err| transport_error(url, &err))?;
        let status = resp.status();
        let body = resp.text().map_err(|err| transport_error(url, &err))?;
        if !status.is_success() {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(FetchError::Transport {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("http {status}: {preview}"),
            });
        }
        Ok(body)
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

/// Decodes a response body, treating an empty or `null` body as `T::default()`.
pub fn decode_json<T>(url: &str, body: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned + Default,
{
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(T::default());
    }
    serde_json::from_str(trimmed).map_err(|err| FetchError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}
