use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::io::{self, Write};

use super::util::sanitise_base_url;
use super::{BaseUrl, TransportError};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "OsmChangeDownloader";

/// Where replication files come from.
#[async_trait(?Send)]
pub trait ChangeSource {
    /// Base URL of the feed.
    fn base_url(&self) -> &BaseUrl;
    /// Stream the body at `url` into `sink`, returning its length.
    ///
    /// Anything other than `200 OK` is an error.
    async fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransportError>;
}

/// HTTP implementation of [`ChangeSource`].
#[derive(Debug)]
pub struct HttpChangeSource {
    client: Client,
    base_url: BaseUrl,
    user_agent: String,
}

impl HttpChangeSource {
    /// Construct an HTTP-backed change source.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: sanitise_base_url(base_url),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait(?Send)]
impl ChangeSource for HttpChangeSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransportError> {
        let mut response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_owned(),
            });
        }
        let mut written = 0_u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
        {
            sink.write_all(&chunk)
                .map_err(|source| TransportError::Sink {
                    url: url.to_owned(),
                    source,
                })?;
            written = written.saturating_add(chunk.len() as u64);
        }
        Ok(written)
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
