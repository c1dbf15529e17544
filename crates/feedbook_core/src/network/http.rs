//! Blocking HTTP fetcher backed by `reqwest`.

use crate::network::ArticleFetcher;
use log::warn;
use std::time::Duration;

pub struct HttpArticleFetcher {
    client: reqwest::blocking::Client,
}

impl HttpArticleFetcher {
    /// Builds a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ArticleFetcher for HttpArticleFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                let error_code = if err.is_timeout() {
                    "timeout"
                } else {
                    "request_failed"
                };
                warn!(
                    "event=article_fetch module=network status=error error_code={} error={}",
                    error_code,
                    err.without_url()
                );
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=article_fetch module=network status=error error_code=http_status http_status={}",
                status.as_u16()
            );
            return None;
        }

        match response.bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err) => {
                warn!(
                    "event=article_fetch module=network status=error error_code=body_read_failed error={}",
                    err.without_url()
                );
                None
            }
        }
    }
}
