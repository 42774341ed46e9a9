use std::time::Duration;

use reqwest::blocking::Client;
use tracing::warn;

use super::error::{FetchError, FetchFailure};
use super::retry::Retry;

pub trait ImageSource: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub attempts: u32,
    pub timeout: Duration,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            retry_delay: Duration::ZERO,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl FetchConfig {
    pub fn retry(&self) -> Retry {
        Retry::new(self.attempts, self.retry_delay)
    }
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_owned(),
        }
    } else {
        FetchError::Transport {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

impl ImageSource for HttpSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| transport_error(url, &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|error| transport_error(url, &error))?;
        Ok(body.to_vec())
    }
}

pub struct ImageFetcher<S> {
    source: S,
    retry: Retry,
}

impl<S: ImageSource> ImageFetcher<S> {
    pub fn new(source: S, retry: Retry) -> Self {
        Self { source, retry }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let max_attempts = self.retry.attempts();
        self.retry
            .run(|attempt| {
                self.source.get(url).inspect_err(|error| {
                    warn!(url, attempt, max_attempts, %error, "avatar download attempt failed");
                })
            })
            .map_err(|exhausted| FetchFailure {
                url: url.to_owned(),
                attempts: exhausted.attempts,
                last: exhausted.last,
            })
    }
}
