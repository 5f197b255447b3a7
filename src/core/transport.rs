use crate::core::errors::{Error, Result};
use log::info;
use std::{fmt, thread, time};

/*-------------------------------------------------------------------------------------------------
  Transport
-------------------------------------------------------------------------------------------------*/

/// Outbound HTTP used to download feed documents.
///
/// Implementations must be shareable across the refresh threads.
pub trait Transport: fmt::Debug + Send + Sync {
    /// GET `url` and return the response body of a 2xx response.
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/*-------------------------------------------------------------------------------------------------
  HTTP Transport
-------------------------------------------------------------------------------------------------*/

/// Blocking `reqwest` transport with a per-request timeout and a simple exponential-backoff retry.
///
/// The delay between attempts is `retry_initial_delay * (retry_backoff_factor ^ attempt)`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    retry_count: u32,
    retry_initial_delay: u64,
    retry_backoff_factor: u64,
}

impl HttpTransport {
    /// Create a transport. `request_timeout` and `retry_initial_delay` are in milliseconds;
    /// `retry_count` is the total number of attempts (at least one is always made).
    pub fn new(
        request_timeout: u64,
        retry_count: u32,
        retry_initial_delay: u64,
        retry_backoff_factor: u64,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(time::Duration::from_millis(request_timeout))
            .user_agent(concat!("whoip/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            retry_count: retry_count.max(1),
            retry_initial_delay,
            retry_backoff_factor,
        })
    }

    fn get_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt: u32 = 0;
        loop {
            info!("Attempt {}: GET {}", attempt, url);

            match self.get_once(url) {
                Ok(body) => {
                    info!("Attempt {}: GET {}: Ok ({} bytes)", attempt, url, body.len());
                    break Ok(body);
                }
                Err(error) => {
                    log::error!("Attempt {}: GET {}: FAILED: {}", attempt, url, error);

                    let delay = time::Duration::from_millis(
                        self.retry_initial_delay
                            .saturating_mul(self.retry_backoff_factor.saturating_pow(attempt)),
                    );

                    attempt += 1;

                    if attempt < self.retry_count {
                        thread::sleep(delay);
                        continue;
                    } else {
                        break Err(error);
                    }
                }
            }
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::errors::log_error;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_log::test;

    /*----------------------------------------------------------------------------------
      Fake Transport
    ----------------------------------------------------------------------------------*/

    /// Canned response for a fake URL.
    #[derive(Debug)]
    pub(crate) enum FakeResponse {
        Body(String),
        Status(u16),
    }

    /// In-memory transport that serves canned responses and counts requests.
    #[derive(Debug)]
    pub(crate) struct FakeTransport {
        responses: HashMap<String, FakeResponse>,
        delay: time::Duration,
        requests: AtomicUsize,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: HashMap::new(),
                delay: time::Duration::ZERO,
                requests: AtomicUsize::new(0),
            }
        }

        pub(crate) fn respond(mut self, url: &str, response: FakeResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        /// Sleep this long inside every request, widening race windows in concurrency tests.
        pub(crate) fn delay(mut self, delay: time::Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);

            match self.responses.get(url) {
                Some(FakeResponse::Body(body)) => Ok(body.as_bytes().to_vec()),
                Some(FakeResponse::Status(status)) => Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: reqwest::StatusCode::from_u16(*status)
                        .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
                }),
                None => Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                }),
            }
        }
    }

    /*----------------------------------------------------------------------------------
      HTTP Transport
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_http_transport_always_attempts_once() {
        let transport = HttpTransport::new(5000, 0, 200, 2)
            .inspect_err(log_error)
            .unwrap();
        assert_eq!(transport.retry_count, 1);
    }

    #[test]
    fn test_http_transport_connection_refused() {
        // Nothing listens on port 9 of the loopback interface
        let transport = HttpTransport::new(1000, 2, 10, 2).unwrap();
        let result = transport.get("http://127.0.0.1:9/ranges.json");
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
