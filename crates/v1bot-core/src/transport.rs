use crate::error::{Result, TrackerError};
use tracing::{debug, warn};

/// The single I/O seam of the crate. Implementations own connection
/// management, TLS and any timeout policy; this core issues one best-effort
/// round trip per call and never retries.
pub trait Transport: Send + Sync {
    /// GET a document. "No response" (connection failure, timeout,
    /// non-success status) is a first-class `Ok(None)`, not a fault.
    fn fetch(&self, url: &str) -> Result<Option<String>>;

    /// POST a mutation document. Mutations must come back with a response
    /// document, so any failure here is `TransportUnavailable`.
    fn post(&self, url: &str, body: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// Blocking HTTP transport with basic auth.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(cfg: &crate::config::TrackerConfig) -> Self {
        Self::new(cfg.username.clone(), cfg.password.clone())
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = match self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "tracker fetch failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), url, "tracker fetch returned no document");
            return Ok(None);
        }
        match response.text() {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                warn!(error = %e, "tracker response body unreadable");
                Ok(None)
            }
        }
    }

    fn post(&self, url: &str, body: &str) -> Result<String> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body.to_string())
            .send()
            .map_err(|e| {
                warn!(error = %e, "tracker post failed");
                TrackerError::TransportUnavailable
            })?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url, "tracker rejected post");
            return Err(TrackerError::TransportUnavailable);
        }
        response
            .text()
            .map_err(|_| TrackerError::TransportUnavailable)
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Recorded {
        Fetch(String),
        Post { url: String, body: String },
    }

    /// Scripted transport: answers fetch/post calls from a queue, in order,
    /// and records every request for assertion.
    pub(crate) struct MockTransport {
        responses: Mutex<VecDeque<Option<String>>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl MockTransport {
        pub(crate) fn new<I>(responses: I) -> Self
        where
            I: IntoIterator<Item = Option<&'static str>>,
        {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn next_response(&self) -> Option<String> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock transport: no scripted response left")
        }
    }

    impl Transport for MockTransport {
        fn fetch(&self, url: &str) -> Result<Option<String>> {
            self.requests
                .lock()
                .unwrap()
                .push(Recorded::Fetch(url.to_string()));
            Ok(self.next_response())
        }

        fn post(&self, url: &str, body: &str) -> Result<String> {
            self.requests.lock().unwrap().push(Recorded::Post {
                url: url.to_string(),
                body: body.to_string(),
            });
            self.next_response().ok_or(TrackerError::TransportUnavailable)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
