//! Blocking execution of `HttpRequest`s.
//!
//! # Design
//! `Transport` is the seam between the pure client and the network. The
//! default implementation wraps a `ureq::Agent`, which pools connections
//! internally and is cheap to clone across threads. Non-success statuses are
//! returned as data (`http_status_as_error(false)`) so the classifier, not
//! the transport, decides what they mean.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a request and returns the response as plain data.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// `ureq`-backed transport.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.agent.get(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().inspect_err(|err| {
            warn!(url = %request.url, error = %err, "request failed");
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;
        debug!(url = %request.url, status, "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
