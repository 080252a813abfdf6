//! Blocking facade: build, execute, classify and parse in one call.

use std::sync::OnceLock;

use tracing::instrument;

use crate::client::{check_parseable, JokeClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::options::RequestOptions;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Info, Joke, RawResponse};

/// A `JokeClient` paired with a `Transport`.
///
/// Each call is one independent round-trip; nothing is shared between calls
/// except the transport's connection pool, so a `JokeApi` can be used from
/// several threads at once.
pub struct JokeApi<T = UreqTransport> {
    client: JokeClient,
    transport: T,
}

impl JokeApi<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout()))
    }

    /// Process-wide instance configured from the environment on first use.
    pub fn global() -> &'static JokeApi {
        static GLOBAL: OnceLock<JokeApi> = OnceLock::new();
        GLOBAL.get_or_init(|| JokeApi::new(&ClientConfig::from_env()))
    }
}

impl<T: Transport> JokeApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: JokeClient::from_config(config),
            transport,
        }
    }

    pub fn client(&self) -> &JokeClient {
        &self.client
    }

    /// One joke. With `amount > 1` the first joke of the batch is returned.
    #[instrument(skip_all, level = "debug", fields(amount = options.amount()))]
    pub fn joke(&self, options: &RequestOptions) -> Result<Joke> {
        check_parseable(options)?;
        let response = self.transport.execute(&self.client.build_joke_request(options))?;
        self.client.parse_joke(response, options)
    }

    #[instrument(skip_all, level = "debug", fields(amount = options.amount()))]
    pub fn jokes(&self, options: &RequestOptions) -> Result<Vec<Joke>> {
        check_parseable(options)?;
        let response = self.transport.execute(&self.client.build_joke_request(options))?;
        self.client.parse_jokes(response, options)
    }

    /// The joke response body in the requested format, unparsed.
    #[instrument(skip_all, level = "debug", fields(format = %options.format()))]
    pub fn raw_joke(&self, options: &RequestOptions) -> Result<RawResponse> {
        let response = self.transport.execute(&self.client.build_joke_request(options))?;
        Ok(self.client.parse_raw(response)?)
    }

    /// Any endpoint, returned as the raw status and body without
    /// classification.
    #[instrument(skip(self, params), level = "debug")]
    pub fn request<K: AsRef<str>, V: AsRef<str>>(
        &self,
        endpoint: &str,
        path: Option<&str>,
        params: &[(K, V)],
    ) -> Result<RawResponse> {
        let response = self
            .transport
            .execute(&self.client.build_request(endpoint, path, params))?;
        Ok(RawResponse {
            status_code: response.status,
            data: response.body,
        })
    }

    #[instrument(skip(self), level = "debug")]
    pub fn info(&self) -> Result<Info> {
        let response = self.transport.execute(&self.client.build_info_request())?;
        self.client.parse_info(response)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn ping(&self) -> Result<String> {
        let response = self.transport.execute(&self.client.build_ping_request())?;
        self.client.parse_ping(response)
    }
}
