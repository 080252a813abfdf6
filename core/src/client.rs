//! Stateless HTTP request builder and response parser for the joke service.
//!
//! # Design
//! `JokeClient` holds only the base URL, the user agent and an optional
//! default token. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the round-trip in between belongs to a `Transport`.

use serde_json::Value;
use tracing::debug;

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::error::{ConfigError, Error, HttpError, ParseError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::options::RequestOptions;
use crate::parse::{parse_payload, reject_error_envelope};
use crate::query::{build_query, build_url, render_params};
use crate::types::{Format, Info, Joke, RawResponse};

pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Synchronous, stateless client for the joke service.
#[derive(Debug, Clone)]
pub struct JokeClient {
    base_url: String,
    user_agent: String,
    auth: Option<String>,
}

impl JokeClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            auth: config.auth.clone().filter(|token| !token.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET <base>/joke/<categories>?<filters>`
    pub fn build_joke_request(&self, options: &RequestOptions) -> HttpRequest {
        let query = build_query(options);
        let url = build_url(&self.base_url, "joke", Some(&query.path), &query.render());
        debug!(%url, "built joke request");
        HttpRequest {
            url,
            headers: self.headers(Some(options.auth())),
        }
    }

    /// Request for an arbitrary endpoint. Values are percent-encoded except
    /// for `,`, so comma-joined token lists pass through unchanged.
    pub fn build_request<K: AsRef<str>, V: AsRef<str>>(
        &self,
        endpoint: &str,
        path: Option<&str>,
        params: &[(K, V)],
    ) -> HttpRequest {
        let url = build_url(&self.base_url, endpoint, path, &render_params(params));
        debug!(%url, "built request");
        HttpRequest {
            url,
            headers: self.headers(None),
        }
    }

    pub fn build_info_request(&self) -> HttpRequest {
        self.build_request::<&str, &str>("info", None, &[])
    }

    pub fn build_ping_request(&self) -> HttpRequest {
        self.build_request::<&str, &str>("ping", None, &[])
    }

    pub fn parse_jokes(&self, response: HttpResponse, options: &RequestOptions) -> Result<Vec<Joke>> {
        check_parseable(options)?;
        let body = classify(response.status, &response.body, response.content_type())?;
        parse_payload(body, options.split_new_line())
    }

    /// First joke of the response.
    pub fn parse_joke(&self, response: HttpResponse, options: &RequestOptions) -> Result<Joke> {
        self.parse_jokes(response, options)?
            .into_iter()
            .next()
            .ok_or(Error::Parse(ParseError::EmptyBatch))
    }

    /// Classification only; the body is returned as-is in whatever format
    /// was requested.
    pub fn parse_raw(&self, response: HttpResponse) -> std::result::Result<RawResponse, HttpError> {
        classify(response.status, &response.body, response.content_type())?;
        Ok(RawResponse {
            status_code: response.status,
            data: response.body,
        })
    }

    pub fn parse_info(&self, response: HttpResponse) -> Result<Info> {
        let value = self.parse_value(&response)?;
        Ok(serde_json::from_value(value).map_err(ParseError::from)?)
    }

    /// The service's ping message.
    pub fn parse_ping(&self, response: HttpResponse) -> Result<String> {
        let value = self.parse_value(&response)?;
        match value.get("ping") {
            Some(Value::String(message)) => Ok(message.clone()),
            Some(_) => Err(ParseError::WrongKind {
                field: "ping",
                expected: "string",
            }
            .into()),
            None => Err(ParseError::MissingField("ping").into()),
        }
    }

    fn parse_value(&self, response: &HttpResponse) -> Result<Value> {
        let body = classify(response.status, &response.body, response.content_type())?;
        let value: Value = serde_json::from_str(body).map_err(ParseError::from)?;
        reject_error_envelope(&value)?;
        Ok(value)
    }

    /// `User-Agent` always; `Authorization` when a token is set, the
    /// per-request token winning over the client default.
    fn headers(&self, request_auth: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![(USER_AGENT_HEADER.to_string(), self.user_agent.clone())];
        let token = request_auth
            .filter(|token| !token.is_empty())
            .or(self.auth.as_deref());
        if let Some(token) = token {
            headers.push((AUTHORIZATION_HEADER.to_string(), token.to_string()));
        }
        headers
    }
}

/// Only JSON bodies can be turned into `Joke`s.
pub fn check_parseable(options: &RequestOptions) -> std::result::Result<(), ConfigError> {
    match options.format() {
        Format::Json => Ok(()),
        other => Err(ConfigError::UnparseableFormat(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::types::{Category, JokeType};

    fn client() -> JokeClient {
        JokeClient::new("http://localhost:3000")
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    const SINGLE: &str = r#"{"error":false,"category":"Programming","type":"single","joke":"line1\nline2","flags":{"nsfw":false,"religious":false,"political":false,"racist":false,"sexist":false,"explicit":false},"id":1,"safe":true,"lang":"en"}"#;

    #[test]
    fn build_default_joke_request() {
        let req = client().build_joke_request(&RequestOptions::default());
        assert_eq!(req.url, "http://localhost:3000/joke/Any");
        assert!(req.header("user-agent").unwrap().starts_with("jokeapi-rs/"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn build_filtered_joke_request() {
        let options = RequestOptions::builder()
            .category(Category::Programming)
            .joke_type(JokeType::Single)
            .amount(2)
            .build()
            .unwrap();
        let req = client().build_joke_request(&options);
        assert_eq!(
            req.url,
            "http://localhost:3000/joke/Programming?type=single&amount=2"
        );
    }

    #[test]
    fn request_token_overrides_client_token() {
        let client = JokeClient::from_config(&ClientConfig {
            base_url: "http://h".to_string(),
            auth: Some("default".to_string()),
            ..ClientConfig::default()
        });

        let req = client.build_joke_request(&RequestOptions::default());
        assert_eq!(req.header("Authorization"), Some("default"));

        let options = RequestOptions::builder().auth("mine").build().unwrap();
        let req = client.build_joke_request(&options);
        assert_eq!(req.header("Authorization"), Some("mine"));
    }

    #[test]
    fn passthrough_request() {
        let req = client().build_request("langcode", Some("german"), &[("lang", "en")]);
        assert_eq!(req.url, "http://localhost:3000/langcode/german?lang=en");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = JokeClient::new("http://localhost:3000/").build_info_request();
        assert_eq!(req.url, "http://localhost:3000/info");
    }

    #[test]
    fn parse_joke_splits_when_requested() {
        let options = RequestOptions::builder().split_new_line(true).build().unwrap();
        let joke = client().parse_joke(json_response(200, SINGLE), &options).unwrap();
        assert_eq!(joke.lines, ["line1", "line2"]);
    }

    #[test]
    fn parse_jokes_rejects_non_json_format() {
        let options = RequestOptions::builder().format(Format::Txt).build().unwrap();
        let err = client().parse_jokes(json_response(200, "joke"), &options).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnparseableFormat(Format::Txt))));
    }

    #[test]
    fn parse_jokes_empty_429_is_http_error() {
        let response = HttpResponse {
            status: 429,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_jokes(response, &RequestOptions::default()).unwrap_err();
        match err {
            Error::Http(http) => {
                assert_eq!(http.status, 429);
                assert_eq!(http.reason, "Too Many Requests");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn parse_jokes_structured_400_is_api_error() {
        let body = r#"{"error":true,"internalError":false,"code":106,"message":"No matching joke found","causedBy":["No jokes were found that match your provided filter(s)"],"additionalInfo":"","timestamp":1579170794412}"#;
        let err = client()
            .parse_jokes(json_response(400, body), &RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError { code: 106, .. })));
    }

    #[test]
    fn parse_joke_empty_batch() {
        let body = r#"{"error":false,"amount":0,"jokes":[]}"#;
        let err = client()
            .parse_joke(json_response(200, body), &RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::EmptyBatch)));
    }

    #[test]
    fn parse_raw_keeps_body() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: "Why?\n\nBecause.".to_string(),
        };
        let raw = client().parse_raw(response).unwrap();
        assert_eq!(raw.status_code, 200);
        assert_eq!(raw.data, "Why?\n\nBecause.");
    }

    #[test]
    fn parse_raw_html_error_page() {
        let response = HttpResponse {
            status: 403,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: "<html>blocked</html>".to_string(),
        };
        let err = client().parse_raw(response).unwrap_err();
        assert_eq!(err.reason, "Forbidden");
    }

    #[test]
    fn parse_ping_message() {
        let body = r#"{"error":false,"ping":"Pong!","timestamp":1}"#;
        assert_eq!(client().parse_ping(json_response(200, body)).unwrap(), "Pong!");
    }
}
