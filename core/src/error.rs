//! Error types for the joke service client.
//!
//! # Design
//! Four failure families are kept apart:
//! - `ConfigError`: invalid options, raised before any request is built.
//! - `HttpError`: a non-success status whose body is empty or a generic HTML
//!   page, i.e. the service never got to answer in its own envelope.
//! - `ApiError`: the service answered with its JSON error envelope.
//! - `ParseError`: a body that does not match the service's documented shape.
//!
//! `Error` wraps them all, plus network failures from the transport.

use thiserror::Error;

use crate::types::Format;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client, the transport and the facade.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request options: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unexpected response payload: {0}")]
    Parse(#[from] ParseError),

    /// The request never produced a response (DNS, refused connection,
    /// timeout, broken body stream).
    #[error("network failure: {0}")]
    Network(#[from] ureq::Error),
}

/// Client-side configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("id range end ({end}) must be greater than start ({start}), -1 or equal to start")]
    InvalidIdRange { start: i64, end: i64 },

    #[error("amount must be greater than zero, got {0}")]
    InvalidAmount(u32),

    #[error("only JSON responses can be parsed, requested format is {0}")]
    UnparseableFormat(Format),
}

/// A non-success status without a structured body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("HTTP {status} {reason}: {cause}")]
pub struct HttpError {
    pub status: u16,
    pub reason: &'static str,
    pub cause: &'static str,
}

impl HttpError {
    /// Look up the fixed reason and cause for `status`.
    pub fn from_status(status: u16) -> Self {
        let (reason, cause) = match status {
            400 => (
                "Bad Request",
                "The request you have sent to JokeAPI is formatted incorrectly and cannot be processed",
            ),
            403 => (
                "Forbidden",
                "You have been added to the blacklist due to malicious behavior and are not allowed to send requests to JokeAPI anymore",
            ),
            404 => ("Not Found", "The URL you have requested couldn't be found"),
            413 => (
                "URI Too Long",
                "The URL exceeds the maximum length of 250 characters",
            ),
            414 => (
                "Payload Too Large",
                "The payload data sent to the server exceeds the maximum size of 5120 bytes",
            ),
            429 => (
                "Too Many Requests",
                "You have exceeded the limit of 120 requests per minute and have to wait a bit until you are allowed to send requests again",
            ),
            500 => (
                "Internal Server Error",
                "There was a general internal error within JokeAPI. You can get more info from the properties in the response text",
            ),
            523 => (
                "Origin Unreachable",
                "The server is temporarily offline due to maintenance or a dynamic IP update. Please be patient in this case.",
            ),
            _ => (
                "Unknown HTTP Error",
                "The server returned an unexpected HTTP status code",
            ),
        };
        Self {
            status,
            reason,
            cause,
        }
    }
}

/// The service's own error envelope (`"error": true`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("JokeAPI error {code}: {message}")]
pub struct ApiError {
    pub internal_error: bool,
    pub code: i64,
    pub message: String,
    pub caused_by: Vec<String>,
    pub additional_info: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// A payload that breaks the service's documented contract.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unrecognized {kind} `{token}`")]
    UnknownToken { kind: &'static str, token: String },

    #[error("response contained no jokes")]
    EmptyBatch,
}
