//! Synchronous client core for the JokeAPI joke service.
//!
//! # Overview
//! `JokeClient` turns `RequestOptions` into `HttpRequest` values and turns
//! `HttpResponse` values into jokes or typed errors without touching the
//! network. `JokeApi` pairs it with a blocking `Transport` for callers that
//! just want a joke.
//!
//! # Design
//! - Options are validated once, in `RequestOptionsBuilder::build`; the query
//!   builder itself cannot fail.
//! - A response goes through two stages: `classify` separates transport
//!   failures from payloads, then `parse` separates the service's error
//!   envelope from jokes.
//! - Only JSON is parsed. Other formats are available through
//!   `JokeApi::raw_joke`.

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod parse;
pub mod query;
pub mod transport;
pub mod types;

pub use api::JokeApi;
pub use client::JokeClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, Error, HttpError, ParseError, Result};
pub use http::{HttpRequest, HttpResponse};
pub use options::{IdRange, RequestOptions, RequestOptionsBuilder};
pub use query::{build_query, Query};
pub use transport::{Transport, UreqTransport};
pub use types::{Category, Flag, Format, Info, Joke, JokeStats, JokeType, Language, RawResponse};
