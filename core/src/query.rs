//! Translation from `RequestOptions` to a path segment and query string.
//!
//! Parameters are appended in a fixed order and only when they differ from
//! the service default, so identical options always render identical URLs.

use crate::options::RequestOptions;
use crate::types::{Category, Flag, Format, JokeType, Language};

/// Path segment and ordered parameters for one joke request.
///
/// Values are wire-ready: closed-enum tokens are inserted as-is and only the
/// free-text `contains` value is percent-encoded. A parameter with an empty
/// value is presence-only and renders without `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Query {
    /// Render `params` as a query string (without the leading `?`).
    pub fn render(&self) -> String {
        join_pairs(self.params.iter().map(|(key, value)| (key.as_str(), value.clone())))
    }
}

pub fn build_query(options: &RequestOptions) -> Query {
    let mut params = Vec::new();

    if options.format() != Format::Json {
        params.push(("format".to_string(), options.format().to_string()));
    }

    let flags = options.blacklist_flags();
    if !flags.is_empty() {
        let value = if flags.contains(&Flag::All) {
            Flag::All.to_string()
        } else {
            join_tokens(flags.iter())
        };
        params.push(("blacklistFlags".to_string(), value));
    }

    if options.language() != Language::default() {
        params.push(("lang".to_string(), options.language().to_string()));
    }

    if let Some(range) = options.id_range() {
        params.push(("idRange".to_string(), range.to_param()));
    }

    if !options.contains().trim().is_empty() {
        params.push((
            "contains".to_string(),
            urlencoding::encode(options.contains()).into_owned(),
        ));
    }

    if options.joke_type() != JokeType::All {
        params.push(("type".to_string(), options.joke_type().to_string()));
    }

    if options.amount() > 1 {
        params.push(("amount".to_string(), options.amount().to_string()));
    }

    if options.safe() {
        params.push(("safe-mode".to_string(), String::new()));
    }

    Query {
        path: category_path(options),
        params,
    }
}

fn category_path(options: &RequestOptions) -> String {
    let categories = options.categories();
    if categories.is_empty() || categories.contains(&Category::Any) {
        Category::Any.to_string()
    } else {
        join_tokens(categories.iter())
    }
}

fn join_tokens<T: AsRef<str>>(tokens: impl Iterator<Item = T>) -> String {
    tokens
        .map(|token| token.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render caller-supplied parameters for the passthrough call.
///
/// Values are percent-encoded with the RFC 3986 unreserved set, except `,`
/// which stays literal so token lists such as `blacklistFlags=nsfw,racist`
/// reach the service unchanged. Names are trusted and left alone.
pub fn render_params<K: AsRef<str>, V: AsRef<str>>(params: &[(K, V)]) -> String {
    join_pairs(
        params
            .iter()
            .map(|(key, value)| (key.as_ref(), encode_keeping_commas(value.as_ref()))),
    )
}

fn encode_keeping_commas(value: &str) -> String {
    value
        .split(',')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_pairs<'a>(pairs: impl Iterator<Item = (&'a str, String)>) -> String {
    pairs
        .map(|(key, value)| {
            if value.is_empty() {
                key.to_string()
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `<base>/<endpoint>[/<path>][?<query>]`, where `query` is already rendered.
pub fn build_url(base_url: &str, endpoint: &str, path: Option<&str>, query: &str) -> String {
    let mut url = format!("{}/{}", base_url, endpoint.trim_matches('/'));
    if let Some(path) = path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        url.push('/');
        url.push_str(path);
    }
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}
