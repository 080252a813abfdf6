//! In-memory stand-in for the JokeAPI service.
//!
//! Serves a fixed corpus through the same routes, query parameters and JSON
//! envelopes as the real service, so the client can be exercised end to end
//! without network access. Joke selection is deterministic (lowest ids
//! first) instead of random.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const CATEGORIES: [&str; 7] = ["Any", "Misc", "Programming", "Dark", "Pun", "Spooky", "Christmas"];
pub const FLAGS: [&str; 6] = ["nsfw", "religious", "political", "racist", "sexist", "explicit"];
pub const MAX_AMOUNT: usize = 10;
/// The one API token this service accepts.
pub const VALID_TOKEN: &str = "mock-token";
/// Set on joke responses whenever the request carried an `Authorization`
/// header: `1` for an accepted token, `0` otherwise.
pub const TOKEN_VALID_HEADER: &str = "token-valid";

#[derive(Clone, Debug, Default, Serialize)]
pub struct Flags {
    pub nsfw: bool,
    pub religious: bool,
    pub political: bool,
    pub racist: bool,
    pub sexist: bool,
    pub explicit: bool,
}

impl Flags {
    fn get(&self, token: &str) -> bool {
        match token {
            "nsfw" => self.nsfw,
            "religious" => self.religious,
            "political" => self.political,
            "racist" => self.racist,
            "sexist" => self.sexist,
            "explicit" => self.explicit,
            _ => false,
        }
    }

    fn any(&self) -> bool {
        FLAGS.iter().any(|flag| self.get(flag))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Joke {
    pub category: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joke: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<&'static str>,
    pub flags: Flags,
    pub id: u32,
    pub safe: bool,
    pub lang: &'static str,
}

impl Joke {
    fn single(id: u32, category: &'static str, lang: &'static str, text: &'static str) -> Self {
        Self {
            category,
            kind: "single",
            joke: Some(text),
            setup: None,
            delivery: None,
            flags: Flags::default(),
            id,
            safe: true,
            lang,
        }
    }

    fn two_part(
        id: u32,
        category: &'static str,
        lang: &'static str,
        setup: &'static str,
        delivery: &'static str,
    ) -> Self {
        Self {
            category,
            kind: "twopart",
            joke: None,
            setup: Some(setup),
            delivery: Some(delivery),
            flags: Flags::default(),
            id,
            safe: true,
            lang,
        }
    }

    fn flagged(mut self, flags: Flags) -> Self {
        self.safe = !flags.any();
        self.flags = flags;
        self
    }

    fn text(&self) -> String {
        match (self.joke, self.setup, self.delivery) {
            (Some(joke), _, _) => joke.to_string(),
            (None, Some(setup), Some(delivery)) => format!("{setup}\n\n{delivery}"),
            _ => String::new(),
        }
    }
}

/// The fixed joke corpus, ordered by language then id.
pub fn corpus() -> Vec<Joke> {
    vec![
        Joke::single(
            0,
            "Programming",
            "en",
            "I've got a really good UDP joke to tell you but I don't know if you'll get it.",
        ),
        Joke::two_part(
            1,
            "Programming",
            "en",
            "Why do programmers prefer dark mode?",
            "Because light attracts bugs.",
        ),
        Joke::single(
            2,
            "Misc",
            "en",
            "I told my wife she was drawing her eyebrows too high.\nShe looked surprised.",
        ),
        Joke::two_part(
            3,
            "Pun",
            "en",
            "What do you call a fake noodle?",
            "An impasta.",
        ),
        Joke::single(4, "Dark", "en", "My grandfather has the heart of a lion and a lifetime ban from the zoo.")
            .flagged(Flags {
                explicit: true,
                ..Flags::default()
            }),
        Joke::two_part(
            5,
            "Spooky",
            "en",
            "Why didn't the skeleton go to the party?",
            "He had no body to go with.",
        ),
        Joke::two_part(
            6,
            "Christmas",
            "en",
            "What do you call an elf who sings?",
            "A wrapper.",
        ),
        Joke::single(
            0,
            "Programming",
            "de",
            "Es gibt 10 Arten von Menschen: die, die Binär verstehen, und die anderen.",
        ),
    ]
}

type Corpus = Arc<Vec<Joke>>;

pub fn app() -> Router {
    let corpus: Corpus = Arc::new(corpus());
    Router::new()
        .route("/joke/{categories}", get(get_joke))
        .route("/info", get(info))
        .route("/ping", get(ping))
        .with_state(corpus)
        .layer(TraceLayer::new_for_http())
}

/// Every route answers 523 with a generic HTML page, like the CDN in front
/// of the service does while the origin is down.
pub fn app_in_maintenance() -> Router {
    Router::new()
        .fallback(maintenance_page)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_in_maintenance(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app_in_maintenance()).await
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn error_response(
    status: StatusCode,
    code: u32,
    message: &str,
    caused_by: Vec<String>,
    additional_info: &str,
) -> Response {
    let body = json!({
        "error": true,
        "internalError": status.is_server_error(),
        "code": code,
        "message": message,
        "causedBy": caused_by,
        "additionalInfo": additional_info,
        "timestamp": timestamp(),
    });
    (status, Json(body)).into_response()
}

fn no_match(reason: String) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        106,
        "No matching joke found",
        vec![reason],
        "Error while finalizing joke filtering",
    )
}

fn parse_id_range(raw: &str) -> Option<(u32, u32)> {
    match raw.split_once('-') {
        Some((start, end)) => Some((start.trim().parse().ok()?, end.trim().parse().ok()?)),
        None => {
            let id = raw.trim().parse().ok()?;
            Some((id, id))
        }
    }
}

async fn get_joke(
    State(corpus): State<Corpus>,
    Path(categories): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut response = select_jokes(&corpus, &categories, &params);
    if let Some(token) = headers.get(header::AUTHORIZATION) {
        let valid = token.as_bytes() == VALID_TOKEN.as_bytes();
        response.headers_mut().insert(
            TOKEN_VALID_HEADER,
            HeaderValue::from_static(if valid { "1" } else { "0" }),
        );
    }
    response
}

fn select_jokes(corpus: &[Joke], categories: &str, params: &HashMap<String, String>) -> Response {
    let mut wanted = Vec::new();
    for token in categories.split(',') {
        match CATEGORIES.iter().find(|c| c.eq_ignore_ascii_case(token.trim())) {
            Some(category) => wanted.push(*category),
            None => return no_match(format!("The category \"{token}\" is invalid")),
        }
    }
    let any = wanted.contains(&"Any");

    let lang = params.get("lang").map(String::as_str).unwrap_or("en").to_lowercase();
    let blacklist: Vec<String> = params
        .get("blacklistFlags")
        .map(|raw| raw.split(',').map(|f| f.trim().to_lowercase()).collect())
        .unwrap_or_default();
    let blacklist_all = blacklist.iter().any(|f| f == "all");
    let kind = params.get("type").map(|t| t.to_lowercase());
    let contains = params.get("contains").map(|c| c.to_lowercase());
    let safe_mode = params.contains_key("safe-mode");
    let id_range = match params.get("idRange") {
        Some(raw) => match parse_id_range(raw) {
            Some(range) => Some(range),
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    103,
                    "Invalid ID range",
                    vec![format!("The ID range \"{raw}\" is malformed")],
                    "Use the format \"N\" or \"N-M\"",
                )
            }
        },
        None => None,
    };
    let amount = params
        .get("amount")
        .and_then(|a| a.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_AMOUNT);

    let matches: Vec<&Joke> = corpus
        .iter()
        .filter(|joke| joke.lang == lang)
        .filter(|joke| any || wanted.contains(&joke.category))
        .filter(|joke| !(blacklist_all && joke.flags.any()))
        .filter(|joke| !blacklist.iter().any(|flag| joke.flags.get(flag)))
        .filter(|joke| kind.as_deref().is_none_or(|k| k == "all" || k == joke.kind))
        .filter(|joke| {
            contains
                .as_deref()
                .is_none_or(|needle| joke.text().to_lowercase().contains(needle))
        })
        .filter(|joke| id_range.is_none_or(|(start, end)| (start..=end).contains(&joke.id)))
        .filter(|joke| !safe_mode || joke.safe)
        .take(amount)
        .collect();

    if matches.is_empty() {
        return no_match("No jokes were found that match your provided filter(s)".to_string());
    }

    match params.get("format").map(|f| f.to_lowercase()).as_deref() {
        None | Some("json") => Json(jokes_value(&matches, amount > 1)).into_response(),
        Some("yaml") => {
            let mut yaml = String::new();
            write_yaml(&jokes_value(&matches, amount > 1), 0, &mut yaml);
            ([(header::CONTENT_TYPE, "application/x-yaml")], yaml).into_response()
        }
        Some("txt") => {
            let text = matches
                .iter()
                .map(|joke| joke.text())
                .collect::<Vec<_>>()
                .join("\n\n----------------------------------------------\n\n");
            ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
        }
        Some("xml") => {
            let body: String = matches
                .iter()
                .map(|joke| format!("<joke id=\"{}\">{}</joke>", joke.id, escape_xml(&joke.text())))
                .collect();
            let xml = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<data>{body}</data>");
            ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
        }
        Some(other) => error_response(
            StatusCode::BAD_REQUEST,
            101,
            "Invalid format",
            vec![format!("The format \"{other}\" is not supported")],
            "Supported formats are json, txt, xml and yaml",
        ),
    }
}

/// A single requested joke is sent bare; batches get the `amount` wrapper.
fn jokes_value(matches: &[&Joke], batch: bool) -> Value {
    if let (false, [joke]) = (batch, matches) {
        let mut value = serde_json::to_value(joke).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert("error".to_string(), Value::Bool(false));
        }
        return value;
    }
    json!({
        "error": false,
        "amount": matches.len(),
        "jokes": matches,
    })
}

/// Block-style YAML for a JSON tree. Scalars are written in JSON syntax,
/// which YAML accepts as flow scalars.
fn write_yaml(value: &Value, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                if is_nested(item) {
                    out.push_str(&format!("{pad}{key}:\n"));
                    write_yaml(item, indent + 2, out);
                } else {
                    out.push_str(&format!("{pad}{key}: {}\n", yaml_scalar(item)));
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if is_nested(item) {
                    out.push_str(&format!("{pad}-\n"));
                    write_yaml(item, indent + 2, out);
                } else {
                    out.push_str(&format!("{pad}- {}\n", yaml_scalar(item)));
                }
            }
        }
        scalar => out.push_str(&format!("{pad}{}\n", yaml_scalar(scalar))),
    }
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn yaml_scalar(value: &Value) -> String {
    match value {
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
        other => other.to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

async fn info(State(corpus): State<Corpus>) -> Json<Value> {
    let mut id_range: HashMap<&str, [u32; 2]> = HashMap::new();
    for joke in corpus.iter() {
        let range = id_range.entry(joke.lang).or_insert([joke.id, joke.id]);
        range[0] = range[0].min(joke.id);
        range[1] = range[1].max(joke.id);
    }
    Json(json!({
        "error": false,
        "version": "2.3.2",
        "jokes": {
            "totalCount": corpus.len(),
            "categories": CATEGORIES,
            "flags": FLAGS,
            "types": ["single", "twopart"],
            "submissionURL": "http://localhost/#submit",
            "idRange": id_range,
        },
        "formats": ["json", "txt", "xml", "yaml"],
        "jokeLanguages": id_range.len(),
        "systemLanguages": 1,
        "info": "Mock JokeAPI for tests",
        "timestamp": timestamp(),
    }))
}

async fn ping() -> Json<Value> {
    Json(json!({
        "error": false,
        "ping": "Pong!",
        "timestamp": timestamp(),
    }))
}

async fn maintenance_page() -> Response {
    (
        StatusCode::from_u16(523).unwrap_or(StatusCode::SERVICE_UNAVAILABLE),
        [(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
        "<!DOCTYPE html><html><head><title>Origin is unreachable</title></head><body><h1>Error 523</h1></body></html>",
    )
        .into_response()
}
