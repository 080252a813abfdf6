//! Domain types for the joke service.
//!
//! # Design
//! Every filter dimension is a closed enum whose wire token comes from the
//! `strum` derives, so only registered tokens can ever reach a URL. Parsing a
//! token back is ASCII case-insensitive because the service is inconsistent
//! about casing between endpoints.
//!
//! Sets are `BTreeSet`s: iteration follows declaration order, which keeps
//! joined token lists deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Joke category. `Any` is the wildcard sentinel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Any,
    Misc,
    Programming,
    Dark,
    Pun,
    Spooky,
    Christmas,
}

/// Joke language, as an ISO-639-1 code.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    Cs,
    De,
    #[default]
    En,
    Es,
    Fr,
    Pt,
}

/// Content-warning flag. `All` only makes sense as a blacklist entry and is
/// never part of a parsed joke.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Flag {
    Nsfw,
    Religious,
    Political,
    Racist,
    Sexist,
    Explicit,
    All,
}

/// Shape of a joke. `All` is the request-side default and accepts both.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum JokeType {
    #[strum(serialize = "single")]
    Single,
    #[strum(serialize = "twopart")]
    TwoPart,
    #[default]
    #[strum(serialize = "all")]
    All,
}

/// Response body format.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    #[default]
    Json,
    Txt,
    Xml,
    Yaml,
}

/// A parsed joke.
///
/// `lines` is `[joke]` for single jokes (or its non-blank lines when newline
/// splitting was requested) and `[setup, delivery]` for two-part jokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub category: Category,
    #[serde(rename = "type")]
    pub joke_type: JokeType,
    pub lines: Vec<String>,
    pub flags: BTreeSet<Flag>,
    pub id: u32,
    pub safe: bool,
    pub language: Language,
}

impl Joke {
    /// Setup line of a two-part joke.
    pub fn setup(&self) -> Option<&str> {
        match self.joke_type {
            JokeType::TwoPart => self.lines.first().map(String::as_str),
            _ => None,
        }
    }

    /// Delivery line of a two-part joke.
    pub fn delivery(&self) -> Option<&str> {
        match self.joke_type {
            JokeType::TwoPart => self.lines.get(1).map(String::as_str),
            _ => None,
        }
    }
}

/// A response body returned without structured parsing, in whatever format
/// was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub data: String,
}

/// Service metadata returned by the `info` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub version: String,
    pub jokes: JokeStats,
    pub formats: Vec<String>,
    pub joke_languages: u32,
    pub system_languages: u32,
    pub info: String,
    pub timestamp: i64,
}

/// Joke corpus statistics nested in `Info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeStats {
    pub total_count: u32,
    pub categories: Vec<String>,
    pub flags: Vec<String>,
    pub types: Vec<String>,
    #[serde(default, rename = "submissionURL")]
    pub submission_url: Option<String>,
    /// Inclusive `[first, last]` joke ids per language code.
    #[serde(default)]
    pub id_range: BTreeMap<String, [u32; 2]>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn wire_tokens() {
        assert_eq!(Category::Programming.to_string(), "Programming");
        assert_eq!(Language::Pt.to_string(), "pt");
        assert_eq!(Flag::Nsfw.to_string(), "nsfw");
        assert_eq!(JokeType::TwoPart.to_string(), "twopart");
        assert_eq!(Format::Yaml.to_string(), "yaml");
    }

    #[test]
    fn tokens_parse_case_insensitively() {
        assert_eq!(Category::from_str("PROGRAMMING").unwrap(), Category::Programming);
        assert_eq!(Category::from_str("spooky").unwrap(), Category::Spooky);
        assert_eq!(JokeType::from_str("TwoPart").unwrap(), JokeType::TwoPart);
        assert_eq!(Language::from_str("DE").unwrap(), Language::De);
        assert!(Flag::from_str("offensive").is_err());
    }

    #[test]
    fn defaults() {
        assert_eq!(Language::default(), Language::En);
        assert_eq!(JokeType::default(), JokeType::All);
        assert_eq!(Format::default(), Format::Json);
    }

    #[test]
    fn setup_and_delivery_only_for_two_part() {
        let mut joke = Joke {
            category: Category::Pun,
            joke_type: JokeType::TwoPart,
            lines: vec!["setup".to_string(), "delivery".to_string()],
            flags: BTreeSet::new(),
            id: 1,
            safe: true,
            language: Language::En,
        };
        assert_eq!(joke.setup(), Some("setup"));
        assert_eq!(joke.delivery(), Some("delivery"));

        joke.joke_type = JokeType::Single;
        assert_eq!(joke.setup(), None);
    }

    #[test]
    fn info_deserializes_from_wire_shape() {
        let body = r#"{
            "error": false,
            "version": "2.3.2",
            "jokes": {
                "totalCount": 1368,
                "categories": ["Any", "Misc", "Programming"],
                "flags": ["nsfw", "religious"],
                "types": ["single", "twopart"],
                "submissionURL": "https://v2.jokeapi.dev#submit",
                "idRange": {"en": [0, 318], "de": [0, 35]}
            },
            "formats": ["json", "xml", "yaml", "txt"],
            "jokeLanguages": 6,
            "systemLanguages": 5,
            "info": "hello",
            "timestamp": 1579170794412
        }"#;
        let info: Info = serde_json::from_str(body).unwrap();
        assert_eq!(info.version, "2.3.2");
        assert_eq!(info.jokes.total_count, 1368);
        assert_eq!(info.jokes.id_range["en"], [0, 318]);
        assert_eq!(info.formats.len(), 4);
    }
}
