//! Interpretation of JSON payloads: error envelopes, single jokes and
//! batches.
//!
//! Parsing works on `serde_json::Value` rather than derived structs because
//! the joke shape depends on which fields are present (`setup` vs `joke`,
//! `amount` wrapper or not).

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{ApiError, Error, ParseError};
use crate::types::{Flag, Joke};

type Object = Map<String, Value>;

/// Parse a body and return its jokes, or the service's error envelope.
pub fn parse_payload(body: &str, split_new_line: bool) -> Result<Vec<Joke>, Error> {
    let value: Value = serde_json::from_str(body).map_err(ParseError::from)?;
    reject_error_envelope(&value)?;
    Ok(parse_batch(&value, split_new_line)?)
}

/// Fail with `Error::Api` when `value` carries `"error": true`.
pub fn reject_error_envelope(value: &Value) -> Result<(), Error> {
    if value.get("error").and_then(Value::as_bool) == Some(true) {
        return Err(Error::Api(parse_error(value)?));
    }
    Ok(())
}

pub fn parse_error(value: &Value) -> Result<ApiError, ParseError> {
    let obj = as_object(value)?;
    bool_field(obj, "error")?;
    let internal_error = match obj.get("internalError") {
        None => false,
        Some(v) => v.as_bool().ok_or(ParseError::WrongKind {
            field: "internalError",
            expected: "boolean",
        })?,
    };
    let caused_by = array_field(obj, "causedBy")?
        .iter()
        .map(|cause| {
            cause.as_str().map(str::to_string).ok_or(ParseError::WrongKind {
                field: "causedBy",
                expected: "array of strings",
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiError {
        internal_error,
        code: i64_field(obj, "code")?,
        message: str_field(obj, "message")?.to_string(),
        caused_by,
        additional_info: str_field(obj, "additionalInfo")?.to_string(),
        timestamp: i64_field(obj, "timestamp")?,
    })
}

pub fn parse_joke(value: &Value, split_new_line: bool) -> Result<Joke, ParseError> {
    let obj = as_object(value)?;

    let lines = if obj.contains_key("setup") {
        vec![
            str_field(obj, "setup")?.to_string(),
            str_field(obj, "delivery")?.to_string(),
        ]
    } else {
        let text = str_field(obj, "joke")?;
        if split_new_line {
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()
        } else {
            vec![text.to_string()]
        }
    };

    let flag_values = obj
        .get("flags")
        .ok_or(ParseError::MissingField("flags"))?
        .as_object()
        .ok_or(ParseError::WrongKind {
            field: "flags",
            expected: "object",
        })?;
    let flags = <Flag as strum::IntoEnumIterator>::iter()
        .filter(|flag| *flag != Flag::All)
        .filter(|flag| {
            let token: &str = flag.as_ref();
            flag_values.get(token).and_then(Value::as_bool) == Some(true)
        })
        .collect();

    let id = u32::try_from(i64_field(obj, "id")?).map_err(|_| ParseError::WrongKind {
        field: "id",
        expected: "joke id",
    })?;

    Ok(Joke {
        category: token_field(obj, "category")?,
        joke_type: token_field(obj, "type")?,
        lines,
        flags,
        id,
        safe: bool_field(obj, "safe")?,
        language: token_field(obj, "lang")?,
    })
}

/// Multi-joke responses are wrapped in `{"amount": n, "jokes": [...]}`; a
/// single joke comes back bare.
pub fn parse_batch(value: &Value, split_new_line: bool) -> Result<Vec<Joke>, ParseError> {
    let obj = as_object(value)?;
    if !obj.contains_key("amount") {
        return Ok(vec![parse_joke(value, split_new_line)?]);
    }
    array_field(obj, "jokes")?
        .iter()
        .map(|joke| parse_joke(joke, split_new_line))
        .collect()
}

fn as_object(value: &Value) -> Result<&Object, ParseError> {
    value.as_object().ok_or(ParseError::WrongKind {
        field: "<root>",
        expected: "object",
    })
}

fn field<'a>(obj: &'a Object, name: &'static str) -> Result<&'a Value, ParseError> {
    obj.get(name).ok_or(ParseError::MissingField(name))
}

fn str_field<'a>(obj: &'a Object, name: &'static str) -> Result<&'a str, ParseError> {
    field(obj, name)?.as_str().ok_or(ParseError::WrongKind {
        field: name,
        expected: "string",
    })
}

fn bool_field(obj: &Object, name: &'static str) -> Result<bool, ParseError> {
    field(obj, name)?.as_bool().ok_or(ParseError::WrongKind {
        field: name,
        expected: "boolean",
    })
}

fn i64_field(obj: &Object, name: &'static str) -> Result<i64, ParseError> {
    field(obj, name)?.as_i64().ok_or(ParseError::WrongKind {
        field: name,
        expected: "integer",
    })
}

fn array_field<'a>(obj: &'a Object, name: &'static str) -> Result<&'a Vec<Value>, ParseError> {
    field(obj, name)?.as_array().ok_or(ParseError::WrongKind {
        field: name,
        expected: "array",
    })
}

fn token_field<T: FromStr>(obj: &Object, name: &'static str) -> Result<T, ParseError> {
    let token = str_field(obj, name)?;
    token.parse().map_err(|_| ParseError::UnknownToken {
        kind: name,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::types::{Category, JokeType, Language};

    fn flags(nsfw: bool, sexist: bool) -> Value {
        json!({
            "nsfw": nsfw,
            "religious": false,
            "political": false,
            "racist": false,
            "sexist": sexist,
            "explicit": false
        })
    }

    fn single(text: &str) -> Value {
        json!({
            "error": false,
            "category": "Programming",
            "type": "single",
            "joke": text,
            "flags": flags(false, false),
            "id": 12,
            "safe": true,
            "lang": "en"
        })
    }

    fn two_part(id: u32) -> Value {
        json!({
            "category": "Pun",
            "type": "twopart",
            "setup": "Why?",
            "delivery": "Because.\nReally.",
            "flags": flags(false, false),
            "id": id,
            "safe": true,
            "lang": "de"
        })
    }

    #[test]
    fn two_part_always_has_two_lines() {
        for split in [false, true] {
            let joke = parse_joke(&two_part(3), split).unwrap();
            assert_eq!(joke.lines, ["Why?", "Because.\nReally."]);
            assert_eq!(joke.joke_type, JokeType::TwoPart);
            assert_eq!(joke.language, Language::De);
        }
    }

    #[test]
    fn single_joke_split_on_newlines() {
        let joke = parse_joke(&single("line1\nline2"), true).unwrap();
        assert_eq!(joke.lines, ["line1", "line2"]);

        let joke = parse_joke(&single("line1\nline2"), false).unwrap();
        assert_eq!(joke.lines, ["line1\nline2"]);
    }

    #[test]
    fn blank_segments_are_dropped() {
        let joke = parse_joke(&single("a\n\n  \nb\n"), true).unwrap();
        assert_eq!(joke.lines, ["a", "b"]);
    }

    #[test]
    fn flags_are_reconstructed() {
        let mut value = single("x");
        value["flags"] = flags(true, true);
        let joke = parse_joke(&value, false).unwrap();
        assert_eq!(joke.flags, BTreeSet::from([Flag::Nsfw, Flag::Sexist]));
    }

    #[test]
    fn missing_flag_keys_are_false() {
        let mut value = single("x");
        value["flags"] = json!({ "political": true });
        let joke = parse_joke(&value, false).unwrap();
        assert_eq!(joke.flags, BTreeSet::from([Flag::Political]));
    }

    #[test]
    fn all_is_never_a_parsed_flag() {
        let mut value = single("x");
        value["flags"] = json!({ "all": true, "racist": true });
        let joke = parse_joke(&value, false).unwrap();
        assert_eq!(joke.flags, BTreeSet::from([Flag::Racist]));
        assert!(!joke.flags.contains(&Flag::All));
    }

    #[test]
    fn crlf_line_endings_are_split_cleanly() {
        let joke = parse_joke(&single("a\r\nb\r\n"), true).unwrap();
        assert_eq!(joke.lines, ["a", "b"]);
    }

    #[test]
    fn tokens_are_case_insensitive() {
        let mut value = single("x");
        value["category"] = json!("PROGRAMMING");
        value["lang"] = json!("EN");
        let joke = parse_joke(&value, false).unwrap();
        assert_eq!(joke.category, Category::Programming);
        assert_eq!(joke.language, Language::En);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut value = single("x");
        value["category"] = json!("Knock-knock");
        let err = parse_joke(&value, false).unwrap_err();
        assert!(matches!(err, ParseError::UnknownToken { kind: "category", .. }));
    }

    #[test]
    fn missing_joke_text_is_rejected() {
        let mut value = single("x");
        value.as_object_mut().unwrap().remove("joke");
        let err = parse_joke(&value, false).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("joke")));
    }

    #[test]
    fn error_envelope() {
        let value = json!({
            "error": true,
            "code": 106,
            "message": "No matching joke found",
            "causedBy": ["No jokes were found that match your provided filter(s)"],
            "additionalInfo": "Error while finalizing joke filtering",
            "timestamp": 1579170794412i64
        });
        let err = parse_error(&value).unwrap();
        assert_eq!(err.code, 106);
        assert_eq!(err.caused_by.len(), 1);
        assert!(!err.internal_error);
        assert_eq!(err.timestamp, 1579170794412);
    }

    #[test]
    fn error_envelope_with_wrong_kind_fails() {
        let value = json!({
            "error": true,
            "internalError": false,
            "code": "106",
            "message": "m",
            "causedBy": [],
            "additionalInfo": "",
            "timestamp": 0
        });
        let err = parse_error(&value).unwrap_err();
        assert!(matches!(err, ParseError::WrongKind { field: "code", .. }));
    }

    #[test]
    fn batch_keeps_array_order() {
        let value = json!({
            "error": false,
            "amount": 2,
            "jokes": [two_part(7), two_part(3)]
        });
        let jokes = parse_batch(&value, false).unwrap();
        assert_eq!(jokes.len(), 2);
        assert_eq!(jokes[0].id, 7);
        assert_eq!(jokes[1].id, 3);
    }

    #[test]
    fn bare_joke_is_a_batch_of_one() {
        let jokes = parse_batch(&single("x"), false).unwrap();
        assert_eq!(jokes.len(), 1);
        assert_eq!(jokes[0].id, 12);
    }

    #[test]
    fn payload_routes_error_envelopes() {
        let body = r#"{"error":true,"internalError":true,"code":500,"message":"m","causedBy":["c"],"additionalInfo":"i","timestamp":1}"#;
        let err = parse_payload(body, false).unwrap_err();
        match err {
            Error::Api(api) => {
                assert!(api.internal_error);
                assert_eq!(api.code, 500);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn payload_rejects_invalid_json() {
        let err = parse_payload("not json", false).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }
}
