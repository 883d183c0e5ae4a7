//! Flat key/value encodings of calculator state.
//!
//! A record exposes its fields as `(name, FieldValue)` pairs through [`PersistableState`]. Two
//! encodings share one decoding contract: URL query strings and flat JSON objects. Decoding
//! starts from a default record and overwrites each field whose external value is present and
//! parses as the field's type. Anything missing or malformed keeps its default.
//!
//! Numbers and text are written verbatim; dates are signed millisecond timestamps. JSON numbers
//! keep their exact decimal text, so every `Decimal` survives a JSON round trip.

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use url::form_urlencoded;

/// A primitive field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(Decimal),
    Text(String),
    Date(DateTime<Utc>),
}

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    Date,
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    /// The flat string form used in query strings.
    pub fn to_flat_string(&self) -> String {
        match self {
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Date(date) => date.timestamp_millis().to_string(),
        }
    }

    /// The JSON form: numbers and timestamps as JSON numbers, text as a string.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Number(number) => {
                serde_json::from_str(&number.to_string()).unwrap_or_else(|_| Value::String(number.to_string()))
            }
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Date(date) => Value::from(date.timestamp_millis()),
        }
    }

    /// Parses `raw` as a value of the same type as `self`.
    pub fn parse_same_type(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldValue::Number(_) => parse_number(raw).map(FieldValue::Number),
            FieldValue::Text(_) => Some(FieldValue::Text(raw.to_string())),
            FieldValue::Date(_) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .map(FieldValue::Date),
        }
    }
}

fn parse_number(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)).ok()
}

/// A flat record of number, text and date fields.
pub trait PersistableState: Clone {
    /// Every field of the record, in a stable order.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// Stores `value` in the field named `key`.
    ///
    /// Returns `false` when the record rejects the value (unknown key, mismatched type, or a
    /// value outside the field's domain), leaving the field unchanged.
    fn apply_field(&mut self, key: &str, value: FieldValue) -> bool;
}

/// A flat external source of raw values, looked up by field name.
pub trait FlatSource {
    /// The raw value stored under `key`, if the source holds one usable for a field of `kind`.
    fn raw(&self, key: &str, kind: FieldKind) -> Option<Cow<'_, str>>;
}

impl FlatSource for HashMap<String, String> {
    fn raw(&self, key: &str, _kind: FieldKind) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl FlatSource for Map<String, Value> {
    fn raw(&self, key: &str, kind: FieldKind) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            Value::Number(number) if kind != FieldKind::Text => Some(Cow::Owned(number.to_string())),
            _ => None,
        }
    }
}

/// Rebuilds a record from `source`, falling back to `defaults` field by field.
pub fn decode<S, F>(source: &F, defaults: &S) -> S
where
    S: PersistableState,
    F: FlatSource + ?Sized,
{
    let mut state = defaults.clone();
    for (key, default_value) in defaults.fields() {
        let Some(raw) = source.raw(key, default_value.kind()) else {
            debug!("No {:?} value for '{key}', keeping default", default_value.kind());
            continue;
        };
        match default_value.parse_same_type(&raw) {
            Some(value) => {
                if !state.apply_field(key, value) {
                    debug!("Value '{raw}' rejected for '{key}', keeping default");
                }
            }
            None => debug!("Malformed value '{raw}' for '{key}', keeping default"),
        }
    }
    state
}

/// Encodes a record as a URL query string (without the leading `?`).
pub fn encode_query<S: PersistableState>(state: &S) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in state.fields() {
        serializer.append_pair(key, &value.to_flat_string());
    }
    serializer.finish()
}

/// Parses a URL query string into flat pairs. The first occurrence of a key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut pairs = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        pairs.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    pairs
}

/// Decodes a URL query string over `defaults`.
pub fn decode_query<S: PersistableState>(query: &str, defaults: &S) -> S {
    decode(&parse_query(query), defaults)
}

/// Encodes a record as a flat JSON object.
pub fn encode_json<S: PersistableState>(state: &S) -> Map<String, Value> {
    state
        .fields()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_json()))
        .collect()
}

/// Decodes a flat JSON object over `defaults`.
pub fn decode_json<S: PersistableState>(object: &Map<String, Value>, defaults: &S) -> S {
    decode(object, defaults)
}
