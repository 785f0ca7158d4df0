//! Parsing of the semi-structured text fields found in publication datasets.

use log::debug;
use serde_json::Value;

/// Literal written by some exporters for an empty author cell.
const NAN_SENTINEL: &str = "nan";

///Parses a raw author field into an ordered list of display names.
///
///Two encodings are understood. The alternate dataset source writes a
///Python-repr array of objects (`[{'name': 'Ada Lovelace'}]`, with names
///containing an apostrophe double-quoted); this is tried first. Everything
///else is treated as a `;`-joined list. A field that looks like an array but
///cannot be read as one yields no authors rather than a bogus name.
///Whitespace is trimmed, empty names and the `nan` sentinel are dropped.
///A field that yields no authors is not an error.
/// # Example
/// ```
/// use citation_atlas::parse_author_list;
/// assert_eq!(parse_author_list("Alice ; Bob;  nan ;"), vec!["Alice", "Bob"]);
/// assert_eq!(parse_author_list("[{'name': 'Ada'}, {'name': 'Alan'}]"), vec!["Ada", "Alan"]);
/// ```
pub fn parse_author_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match parse_quoted_json(raw) {
        Some(names) => names,
        None if raw.trim_start().starts_with('[') => {
            debug!("unreadable author array {raw:?}, no authors taken");
            Vec::new()
        }
        None => split_semicolons(raw),
    }
}

fn parse_quoted_json(raw: &str) -> Option<Vec<String>> {
    let value: Value = match serde_json::from_str(&python_repr_to_json(raw)) {
        Ok(v) => v,
        Err(e) => {
            debug!("author field is not JSON-encoded ({e}), using ';' form");
            return None;
        }
    };
    let items = value.as_array()?;
    let names = items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => obj.get("name").and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .filter_map(clean_name)
        .collect();
    Some(names)
}

/// Rewrites Python-repr string literals (`'x'` and `"x'y"`) as JSON strings
/// and `None`/`True`/`False` as their JSON counterparts. Text outside string
/// literals is copied as is.
fn python_repr_to_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let mut literal = String::new();
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => match chars.next() {
                            Some('n') => literal.push('\n'),
                            Some('t') => literal.push('\t'),
                            Some(other) => literal.push(other),
                            None => {}
                        },
                        _ if ch == c => break,
                        _ => literal.push(ch),
                    }
                }
                out.push_str(&Value::String(literal).to_string());
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphanumeric() && next != '_' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    _ => word.as_str(),
                });
            }
            _ => out.push(c),
        }
    }
    out
}

fn split_semicolons(raw: &str) -> Vec<String> {
    raw.split(';').filter_map(clean_name).collect()
}

fn clean_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case(NAN_SENTINEL) {
        None
    } else {
        Some(name.to_string())
    }
}

///Normalizes a venue name. `None` means the paper takes no part in
///venue-based aggregation: empty names, `n/a` and the `book` venue-type
///sentinel are excluded.
/// # Example
/// ```
/// use citation_atlas::normalize_venue;
/// assert_eq!(normalize_venue("  NeurIPS "), Some("NeurIPS".to_string()));
/// assert_eq!(normalize_venue("N/A"), None);
/// assert_eq!(normalize_venue("book"), None);
/// ```
pub fn normalize_venue(raw: &str) -> Option<String> {
    let venue = raw.trim();
    if venue.is_empty() || venue.eq_ignore_ascii_case("n/a") || venue.eq_ignore_ascii_case("book")
    {
        None
    } else {
        Some(venue.to_string())
    }
}

///Splits a `;`-joined keyword field.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

///Coerces a citation field to a count. Missing, non-numeric, negative and
///non-finite values become 0; fractional values (`"1234.0"`) are floored.
pub fn coerce_count(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.floor() as u64,
        _ => 0,
    }
}
