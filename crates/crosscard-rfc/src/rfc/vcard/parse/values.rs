//! vCard value parsers: escaping, structured splits, dates and timestamps.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::{ParseError, ParseResult};
use crate::rfc::vcard::core::{Address, Organization, StructuredName};

/// Unescapes a vCard text value.
///
/// vCard escapes: \n, \N (newline), \, (comma), \; (semicolon), \\ (backslash)
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 'N') => {
                    chars.next();
                    result.push('\n');
                }
                Some(',') => {
                    chars.next();
                    result.push(',');
                }
                Some(';') => {
                    chars.next();
                    result.push(';');
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a structured value on unescaped semicolons.
#[must_use]
pub fn split_structured(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev_backslash = false;

    for (i, c) in s.char_indices() {
        if c == '\\' {
            prev_backslash = !prev_backslash;
            continue;
        }

        if c == ';' && !prev_backslash {
            parts.push(&s[start..i]);
            start = i + 1;
        }

        prev_backslash = false;
    }

    parts.push(&s[start..]);
    parts
}

/// Splits a component value on unescaped commas, unescaping each part.
#[must_use]
pub fn split_component(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next @ (',' | ';' | '\\')) => {
                    chars.next();
                    current.push(next);
                }
                Some('n' | 'N') => {
                    chars.next();
                    current.push('\n');
                }
                _ => current.push(c),
            }
        } else if c == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    parts.push(current);
    parts
}

/// Parses a structured name (N property).
///
/// N has 5 positions: family;given;additional;prefixes;suffixes.
/// All are optional; trailing positions may be absent entirely.
#[must_use]
pub fn parse_structured_name(value: &str) -> StructuredName {
    let parts = split_structured(value);
    let component = |i: usize| parts.get(i).map(|s| split_component(s)).unwrap_or_default();

    StructuredName {
        family: component(0),
        given: component(1),
        additional: component(2),
        prefixes: component(3),
        suffixes: component(4),
    }
}

/// Parses an address (ADR property).
///
/// ADR has 7 positions: po_box;extended;street;locality;region;postal;country.
#[must_use]
pub fn parse_address(value: &str) -> Address {
    let parts = split_structured(value);
    let component = |i: usize| parts.get(i).map(|s| split_component(s)).unwrap_or_default();

    Address {
        po_box: component(0),
        extended: component(1),
        street: component(2),
        locality: component(3),
        region: component(4),
        postal_code: component(5),
        country: component(6),
    }
}

/// Parses an organization (ORG property): name, then units.
#[must_use]
pub fn parse_organization(value: &str) -> Organization {
    let mut parts = split_structured(value).into_iter().map(unescape_text);
    let name = parts.next().unwrap_or_default();

    Organization {
        name,
        units: parts.collect(),
    }
}

/// Parses a calendar date in vCard basic (`19960415`) or extended
/// (`1996-04-15`) format.
///
/// ## Errors
/// Returns an error if the value is not a complete calendar date.
pub fn parse_date(value: &str, line_num: usize) -> ParseResult<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|e| ParseError::invalid_value(line_num, format!("invalid date {trimmed}: {e}")))
}

/// Parses a timestamp (REV property), e.g. `19951031T222710Z`.
///
/// ## Errors
/// Returns an error if the value is not a valid UTC timestamp.
pub fn parse_timestamp(value: &str, line_num: usize) -> ParseResult<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Some(naive) = trimmed
        .strip_suffix('Z')
        .and_then(|s| chrono::NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S").ok())
    {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_str(trimmed, "%Y%m%dT%H%M%S%z")
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| trimmed.parse::<DateTime<Utc>>())
        .map_err(|e| {
            ParseError::invalid_value(line_num, format!("invalid timestamp {trimmed}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_basic() {
        assert_eq!(unescape_text("a\\,b\\;c\\nd\\\\e"), "a,b;c\nd\\e");
    }

    #[test]
    fn split_structured_respects_escapes() {
        assert_eq!(split_structured("a;b\\;c;d"), vec!["a", "b\\;c", "d"]);
    }

    #[test]
    fn structured_name_five_positions() {
        let name = parse_structured_name("Public;John;Quinlan;Mr.;Esq.");
        assert_eq!(name.family, vec!["Public"]);
        assert_eq!(name.given, vec!["John"]);
        assert_eq!(name.additional, vec!["Quinlan"]);
        assert_eq!(name.prefixes, vec!["Mr."]);
        assert_eq!(name.suffixes, vec!["Esq."]);
    }

    #[test]
    fn structured_name_short() {
        let name = parse_structured_name("Doe;Jane");
        assert_eq!(name.family, vec!["Doe"]);
        assert_eq!(name.given, vec!["Jane"]);
        assert!(name.prefixes.is_empty());
    }

    #[test]
    fn address_positions() {
        let adr = parse_address(";;123 Main St;Anytown;CA;91921;USA");
        assert!(adr.po_box.is_empty());
        assert_eq!(adr.street, vec!["123 Main St"]);
        assert_eq!(adr.locality, vec!["Anytown"]);
        assert_eq!(adr.country, vec!["USA"]);
    }

    #[test]
    fn organization_units() {
        let org = parse_organization("ABC\\, Inc.;North American Division;Marketing");
        assert_eq!(org.name, "ABC, Inc.");
        assert_eq!(org.units, vec!["North American Division", "Marketing"]);
    }

    #[test]
    fn date_both_formats() {
        let expected = NaiveDate::from_ymd_opt(1996, 4, 15).expect("valid date");
        assert_eq!(parse_date("19960415", 1).expect("basic"), expected);
        assert_eq!(parse_date("1996-04-15", 1).expect("extended"), expected);
        assert!(parse_date("1996-04", 1).is_err());
    }

    #[test]
    fn timestamp_basic_format() {
        let ts = parse_timestamp("19951031T222710Z", 1).expect("valid timestamp");
        assert_eq!(ts.to_rfc3339(), "1995-10-31T22:27:10+00:00");
    }
}
