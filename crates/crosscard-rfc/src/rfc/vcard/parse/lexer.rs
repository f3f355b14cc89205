//! Content-line lexing: unfolding and name/parameter/value splitting.
//!
//! vCard uses the folding rules of RFC 6350 §3.2: a CRLF followed by a single
//! space or tab continues the previous logical line. Bare LF is accepted for
//! lenient parsing.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::vcard::core::VCardParameter;

/// Splits raw input into unfolded logical lines.
///
/// Continuation lines (leading space or tab) are merged into the previous
/// line with the fold marker removed. Empty lines are skipped.
#[must_use]
pub fn split_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some(prev) = lines.last_mut() {
                prev.push_str(continuation);
            } else {
                lines.push(continuation.to_string());
            }
        } else {
            lines.push(line.to_string());
        }
    }

    lines
}

/// A parsed content line before value interpretation.
#[derive(Debug, Clone)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (uppercase).
    pub name: String,
    /// Parameters.
    pub params: Vec<VCardParameter>,
    /// Raw value string.
    pub value: String,
}

/// Parses a single content line into its components.
///
/// Format: `[group.]name[;param=value]*:value`
///
/// ## Errors
/// Returns an error if the line is malformed or missing the colon separator.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon_pos = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            "missing colon separator",
        )
    })?;

    let (name_params, value) = line.split_at(colon_pos);
    let value = &value[1..];

    let (group, name_params) = split_group(name_params);

    let (name, params_str) = match name_params.find(';') {
        Some(semi_pos) => (&name_params[..semi_pos], Some(&name_params[semi_pos + 1..])),
        None => (name_params, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("invalid property name: {name}"),
        ));
    }

    let params = match params_str {
        Some(params_str) => parse_parameters(params_str, line_num)?,
        None => Vec::new(),
    };

    Ok(ContentLine {
        group: group.map(String::from),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Finds the colon that separates name/params from value.
///
/// Must handle quoted parameter values that may contain colons.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Splits an optional group prefix off the name part.
fn split_group(s: &str) -> (Option<&str>, &str) {
    if let Some(dot_pos) = s.find('.') {
        let candidate = &s[..dot_pos];
        if !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return (Some(candidate), &s[dot_pos + 1..]);
        }
    }
    (None, s)
}

/// Parses the parameter section of a content line.
fn parse_parameters(s: &str, line_num: usize) -> ParseResult<Vec<VCardParameter>> {
    let mut params = Vec::new();
    let mut remaining = s;

    while !remaining.is_empty() {
        let eq_pos = remaining.find('=').ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                format!("missing = in parameter: {remaining}"),
            )
        })?;

        let name = &remaining[..eq_pos];
        let (values, rest) = parse_param_values(&remaining[eq_pos + 1..]);
        params.push(VCardParameter::multi(name, values));
        remaining = rest;
    }

    Ok(params)
}

/// Parses parameter values (comma-separated, possibly quoted, RFC 6868
/// caret-decoded). Returns the values and the remaining parameter text.
fn parse_param_values(s: &str) -> (Vec<String>, &str) {
    let mut values = Vec::new();
    let mut chars = s.chars().peekable();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut consumed = 0;

    while let Some(&c) = chars.peek() {
        consumed += c.len_utf8();

        match c {
            '"' => {
                chars.next();
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => {
                chars.next();
                values.push(std::mem::take(&mut current_value));
            }
            ';' if !in_quotes => {
                chars.next();
                if !current_value.is_empty() || !values.is_empty() {
                    values.push(current_value);
                }
                return (values, &s[consumed..]);
            }
            '^' if !in_quotes => {
                // RFC 6868 caret encoding
                chars.next();
                if let Some(&next) = chars.peek() {
                    consumed += next.len_utf8();
                    chars.next();
                    match next {
                        'n' => current_value.push('\n'),
                        '\'' => current_value.push('"'),
                        '^' => current_value.push('^'),
                        _ => {
                            current_value.push('^');
                            current_value.push(next);
                        }
                    }
                } else {
                    current_value.push('^');
                }
            }
            _ => {
                chars.next();
                current_value.push(c);
            }
        }
    }

    if !current_value.is_empty() || !values.is_empty() {
        values.push(current_value);
    }

    (values, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_unfolds_continuations() {
        let input = "FN:John\r\n  Doe\r\nTEL:+1\r\n";
        let lines = split_lines(input);
        assert_eq!(lines, vec!["FN:John Doe", "TEL:+1"]);
    }

    #[test]
    fn split_lines_filters_empty() {
        let input = "LINE1\n\nLINE2\n";
        assert_eq!(split_lines(input), vec!["LINE1", "LINE2"]);
    }

    #[test]
    fn parse_simple_line() {
        let line = parse_content_line("FN:John Doe", 1).expect("valid line");
        assert!(line.group.is_none());
        assert_eq!(line.name, "FN");
        assert!(line.params.is_empty());
        assert_eq!(line.value, "John Doe");
    }

    #[test]
    fn parse_grouped_line() {
        let line = parse_content_line("item1.TEL:+1-555-555-5555", 1).expect("valid line");
        assert_eq!(line.group, Some("item1".to_string()));
        assert_eq!(line.name, "TEL");
    }

    #[test]
    fn parse_with_parameters() {
        let line =
            parse_content_line("TEL;TYPE=home,voice;PREF=1:+1-555-555-5555", 1).expect("valid");
        assert_eq!(line.name, "TEL");
        assert_eq!(line.params.len(), 2);
        assert_eq!(line.params[0].values, vec!["home", "voice"]);
        assert_eq!(line.params[1].value(), Some("1"));
    }

    #[test]
    fn parse_quoted_param_with_colon() {
        let line = parse_content_line("ADR;LABEL=\"Main St: rear\":;;Main St", 1).expect("valid");
        assert_eq!(line.params[0].value(), Some("Main St: rear"));
        assert_eq!(line.value, ";;Main St");
    }

    #[test]
    fn parse_caret_encoded_param() {
        let line = parse_content_line("TEL;X-NOTE=a^nb:+1", 1).expect("valid");
        assert_eq!(line.params[0].value(), Some("a\nb"));
    }

    #[test]
    fn parse_colon_in_value() {
        let line = parse_content_line("URL:https://example.com:8080/path", 1).expect("valid");
        assert_eq!(line.value, "https://example.com:8080/path");
    }

    #[test]
    fn reject_missing_colon() {
        assert!(parse_content_line("FN John Doe", 3).is_err());
    }
}
