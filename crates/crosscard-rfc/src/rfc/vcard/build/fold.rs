//! vCard line folding.

/// Maximum line length in octets (not characters) per RFC 6350.
const MAX_LINE_OCTETS: usize = 75;

/// Folds a line to the maximum length.
///
/// Lines longer than 75 octets are folded by inserting CRLF + space.
/// Folds at UTF-8 character boundaries.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current_len = 0;
    let mut first_segment = true;

    for c in line.chars() {
        let char_len = c.len_utf8();

        // Continuation lines lose one octet to the leading space.
        let effective_max = if first_segment {
            MAX_LINE_OCTETS
        } else {
            MAX_LINE_OCTETS - 1
        };

        if current_len + char_len > effective_max {
            result.push_str("\r\n ");
            current_len = 1;
            first_segment = false;
        }

        result.push(c);
        current_len += char_len;
    }

    result
}
