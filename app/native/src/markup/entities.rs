//! Character reference decoding for markup text.

/// Longest decimal reference accepted (`&#1114111;`).
const MAX_DECIMAL_DIGITS: usize = 6;

/// Longest hexadecimal reference accepted (`&#x10FFFF;`).
const MAX_HEX_DIGITS: usize = 5;

/// Decodes the five predefined entities and numeric character references.
///
/// Recognized forms are `&lt;`, `&gt;`, `&amp;`, `&apos;`, `&quot;`, `&#NNN;`
/// (one to six decimal digits) and `&#xHHHH;` (one to five hex digits).
/// Anything else, including numeric references that do not name a valid
/// Unicode scalar value, is kept verbatim.
#[must_use]
pub fn decode(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        match decode_reference(candidate) {
            Some((ch, consumed)) => {
                output.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                output.push('&');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Decodes a single reference at the start of `input` (which begins with `&`).
///
/// Returns the decoded character and the number of bytes consumed.
fn decode_reference(input: &str) -> Option<(char, usize)> {
    let end = input.find(';')?;
    let body = &input[1..end];

    let ch = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "apos" => '\'',
        "quot" => '"',
        _ => decode_numeric(body)?,
    };

    Some((ch, end + 1))
}

fn decode_numeric(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;

    let code = if let Some(hex) = digits.strip_prefix('x') {
        if hex.is_empty()
            || hex.len() > MAX_HEX_DIGITS
            || !hex.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()?
    } else {
        if digits.is_empty()
            || digits.len() > MAX_DECIMAL_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse::<u32>().ok()?
    };

    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decode("&lt;a&gt; &amp; &apos;b&apos; &quot;c&quot;"), "<a> & 'b' \"c\"");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(decode("caf&#233;"), "café");
        assert_eq!(decode("&#x41;&#x1F600;"), "A\u{1F600}");
    }

    #[test]
    fn leaves_unknown_entities_untouched() {
        assert_eq!(decode("&nbsp;&copy;"), "&nbsp;&copy;");
        assert_eq!(decode("fish & chips"), "fish & chips");
        assert_eq!(decode("trailing &"), "trailing &");
    }

    #[test]
    fn leaves_out_of_range_references_untouched() {
        assert_eq!(decode("&#xD800;"), "&#xD800;");
        assert_eq!(decode("&#1234567;"), "&#1234567;");
        assert_eq!(decode("&#x110000;"), "&#x110000;");
    }

    #[test]
    fn uppercase_hex_marker_is_not_a_reference() {
        assert_eq!(decode("&#X41;"), "&#X41;");
    }

    #[test]
    fn decodes_once() {
        assert_eq!(decode("&amp;lt;"), "&lt;");
    }
}
