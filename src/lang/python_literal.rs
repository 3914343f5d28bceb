//! Decoding of Python string tokens and `repr`-style rendering of values.
//!
//! The scanner works on raw token text from tree-sitter, so prefixes, quote
//! styles and escape sequences are resolved here. Rendering produces source
//! text that Python evaluates back to the same value.

use crate::lang::common::LiteralValue;

/// Decoded content of one string token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringToken {
    /// `str` literal
    Text(String),
    /// `bytes` literal
    Bytes(Vec<u8>),
    /// f-string or t-string, never extracted
    Formatted,
}

/// Decode a single string token such as `r'\d+'`, `b"\x00"` or `"""doc"""`.
///
/// Returns `None` when the token cannot be decoded to a concrete value
/// (unknown prefix, `\N{...}` escapes, invalid code points).
pub fn decode_string_token(raw: &str) -> Option<StringToken> {
    let prefix_len = raw
        .char_indices()
        .find(|(_, c)| *c == '\'' || *c == '"')
        .map(|(i, _)| i)?;
    let prefix = raw[..prefix_len].to_ascii_lowercase();
    if !prefix.chars().all(|c| matches!(c, 'r' | 'b' | 'u' | 'f' | 't')) {
        return None;
    }
    if prefix.contains('f') || prefix.contains('t') {
        return Some(StringToken::Formatted);
    }
    let is_raw = prefix.contains('r');
    let is_bytes = prefix.contains('b');

    let quoted = &raw[prefix_len..];
    let delimiter = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    if quoted.len() < delimiter.len() * 2 || !quoted.ends_with(delimiter) {
        return None;
    }
    let body = &quoted[delimiter.len()..quoted.len() - delimiter.len()];

    if is_bytes {
        decode_bytes(body, is_raw).map(StringToken::Bytes)
    } else if is_raw {
        Some(StringToken::Text(body.to_string()))
    } else {
        decode_text(body).map(StringToken::Text)
    }
}

fn decode_text(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => out.push(char::from_u32(take_hex(&mut chars, 2)?)?),
            'u' => out.push(char::from_u32(take_hex(&mut chars, 4)?)?),
            'U' => out.push(char::from_u32(take_hex(&mut chars, 8)?)?),
            'N' => return None,
            '0'..='7' => out.push(char::from_u32(take_octal(next, &mut chars))?),
            other => match simple_escape(other) {
                Some(decoded) => out.push(decoded),
                None => {
                    out.push('\\');
                    out.push(other);
                }
            },
        }
    }
    Some(out)
}

fn decode_bytes(body: &str, is_raw: bool) -> Option<Vec<u8>> {
    if !body.is_ascii() {
        return None;
    }
    if is_raw {
        return Some(body.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c as u8);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => out.push(take_hex(&mut chars, 2)? as u8),
            '0'..='7' => out.push((take_octal(next, &mut chars) & 0xff) as u8),
            other => match simple_escape(other) {
                Some(decoded) => out.push(decoded as u8),
                None => {
                    out.push(b'\\');
                    out.push(other as u8);
                }
            },
        }
    }
    Some(out)
}

fn simple_escape(c: char) -> Option<char> {
    Some(match c {
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        _ => return None,
    })
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}

fn take_octal(first: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u32 {
    let mut value = first.to_digit(8).unwrap_or(0);
    for _ in 0..2 {
        match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(digit) => {
                value = value * 8 + digit;
                chars.next();
            }
            None => break,
        }
    }
    value
}

/// Render a value as Python source, matching `repr()` closely enough that
/// the text evaluates back to the same value.
pub fn render_python_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Text(s) => render_text(s),
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::Real(v) => python_float_repr(*v),
        LiteralValue::Bytes(b) => render_bytes(b),
    }
}

/// Shortest round-trip text of a real, laid out the way Python's `repr`
/// does: positional notation for exponents in `-4..16`, otherwise
/// scientific notation with a signed two-digit exponent.
pub fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value == 0.0 {
        return format!("{sign}0.0");
    }

    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{value:?}");
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{value:?}");
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                format!("{sign}{digits}{}.0", "0".repeat(int_len - digits.len()))
            } else {
                format!("{sign}{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("{sign}0.{zeros}{digits}")
        }
    } else {
        let mantissa = if digits.len() > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs())
    }
}

fn render_text(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_unprintable(c) => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn is_unprintable(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(c, '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}')
}

fn render_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push(quote as char);
    out
}
