//! Cooking of JavaScript string literal bodies.

use std::str::Chars;

/// Resolve escape sequences in the body of a string or template literal.
///
/// `raw` is the literal without its delimiting quotes. Unknown escapes
/// yield the escaped character, and line continuations disappear.
pub fn cook(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !starts_with_digit(&chars) => out.push('\0'),
            '\r' => {
                let mut ahead = chars.clone();
                if ahead.next() == Some('\n') {
                    chars = ahead;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => match take_hex(&mut chars, 2).and_then(char::from_u32) {
                Some(ch) => out.push(ch),
                None => out.push('x'),
            },
            'u' => match take_unicode(&mut chars) {
                Some(ch) => out.push(ch),
                None => out.push('u'),
            },
            other => out.push(other),
        }
    }

    out
}

fn starts_with_digit(chars: &Chars<'_>) -> bool {
    chars.clone().next().is_some_and(|c| c.is_ascii_digit())
}

/// Consume exactly `len` hex digits, or nothing.
fn take_hex(chars: &mut Chars<'_>, len: usize) -> Option<u32> {
    let mut ahead = chars.clone();
    let mut value = 0u32;
    for _ in 0..len {
        value = value * 16 + ahead.next()?.to_digit(16)?;
    }
    *chars = ahead;
    Some(value)
}

/// Consume the rest of a `\u` escape: `HHHH`, a surrogate pair, or `{H..}`.
fn take_unicode(chars: &mut Chars<'_>) -> Option<char> {
    let mut ahead = chars.clone();
    if ahead.next() == Some('{') {
        let mut value = 0u32;
        let mut digits = 0;
        loop {
            let c = ahead.next()?;
            if c == '}' {
                break;
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            digits += 1;
        }
        if digits == 0 {
            return None;
        }
        let ch = char::from_u32(value)?;
        *chars = ahead;
        return Some(ch);
    }

    let high = take_hex(chars, 4)?;
    if !(0xD800..0xDC00).contains(&high) {
        return Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    let mut ahead = chars.clone();
    if ahead.next() == Some('\\') && ahead.next() == Some('u') {
        if let Some(low) = take_hex(&mut ahead, 4).filter(|low| (0xDC00..0xE000).contains(low)) {
            *chars = ahead;
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined);
        }
    }
    Some(char::REPLACEMENT_CHARACTER)
}
