//! Escape codec for the five reserved characters.
//!
//! `escape` and `unescape` are inverses: `unescape(&escape(s)) == s` for every
//! `s`, and both return the input unchanged (borrowed) when there is nothing
//! to rewrite.

use std::borrow::Cow;

use memchr::memchr;
use phf::phf_map;

/// Reserved character -> entity.
static ESCAPES: phf::Map<char, &'static str> = phf_map! {
    '<' => "&lt;",
    '>' => "&gt;",
    '&' => "&amp;",
    '"' => "&quot;",
    '\'' => "&apos;",
};

/// Entity name (between `&` and `;`) -> character.
static ENTITIES: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "quot" => '"',
    "apos" => '\'',
};

/// Longest entity name in [`ENTITIES`].
const MAX_ENTITY_LEN: usize = 4;

/// Replace each reserved character with its entity.
///
/// Newlines and every other character pass through untouched.
pub fn escape(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(|c: char| ESCAPES.contains_key(&c)) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 8);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match ESCAPES.get(&c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Replace the five named entities with the characters they stand for.
///
/// An `&` that does not start one of `&lt;`, `&gt;`, `&amp;`, `&quot;` or
/// `&apos;` is copied literally and scanning resumes right after it, so
/// truncated or unknown entities never lose input.
pub fn unescape(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(mut amp) = memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    loop {
        out.push_str(&s[copied..amp]);

        let name_start = amp + 1;
        let window_end = bytes.len().min(name_start + MAX_ENTITY_LEN + 1);
        let resolved = memchr(b';', &bytes[name_start..window_end]).and_then(|len| {
            ENTITIES
                .get(&s[name_start..name_start + len])
                .map(|&c| (c, name_start + len + 1))
        });

        match resolved {
            Some((c, next)) => {
                out.push(c);
                copied = next;
            }
            None => {
                out.push('&');
                copied = name_start;
            }
        }

        match memchr(b'&', &bytes[copied..]) {
            Some(offset) => amp = copied + offset,
            None => break,
        }
    }
    out.push_str(&s[copied..]);
    Cow::Owned(out)
}
