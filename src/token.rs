//! Turning raw corpus text into words.
//!
//! A word is a whitespace-separated token with its leading and trailing
//! non-alphabetic bytes stripped and the rest ASCII-lowercased. Interior
//! punctuation (`don't`, `well-known`) is kept. Anything shorter than
//! [`MIN_WORD_LEN`] after stripping is dropped.

/// Shortest accepted word, in bytes.
pub const MIN_WORD_LEN: usize = 2;

/// Longest raw token; longer runs are cut into pieces of this size.
pub const MAX_TOKEN_LEN: usize = 255;

/// Normalizes one raw token, or returns `None` if nothing usable is left.
pub fn normalize(raw: &[u8]) -> Option<Vec<u8>> {
    let start = raw.iter().position(u8::is_ascii_alphabetic)?;
    let end = raw.iter().rposition(u8::is_ascii_alphabetic)? + 1;
    let word = &raw[start..end];
    if word.len() < MIN_WORD_LEN {
        return None;
    }
    Some(word.to_ascii_lowercase())
}

/// Token separator: ASCII whitespace plus vertical tab, which
/// `u8::is_ascii_whitespace` leaves out.
fn is_separator(b: &u8) -> bool {
    b.is_ascii_whitespace() || *b == 0x0B
}

/// Words of one chunk of text, in order.
pub fn words(text: &[u8]) -> impl Iterator<Item = Vec<u8>> + '_ {
    text.split(is_separator)
        .filter(|raw| !raw.is_empty())
        .flat_map(|raw| raw.chunks(MAX_TOKEN_LEN))
        .filter_map(normalize)
}
