use core::str;

pub(crate) fn is_word_byte(byte: u8) -> bool {
    !byte.is_ascii_whitespace()
}

/// Pushes `end` forward while it sits inside a word. Never moves past `bytes.len()`.
pub(crate) fn extend_to_word_end(bytes: &[u8], start: usize, end: usize) -> usize {
    let len = bytes.len();
    let mut end = end.min(len);
    if end <= start || end >= len || !is_word_byte(bytes[end - 1]) {
        return end;
    }

    while end < len && is_word_byte(bytes[end]) {
        end += 1;
    }
    end
}

/// Longest displayable prefix of a page that may start or end inside a UTF-8 sequence.
pub(crate) fn displayable_prefix(bytes: &[u8]) -> &str {
    let lead = bytes
        .iter()
        .take_while(|byte| (**byte & 0b1100_0000) == 0b1000_0000)
        .count();
    let bytes = &bytes[lead..];

    match str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or(""),
    }
}

/// Legacy blobs were written with a trailing NUL; the text ends at the first one.
pub(crate) fn trim_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|byte| *byte == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Truncates `source` to at most `max_bytes` without splitting a character.
pub(crate) fn truncate_on_char_boundary(source: &str, max_bytes: usize) -> &str {
    if source.len() <= max_bytes {
        return source;
    }

    let mut end = max_bytes;
    while end > 0 && !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[..end]
}
