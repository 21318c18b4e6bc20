//! Small string utilities shared by modifiers and useful to hosts.

/// Folds a string to plain ASCII suitable for URLs: transliterates accented
/// characters, turns spaces into hyphens, and drops quotes.
///
/// This is the cleaning step behind the `urlFriendly` modifier.
pub fn remove_special_chars(text: &str) -> String {
    deunicode::deunicode(text)
        .chars()
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            '"' | '\'' => None,
            c => Some(c),
        })
        .collect()
}

/// Left-pads `text` with zeros up to `digits` characters.
///
/// ```rust
/// assert_eq!(tannin::util::zero_fill("42", 5), "00042");
/// assert_eq!(tannin::util::zero_fill("123456", 3), "123456");
/// ```
pub fn zero_fill(text: &str, digits: usize) -> String {
    let len = text.chars().count();
    if len >= digits {
        return text.to_string();
    }
    let mut out = String::with_capacity(digits);
    for _ in 0..digits - len {
        out.push('0');
    }
    out.push_str(text);
    out
}
