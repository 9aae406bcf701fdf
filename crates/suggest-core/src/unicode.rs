//! Code-point helpers shared by the resolver and the policies.

/// Lowercase a single code point.
///
/// Characters whose lowercase form expands to several code points (e.g. `İ`)
/// are returned unchanged, since trie edges compare one code point at a time.
pub fn to_lower(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-insensitive code-point equality.
pub fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || to_lower(a) == to_lower(b)
}

pub fn to_code_points(word: &str) -> Vec<char> {
    word.chars().collect()
}
