/// Minimum query length (in characters) for full-text strategies
pub const FULL_TEXT_MIN_CHARS: usize = 3;

/// Build an FTS5 expression from free text.
///
/// Splits on anything that is not alphanumeric, quotes each token, and joins
/// them with implicit AND. Returns `None` when no token survives.
pub fn full_text_expression(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{token}\""))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}
