//! Small text helpers shared by the config and remote layers.

/// Longest excerpt of a remote error body kept in messages.
pub const ERROR_EXCERPT_CHARS: usize = 180;

/// The trimmed value, or `None` when nothing but whitespace is left.
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Whether `value` names an `http` or `https` endpoint.
pub fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}

/// Trimmed head of an error body, capped at [`ERROR_EXCERPT_CHARS`].
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}
