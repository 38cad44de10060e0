//! Contact number normalization.

/// Normalize a subscriber contact number.
///
/// Two repairs are applied before the number is stored or dialed:
/// - a leading space (a `+` that was URL-decoded away) restores the `+`
///   prefix after trimming
/// - a leading `00` international prefix is rewritten to `+`
///
/// Anything else passes through unchanged.
pub fn normalize_phone_number(raw: &str) -> String {
    if raw.starts_with(' ') {
        format!("+{}", raw.trim())
    } else if let Some(rest) = raw.strip_prefix("00") {
        format!("+{}", rest)
    } else {
        raw.to_string()
    }
}
