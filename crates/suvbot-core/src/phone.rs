//! Phone number normalization.
//!
//! Telegram contact cards arrive with inconsistent formatting ("+998 90 123-45-67",
//! "998901234567", "901234567"). We strip everything except digits and a
//! leading plus, then canonicalize the Uzbek national pattern to `+998XXXXXXXXX`.
//! Anything that does not match a known pattern passes through unchanged.

/// Normalize a raw phone string. Idempotent: feeding the output back in
/// returns it unchanged.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for (i, ch) in raw.chars().enumerate() {
        if ch.is_ascii_digit() || (ch == '+' && i == 0 && cleaned.is_empty()) {
            cleaned.push(ch);
        }
    }

    let digits_only = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let all_digits = !digits_only.is_empty() && digits_only.bytes().all(|b| b.is_ascii_digit());

    if !all_digits {
        return cleaned;
    }

    // Known national patterns: 998 + 9 digits, or a bare 9-digit subscriber number.
    if !cleaned.starts_with('+') && digits_only.len() == 12 && digits_only.starts_with("998") {
        return format!("+{digits_only}");
    }
    if !cleaned.starts_with('+') && digits_only.len() == 9 {
        return format!("+998{digits_only}");
    }
    if cleaned.starts_with('+') && digits_only.len() == 12 && digits_only.starts_with("998") {
        return cleaned;
    }

    cleaned
}
