use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("compile email regex")
});

/// Upper bound for every free-text field we accept (names,
/// medication, sector, dispensing type). Real entries never come
/// close; anything longer is garbage or abuse.
pub const TEXT_MAX: usize = 120;

/// The identity provider already verified this address; the check here
/// only rejects payloads that are not shaped like an e-mail at all, so
/// the unique key of the `users` table stays meaningful.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.len() <= 254
}

pub fn is_valid_text(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.len() <= TEXT_MAX
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, is_valid_text};

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("gush@gmail.com"));
        assert!(is_valid_email("maria.silva@hospital.org.br"));
        assert!(!is_valid_email("nada_neutho"));
        assert!(!is_valid_email("spaced out@example.com"));
    }

    #[test]
    fn test_is_valid_text() {
        assert!(is_valid_text("Paracetamol"));
        assert!(is_valid_text("  Ala B  "));
        assert!(!is_valid_text(""));
        assert!(!is_valid_text("   "));
        assert!(!is_valid_text(&"x".repeat(200)));
    }
}
