use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const LEN: usize = 32;

/// Random key used for sessions, upload tickets and storage ids.
pub(crate) fn generate_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LEN)
        .map(char::from)
        .collect()
}

/// Anything that could not have come out of [`generate_key`] is rejected
/// before it gets near a path or a map lookup.
pub(crate) fn is_valid_key(key: &str) -> bool {
    key.len() == LEN && key.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_valid_and_distinct() {
        let a = generate_key();
        let b = generate_key();

        assert!(is_valid_key(&a));
        assert!(is_valid_key(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn path_like_keys_are_invalid() {
        assert!(!is_valid_key("../../etc/passwd"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key(&format!("{}/", "a".repeat(31))));
    }
}
