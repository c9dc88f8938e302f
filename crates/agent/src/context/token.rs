//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token. Good enough to
//! report how much of a model's context window a prompt will take; the
//! prompt budget itself is enforced in characters.

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    estimate_tokens_for_chars(text.chars().count())
}

/// Same heuristic when the character count is already known.
pub fn estimate_tokens_for_chars(chars: usize) -> usize {
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn four_chars_is_one_token() {
        assert_eq!(estimate_tokens("test"), 1);
    }

    #[test]
    fn five_chars_rounds_up() {
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[test]
    fn hundred_chars() {
        let text = "a".repeat(100);
        assert_eq!(estimate_tokens(&text), 25);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 4 chars, 8 bytes
        assert_eq!(estimate_tokens("ñãõé"), 1);
    }
}
