//! Compact integer storage for the fixed SQL keywords kept in payloads
//!
//! The position of each keyword is stable: persisted values depend on it.

const SCHEMA_TOKENS: [&str; 16] = [
    "",
    "CASCADE",
    "SET NULL",
    "SET DEFAULT",
    "RESTRICT",
    "NO ACTION",
    "BTREE",
    "FULLTEXT",
    "HASH",
    "RTREE",
    "SPATIAL",
    "INSERT",
    "UPDATE",
    "DELETE",
    "BEFORE",
    "AFTER",
];

/// Map a keyword to its token value, 0 when unknown
pub fn internalize_token(token: &str) -> u8 {
    if token.is_empty() {
        return 0;
    }
    SCHEMA_TOKENS
        .iter()
        .position(|known| *known == token)
        .map(|index| index as u8)
        .unwrap_or(0)
}

/// Map a token value back to its keyword, "" when out of range
pub fn externalize_token(value: u8) -> &'static str {
    SCHEMA_TOKENS.get(value as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for (index, token) in SCHEMA_TOKENS.iter().enumerate().skip(1) {
            assert_eq!(internalize_token(token), index as u8);
            assert_eq!(externalize_token(internalize_token(token)), *token);
        }
    }

    #[test]
    fn test_token_values() {
        assert_eq!(internalize_token("CASCADE"), 1);
        assert_eq!(internalize_token("NO ACTION"), 5);
        assert_eq!(internalize_token("BTREE"), 6);
        assert_eq!(internalize_token("AFTER"), 15);
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(internalize_token(""), 0);
        assert_eq!(internalize_token("cascade"), 0);
        assert_eq!(internalize_token("WHATEVER"), 0);
        assert_eq!(externalize_token(0), "");
        assert_eq!(externalize_token(16), "");
        assert_eq!(externalize_token(u8::MAX), "");
    }
}
