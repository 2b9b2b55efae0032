//! Input validation for client-supplied names and command-line values.

/// Player name validation errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("player name is empty")]
    Empty,
}

/// Seed validation errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    #[error("seed must be an integer, got '{0}'")]
    NotANumber(String),

    #[error("seed must be a positive integer")]
    NotPositive,
}

/// Clean up a requested display name.
///
/// The name is cut to `max_len` characters and every character that is
/// neither printable ASCII nor a blank (space or tab) becomes `_`. Blanks are
/// kept as sent. Only an empty result is rejected.
pub fn sanitize_player_name(raw: &str, max_len: usize) -> Result<String, NameError> {
    let name: String = raw
        .chars()
        .take(max_len)
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' || c == '\t' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    Ok(name)
}

/// Parse the optional RNG seed argument. Zero and negatives are refused.
pub fn parse_seed(raw: &str) -> Result<u64, SeedError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| SeedError::NotANumber(raw.to_string()))?;
    if value <= 0 {
        return Err(SeedError::NotPositive);
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_and_non_ascii_become_underscores() {
        assert_eq!(sanitize_player_name("Al\u{7}ice", 50).unwrap(), "Al_ice");
        assert_eq!(sanitize_player_name("Zoë", 50).unwrap(), "Zo_");
        assert_eq!(sanitize_player_name("a\tb c", 50).unwrap(), "a\tb c");
    }

    #[test]
    fn blanks_are_kept_and_long_names_truncated() {
        assert_eq!(sanitize_player_name("  bob  ", 50).unwrap(), "  bob  ");
        assert_eq!(sanitize_player_name("   ", 50).unwrap(), "   ");
        let long = "x".repeat(80);
        assert_eq!(sanitize_player_name(&long, 50).unwrap().len(), 50);
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(sanitize_player_name("", 50), Err(NameError::Empty));
        assert_eq!(sanitize_player_name("bob", 0), Err(NameError::Empty));
    }

    #[test]
    fn seeds_must_be_positive_integers() {
        assert_eq!(parse_seed("42"), Ok(42));
        assert_eq!(parse_seed("0"), Err(SeedError::NotPositive));
        assert_eq!(parse_seed("-3"), Err(SeedError::NotPositive));
        assert!(matches!(parse_seed("12x"), Err(SeedError::NotANumber(_))));
        assert!(matches!(parse_seed("1.5"), Err(SeedError::NotANumber(_))));
    }
}
