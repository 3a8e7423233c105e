//! Restricted wildcard patterns over event names.
//!
//! A pattern string may contain at most one `*`, and only as its first or
//! last character. Malformed patterns fail at registration time so that
//! dispatch never has to deal with them. There is no case folding and no
//! way to escape a literal `*`.

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;

/// A parsed event-name match rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The candidate must equal the string exactly.
    Exact(String),
    /// The candidate must start with the fragment (`"frag*"`).
    StartsWith(String),
    /// The candidate must end with the fragment (`"*frag"`).
    EndsWith(String),
}

impl Pattern {
    /// Parse a pattern string.
    pub fn parse(s: &str) -> AppResult<Self> {
        let stars = s.bytes().filter(|&b| b == b'*').count();
        if stars == 0 {
            return Ok(Self::Exact(s.to_string()));
        }
        if stars > 1 {
            return Err(AppError::pattern_syntax(
                "Patterns can contain only one '*' at the beginning/end of string",
            ));
        }
        if let Some(fragment) = s.strip_prefix('*') {
            return Ok(Self::EndsWith(fragment.to_string()));
        }
        if let Some(fragment) = s.strip_suffix('*') {
            return Ok(Self::StartsWith(fragment.to_string()));
        }
        Err(AppError::pattern_syntax(
            "In patterns '*' must be at the beginning/end of string",
        ))
    }

    /// Whether the candidate event name satisfies this pattern.
    ///
    /// Byte comparison, length-gated: a candidate shorter than the
    /// fragment never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Exact(s) => candidate == s,
            Self::StartsWith(fragment) => candidate.as_bytes().starts_with(fragment.as_bytes()),
            Self::EndsWith(fragment) => candidate.as_bytes().ends_with(fragment.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use scripthook_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_parse_exact() {
        assert_eq!(Pattern::parse("foo").unwrap(), Pattern::Exact("foo".into()));
    }

    #[test]
    fn test_parse_starts_with() {
        assert_eq!(
            Pattern::parse("foo*").unwrap(),
            Pattern::StartsWith("foo".into())
        );
    }

    #[test]
    fn test_parse_ends_with() {
        assert_eq!(
            Pattern::parse("*foo").unwrap(),
            Pattern::EndsWith("foo".into())
        );
    }

    #[test]
    fn test_parse_rejects_inner_star() {
        let err = Pattern::parse("f*o").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PatternSyntax);
    }

    #[test]
    fn test_parse_rejects_multiple_stars() {
        let err = Pattern::parse("f*o*o").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PatternSyntax);
        // Even when both stars sit at legal positions.
        let err = Pattern::parse("*foo*").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PatternSyntax);
    }

    #[test]
    fn test_exact_matching() {
        let p = Pattern::parse("hit").unwrap();
        assert!(p.matches("hit"));
        assert!(!p.matches("Hit"));
        assert!(!p.matches("hitEnd"));
    }

    #[test]
    fn test_prefix_matching_is_length_gated() {
        let p = Pattern::parse("attack*").unwrap();
        assert!(p.matches("attackStart"));
        assert!(p.matches("attack"));
        assert!(!p.matches("atta"));
        assert!(!p.matches("blockAttack"));
    }

    #[test]
    fn test_suffix_matching_is_length_gated() {
        let p = Pattern::parse("*End").unwrap();
        assert!(p.matches("attackEnd"));
        assert!(p.matches("End"));
        assert!(!p.matches("nd"));
        assert!(!p.matches("Ending"));
    }

    #[test]
    fn test_lone_star_matches_everything() {
        let p = Pattern::parse("*").unwrap();
        assert_eq!(p, Pattern::EndsWith(String::new()));
        assert!(p.matches("anything"));
        assert!(p.matches(""));
    }
}
