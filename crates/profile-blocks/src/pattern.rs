//! Tolerant matching for directive lines.
//!
//! Another installer may already have written an equivalent line with its
//! own quoting or spacing, so presence is keyed on a pattern rather than
//! exact equality.

use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum LinePattern {
    /// The line contains this text.
    Substring(String),
    /// The line matches this regular expression.
    Regex(Regex),
}

impl LinePattern {
    /// # Errors
    /// Returns [`Error::InvalidDirective`] for an empty pattern, which would
    /// match every line.
    pub fn substring(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::InvalidDirective {
                reason: "match pattern must not be empty".to_string(),
            });
        }
        Ok(Self::Substring(text))
    }

    /// # Errors
    /// Returns [`Error::InvalidPattern`] if the expression does not compile.
    pub fn regex(expr: &str) -> Result<Self> {
        if expr.is_empty() {
            return Err(Error::InvalidDirective {
                reason: "match pattern must not be empty".to_string(),
            });
        }
        Regex::new(expr)
            .map(Self::Regex)
            .map_err(|source| Error::InvalidPattern {
                pattern: expr.to_string(),
                source,
            })
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Substring(text) => line.contains(text.as_str()),
            Self::Regex(re) => re.is_match(line),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Substring(text) => text,
            Self::Regex(re) => re.as_str(),
        }
    }

    /// 1-based number of the first matching line.
    pub fn find_in(&self, content: &str) -> Option<usize> {
        content
            .lines()
            .position(|line| self.matches(line))
            .map(|idx| idx + 1)
    }
}

impl PartialEq for LinePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Substring(a), Self::Substring(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_tolerates_formatting() {
        let pattern = LinePattern::substring("zoxide init").unwrap();
        assert!(pattern.matches(r#"eval "$(zoxide init bash)""#));
        assert!(pattern.matches("  eval \"$(zoxide init --cmd cd bash)\""));
        assert!(!pattern.matches("# zoxide"));
    }

    #[test]
    fn regex_pattern() {
        let pattern = LinePattern::regex(r"starship\s+init\s+bash").unwrap();
        assert!(pattern.matches(r#"eval "$(starship  init bash)""#));
        assert!(!pattern.matches(r#"eval "$(starship init zsh)""#));
    }

    #[test]
    fn empty_patterns_rejected() {
        assert!(LinePattern::substring("").is_err());
        assert!(LinePattern::regex("").is_err());
    }

    #[test]
    fn bad_regex_rejected() {
        let err = LinePattern::regex("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn find_in_reports_line_number() {
        let pattern = LinePattern::substring("fzf").unwrap();
        assert_eq!(pattern.find_in("a\nb\nsource ~/.fzf.bash\n"), Some(3));
        assert_eq!(pattern.find_in("a\nb\n"), None);
    }
}
