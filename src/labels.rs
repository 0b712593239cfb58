//! Attack Labels and Severities
//!
//! The closed set of categories the classifier can emit, including the
//! `clean` sentinel for benign traffic. Labels in the corpus metadata are
//! parsed against this enumeration; an unknown string is a corrupt corpus,
//! never a silently invented category.

use serde::{Deserialize, Serialize};

/// Attack category assigned to a pattern or a classification verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackLabel {
    /// Benign traffic sentinel
    Clean,
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
    Ssrf,
    Xxe,
    NosqlInjection,
    TemplateInjection,
    Log4shell,
    OpenRedirect,
    LdapInjection,
    Scanner,
}

impl AttackLabel {
    /// Canonical string form, matching the corpus metadata encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackLabel::Clean => "clean",
            AttackLabel::SqlInjection => "sql_injection",
            AttackLabel::Xss => "xss",
            AttackLabel::PathTraversal => "path_traversal",
            AttackLabel::CommandInjection => "command_injection",
            AttackLabel::Ssrf => "ssrf",
            AttackLabel::Xxe => "xxe",
            AttackLabel::NosqlInjection => "nosql_injection",
            AttackLabel::TemplateInjection => "template_injection",
            AttackLabel::Log4shell => "log4shell",
            AttackLabel::OpenRedirect => "open_redirect",
            AttackLabel::LdapInjection => "ldap_injection",
            AttackLabel::Scanner => "scanner",
        }
    }

    /// True for every label except the `clean` sentinel
    pub fn is_attack(&self) -> bool {
        !matches!(self, AttackLabel::Clean)
    }
}

impl std::fmt::Display for AttackLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttackLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clean" => Ok(AttackLabel::Clean),
            "sql_injection" => Ok(AttackLabel::SqlInjection),
            "xss" => Ok(AttackLabel::Xss),
            "path_traversal" => Ok(AttackLabel::PathTraversal),
            "command_injection" => Ok(AttackLabel::CommandInjection),
            "ssrf" => Ok(AttackLabel::Ssrf),
            "xxe" => Ok(AttackLabel::Xxe),
            "nosql_injection" => Ok(AttackLabel::NosqlInjection),
            "template_injection" => Ok(AttackLabel::TemplateInjection),
            "log4shell" => Ok(AttackLabel::Log4shell),
            "open_redirect" => Ok(AttackLabel::OpenRedirect),
            "ldap_injection" => Ok(AttackLabel::LdapInjection),
            "scanner" => Ok(AttackLabel::Scanner),
            other => Err(format!("unknown attack label: {}", other)),
        }
    }
}

/// Pattern severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Provenance of a stored pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSource {
    /// Loaded from the bundled corpus blob
    Bundled,
    /// Inserted at runtime (externally-indexed variant)
    Custom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_label_round_trip() {
        for label in [
            AttackLabel::Clean,
            AttackLabel::SqlInjection,
            AttackLabel::Xss,
            AttackLabel::Log4shell,
            AttackLabel::Scanner,
        ] {
            assert_eq!(AttackLabel::from_str(label.as_str()).unwrap(), label);
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!(AttackLabel::from_str("buffer_overflow").is_err());
    }

    #[test]
    fn test_clean_is_not_attack() {
        assert!(!AttackLabel::Clean.is_attack());
        assert!(AttackLabel::SqlInjection.is_attack());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
