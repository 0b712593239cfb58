//! Derived Request Signals
//!
//! Numeric signals folded into the canonical text as bucketed tokens:
//! Shannon entropy, percent-encoding depth, special-character density,
//! user-agent typing and body-size buckets. Buckets keep the embedding
//! vocabulary small while preserving the signal.

/// Characters counted toward special-character density
const SPECIAL_CHARS: &[char] = &[
    '<', '>', '\'', '"', ';', '(', ')', '&', '|', '{', '}', '[', ']', '$', '%', '\\', '#', '@',
    '!', '*', '+', '=', ':', '?', '~', '^', '`',
];

/// Scanner tool fingerprints, checked before generic bot tokens
const SCANNER_AGENTS: &[&str] = &[
    "sqlmap", "nikto", "nmap", "masscan", "nuclei", "acunetix", "nessus", "openvas", "burp",
    "zgrab", "dirbuster", "gobuster", "wfuzz", "hydra", "metasploit",
];

/// Generic bot/client tokens
const BOT_AGENTS: &[&str] = &[
    "bot", "crawler", "spider", "curl", "wget", "python-requests", "python", "go-http-client",
    "java", "okhttp", "httpclient", "scrapy", "aiohttp", "libwww",
];

/// Browser tokens, checked last so "mozilla"-spoofing bots lose to the
/// earlier sets
const BROWSER_AGENTS: &[&str] = &["mozilla", "chrome", "safari", "firefox", "edge", "opera"];

/// Shannon entropy (base 2) over character frequency
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut counts = rustc_hash::FxHashMap::default();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0usize) += 1;
        total += 1;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for &count in counts.values() {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy
}

/// Bucket an entropy value at thresholds 2.5 / 4.0 / 5.5
pub fn entropy_bucket(entropy: f64) -> &'static str {
    if entropy < 2.5 {
        "low"
    } else if entropy < 4.0 {
        "normal"
    } else if entropy < 5.5 {
        "high"
    } else {
        "very_high"
    }
}

/// Fraction of special characters, bucketed at 0.05 / 0.15 / 0.3
pub fn special_density_bucket(text: &str) -> &'static str {
    if text.is_empty() {
        return "low";
    }

    let total = text.chars().count();
    let special = text.chars().filter(|c| SPECIAL_CHARS.contains(c)).count();
    let density = special as f64 / total as f64;

    if density < 0.05 {
        "low"
    } else if density < 0.15 {
        "normal"
    } else if density < 0.3 {
        "high"
    } else {
        "very_high"
    }
}

/// Percent-decode a string, treating `+` literally.
///
/// Returns None when the input contains a malformed escape so the caller can
/// fall back to the undecoded original.
pub fn percent_decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let high = (hex[0] as char).to_digit(16)?;
            let low = (hex[1] as char).to_digit(16)?;
            out.push((high * 16 + low) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

/// Count how many successive percent-decodes change the string, capped at 3.
///
/// Detects double and triple encoding; a plain string reports 0.
pub fn encoding_depth(text: &str) -> usize {
    let mut current = text.to_string();
    let mut depth = 0;

    for _ in 0..3 {
        match percent_decode(&current) {
            Some(decoded) if decoded != current => {
                current = decoded;
                depth += 1;
            }
            _ => break,
        }
    }

    depth
}

/// Classify a user-agent string by ordered substring membership.
///
/// Scanner tool names win over generic bot tokens, which win over browser
/// tokens. Returns None for an absent or empty user-agent.
pub fn user_agent_type(user_agent: &str) -> Option<&'static str> {
    if user_agent.is_empty() {
        return None;
    }

    let lowered = user_agent.to_lowercase();

    if SCANNER_AGENTS.iter().any(|s| lowered.contains(s)) {
        return Some("scanner");
    }
    if BOT_AGENTS.iter().any(|s| lowered.contains(s)) {
        return Some("bot");
    }
    if BROWSER_AGENTS.iter().any(|s| lowered.contains(s)) {
        return Some("browser");
    }

    Some("unknown")
}

/// Bucket a body byte length: [0,100) tiny, [100,500) small, [500,2000)
/// medium, else large
pub fn body_size_bucket(len: usize) -> &'static str {
    if len < 100 {
        "tiny"
    } else if len < 500 {
        "small"
    } else if len < 2000 {
        "medium"
    } else {
        "large"
    }
}
