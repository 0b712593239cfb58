//! Request Canonicalizer
//!
//! Converts structured request fields into one canonical text string enriched
//! with derived signals. The embedding is order-sensitive over text, so the
//! tagged tokens are emitted in a fixed order and map iteration is sorted by
//! key — the same request always canonicalizes to the same string.

pub mod patterns;
pub mod signals;

use std::collections::HashMap;

/// Maximum characters of payload carried into the canonical text
const PAYLOAD_LIMIT: usize = 500;

/// Structured request fields consumed by the canonicalizer
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: String,
    pub path: String,
    pub body: String,
    pub user_agent: String,
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl RequestParts {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Convert request fields into the canonical classification text.
///
/// Pure and deterministic; this string is the sole input to the tokenizer.
pub fn request_to_text(
    method: &str,
    path: &str,
    body: &str,
    user_agent: &str,
    params: &HashMap<String, String>,
    headers: &HashMap<String, String>,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(16);

    // 1. Method, path, path depth
    parts.push(format!("METHOD:{}", method.to_uppercase()));
    parts.push(format!("PATH:{}", path));
    parts.push(format!("DEPTH:{}", path.matches('/').count()));

    // 2. Parameter count
    if !params.is_empty() {
        parts.push(format!("PARAMS:{}", params.len()));
    }

    // 3. User-agent type
    if let Some(ua_type) = signals::user_agent_type(user_agent) {
        parts.push(format!("UA_TYPE:{}", ua_type));
    }

    // 4. Body size bucket
    if !body.is_empty() {
        parts.push(format!("BODY_SIZE:{}", signals::body_size_bucket(body.len())));
    }

    // Sorted iteration keeps the output independent of hash-map order
    let mut param_keys: Vec<&String> = params.keys().collect();
    param_keys.sort();
    let mut header_keys: Vec<&String> = headers.keys().collect();
    header_keys.sort();

    // 5. Header count and content flags
    if !headers.is_empty() {
        parts.push(format!("HEADERS:{}", headers.len()));

        let mut has_referer = false;
        let mut has_xml = false;
        let mut has_json = false;
        for key in &header_keys {
            let name = key.to_lowercase();
            let value = headers[*key].to_lowercase();
            if name == "referer" {
                has_referer = true;
            }
            if value.contains("xml") {
                has_xml = true;
            }
            if value.contains("json") {
                has_json = true;
            }
        }
        if has_referer {
            parts.push("HAS_REFERER".to_string());
        }
        if has_xml {
            parts.push("HAS_XML_CONTENT".to_string());
        }
        if has_json {
            parts.push("HAS_JSON_CONTENT".to_string());
        }
    }

    // 6. Combined text for signal extraction
    let mut combined = String::with_capacity(path.len() + body.len() + 64);
    combined.push_str(path);
    combined.push_str(body);
    for key in &param_keys {
        combined.push_str(&params[*key]);
    }
    for key in &header_keys {
        combined.push_str(&headers[*key]);
    }
    let decoded_combined = signals::percent_decode(&combined).unwrap_or_else(|| combined.clone());

    // 7. Entropy bucket over the raw combined text
    let entropy = signals::shannon_entropy(&combined);
    parts.push(format!("ENTROPY:{}", signals::entropy_bucket(entropy)));

    // 8. Encoding depth, only when something was actually encoded
    let depth = signals::encoding_depth(&combined);
    if depth > 0 {
        parts.push(format!("ENCODING:{}", depth));
    }

    // 9. Special-character density over the decoded text
    parts.push(format!(
        "SPECIAL_DENSITY:{}",
        signals::special_density_bucket(&decoded_combined)
    ));

    // 10. Attack signature flags, fixed order, independent of each other
    for signature in patterns::COMBINED_SIGNATURES {
        if signature.pattern.is_match(&decoded_combined) {
            parts.push(format!("FLAG:{}", signature.name));
        }
    }
    if patterns::scanner_path().is_match(path) {
        parts.push("FLAG:SCANNER_PATH".to_string());
    }

    // 11. Truncated payload
    let mut payload = String::with_capacity(body.len() + 64);
    payload.push_str(body);
    for key in &param_keys {
        if !payload.is_empty() {
            payload.push('&');
        }
        payload.push_str(key);
        payload.push('=');
        payload.push_str(&params[*key]);
    }
    for key in &header_keys {
        if key.to_lowercase() == "referer" {
            payload.push_str(&format!(" REFERER:{}", headers[*key]));
        }
    }
    let payload = payload.trim();
    if !payload.is_empty() {
        let truncated: String = payload.chars().take(PAYLOAD_LIMIT).collect();
        parts.push(format!("PAYLOAD:{}", truncated));
    }

    parts.join(" ")
}

/// Convenience wrapper over [`request_to_text`] for a [`RequestParts`]
pub fn parts_to_text(parts: &RequestParts) -> String {
    request_to_text(
        &parts.method,
        &parts.path,
        &parts.body,
        &parts.user_agent,
        &parts.params,
        &parts.headers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_maps() -> (HashMap<String, String>, HashMap<String, String>) {
        (HashMap::new(), HashMap::new())
    }

    #[test]
    fn test_sqli_login_request() {
        let (params, headers) = empty_maps();
        let text = request_to_text(
            "POST",
            "/login",
            "username=admin'--&password=x",
            "python-requests/2.28",
            &params,
            &headers,
        );

        assert!(text.contains("METHOD:POST"));
        assert!(text.contains("PATH:/login"));
        assert!(text.contains("DEPTH:1"));
        assert!(text.contains("UA_TYPE:bot"));
        assert!(text.contains("FLAG:SQL_KEYWORDS"));
        assert!(text.contains("BODY_SIZE:tiny"));
        assert!(text.contains("PAYLOAD:username=admin'--&password=x"));
    }

    #[test]
    fn test_xss_body_flag() {
        let (params, headers) = empty_maps();
        let text = request_to_text(
            "POST",
            "/comment",
            "<script>alert(1)</script>",
            "",
            &params,
            &headers,
        );
        assert!(text.contains("FLAG:XSS_PATTERN"));
    }

    #[test]
    fn test_empty_user_agent_emits_nothing() {
        let (params, headers) = empty_maps();
        let text = request_to_text("GET", "/", "", "", &params, &headers);
        assert!(!text.contains("UA_TYPE:"));
    }

    #[test]
    fn test_empty_body_omits_size_and_payload() {
        let (params, headers) = empty_maps();
        let text = request_to_text("GET", "/", "", "", &params, &headers);
        assert!(!text.contains("BODY_SIZE:"));
        assert!(!text.contains("PAYLOAD:"));
    }

    #[test]
    fn test_params_and_headers_counts() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), "search".to_string());
        params.insert("page".to_string(), "2".to_string());
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let text = request_to_text("GET", "/api/items", "", "", &params, &headers);
        assert!(text.contains("PARAMS:2"));
        assert!(text.contains("HEADERS:1"));
        assert!(text.contains("HAS_JSON_CONTENT"));
        assert!(!text.contains("HAS_XML_CONTENT"));
    }

    #[test]
    fn test_referer_flag_and_payload() {
        let params = HashMap::new();
        let mut headers = HashMap::new();
        headers.insert("Referer".to_string(), "https://example.com/a".to_string());

        let text = request_to_text("GET", "/page", "", "", &params, &headers);
        assert!(text.contains("HAS_REFERER"));
        assert!(text.contains("PAYLOAD:"));
        assert!(text.contains("REFERER:https://example.com/a"));
    }

    #[test]
    fn test_encoding_depth_token() {
        let (params, headers) = empty_maps();
        // Double-encoded "<script>"
        let text = request_to_text(
            "GET",
            "/search",
            "q=%253Cscript%253E",
            "",
            &params,
            &headers,
        );
        assert!(text.contains("ENCODING:2"));
    }

    #[test]
    fn test_no_encoding_token_for_plain_text() {
        let (params, headers) = empty_maps();
        let text = request_to_text("GET", "/plain", "hello there", "", &params, &headers);
        assert!(!text.contains("ENCODING:"));
    }

    #[test]
    fn test_scanner_path_flag_uses_raw_path() {
        let (params, headers) = empty_maps();
        let text = request_to_text("GET", "/.env", "", "", &params, &headers);
        assert!(text.contains("FLAG:SCANNER_PATH"));
    }

    #[test]
    fn test_deterministic_across_map_order() {
        let mut params_a = HashMap::new();
        let mut params_b = HashMap::new();
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")] {
            params_a.insert(k.to_string(), v.to_string());
        }
        for (k, v) in [("d", "4"), ("c", "3"), ("b", "2"), ("a", "1")] {
            params_b.insert(k.to_string(), v.to_string());
        }
        let headers = HashMap::new();

        let a = request_to_text("GET", "/x", "", "", &params_a, &headers);
        let b = request_to_text("GET", "/x", "", "", &params_b, &headers);
        assert_eq!(a, b);
    }

    #[test]
    fn test_payload_truncated_to_500_chars() {
        let (params, headers) = empty_maps();
        let body = "x".repeat(900);
        let text = request_to_text("POST", "/upload", &body, "", &params, &headers);

        let payload = text.split("PAYLOAD:").nth(1).unwrap();
        assert_eq!(payload.chars().count(), 500);
    }

    #[test]
    fn test_malformed_encoding_falls_back() {
        let (params, headers) = empty_maps();
        // "%zz" cannot decode; canonicalization must still succeed
        let text = request_to_text("GET", "/x", "q=%zz", "", &params, &headers);
        assert!(text.contains("METHOD:GET"));
        assert!(!text.contains("ENCODING:"));
    }

    #[test]
    fn test_fixed_token_order() {
        let (params, headers) = empty_maps();
        let text = request_to_text(
            "POST",
            "/login",
            "username=admin'--",
            "curl/8.0",
            &params,
            &headers,
        );

        let method_pos = text.find("METHOD:").unwrap();
        let path_pos = text.find("PATH:").unwrap();
        let ua_pos = text.find("UA_TYPE:").unwrap();
        let entropy_pos = text.find("ENTROPY:").unwrap();
        let flag_pos = text.find("FLAG:").unwrap();
        let payload_pos = text.find("PAYLOAD:").unwrap();

        assert!(method_pos < path_pos);
        assert!(path_pos < ua_pos);
        assert!(ua_pos < entropy_pos);
        assert!(entropy_pos < flag_pos);
        assert!(flag_pos < payload_pos);
    }
}
