//! Query-string parsing module
//!
//! Parses raw query strings into a parameter map and checks parameter
//! names against the configured allow-list.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Parse a raw query string into a parameter map.
///
/// Standard form semantics: pairs split on `&`, `+` decodes to a space,
/// percent-sequences decode, and a duplicate key keeps its last value.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, decode_component(value));
    }

    params
}

/// Parameter names not present in the allow-list, sorted for stable logs.
pub fn blocked_params(params: &HashMap<String, String>, allowed: &[String]) -> Vec<String> {
    let mut blocked: Vec<String> = params
        .keys()
        .filter(|name| !allowed.iter().any(|a| a == *name))
        .cloned()
        .collect();
    blocked.sort();
    blocked
}

/// Decode one query component: `+` as space, then percent-decoding
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let params = parse_query("lang=de&page=2");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("lang").map(String::as_str), Some("de"));
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_empty_query() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("&&").is_empty());
    }

    #[test]
    fn test_duplicate_key_keeps_last_value() {
        let params = parse_query("lang=de&lang=fr");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("lang").map(String::as_str), Some("fr"));
    }

    #[test]
    fn test_key_without_value() {
        let params = parse_query("flag&lang=de");
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert_eq!(params.get("lang").map(String::as_str), Some("de"));
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let params = parse_query("q=caf%C3%A9+au+lait");
        assert_eq!(params.get("q").map(String::as_str), Some("café au lait"));
    }

    #[test]
    fn test_blocked_params() {
        let allowed = vec!["lang".to_string()];
        let params = parse_query("lang=de&token=x&debug=1");
        let blocked = blocked_params(&params, &allowed);
        assert_eq!(blocked, vec!["debug".to_string(), "token".to_string()]);
    }

    #[test]
    fn test_nothing_blocked_when_all_allowed() {
        let allowed = vec!["lang".to_string(), "page".to_string()];
        let params = parse_query("lang=de&page=2");
        assert!(blocked_params(&params, &allowed).is_empty());
    }
}
