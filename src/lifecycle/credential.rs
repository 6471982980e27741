//! Upstream credential handling and connection URL construction.

use url::Url;

use crate::types::{Error, Result};

const TOKEN_PARAM: &str = "token";

/// Effective credential for `raw`.
///
/// Operators often paste the whole endpoint URL the platform hands out
/// (`wss://…/mcp/?token=…`) instead of the bare token. In that case the
/// `token` query parameter is extracted; anything else is used verbatim.
pub fn normalize_credential(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.contains("://") {
        return raw.to_string();
    }

    Url::parse(raw)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == TOKEN_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| raw.to_string())
}

/// Endpoint URL with the credential appended as `token=`.
pub fn connection_url(endpoint: &str, credential: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| {
        Error::configuration(format!("upstream endpoint {:?} is invalid: {}", endpoint, e))
    })?;
    url.query_pairs_mut().append_pair(TOKEN_PARAM, credential);
    Ok(url)
}

/// `url` with the token value masked, for logs.
pub fn redacted(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == TOKEN_PARAM { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut masked = url.clone();
    masked.set_query(None);
    if !pairs.is_empty() {
        masked
            .query_pairs_mut()
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    masked.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_token_is_verbatim() {
        assert_eq!(normalize_credential("eyJhbGciOi.abc.def"), "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_token_extracted_from_full_url() {
        let raw = "wss://api.xiaozhi.me/mcp/?token=eyJhbGciOi.abc.def";
        assert_eq!(normalize_credential(raw), "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_url_without_token_is_verbatim() {
        let raw = "wss://api.xiaozhi.me/mcp/?agent=7";
        assert_eq!(normalize_credential(raw), raw);
    }

    #[test]
    fn test_connection_url_appends_token() {
        let url = connection_url("wss://api.xiaozhi.me/mcp/", "abc123").unwrap();
        assert_eq!(url.as_str(), "wss://api.xiaozhi.me/mcp/?token=abc123");
    }

    #[test]
    fn test_connection_url_invalid_endpoint() {
        assert!(matches!(
            connection_url("not a url", "abc"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_redacted_masks_token_only() {
        let url = Url::parse("wss://api.xiaozhi.me/mcp/?agent=7&token=secret").unwrap();
        let shown = redacted(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("agent=7"));
        assert!(shown.contains("token=***") || shown.contains("token=%2A%2A%2A"));
    }
}
