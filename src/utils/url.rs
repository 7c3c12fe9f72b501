//! URL utilities for consistent host and endpoint handling

/// Address used when no host is configured anywhere.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use llm_chat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:11434"), "http://localhost:11434");
/// assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
/// assert_eq!(normalize_base_url("http://localhost:11434///"), "http://localhost:11434");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use llm_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:11434", "api/tags"),
///     "http://localhost:11434/api/tags"
/// );
/// assert_eq!(
///     construct_api_url("http://gpu-box:11434/", "/api/generate"),
///     "http://gpu-box:11434/api/generate"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Turn a user-supplied host into a base URL, adding `http://` when no
/// scheme is given. Returns `None` for blank input.
///
/// # Examples
///
/// ```
/// use llm_chat::utils::url::normalize_host;
///
/// assert_eq!(normalize_host("gpu-box:11434").as_deref(), Some("http://gpu-box:11434"));
/// assert_eq!(normalize_host(" https://llm.example.com/ ").as_deref(), Some("https://llm.example.com"));
/// assert_eq!(normalize_host("   "), None);
/// ```
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    Some(normalize_base_url(&with_scheme))
}

/// Pick the server address: command line first, then the stored
/// `host-address`, then `OLLAMA_HOST`, then [`DEFAULT_HOST`].
pub fn resolve_host(cli: Option<&str>, stored: Option<&str>, env: Option<&str>) -> String {
    [cli, stored, env]
        .into_iter()
        .flatten()
        .find_map(normalize_host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/"),
            "http://localhost:11434"
        );
        // Path prefixes behind a proxy are kept
        assert_eq!(
            normalize_base_url("https://proxy.example.com/ollama//"),
            "https://proxy.example.com/ollama"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("https://proxy.example.com/ollama/", "api/tags"),
            "https://proxy.example.com/ollama/api/tags"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:11434", "//api/generate"),
            "http://127.0.0.1:11434/api/generate"
        );
    }

    #[test]
    fn resolve_host_follows_precedence() {
        assert_eq!(
            resolve_host(Some("cli:1"), Some("http://stored:2"), Some("env:3")),
            "http://cli:1"
        );
        assert_eq!(
            resolve_host(None, Some("http://stored:2/"), Some("env:3")),
            "http://stored:2"
        );
        assert_eq!(resolve_host(None, None, Some("0.0.0.0:11434")), "http://0.0.0.0:11434");
        assert_eq!(resolve_host(None, None, None), DEFAULT_HOST);
    }

    #[test]
    fn resolve_host_skips_blank_values() {
        assert_eq!(resolve_host(Some("  "), Some(""), Some("env:3")), "http://env:3");
    }
}
