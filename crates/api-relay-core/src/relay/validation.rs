//! Target URL checks run before any outbound traffic.

use api_relay_types::RelayError;
use url::Url;

/// Validate a caller-supplied target and return the parsed URL.
///
/// Checks run in order: presence, absolute URL, http(s) scheme, blocked host.
/// `blocked` entries must already be lowercase.
pub fn validate_target(raw: Option<&str>, blocked: &[String]) -> Result<Url, RelayError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(RelayError::MissingParameter)?;

    let url = Url::parse(raw)
        .map_err(|e| RelayError::InvalidUrl { url: raw.to_string(), reason: e.to_string() })?;

    match url.scheme() {
        "http" | "https" => {},
        other => return Err(RelayError::UnsupportedProtocol { scheme: other.to_string() }),
    }

    let host = url.host_str().map(normalize_host).ok_or_else(|| RelayError::InvalidUrl {
        url: raw.to_string(),
        reason: "missing host".to_string(),
    })?;

    if blocked.iter().any(|b| *b == host) {
        return Err(RelayError::BlockedHost { host });
    }

    Ok(url)
}

/// Lowercase, strip IPv6 brackets and a trailing root dot.
fn normalize_host(host: &str) -> String {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_relay_types::DeploymentMode;

    fn blocked(mode: DeploymentMode) -> Vec<String> {
        mode.blocked_hosts().iter().map(|h| (*h).to_string()).collect()
    }

    #[test]
    fn test_missing_and_blank() {
        let hosts = blocked(DeploymentMode::Production);
        assert_eq!(validate_target(None, &hosts), Err(RelayError::MissingParameter));
        assert_eq!(validate_target(Some("   "), &hosts), Err(RelayError::MissingParameter));
    }

    #[test]
    fn test_relative_url_is_invalid() {
        let hosts = blocked(DeploymentMode::Production);
        assert!(matches!(
            validate_target(Some("not-a-url"), &hosts),
            Err(RelayError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let hosts = blocked(DeploymentMode::Production);
        assert_eq!(
            validate_target(Some("ftp://files.example.com/a.txt"), &hosts),
            Err(RelayError::UnsupportedProtocol { scheme: "ftp".to_string() })
        );
        assert!(matches!(
            validate_target(Some("file:///etc/passwd"), &hosts),
            Err(RelayError::UnsupportedProtocol { .. })
        ));
    }

    #[test]
    fn test_loopback_blocked_in_both_modes() {
        for mode in [DeploymentMode::Development, DeploymentMode::Production] {
            assert_eq!(
                validate_target(Some("http://127.0.0.1/secret"), &blocked(mode)),
                Err(RelayError::BlockedHost { host: "127.0.0.1".to_string() })
            );
        }
    }

    #[test]
    fn test_localhost_only_blocked_in_development() {
        let target = Some("http://LOCALHOST.:8080/admin");
        assert!(matches!(
            validate_target(target, &blocked(DeploymentMode::Development)),
            Err(RelayError::BlockedHost { .. })
        ));
        assert!(validate_target(target, &blocked(DeploymentMode::Production)).is_ok());
    }

    #[test]
    fn test_internal_host_only_blocked_in_production() {
        let target = Some("https://10.106.246.81/internal");
        assert!(matches!(
            validate_target(target, &blocked(DeploymentMode::Production)),
            Err(RelayError::BlockedHost { .. })
        ));
        assert!(validate_target(target, &blocked(DeploymentMode::Development)).is_ok());
    }

    #[test]
    fn test_ipv6_compared_without_brackets() {
        let hosts = vec!["::1".to_string()];
        assert_eq!(
            validate_target(Some("http://[::1]:9000/"), &hosts),
            Err(RelayError::BlockedHost { host: "::1".to_string() })
        );
    }

    #[test]
    fn test_valid_target_passes() {
        let url = validate_target(
            Some(" https://api.example.com/users/2?x=1 "),
            &blocked(DeploymentMode::Production),
        );
        assert_eq!(
            url.map(|u| u.to_string()),
            Ok("https://api.example.com/users/2?x=1".to_string())
        );
    }
}
