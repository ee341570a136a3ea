use std::sync::Arc;
use std::time::Duration;

use api_relay_types::{RelayConfig, RelayError};
use reqwest::redirect;

use super::validation::validate_target;
use crate::error::AppResult;

/// Connect phase bound; the overall call is still capped by `request_timeout_secs`.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared outbound client from relay config.
///
/// The client carries no default headers: every call supplies its own.
pub fn build_http_client(config: &RelayConfig) -> AppResult<reqwest::Client> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    if config.accept_invalid_certs {
        tracing::warn!("Upstream TLS certificate validation is disabled");
    }

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .redirect(redirect_policy(config.max_redirects, config.blocked_hosts().into()))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .tcp_nodelay(true)
        .build()?;

    Ok(client)
}

/// Follow at most `max_redirects` hops, re-validating every hop target.
///
/// A rejected hop aborts the call with the [`RelayError`] as the error source.
/// With `max_redirects == 0` the 3xx response itself is returned.
fn redirect_policy(max_redirects: usize, blocked: Arc<[String]>) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if max_redirects == 0 {
            return attempt.stop();
        }
        // `previous` holds every URL requested so far, the first one included.
        if attempt.previous().len() > max_redirects {
            let err = RelayError::Transport {
                message: format!("Too many redirects (limit {})", max_redirects),
            };
            return attempt.error(err);
        }
        match validate_target(Some(attempt.url().as_str()), &blocked) {
            Ok(_) => attempt.follow(),
            Err(err) => {
                tracing::warn!("Refusing redirect to {}: {}", attempt.url(), err);
                attempt.error(err)
            },
        }
    })
}
