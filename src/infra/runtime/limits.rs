use std::time::Duration;

/// Hard per-call deadline for upstream fetches. On expiry the call resolves
/// to an absent payload, not a fault.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a reqwest client with the given total-request timeout.
pub fn make_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}
