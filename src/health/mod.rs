//! Liveness probe.
//!
//! Answers 200 with an empty body on any method. It never touches the
//! admission path, so it stays green while the policy is busy.

use axum::http::StatusCode;

/// Path the cluster probes for liveness.
pub const HEALTHZ_PATH: &str = "/healthz";

/// `ANY /healthz`
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }
}
