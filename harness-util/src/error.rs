use std::fmt;

use serde_json::Value;

/// Convenience alias for fallible harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, Clone)]
enum ErrorKind {
    BadRequest { details: Option<Value> },
    RateLimited { limit_name: String },
    Internal,
}

/// The harness's error taxonomy: a wrapper around `anyhow::Error` tagged
/// with which HTTP status and body shape it maps to. `ActionFailure` is
/// deliberately not a variant here — it is a successful-pipeline outcome
/// carried inside a 200 `ActionResult`, not an error type.
#[derive(Debug)]
pub struct HarnessError {
    kind: ErrorKind,
    error: anyhow::Error,
}

impl HarnessError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::BadRequest { details: None },
            error: anyhow::anyhow!(message),
        }
    }

    pub fn bad_request_with_details(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::BadRequest {
                details: Some(details),
            },
            error: anyhow::anyhow!(message),
        }
    }

    pub fn rate_limited(limit_name: impl Into<String>) -> Self {
        let limit_name = limit_name.into();
        Self {
            error: anyhow::anyhow!("rate limit exceeded: {limit_name}"),
            kind: ErrorKind::RateLimited { limit_name },
        }
    }

    pub fn internal(error: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Internal,
            error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::BadRequest { .. } => 400,
            ErrorKind::RateLimited { .. } => 429,
            ErrorKind::Internal => 500,
        }
    }

    /// The JSON body returned to the caller. The `Internal` body is
    /// deliberately redacted to a stable code: the full error is logged via
    /// `tracing`, never echoed verbatim to the client.
    pub fn body(&self) -> Value {
        match &self.kind {
            ErrorKind::BadRequest { details } => {
                let mut body = serde_json::json!({
                    "code": "bad_request",
                    "message": self.error.to_string(),
                });
                if let Some(details) = details {
                    body["details"] = details.clone();
                }
                body
            }
            ErrorKind::RateLimited { limit_name } => serde_json::json!({
                "code": "rate_limited",
                "message": format!("rate limit exceeded: {limit_name}"),
            }),
            ErrorKind::Internal => serde_json::json!({
                "code": "internal_error",
                "message": "an internal error occurred",
            }),
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for HarnessError {}

impl From<anyhow::Error> for HarnessError {
    fn from(error: anyhow::Error) -> Self {
        HarnessError::internal(error)
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(error: std::io::Error) -> Self {
        HarnessError::internal(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let err = HarnessError::bad_request("missing field: name");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.body()["code"], "bad_request");
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let err = HarnessError::rate_limited("per-ip");
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.body()["code"], "rate_limited");
    }

    #[test]
    fn internal_redacts_message_in_body() {
        let err = HarnessError::internal(anyhow::anyhow!("stray secret key material"));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.body()["message"], "an internal error occurred");
        assert!(err.to_string().contains("stray secret key material"));
    }
}
