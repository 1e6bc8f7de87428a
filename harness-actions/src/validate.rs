use std::sync::OnceLock;

use harness_util::{HarnessError, HarnessResult};
use regex::Regex;
use serde_json::Value;

pub const NAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";
pub const ENTRYPOINT_PATTERN: &str = r"^[A-Za-z0-9_]{1,31}$";

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_PATTERN).unwrap())
}

fn entrypoint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTRYPOINT_PATTERN).unwrap())
}

pub fn validate_name(field: &str, value: &str) -> HarnessResult<()> {
    if name_re().is_match(value) {
        Ok(())
    } else {
        Err(HarnessError::bad_request(format!(
            "{field} must match {NAME_PATTERN}, got {value:?}"
        )))
    }
}

pub fn validate_entrypoint(value: &str) -> HarnessResult<()> {
    if entrypoint_re().is_match(value) {
        Ok(())
    } else {
        Err(HarnessError::bad_request(format!(
            "entrypoint must match {ENTRYPOINT_PATTERN}, got {value:?}"
        )))
    }
}

/// Fails with a single `BadRequest` naming every required field absent
/// from `payload`, rather than stopping at the first missing field.
pub fn require_fields(kind: &str, payload: &Value, fields: &[&str]) -> HarnessResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| payload.get(field).map_or(true, Value::is_null))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::bad_request_with_details(
            format!(
                "action of kind ({kind}) misses the following fields [{}]",
                missing.join(", ")
            ),
            serde_json::json!({ "missing": missing }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_underscore_names() {
        assert!(validate_name("name", "bootstrap_1").is_ok());
        assert!(validate_name("name", "has space").is_err());
    }

    #[test]
    fn entrypoint_length_is_bounded() {
        assert!(validate_entrypoint(&"a".repeat(31)).is_ok());
        assert!(validate_entrypoint(&"a".repeat(32)).is_err());
    }

    #[test]
    fn require_fields_names_every_missing_one() {
        let payload = serde_json::json!({ "name": "alice" });
        let err = require_fields("create_implicit_account", &payload, &["name", "balance"])
            .unwrap_err();
        assert!(err.to_string().contains("balance"));
    }
}
