use std::sync::OnceLock;

use harness_util::{HarnessError, HarnessResult};
use regex::Regex;

use crate::kind::{Action, ActionKind};
use crate::payloads::{
    AssertAccountBalancePayload, AssertContractStoragePayload, CallContractPayload,
    CreateImplicitAccountPayload, ModifyBlockLevelPayload, ModifyBlockTimestampPayload,
    ModifyChainIdPayload, OriginateContractPayload, PackDataPayload,
};
use crate::validate::{require_fields, validate_entrypoint, validate_name};

/// A decoded, validated action paired with the raw envelope it was echoed
/// from. Decoding a whole batch fails atomically: one bad action aborts
/// the entire request with `BadRequest` before anything runs.
#[derive(Debug, Clone)]
pub enum DecodedAction {
    CreateImplicitAccount {
        raw: Action,
        payload: CreateImplicitAccountPayload,
    },
    OriginateContract {
        raw: Action,
        payload: OriginateContractPayload,
    },
    CallContract {
        raw: Action,
        payload: CallContractPayload,
    },
    AssertAccountBalance {
        raw: Action,
        payload: AssertAccountBalancePayload,
    },
    AssertContractStorage {
        raw: Action,
        payload: AssertContractStoragePayload,
    },
    ModifyChainId {
        raw: Action,
        payload: ModifyChainIdPayload,
    },
    ModifyBlockLevel {
        raw: Action,
        payload: ModifyBlockLevelPayload,
    },
    ModifyBlockTimestamp {
        raw: Action,
        payload: ModifyBlockTimestampPayload,
    },
    PackData {
        raw: Action,
        payload: PackDataPayload,
    },
}

fn chain_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Net[1-9A-HJ-NP-Za-km-z]{12}$").unwrap())
}

fn deserialize<T: serde::de::DeserializeOwned>(kind: &str, payload: &serde_json::Value) -> HarnessResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|err| HarnessError::bad_request(format!("invalid {kind} payload: {err}")))
}

pub fn decode_batch(raw_actions: Vec<Action>) -> HarnessResult<Vec<DecodedAction>> {
    raw_actions.into_iter().map(decode_one).collect()
}

fn decode_one(raw: Action) -> HarnessResult<DecodedAction> {
    match raw.kind {
        ActionKind::CreateImplicitAccount => {
            require_fields("create_implicit_account", &raw.payload, &["name", "balance"])?;
            let payload: CreateImplicitAccountPayload =
                deserialize("create_implicit_account", &raw.payload)?;
            validate_name("name", &payload.name)?;
            Ok(DecodedAction::CreateImplicitAccount { raw, payload })
        }
        ActionKind::OriginateContract => {
            require_fields(
                "originate_contract",
                &raw.payload,
                &["name", "balance", "code", "storage"],
            )?;
            let payload: OriginateContractPayload = deserialize("originate_contract", &raw.payload)?;
            validate_name("name", &payload.name)?;
            Ok(DecodedAction::OriginateContract { raw, payload })
        }
        ActionKind::CallContract => {
            require_fields(
                "call_contract",
                &raw.payload,
                &["recipient", "sender", "entrypoint", "amount", "parameter"],
            )?;
            let payload: CallContractPayload = deserialize("call_contract", &raw.payload)?;
            validate_name("recipient", &payload.recipient)?;
            validate_name("sender", &payload.sender)?;
            validate_entrypoint(&payload.entrypoint)?;
            Ok(DecodedAction::CallContract { raw, payload })
        }
        ActionKind::AssertAccountBalance => {
            require_fields(
                "assert_account_balance",
                &raw.payload,
                &["account_name", "balance"],
            )?;
            let payload: AssertAccountBalancePayload =
                deserialize("assert_account_balance", &raw.payload)?;
            validate_name("account_name", &payload.account_name)?;
            Ok(DecodedAction::AssertAccountBalance { raw, payload })
        }
        ActionKind::AssertContractStorage => {
            require_fields(
                "assert_contract_storage",
                &raw.payload,
                &["contract_name", "storage"],
            )?;
            let payload: AssertContractStoragePayload =
                deserialize("assert_contract_storage", &raw.payload)?;
            validate_name("contract_name", &payload.contract_name)?;
            Ok(DecodedAction::AssertContractStorage { raw, payload })
        }
        ActionKind::ModifyChainId => {
            require_fields("modify_chain_id", &raw.payload, &["chain_id"])?;
            let payload: ModifyChainIdPayload = deserialize("modify_chain_id", &raw.payload)?;
            if !chain_id_re().is_match(&payload.chain_id) {
                return Err(HarnessError::bad_request(format!(
                    "\"chain_id\" is invalid: {}",
                    payload.chain_id
                )));
            }
            Ok(DecodedAction::ModifyChainId { raw, payload })
        }
        ActionKind::ModifyBlockLevel => {
            require_fields("modify_block_level", &raw.payload, &["level"])?;
            let payload: ModifyBlockLevelPayload = deserialize("modify_block_level", &raw.payload)?;
            if payload.level < 1 || payload.level > 100_000_000 {
                return Err(HarnessError::bad_request(format!(
                    "\"level\" must be in 1..100000000, got {}",
                    payload.level
                )));
            }
            Ok(DecodedAction::ModifyBlockLevel { raw, payload })
        }
        ActionKind::ModifyBlockTimestamp => {
            require_fields("modify_block_timestamp", &raw.payload, &["timestamp"])?;
            let payload: ModifyBlockTimestampPayload =
                deserialize("modify_block_timestamp", &raw.payload)?;
            chrono::DateTime::parse_from_rfc3339(&payload.timestamp).map_err(|err| {
                HarnessError::bad_request(format!(
                    "\"timestamp\" is not valid RFC3339: {err}"
                ))
            })?;
            Ok(DecodedAction::ModifyBlockTimestamp { raw, payload })
        }
        ActionKind::PackData => {
            require_fields("pack_data", &raw.payload, &["data", "type"])?;
            let payload: PackDataPayload = deserialize("pack_data", &raw.payload)?;
            Ok(DecodedAction::PackData { raw, payload })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_create_implicit_account() {
        let raw = Action {
            kind: ActionKind::CreateImplicitAccount,
            payload: serde_json::json!({ "name": "alice", "balance": "1000000" }),
        };
        assert!(matches!(
            decode_one(raw).unwrap(),
            DecodedAction::CreateImplicitAccount { .. }
        ));
    }

    #[test]
    fn missing_field_aborts_decode() {
        let raw = Action {
            kind: ActionKind::CreateImplicitAccount,
            payload: serde_json::json!({ "name": "alice" }),
        };
        let err = decode_one(raw).unwrap_err();
        assert!(err.to_string().contains("balance"));
    }

    #[test]
    fn rejects_malformed_chain_id() {
        let raw = Action {
            kind: ActionKind::ModifyChainId,
            payload: serde_json::json!({ "chain_id": "NetSomething" }),
        };
        assert!(decode_one(raw).is_err());
    }

    #[test]
    fn accepts_well_formed_chain_id() {
        let raw = Action {
            kind: ActionKind::ModifyChainId,
            payload: serde_json::json!({ "chain_id": "NetXynUjJNZm7wi" }),
        };
        assert!(decode_one(raw).is_ok());
    }

    #[test]
    fn rejects_entrypoint_too_long() {
        let raw = Action {
            kind: ActionKind::CallContract,
            payload: serde_json::json!({
                "recipient": "c",
                "sender": "bootstrap1",
                "entrypoint": "a".repeat(32),
                "amount": "0",
                "parameter": "Unit",
            }),
        };
        assert!(decode_one(raw).is_err());
    }
}
