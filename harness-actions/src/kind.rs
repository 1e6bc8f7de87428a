use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tags recognized in an action's `kind` field. Spellings are the wire
/// format and must stay in sync with the HTTP surface's documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateImplicitAccount,
    OriginateContract,
    CallContract,
    AssertAccountBalance,
    AssertContractStorage,
    ModifyChainId,
    ModifyBlockLevel,
    ModifyBlockTimestamp,
    PackData,
}

/// The envelope every action arrives in: `{ kind, payload }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failure,
}

/// One action's outcome, echoing the action it answers.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ActionResult {
    pub fn success(action: Action, result: Option<Value>) -> Self {
        Self {
            status: ActionStatus::Success,
            action,
            result,
        }
    }

    pub fn failure(action: Action, details: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Failure,
            action,
            result: Some(serde_json::json!({ "details": details.into() })),
        }
    }

    pub fn failure_expected_actual(action: Action, expected: Value, actual: Value) -> Self {
        Self {
            status: ActionStatus::Failure,
            action,
            result: Some(serde_json::json!({ "expected": expected, "actual": actual })),
        }
    }
}
