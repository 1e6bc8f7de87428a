//! Decodes a batch of declarative test actions, validates them together as
//! an atomic unit, then executes them one at a time against a live
//! [`Sandbox`], in input order.

mod decode;
mod executors;
mod kind;
mod placeholder;
mod payloads;
mod storage_type;
mod validate;

pub use decode::{decode_batch, DecodedAction};
pub use kind::{Action, ActionKind, ActionResult, ActionStatus};
pub use payloads::{
    AssertAccountBalancePayload, AssertContractStoragePayload, CallContractPayload,
    CreateImplicitAccountPayload, ModifyBlockLevelPayload, ModifyBlockTimestampPayload,
    ModifyChainIdPayload, OriginateContractPayload, PackDataPayload,
};

use sandbox_client::Sandbox;

/// Runs every decoded action sequentially against `sandbox`. One action's
/// failure is recorded in its own [`ActionResult`] and does not stop the
/// batch.
pub async fn run_batch(sandbox: &mut Sandbox, actions: Vec<DecodedAction>) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());
    for action in actions {
        let kind = action_kind_name(&action);
        let result = run_one(sandbox, action).await;
        tracing::debug!(kind, status = ?result.status, "action executed");
        results.push(result);
    }
    results
}

fn action_kind_name(action: &DecodedAction) -> &'static str {
    match action {
        DecodedAction::CreateImplicitAccount { .. } => "create_implicit_account",
        DecodedAction::OriginateContract { .. } => "originate_contract",
        DecodedAction::CallContract { .. } => "call_contract",
        DecodedAction::AssertAccountBalance { .. } => "assert_account_balance",
        DecodedAction::AssertContractStorage { .. } => "assert_contract_storage",
        DecodedAction::ModifyChainId { .. } => "modify_chain_id",
        DecodedAction::ModifyBlockLevel { .. } => "modify_block_level",
        DecodedAction::ModifyBlockTimestamp { .. } => "modify_block_timestamp",
        DecodedAction::PackData { .. } => "pack_data",
    }
}

async fn run_one(sandbox: &mut Sandbox, action: DecodedAction) -> ActionResult {
    match action {
        DecodedAction::CreateImplicitAccount { raw, payload } => {
            executors::create_implicit_account(sandbox, raw, payload).await
        }
        DecodedAction::OriginateContract { raw, payload } => {
            executors::originate_contract(sandbox, raw, payload).await
        }
        DecodedAction::CallContract { raw, payload } => {
            executors::call_contract(sandbox, raw, payload).await
        }
        DecodedAction::AssertAccountBalance { raw, payload } => {
            executors::assert_account_balance(sandbox, raw, payload).await
        }
        DecodedAction::AssertContractStorage { raw, payload } => {
            executors::assert_contract_storage(sandbox, raw, payload).await
        }
        DecodedAction::ModifyChainId { raw, payload } => {
            executors::modify_chain_id(sandbox, raw, payload).await
        }
        DecodedAction::ModifyBlockLevel { raw, payload } => {
            executors::modify_block_level(sandbox, raw, payload).await
        }
        DecodedAction::ModifyBlockTimestamp { raw, payload } => {
            executors::modify_block_timestamp(sandbox, raw, payload).await
        }
        DecodedAction::PackData { raw, payload } => executors::pack_data(sandbox, raw, payload).await,
    }
}
