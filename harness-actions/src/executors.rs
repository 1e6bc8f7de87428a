use michelson_fmt::{print, print_json, replace_big_maps};
use michelson_parse::{parse, parse_json};
use michelson_types::{BaseUnit, DisplayUnit};
use sandbox_client::{Sandbox, SandboxError};

use crate::kind::{Action, ActionResult};
use crate::payloads::{
    AssertAccountBalancePayload, AssertContractStoragePayload, CallContractPayload,
    CreateImplicitAccountPayload, ModifyBlockLevelPayload, ModifyBlockTimestampPayload,
    ModifyChainIdPayload, OriginateContractPayload, PackDataPayload,
};
use crate::placeholder::expand_placeholders;
use crate::storage_type::find_storage_type;

/// Default fee an implicit account pays to reveal its public key, in base
/// units. Not presently surfaced through configuration.
const REVEAL_FEE_MUTEZ: &str = "1420";

pub async fn create_implicit_account(
    sandbox: &mut Sandbox,
    raw: Action,
    payload: CreateImplicitAccountPayload,
) -> ActionResult {
    if sandbox.addresses.contains_key(&payload.name) {
        return ActionResult::failure(
            raw,
            format!("an account named '{}' already exists in this request", payload.name),
        );
    }

    let requested_balance = match BaseUnit::parse(&payload.balance) {
        Ok(balance) => balance,
        Err(err) => return ActionResult::failure(raw, format!("invalid balance: {err}")),
    };
    let reveal_fee = BaseUnit::parse(REVEAL_FEE_MUTEZ).expect("compiled-in constant is valid");

    if let Err(err) = sandbox.gen_and_import_key(&payload.name).await {
        return ActionResult::failure(raw, err.to_string());
    }
    if let Err(err) = sandbox.refresh_known_addresses().await {
        return ActionResult::failure(raw, err.to_string());
    }

    let transfer_amount = requested_balance.add(&reveal_fee);
    if let Err(err) = sandbox
        .transfer(&transfer_amount.print(), "bootstrap1", &payload.name, None, None)
        .await
    {
        return ActionResult::failure(raw, err.to_string());
    }
    if let Err(err) = sandbox.reveal_key(&payload.name, REVEAL_FEE_MUTEZ).await {
        return ActionResult::failure(raw, err.to_string());
    }

    let actual_display = match sandbox.get_balance(&payload.name).await {
        Ok(balance) => balance,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };
    let actual_base = match DisplayUnit::parse(&actual_display).and_then(|d| d.to_base()) {
        Ok(base) => base,
        Err(err) => return ActionResult::failure(raw, format!("could not parse realized balance: {err}")),
    };

    if actual_base.print() != requested_balance.print() {
        return ActionResult::failure_expected_actual(
            raw,
            serde_json::json!(requested_balance.print()),
            serde_json::json!(actual_base.print()),
        );
    }

    let address = sandbox.addresses.get(&payload.name).cloned().unwrap_or_default();
    ActionResult::success(raw, Some(serde_json::json!({ "address": address })))
}

pub async fn originate_contract(
    sandbox: &mut Sandbox,
    raw: Action,
    payload: OriginateContractPayload,
) -> ActionResult {
    if sandbox.addresses.contains_key(&payload.name) {
        return ActionResult::failure(
            raw,
            format!("a contract named '{}' already exists in this request", payload.name),
        );
    }

    let code_ast = match parse_json(&payload.code) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid code: {err}")),
    };
    let storage_ast = match parse_json(&payload.storage) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid storage: {err}")),
    };

    let code_sform = replace_big_maps(&print(&code_ast, ""));
    let storage_sform = replace_big_maps(&print(&storage_ast, ""));
    let code_sform = match expand_placeholders(sandbox, &code_sform).await {
        Ok(text) => text,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };
    let storage_sform = match expand_placeholders(sandbox, &storage_sform).await {
        Ok(text) => text,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };

    let address = match sandbox
        .originate_contract(&payload.name, &payload.balance, &code_sform, &storage_sform)
        .await
    {
        Ok(address) => address,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };

    sandbox.addresses.insert(payload.name.clone(), address.clone());
    if let Some(storage_type) = find_storage_type(&code_ast) {
        sandbox
            .contract_cache
            .insert(payload.name.clone(), sandbox_client::ContractEntry { storage_type });
    }

    ActionResult::success(raw, Some(serde_json::json!({ "address": address })))
}

pub async fn call_contract(sandbox: &Sandbox, raw: Action, payload: CallContractPayload) -> ActionResult {
    let parsed_timestamp = match payload.timestamp.as_deref().map(chrono::DateTime::parse_from_rfc3339) {
        Some(Ok(ts)) => Some(ts.with_timezone(&chrono::Utc)),
        Some(Err(err)) => return ActionResult::failure(raw, format!("invalid timestamp: {err}")),
        None => None,
    };
    if let Err(err) = sandbox
        .apply_pre_transfer_adjustments(payload.level, parsed_timestamp.as_ref())
        .await
    {
        return ActionResult::failure(raw, err.to_string());
    }

    let parameter_ast = match parse_json(&payload.parameter) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid parameter: {err}")),
    };
    let parameter_sform = match expand_placeholders(sandbox, &print(&parameter_ast, "")).await {
        Ok(text) => text,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };

    let outcome = sandbox
        .transfer(
            &payload.amount,
            &payload.sender,
            &payload.recipient,
            Some(&payload.entrypoint),
            Some(&parameter_sform),
        )
        .await;

    match outcome {
        Ok(_) => match sandbox.get_contract_storage(&payload.recipient).await {
            Ok(storage) => ActionResult::success(
                raw,
                Some(serde_json::json!({ "storage": print_json(&storage) })),
            ),
            Err(err) => ActionResult::failure(raw, err.to_string()),
        },
        Err(SandboxError::ClientFailed(stderr)) => match &payload.expect_failwith {
            None => ActionResult::failure(raw, stderr),
            Some(expected_json) => match_failwith(raw, &stderr, expected_json),
        },
        Err(err @ SandboxError::OpaqueFailure) => ActionResult::failure(raw, err.to_string()),
    }
}

fn match_failwith(raw: Action, stderr: &str, expected_json: &serde_json::Value) -> ActionResult {
    let Some(actual_sform) = sandbox_client::parse_failwith_value(stderr) else {
        return ActionResult::failure(raw, stderr.to_string());
    };
    let actual_ast = match parse(&actual_sform) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("could not parse FAILWITH value: {err}")),
    };
    let expected_ast = match parse_json(expected_json) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid expect_failwith: {err}")),
    };

    if actual_ast == expected_ast {
        ActionResult::success(raw, Some(serde_json::json!({ "failwith": print_json(&actual_ast) })))
    } else {
        ActionResult::failure_expected_actual(raw, print_json(&expected_ast), print_json(&actual_ast))
    }
}

pub async fn assert_account_balance(
    sandbox: &Sandbox,
    raw: Action,
    payload: AssertAccountBalancePayload,
) -> ActionResult {
    let requested_balance = match BaseUnit::parse(&payload.balance) {
        Ok(balance) => balance,
        Err(err) => return ActionResult::failure(raw, format!("invalid balance: {err}")),
    };
    let actual_display = match sandbox.get_balance(&payload.account_name).await {
        Ok(balance) => balance,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };
    let actual_base = match DisplayUnit::parse(&actual_display).and_then(|d| d.to_base()) {
        Ok(base) => base,
        Err(err) => return ActionResult::failure(raw, format!("could not parse balance: {err}")),
    };

    if actual_base.print() == requested_balance.print() {
        ActionResult::success(raw, Some(serde_json::json!({ "balance": actual_base.print() })))
    } else {
        ActionResult::failure_expected_actual(
            raw,
            serde_json::json!(requested_balance.print()),
            serde_json::json!(actual_base.print()),
        )
    }
}

pub async fn assert_contract_storage(
    sandbox: &Sandbox,
    raw: Action,
    payload: AssertContractStoragePayload,
) -> ActionResult {
    let Some(entry) = sandbox.contract_cache.get(&payload.contract_name) else {
        return ActionResult::failure(
            raw,
            format!(
                "no contract named '{}' was originated in this request",
                payload.contract_name
            ),
        );
    };
    let storage_type_sform = print(&entry.storage_type, "");

    let actual_ast = match sandbox.get_contract_storage(&payload.contract_name).await {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };

    let expected_ast = match parse_json(&payload.storage) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid storage: {err}")),
    };
    let expected_sform = match expand_placeholders(sandbox, &print(&expected_ast, "")).await {
        Ok(text) => text,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };
    let expected_normalized = match sandbox
        .normalize_data(&expected_sform, &storage_type_sform, "Readable")
        .await
    {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, err.to_string()),
    };

    let equal = std::panic::catch_unwind(|| expected_normalized == actual_ast).unwrap_or(false);

    if equal {
        ActionResult::success(raw, Some(serde_json::json!({ "storage": print_json(&actual_ast) })))
    } else {
        ActionResult::failure_expected_actual(
            raw,
            print_json(&expected_normalized),
            print_json(&actual_ast),
        )
    }
}

pub async fn modify_chain_id(sandbox: &Sandbox, raw: Action, payload: ModifyChainIdPayload) -> ActionResult {
    match sandbox.set_chain_id(&payload.chain_id).await {
        Ok(()) => ActionResult::success(raw, Some(serde_json::json!({ "chain_id": payload.chain_id }))),
        Err(err) => ActionResult::failure(raw, err.to_string()),
    }
}

pub async fn modify_block_level(
    sandbox: &Sandbox,
    raw: Action,
    payload: ModifyBlockLevelPayload,
) -> ActionResult {
    match sandbox.set_block_level(payload.level).await {
        Ok(()) => ActionResult::success(raw, Some(serde_json::json!({ "level": payload.level }))),
        Err(err) => ActionResult::failure(raw, err.to_string()),
    }
}

pub async fn modify_block_timestamp(
    sandbox: &Sandbox,
    raw: Action,
    payload: ModifyBlockTimestampPayload,
) -> ActionResult {
    match sandbox.set_block_timestamp(&payload.timestamp).await {
        Ok(()) => ActionResult::success(
            raw,
            Some(serde_json::json!({ "timestamp": payload.timestamp })),
        ),
        Err(err) => ActionResult::failure(raw, err.to_string()),
    }
}

pub async fn pack_data(sandbox: &Sandbox, raw: Action, payload: PackDataPayload) -> ActionResult {
    let data_ast = match parse_json(&payload.data) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid data: {err}")),
    };
    let type_ast = match parse_json(&payload.data_type) {
        Ok(ast) => ast,
        Err(err) => return ActionResult::failure(raw, format!("invalid type: {err}")),
    };

    let data_sform = print(&data_ast, "");
    let type_sform = print(&type_ast, "");

    match sandbox.pack_data(&data_sform, &type_sform).await {
        Ok(bytes) => ActionResult::success(raw, Some(serde_json::json!({ "bytes": bytes }))),
        Err(err) => ActionResult::failure(raw, err.to_string()),
    }
}
