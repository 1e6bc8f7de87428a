use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateImplicitAccountPayload {
    pub name: String,
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginateContractPayload {
    pub name: String,
    pub balance: String,
    pub code: Value,
    pub storage: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallContractPayload {
    pub recipient: String,
    pub sender: String,
    pub entrypoint: String,
    pub amount: String,
    pub parameter: Value,
    #[serde(default)]
    pub level: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub expect_failwith: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssertAccountBalancePayload {
    pub account_name: String,
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssertContractStoragePayload {
    pub contract_name: String,
    pub storage: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModifyChainIdPayload {
    pub chain_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModifyBlockLevelPayload {
    pub level: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModifyBlockTimestampPayload {
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackDataPayload {
    pub data: Value,
    #[serde(rename = "type")]
    pub data_type: Value,
}
