use std::collections::HashMap;
use std::sync::OnceLock;

use harness_util::HarnessResult;
use regex::Regex;
use sandbox_client::Sandbox;

fn address_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"TEST__ADDRESS_OF_ACCOUNT__([A-Za-z0-9_]+)").unwrap())
}

fn balance_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"TEST__BALANCE_OF_ACCOUNT__([A-Za-z0-9_]+)").unwrap())
}

/// Substitutes `TEST__ADDRESS_OF_ACCOUNT__<name>` against the name→address
/// map populated by bootstrap and prior actions in the same request. A
/// name with no known address is replaced with the empty string.
fn expand_addresses(text: &str, addresses: &HashMap<String, String>) -> String {
    address_placeholder_re()
        .replace_all(text, |caps: &regex::Captures| {
            addresses.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Substitutes `TEST__BALANCE_OF_ACCOUNT__<name>` with a live `get balance
/// for` query against the sandbox. Done sequentially since each
/// substitution is its own sandbox-client invocation.
async fn expand_balances(sandbox: &Sandbox, text: &str) -> HarnessResult<String> {
    let re = balance_placeholder_re();
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        result.push_str(&text[last_end..whole.start()]);
        let balance = sandbox.get_balance(&caps[1]).await?;
        result.push_str(&balance);
        last_end = whole.end();
    }
    result.push_str(&text[last_end..]);
    Ok(result)
}

/// Expands both placeholder families, addresses first since a balance
/// placeholder never nests inside an address one.
pub async fn expand_placeholders(sandbox: &Sandbox, text: &str) -> HarnessResult<String> {
    let expanded = expand_addresses(text, &sandbox.addresses);
    expand_balances(sandbox, &expanded).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_account_address() {
        let mut addresses = HashMap::new();
        addresses.insert("alice".to_string(), "tz1abc".to_string());
        let text = "Pair TEST__ADDRESS_OF_ACCOUNT__alice Unit";
        assert_eq!(expand_addresses(text, &addresses), "Pair tz1abc Unit");
    }

    #[test]
    fn unknown_account_placeholder_expands_to_empty_string() {
        let addresses = HashMap::new();
        let text = "TEST__ADDRESS_OF_ACCOUNT__unknown";
        assert_eq!(expand_addresses(text, &addresses), "");
    }
}
