use std::sync::OnceLock;

use regex::Regex;

/// The ecosystem's currency symbol, as printed by `get balance for`.
const CURRENCY_SIGIL: char = 'ꜩ';

fn originate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"New\s+contract\s+(\w+)\s+originated").unwrap())
}

fn balance_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(\d*\.?\d*)\s{CURRENCY_SIGIL}")).unwrap())
}

fn failwith_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"script reached FAILWITH instruction\nwith (.*)\n").unwrap()
    })
}

fn known_addresses_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+):\s(\w+)\s").unwrap())
}

/// Extracts the originated contract's address from `originate contract` output.
pub fn parse_originated_address(stdout: &str) -> Option<String> {
    originate_re()
        .captures(stdout)
        .map(|caps| caps[1].to_string())
}

/// Extracts the display-unit balance value from `get balance for` output.
pub fn parse_balance(stdout: &str) -> Option<String> {
    balance_re().captures(stdout).map(|caps| caps[1].to_string())
}

/// Extracts the raw S-form FAILWITH payload text from a failed transfer's stderr.
pub fn parse_failwith_value(stderr: &str) -> Option<String> {
    failwith_re().captures(stderr).map(|caps| caps[1].to_string())
}

/// Parses the `list known addresses` output into `(name, address)` pairs.
pub fn parse_known_addresses(stdout: &str) -> Vec<(String, String)> {
    known_addresses_re()
        .captures_iter(stdout)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_originated_address() {
        let stdout = "New contract KT1abc123 originated.\nContract memorized as c.";
        assert_eq!(parse_originated_address(stdout), Some("KT1abc123".to_string()));
    }

    #[test]
    fn extracts_balance() {
        let stdout = "10.5 ꜩ";
        assert_eq!(parse_balance(stdout), Some("10.5".to_string()));
    }

    #[test]
    fn extracts_failwith_payload() {
        let stderr = "script reached FAILWITH instruction\nwith \"boom\"\n";
        assert_eq!(parse_failwith_value(stderr), Some("\"boom\"".to_string()));
    }

    #[test]
    fn extracts_known_addresses() {
        let stdout = "bootstrap1: tz1abc \n bootstrap2: tz1def \n";
        let addresses = parse_known_addresses(stdout);
        assert_eq!(
            addresses,
            vec![
                ("bootstrap1".to_string(), "tz1abc".to_string()),
                ("bootstrap2".to_string(), "tz1def".to_string()),
            ]
        );
    }

    #[test]
    fn missing_pattern_returns_none() {
        assert_eq!(parse_originated_address("nothing useful here"), None);
    }
}
