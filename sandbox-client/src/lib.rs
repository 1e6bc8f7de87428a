mod argv;
mod context;
mod keys;
mod orchestrator;
mod output;
mod process;

pub use argv::{ArgvBuilder, Flag};
pub use keys::{encode_secret_key, generate_keypair, unencrypted_uri, GeneratedKey};
pub use orchestrator::{ContractEntry, Sandbox};
pub use output::{parse_balance, parse_failwith_value, parse_known_addresses, parse_originated_address};
pub use process::{ensure_success, run_client, ClientOutput, SandboxError};
