use std::collections::HashMap;
use std::path::PathBuf;

use harness_util::{Config, HarnessError, HarnessResult};
use michelson_parse::parse as parse_sform;
use michelson_types::Ast;
use rand::RngCore;

use crate::argv::{ArgvBuilder, Flag};
use crate::context;
use crate::keys::{self, GeneratedKey};
use crate::output;
use crate::process::{ensure_success, run_client, ClientOutput, SandboxError};

/// Per-contract bookkeeping cached from its origination.
#[derive(Debug, Clone)]
pub struct ContractEntry {
    pub storage_type: Ast,
}

/// Per-request sandbox state: a unique working directory plus whatever the
/// request has originated or bootstrapped so far.
pub struct Sandbox {
    config: std::sync::Arc<Config>,
    task_id: String,
    working_dir: PathBuf,
    protocol: String,
    pub addresses: HashMap<String, String>,
    pub contract_cache: HashMap<String, ContractEntry>,
}

/// Generates a 64-bit prime to disambiguate concurrent sandbox working
/// directories, mirroring the use of a random prime as a task identifier.
fn random_prime_task_id() -> HarnessResult<u64> {
    let mut rng = rand::thread_rng();
    for _ in 0..10_000 {
        let candidate = rng.next_u64() | 1;
        if is_prime_u64(candidate) {
            return Ok(candidate);
        }
    }
    Err(HarnessError::internal(anyhow::anyhow!(
        "failed to find a 64-bit prime task id after 10000 attempts"
    )))
}

/// Deterministic Miller-Rabin primality test, exact for all `u64`.
fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }

    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    'witness: for a in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = mod_mul(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn mod_mul(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128) * (b as u128) % (m as u128)) as u64
}

fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mod_mul(result, base, m);
        }
        exp >>= 1;
        base = mod_mul(base, base, m);
    }
    result
}

impl Sandbox {
    /// Allocates a fresh task id and working-directory path without
    /// touching the filesystem or the sandbox client. Call [`bootstrap`]
    /// to actually stand up the mockup.
    pub fn new(config: std::sync::Arc<Config>, protocol: Option<String>) -> HarnessResult<Self> {
        let prime = random_prime_task_id()?;
        let task_id = format!("task_{prime}");
        let working_dir = config.sandbox.base_directory.join("_tmp").join(&task_id);
        let protocol = protocol.unwrap_or_else(|| config.sandbox.default_protocol.clone());
        Ok(Self {
            config,
            task_id,
            working_dir,
            protocol,
            addresses: HashMap::new(),
            contract_cache: HashMap::new(),
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    fn client_binary(&self) -> PathBuf {
        self.config.sandbox.client_binary.clone()
    }

    fn protocol_constants_path(&self) -> PathBuf {
        self.config.sandbox.base_directory.join("protocol-constants.json")
    }

    fn bootstrap_accounts_path(&self) -> PathBuf {
        self.config.sandbox.base_directory.join("bootstrap-accounts.json")
    }

    async fn run(&self, args: Vec<String>) -> HarnessResult<ClientOutput> {
        run_client(&self.client_binary(), &args).await
    }

    /// Creates the mockup working directory and populates `addresses` from
    /// `list known addresses`.
    pub async fn bootstrap(&mut self) -> HarnessResult<()> {
        tokio::fs::create_dir_all(&self.working_dir).await.map_err(|err| {
            HarnessError::internal(
                anyhow::Error::new(err)
                    .context(format!("creating sandbox directory {}", self.working_dir.display())),
            )
        })?;

        let args = ArgvBuilder::new()
            .flag_value(Flag::Mode, "mockup")
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .flag_value(Flag::Protocol, self.protocol.clone())
            .command(&["create", "mockup"])
            .flag_value(
                Flag::ProtocolConstants,
                self.protocol_constants_path().to_string_lossy(),
            )
            .flag_value(
                Flag::BootstrapAccounts,
                self.bootstrap_accounts_path().to_string_lossy(),
            )
            .build();

        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("bootstrap failed: {err}")))?;

        self.refresh_known_addresses().await
    }

    async fn list_known_addresses(&self) -> HarnessResult<Vec<(String, String)>> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["list", "known", "addresses"])
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("listing addresses failed: {err}")))?;
        Ok(output::parse_known_addresses(&output.stdout))
    }

    /// Re-queries `list known addresses` and merges any new entries into
    /// `addresses`. Called after bootstrap and after importing a freshly
    /// generated key, since the sandbox client derives addresses itself.
    pub async fn refresh_known_addresses(&mut self) -> HarnessResult<()> {
        for (name, address) in self.list_known_addresses().await? {
            self.addresses.insert(name, address);
        }
        Ok(())
    }

    /// Removes the working directory. Idempotent; must run on every exit
    /// path, including after a panic in the action pipeline.
    pub async fn teardown(&self) {
        if let Err(err) = tokio::fs::remove_dir_all(&self.working_dir).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(task_id = %self.task_id, %err, "teardown failed to remove working directory");
            }
        }
    }

    /// Generates a keypair, imports its secret into the sandbox client
    /// under `name`, and returns the address the client will later report
    /// for it.
    pub async fn gen_and_import_key(&self, name: &str) -> HarnessResult<GeneratedKey> {
        let key = keys::generate_keypair();
        let uri = keys::unencrypted_uri(&key.encoded_secret);
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["import", "secret", "key", name, &uri])
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("import secret key failed: {err}")))?;
        Ok(key)
    }

    pub async fn transfer(
        &self,
        amount: &str,
        from: &str,
        to: &str,
        entrypoint: Option<&str>,
        arg: Option<&str>,
    ) -> Result<ClientOutput, SandboxError> {
        let mut builder = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["transfer", amount, "from", from, "to", to]);
        if let Some(entrypoint) = entrypoint {
            builder = builder.flag_value(Flag::Entrypoint, entrypoint);
        }
        if let Some(arg) = arg {
            builder = builder.flag_value(Flag::Arg, arg);
        }
        builder = builder.flag_value(Flag::BurnCap, "1");
        let args = builder.build();
        let output = self
            .run(args)
            .await
            .map_err(|err| SandboxError::ClientFailed(err.to_string()))?;
        ensure_success(&output)?;
        Ok(output)
    }

    pub async fn reveal_key(&self, name: &str, fee: &str) -> HarnessResult<()> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["reveal", "key", "for", name])
            .flag_value(Flag::Fee, fee)
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("reveal key failed: {err}")))?;
        Ok(())
    }

    pub async fn get_balance(&self, name: &str) -> HarnessResult<String> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["get", "balance", "for", name])
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("get balance failed: {err}")))?;
        output::parse_balance(&output.stdout).ok_or_else(|| {
            HarnessError::internal(anyhow::anyhow!("could not parse balance from sandbox output"))
        })
    }

    pub async fn originate_contract(
        &self,
        name: &str,
        balance: &str,
        code_sform: &str,
        storage_sform: &str,
    ) -> Result<String, SandboxError> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&[
                "originate",
                "contract",
                name,
                "transferring",
                balance,
                "from",
                "bootstrap1",
                "running",
                code_sform,
            ])
            .flag_value(Flag::Init, storage_sform)
            .flag_value(Flag::BurnCap, "1")
            .build();
        let output = self
            .run(args)
            .await
            .map_err(|err| SandboxError::ClientFailed(err.to_string()))?;
        ensure_success(&output)?;
        output::parse_originated_address(&output.stdout)
            .ok_or_else(|| SandboxError::ClientFailed("could not find originated address".into()))
    }

    pub async fn get_contract_storage(&self, name: &str) -> HarnessResult<Ast> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["get", "contract", "storage", "for", name])
            .flag_value(Flag::UnparsingMode, "Readable")
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("get contract storage failed: {err}")))?;
        parse_sform(output.stdout.trim())
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("{err}")))
    }

    /// Forwards to the sandbox client's normalization command and
    /// re-parses its S-form output into an AST.
    pub async fn normalize_data(&self, data_sform: &str, type_sform: &str, mode: &str) -> HarnessResult<Ast> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["normalize", "data", data_sform, "of", "type", type_sform])
            .flag_value(Flag::UnparsingMode, mode)
            .build();
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("normalize data failed: {err}")))?;
        parse_sform(output.stdout.trim())
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("{err}")))
    }

    pub async fn pack_data(&self, data_sform: &str, type_sform: &str) -> HarnessResult<String> {
        let args = ArgvBuilder::new()
            .flag_value(Flag::BaseDirectory, self.working_dir.to_string_lossy())
            .command(&["convert", "data", data_sform, "from", "Michelson", "to", "Binary"])
            .build();
        let _ = type_sform;
        let output = self.run(args).await?;
        ensure_success(&output)
            .map_err(|err| HarnessError::internal(anyhow::anyhow!("pack data failed: {err}")))?;
        Ok(output.stdout.trim().to_string())
    }

    pub async fn set_chain_id(&self, chain_id: &str) -> HarnessResult<()> {
        context::set_chain_id(&self.working_dir, chain_id).await
    }

    pub async fn set_block_level(&self, level: u64) -> HarnessResult<()> {
        context::set_shell_header_level(&self.working_dir, level).await
    }

    pub async fn set_block_timestamp(&self, timestamp: &str) -> HarnessResult<()> {
        context::set_shell_header_timestamp(&self.working_dir, timestamp).await
    }

    /// Applies the target level and timestamp as pre-transfer context
    /// mutations, decremented by one (block / second) because the
    /// transfer itself advances both.
    pub async fn apply_pre_transfer_adjustments(
        &self,
        level: Option<u64>,
        timestamp: Option<&chrono::DateTime<chrono::Utc>>,
    ) -> HarnessResult<()> {
        if let Some(level) = level {
            self.set_block_level(level.saturating_sub(1)).await?;
        }
        if let Some(timestamp) = timestamp {
            let adjusted = *timestamp - chrono::Duration::seconds(1);
            self.set_block_timestamp(&adjusted.to_rfc3339()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miller_rabin_rejects_small_composites() {
        for n in [0u64, 1, 4, 6, 8, 9, 15, 21, 100] {
            assert!(!is_prime_u64(n), "{n} should not be prime");
        }
    }

    #[test]
    fn miller_rabin_accepts_known_primes() {
        for n in [2u64, 3, 5, 7, 11, 97, 7919, 2_147_483_647] {
            assert!(is_prime_u64(n), "{n} should be prime");
        }
    }

    #[test]
    fn miller_rabin_accepts_large_64_bit_prime() {
        // 2^61 - 1, a well-known Mersenne prime.
        assert!(is_prime_u64(2_305_843_009_213_693_951));
    }

    #[test]
    fn random_prime_task_id_is_prime_and_odd() {
        let prime = random_prime_task_id().unwrap();
        assert!(is_prime_u64(prime));
        assert_eq!(prime % 2, 1);
    }
}
