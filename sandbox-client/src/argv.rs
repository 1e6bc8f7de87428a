/// Recognized sandbox client flags. Spellings are fixed by the sandbox
/// client's own CLI and must match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Mode,
    BaseDirectory,
    Protocol,
    ProtocolConstants,
    BootstrapAccounts,
    BurnCap,
    Fee,
    Init,
    Arg,
    Entrypoint,
    UnparsingMode,
}

impl Flag {
    fn spelling(self) -> &'static str {
        match self {
            Flag::Mode => "-M",
            Flag::Protocol => "-p",
            Flag::BaseDirectory => "-d",
            Flag::ProtocolConstants => "--protocol-constants",
            Flag::BootstrapAccounts => "--bootstrap-accounts",
            Flag::BurnCap => "--burn-cap",
            Flag::Fee => "--fee",
            Flag::Init => "--init",
            Flag::Arg => "--arg",
            Flag::Entrypoint => "--entrypoint",
            Flag::UnparsingMode => "--unparsing-mode",
        }
    }
}

/// Flattens subcommand words and `(flag, values)` pairs into the sandbox
/// client's exact argv, in the order they were appended.
#[derive(Debug, Clone, Default)]
pub struct ArgvBuilder {
    parts: Vec<String>,
}

impl ArgvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one or more bare command words, e.g. `"create"`, `"mockup"`.
    pub fn command(mut self, words: &[&str]) -> Self {
        self.parts.extend(words.iter().map(|w| w.to_string()));
        self
    }

    /// Appends a flag followed by its values, e.g. `-d <path>` or
    /// `--entrypoint <name>`.
    pub fn flag(mut self, flag: Flag, values: impl IntoIterator<Item = String>) -> Self {
        self.parts.push(flag.spelling().to_string());
        self.parts.extend(values);
        self
    }

    /// Appends a single-valued flag.
    pub fn flag_value(self, flag: Flag, value: impl Into<String>) -> Self {
        self.flag(flag, [value.into()])
    }

    pub fn build(self) -> Vec<String> {
        self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_create_mockup_argv() {
        let args = ArgvBuilder::new()
            .flag_value(Flag::Mode, "mockup")
            .flag_value(Flag::BaseDirectory, "/tmp/sandbox/_tmp/1")
            .flag_value(Flag::Protocol, "alpha")
            .command(&["create", "mockup"])
            .flag_value(Flag::ProtocolConstants, "/tmp/sandbox/protocol-constants.json")
            .flag_value(Flag::BootstrapAccounts, "/tmp/sandbox/bootstrap-accounts.json")
            .build();

        assert_eq!(
            args,
            vec![
                "-M",
                "mockup",
                "-d",
                "/tmp/sandbox/_tmp/1",
                "-p",
                "alpha",
                "create",
                "mockup",
                "--protocol-constants",
                "/tmp/sandbox/protocol-constants.json",
                "--bootstrap-accounts",
                "/tmp/sandbox/bootstrap-accounts.json",
            ]
        );
    }

    #[test]
    fn composes_transfer_argv_with_optional_flags() {
        let args = ArgvBuilder::new()
            .command(&["transfer", "10", "from", "bootstrap1", "to", "c"])
            .flag_value(Flag::Entrypoint, "default")
            .flag_value(Flag::Arg, "Unit")
            .flag_value(Flag::BurnCap, "1")
            .build();

        assert_eq!(
            args,
            vec![
                "transfer", "10", "from", "bootstrap1", "to", "c", "--entrypoint", "default",
                "--arg", "Unit", "--burn-cap", "1",
            ]
        );
    }
}
