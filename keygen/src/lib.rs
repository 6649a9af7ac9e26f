pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod inspect;
pub mod openssl;
pub mod passphrase;
pub mod paths;
pub mod prompt;
pub mod provisioner;
pub mod runner;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use command::GenerateKeysCommand;
pub use config::KeygenConfig;
pub use error::{KeyStep, KeygenError, Result};
pub use openssl::{KEY_BITS, OpensslTool, PassphraseChannel};
pub use passphrase::Passphrase;
pub use prompt::{ConsolePrompt, PassphrasePrompt, StaticPrompt};
pub use provisioner::{KeyPairRequest, KeyPairResult, KeyProvisioner};
pub use runner::{CommandOutput, CommandRunner, Invocation, TokioCommandRunner};
