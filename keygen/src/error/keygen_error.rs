use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The two external tool runs that make up a provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStep {
    PrivateKey,
    PublicKey,
}

impl fmt::Display for KeyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStep::PrivateKey => write!(f, "private key generation"),
            KeyStep::PublicKey => write!(f, "public key extraction"),
        }
    }
}

#[derive(Error, Debug)]
pub enum KeygenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to create key directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("{step} failed ({status})\n{output}")]
    ToolFailed {
        step: KeyStep,
        status: String,
        output: String,
    },

    #[error("Key file {} is missing or empty", .0.display())]
    MissingKeyFile(PathBuf),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to read passphrase: {0}")]
    Prompt(String),
}

impl KeygenError {
    /// Whether the error came out of one of the external tool runs.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            KeygenError::Spawn { .. } | KeygenError::Timeout { .. } | KeygenError::ToolFailed { .. }
        )
    }
}
