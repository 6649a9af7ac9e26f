use crate::config::KeygenConfig;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "keygen", version)]
#[command(about = "Generate the RSA key pair used to sign JWTs", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override application root directory
    #[arg(long, env = "JWT_KEYGEN_ROOT_DIR")]
    pub root_dir: Option<String>,

    /// Override openssl binary
    #[arg(long = "openssl", env = "JWT_KEYGEN_OPENSSL")]
    pub openssl_bin: Option<String>,

    /// Override per-step timeout in seconds
    #[arg(long, env = "JWT_KEYGEN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Do not ask for a passphrase; generate one
    #[arg(short = 'n', long)]
    pub no_interaction: bool,

    /// Show openssl output while it runs
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, env = "JWT_KEYGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Override log directory
    #[arg(long, env = "JWT_KEYGEN_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl CliArgs {
    pub fn apply(&self, cfg: &mut KeygenConfig) {
        if let Some(root_dir) = &self.root_dir {
            cfg.root_dir = root_dir.clone();
        }
        if let Some(openssl_bin) = &self.openssl_bin {
            cfg.openssl_bin = openssl_bin.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            cfg.timeout_secs = timeout_secs;
        }
        if let Some(log_level) = &self.log_level {
            cfg.log_level = log_level.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            cfg.log_dir = Some(log_dir.clone());
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }
}
