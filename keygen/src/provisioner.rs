use crate::error::{KeyStep, KeygenError, Result};
use crate::inspect;
use crate::openssl::{KEY_BITS, OpensslTool, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use crate::passphrase::Passphrase;
use crate::paths;
use crate::runner::{CommandRunner, Invocation};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone)]
pub struct KeyPairRequest {
    pub target_dir: PathBuf,
    pub passphrase: Passphrase,
}

impl KeyPairRequest {
    pub fn key_bits(&self) -> u32 {
        KEY_BITS
    }
}

/// Both files exist and are non-empty whenever this is returned.
#[derive(Debug, Clone)]
pub struct KeyPairResult {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub passphrase: Passphrase,
    pub public_key_bits: usize,
}

/// Creates `private.pem` / `public.pem` through two openssl runs.
pub struct KeyProvisioner<R> {
    runner: R,
    tool: OpensslTool,
}

impl<R: CommandRunner> KeyProvisioner<R> {
    pub fn new(runner: R, tool: OpensslTool) -> Self {
        Self { runner, tool }
    }

    #[instrument(skip(self, request), fields(target_dir = %request.target_dir.display()))]
    pub async fn provision(&self, request: KeyPairRequest) -> Result<KeyPairResult> {
        let KeyPairRequest {
            target_dir,
            passphrase,
        } = request;

        let private_key_path = target_dir.join(PRIVATE_KEY_FILE);
        let public_key_path = target_dir.join(PUBLIC_KEY_FILE);
        let generate = self.tool.generate_private_key(&private_key_path, &passphrase)?;
        let extract = self
            .tool
            .extract_public_key(&private_key_path, &public_key_path, &passphrase)?;
        paths::ensure_dir(&target_dir)?;

        info!(
            "Generating {}-bit RSA private key at {} with {}",
            KEY_BITS,
            private_key_path.display(),
            self.tool.program()
        );
        self.run_step(KeyStep::PrivateKey, generate).await?;

        info!("Extracting public key to {}", public_key_path.display());
        self.run_step(KeyStep::PublicKey, extract).await?;

        inspect::ensure_non_empty(&private_key_path)?;
        inspect::ensure_non_empty(&public_key_path)?;
        inspect::check_encrypted_private_key(&private_key_path)?;
        let public_key_bits = inspect::public_key_bits(&public_key_path)?;
        debug!("Public key modulus is {} bits", public_key_bits);

        Ok(KeyPairResult {
            private_key_path,
            public_key_path,
            passphrase,
            public_key_bits,
        })
    }

    async fn run_step(&self, step: KeyStep, invocation: Invocation) -> Result<()> {
        let output = self.runner.run(&invocation).await?;
        if output.success() {
            debug!("{} finished", step);
            return Ok(());
        }

        error!("{} failed with {}", step, output.status_text());
        Err(KeygenError::ToolFailed {
            step,
            status: output.status_text(),
            output: output.combined(),
        })
    }
}
