use crate::config::KeygenConfig;
use crate::error::Result;
use crate::openssl::OpensslTool;
use crate::passphrase::Passphrase;
use crate::paths;
use crate::prompt::{PASSPHRASE_QUESTION, PassphrasePrompt};
use crate::provisioner::{KeyPairRequest, KeyPairResult, KeyProvisioner};
use crate::runner::CommandRunner;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Interactive front end: ask, resolve the directory, provision, report.
pub struct GenerateKeysCommand<R, P> {
    config: KeygenConfig,
    runner: R,
    prompt: P,
    verbose: bool,
}

impl<R: CommandRunner, P: PassphrasePrompt> GenerateKeysCommand<R, P> {
    pub fn new(config: KeygenConfig, runner: R, prompt: P) -> Self {
        Self {
            config,
            runner,
            prompt,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub async fn execute<W: Write>(self, out: &mut W) -> Result<KeyPairResult> {
        say_welcome(out)?;

        let answer = self.prompt.ask(PASSPHRASE_QUESTION).await?;
        let passphrase = Passphrase::resolve(answer);
        if passphrase.is_generated() {
            info!("No passphrase given, using a generated one");
        }

        let target_dir =
            paths::resolve_key_dir(Path::new(&self.config.root_dir), &self.config.key_subdir);
        info!("Writing keys to {}", target_dir.display());

        let tool = OpensslTool::new(self.config.openssl_bin.clone(), self.config.timeout())
            .with_channel(self.config.passphrase_channel)
            .with_verbose(self.verbose);
        let provisioner = KeyProvisioner::new(self.runner, tool);
        let result = provisioner
            .provision(KeyPairRequest {
                target_dir,
                passphrase,
            })
            .await?;

        writeln!(
            out,
            "RSA keys successfully generated with passphrase {}",
            result.passphrase.expose()
        )?;
        writeln!(out, "  private key: {}", result.private_key_path.display())?;
        writeln!(out, "  public key:  {}", result.public_key_path.display())?;
        out.flush()?;

        Ok(result)
    }
}

fn say_welcome<W: Write>(out: &mut W) -> Result<()> {
    let title = "JWT RSA key generator";
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out)?;
    Ok(())
}
