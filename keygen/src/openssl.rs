use crate::error::{KeygenError, Result};
use crate::passphrase::Passphrase;
use crate::runner::Invocation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const KEY_BITS: u32 = 4096;
pub const PRIVATE_KEY_FILE: &str = "private.pem";
pub const PUBLIC_KEY_FILE: &str = "public.pem";
pub const PASSPHRASE_ENV: &str = "JWT_KEYGEN_PASSPHRASE";

/// How the passphrase reaches the openssl process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassphraseChannel {
    /// `pass:<secret>` on the command line, visible in process listings.
    #[default]
    Argument,
    /// `env:JWT_KEYGEN_PASSPHRASE`, secret only in the child's environment.
    Environment,
}

/// Builds openssl invocations for the two provisioning steps.
#[derive(Debug, Clone)]
pub struct OpensslTool {
    program: String,
    timeout: Duration,
    channel: PassphraseChannel,
    verbose: bool,
}

impl OpensslTool {
    pub fn new<S: Into<String>>(program: S, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            channel: PassphraseChannel::default(),
            verbose: false,
        }
    }

    pub fn with_channel(mut self, channel: PassphraseChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `openssl genrsa -out <private> -aes256 -passout <src> 4096`
    pub fn generate_private_key(
        &self,
        private_key: &Path,
        passphrase: &Passphrase,
    ) -> Result<Invocation> {
        let invocation = self
            .invocation()
            .arg("genrsa")
            .arg("-out")
            .arg(path_arg(private_key)?)
            .arg("-aes256")
            .arg("-passout");
        Ok(self
            .with_passphrase(invocation, passphrase)
            .arg(KEY_BITS.to_string()))
    }

    /// `openssl rsa -pubout -in <private> -out <public> -passin <src>`
    pub fn extract_public_key(
        &self,
        private_key: &Path,
        public_key: &Path,
        passphrase: &Passphrase,
    ) -> Result<Invocation> {
        let invocation = self
            .invocation()
            .arg("rsa")
            .arg("-pubout")
            .arg("-in")
            .arg(path_arg(private_key)?)
            .arg("-out")
            .arg(path_arg(public_key)?)
            .arg("-passin");
        Ok(self.with_passphrase(invocation, passphrase))
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(self.program.clone(), self.timeout).echo(self.verbose)
    }

    fn with_passphrase(&self, invocation: Invocation, passphrase: &Passphrase) -> Invocation {
        match self.channel {
            PassphraseChannel::Argument => invocation.arg(format!("pass:{}", passphrase.expose())),
            PassphraseChannel::Environment => invocation
                .arg(format!("env:{}", PASSPHRASE_ENV))
                .env(PASSPHRASE_ENV, passphrase.expose()),
        }
    }
}

// A lossy conversion would point openssl at a different file.
fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        KeygenError::Configuration(format!(
            "key path {} is not valid UTF-8",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn passphrase() -> Passphrase {
        Passphrase::resolve(Some("s3cret".to_string()))
    }

    #[test]
    fn private_key_invocation_uses_aes256_and_4096_bits() {
        let tool = OpensslTool::new("openssl", Duration::from_secs(3600));
        let invocation =
            tool.generate_private_key(&PathBuf::from("/keys/private.pem"), &passphrase())
                .unwrap();

        assert_eq!(invocation.program, "openssl");
        assert_eq!(
            invocation.args,
            [
                "genrsa",
                "-out",
                "/keys/private.pem",
                "-aes256",
                "-passout",
                "pass:s3cret",
                "4096"
            ]
        );
        assert_eq!(invocation.timeout, Duration::from_secs(3600));
        assert!(invocation.envs.is_empty());
    }

    #[test]
    fn public_key_invocation_reads_private_key() {
        let tool = OpensslTool::new("/usr/bin/openssl", Duration::from_secs(60)).with_verbose(true);
        let invocation = tool.extract_public_key(
            &PathBuf::from("/keys/private.pem"),
            &PathBuf::from("/keys/public.pem"),
            &passphrase(),
        )
        .unwrap();

        assert_eq!(
            invocation.args,
            [
                "rsa",
                "-pubout",
                "-in",
                "/keys/private.pem",
                "-out",
                "/keys/public.pem",
                "-passin",
                "pass:s3cret"
            ]
        );
        assert!(invocation.echo);
    }

    #[test]
    fn environment_channel_keeps_secret_out_of_argv() {
        let tool = OpensslTool::new("openssl", Duration::from_secs(60))
            .with_channel(PassphraseChannel::Environment);
        let invocation =
            tool.generate_private_key(&PathBuf::from("/keys/private.pem"), &passphrase())
                .unwrap();

        assert!(invocation.args.iter().all(|arg| !arg.contains("s3cret")));
        assert_eq!(invocation.arg_after("-passout"), Some("env:JWT_KEYGEN_PASSPHRASE"));
        assert_eq!(
            invocation.envs,
            [(PASSPHRASE_ENV.to_string(), "s3cret".to_string())]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_key_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tool = OpensslTool::new("openssl", Duration::from_secs(60));
        let dir = Path::new(OsStr::from_bytes(b"/keys/caf\xe9"));
        let good = PathBuf::from("/keys/private.pem");

        let err = tool
            .generate_private_key(&dir.join("private.pem"), &passphrase())
            .unwrap_err();
        assert!(matches!(err, KeygenError::Configuration(_)));

        let err = tool
            .extract_public_key(&good, &dir.join("public.pem"), &passphrase())
            .unwrap_err();
        assert!(matches!(err, KeygenError::Configuration(_)));
    }
}
