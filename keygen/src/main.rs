use anyhow::{Context, Result};
use clap::Parser;
use keygen::cli::CliArgs;
use keygen::{
    ConsolePrompt, GenerateKeysCommand, KeygenConfig, PassphrasePrompt, StaticPrompt,
    TokioCommandRunner, telemetry,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Load configuration
    let mut cfg = match &args.config {
        Some(path) => KeygenConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => KeygenConfig::default(),
    };

    // Override with command line arguments
    args.apply(&mut cfg);
    cfg.validate().context("Invalid configuration")?;

    let _guard = telemetry::init_tracing(cfg.log_dir.as_deref(), &cfg.log_file, &cfg.log_level);
    info!("Starting key generation with configuration: {:?}", cfg);

    let prompt: Box<dyn PassphrasePrompt> = if args.no_interaction {
        Box::new(StaticPrompt::default())
    } else {
        Box::new(ConsolePrompt)
    };

    let command = GenerateKeysCommand::new(cfg, TokioCommandRunner, prompt).verbose(args.is_verbose());
    let mut stdout = std::io::stdout();
    match command.execute(&mut stdout).await {
        Ok(result) => {
            info!(
                "Key pair written to {} ({} bit public key)",
                result.private_key_path.display(),
                result.public_key_bits
            );
            Ok(())
        }
        Err(e) => {
            error!("Key generation failed: {}", e);
            if e.is_tool_failure() && !args.is_verbose() {
                eprintln!("Re-run with --verbose to see the openssl output as it happens.");
            }
            Err(e).context("Failed to generate RSA keys")
        }
    }
}
