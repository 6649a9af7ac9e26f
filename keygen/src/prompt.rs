use crate::error::{KeygenError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub const PASSPHRASE_QUESTION: &str = "Choose the passphrase of your private RSA key : ";

/// Source of the operator's passphrase answer.
#[async_trait]
pub trait PassphrasePrompt: Send + Sync {
    /// `None` when the operator gave no answer.
    async fn ask(&self, question: &str) -> Result<Option<String>>;
}

#[async_trait]
impl<T: PassphrasePrompt + ?Sized> PassphrasePrompt for Box<T> {
    async fn ask(&self, question: &str) -> Result<Option<String>> {
        (**self).ask(question).await
    }
}

/// Asks on the terminal: question to stdout, answer from one stdin line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

#[async_trait]
impl PassphrasePrompt for ConsolePrompt {
    async fn ask(&self, question: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(question.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| KeygenError::Prompt(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Answers every question with a fixed value; `-n` uses the empty answer.
#[derive(Debug, Clone, Default)]
pub struct StaticPrompt {
    answer: Option<String>,
}

impl StaticPrompt {
    pub fn new(answer: Option<String>) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl PassphrasePrompt for StaticPrompt {
    async fn ask(&self, _question: &str) -> Result<Option<String>> {
        Ok(self.answer.clone())
    }
}
