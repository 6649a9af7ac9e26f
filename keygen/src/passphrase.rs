use rsa::rand_core::{OsRng, RngCore};
use std::fmt;

/// Random bytes behind a generated passphrase; hex encoding doubles the length.
pub const GENERATED_BYTES: usize = 16;

/// Secret protecting the private key at rest.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase {
    secret: String,
    generated: bool,
}

impl Passphrase {
    /// Uses the operator's answer when it has content, otherwise generates one.
    pub fn resolve(answer: Option<String>) -> Self {
        match answer.map(|a| a.trim().to_string()) {
            Some(secret) if !secret.is_empty() => Self {
                secret,
                generated: false,
            },
            _ => Self::generate(),
        }
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; GENERATED_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self {
            secret: hex::encode(bytes),
            generated: true,
        }
    }

    pub fn expose(&self) -> &str {
        &self.secret
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Passphrase")
            .field("secret", &"<redacted>")
            .field("generated", &self.generated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_generate_a_passphrase() {
        for answer in [None, Some(String::new()), Some("   \n".to_string())] {
            let passphrase = Passphrase::resolve(answer);
            assert!(passphrase.is_generated());
            assert!(passphrase.expose().len() >= 10);
            assert!(passphrase.expose().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn supplied_answer_is_trimmed_and_kept() {
        let passphrase = Passphrase::resolve(Some("  correct horse\n".to_string()));
        assert!(!passphrase.is_generated());
        assert_eq!(passphrase.expose(), "correct horse");
    }

    #[test]
    fn generated_passphrases_differ() {
        assert_ne!(Passphrase::generate(), Passphrase::generate());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let passphrase = Passphrase::resolve(Some("hunter2".to_string()));
        assert!(!format!("{:?}", passphrase).contains("hunter2"));
    }
}
