use crate::domain::model::OutboundEmail;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Confirms a submission's verification token with the bot-verification
/// provider. Implementations decide whether a network call happens at all
/// (the test site key bypasses it).
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<()>;
}

/// Hands a rendered message to the outbound email provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}
