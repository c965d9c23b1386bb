//! The submission pipeline: rate limit → validate → verify → dispatch.
//!
//! Strictly sequential; the first failing stage short-circuits the run and
//! no later stage executes.

use serde_json::Value;

use crate::core::rate_limit::RateLimiter;
use crate::core::render::render_email;
use crate::core::validate::validate_payload;
use crate::domain::model::Attachment;
use crate::domain::ports::{Mailer, Verifier};
use crate::utils::error::{Result, SubmitError};

pub struct SubmissionPipeline<V: Verifier, M: Mailer> {
    rate_limiter: RateLimiter,
    verifier: V,
    mailer: M,
    from: String,
    to: String,
}

impl<V: Verifier, M: Mailer> SubmissionPipeline<V, M> {
    pub fn new(
        rate_limiter: RateLimiter,
        verifier: V,
        mailer: M,
        from: String,
        to: String,
    ) -> Self {
        Self {
            rate_limiter,
            verifier,
            mailer,
            from,
            to,
        }
    }

    /// Runs one submission through every stage and reports the terminal
    /// outcome. `client_key` is the rate-limit bucket derived from the
    /// request's client address.
    pub async fn handle(
        &self,
        client_key: &str,
        payload: &Value,
        attachments: Vec<Attachment>,
    ) -> Result<()> {
        self.rate_limiter.check(client_key)?;

        let submission =
            validate_payload(payload, attachments).map_err(SubmitError::Validation)?;
        tracing::debug!(
            kind = submission.kind().as_str(),
            attachments = submission.attachments.len(),
            "submission validated"
        );

        self.verifier.verify(&submission.verification_token).await?;
        tracing::debug!("verification token accepted");

        let email = render_email(&submission, &self.from, &self.to);
        self.mailer.send(&email).await?;

        tracing::info!(kind = submission.kind().as_str(), "submission relayed");
        Ok(())
    }
}
