//! hCaptcha siteverify client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapters::RetryPolicy;
use crate::domain::ports::Verifier;
use crate::utils::error::{Result, SubmitError};

/// hCaptcha's published test site key. When the configured site key equals
/// this exact constant the verification call is skipped entirely; the
/// bypass is never keyed off an environment name.
pub const HCAPTCHA_TEST_SITE_KEY: &str = "10000000-ffff-ffff-ffff-000000000001";

pub const DEFAULT_SITEVERIFY_ENDPOINT: &str = "https://api.hcaptcha.com/siteverify";

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct HcaptchaVerifier {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
    skip_verification: bool,
    retry: RetryPolicy,
}

impl HcaptchaVerifier {
    pub fn new(
        endpoint: String,
        secret: String,
        site_key: &str,
        timeout: std::time::Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::config(format!("failed to build hcaptcha client: {e}")))?;

        let skip_verification = site_key == HCAPTCHA_TEST_SITE_KEY;
        if skip_verification {
            tracing::warn!("hCaptcha test site key configured; verification calls are skipped");
        }

        Ok(Self {
            client,
            endpoint,
            secret,
            skip_verification,
            retry,
        })
    }

    async fn siteverify(&self, token: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.siteverify_once(token).await {
                Err(SiteverifyFailure::Transient(reason)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "retrying siteverify after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(SiteverifyFailure::Transient(reason))
                | Err(SiteverifyFailure::Terminal(reason)) => {
                    return Err(SubmitError::verification(reason));
                }
                Ok(()) => return Ok(()),
            }
        }
    }

    async fn siteverify_once(&self, token: &str) -> std::result::Result<(), SiteverifyFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SiteverifyFailure::Transient(format!("siteverify request failed: {e}"))
                } else {
                    SiteverifyFailure::Terminal(format!("siteverify request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(SiteverifyFailure::Transient(format!(
                "siteverify returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(SiteverifyFailure::Terminal(format!(
                "siteverify returned {status}"
            )));
        }

        let body: SiteverifyResponse = response.json().await.map_err(|e| {
            SiteverifyFailure::Terminal(format!("malformed siteverify response: {e}"))
        })?;

        if !body.success {
            return Err(SiteverifyFailure::Terminal(format!(
                "token rejected ({})",
                body.error_codes.join(", ")
            )));
        }

        Ok(())
    }
}

enum SiteverifyFailure {
    Transient(String),
    Terminal(String),
}

#[async_trait]
impl Verifier for HcaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<()> {
        if self.skip_verification {
            tracing::debug!("skipping siteverify call (test site key)");
            return Ok(());
        }
        self.siteverify(token).await
    }
}
