//! Resend transactional email client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::adapters::RetryPolicy;
use crate::domain::model::OutboundEmail;
use crate::domain::ports::Mailer;
use crate::utils::error::{Result, SubmitError};

pub const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<WireAttachment<'a>>,
}

#[derive(Serialize)]
struct WireAttachment<'a> {
    filename: &'a str,
    /// Base64 of the raw bytes, per the Resend API.
    content: String,
}

pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl ResendMailer {
    pub fn new(
        endpoint: String,
        api_key: String,
        timeout: std::time::Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::config(format!("failed to build resend client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            retry,
        })
    }

    async fn send_once(&self, email: &OutboundEmail) -> std::result::Result<(), SendFailure> {
        let request = SendRequest {
            from: &email.from,
            to: &email.to,
            reply_to: &email.reply_to,
            subject: &email.subject,
            text: &email.text,
            attachments: email
                .attachments
                .iter()
                .map(|a| WireAttachment {
                    filename: &a.filename,
                    content: BASE64.encode(&a.content),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SendFailure::Transient(format!("send request failed: {e}"))
                } else {
                    SendFailure::Terminal(format!("send request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(SendFailure::Transient(format!(
                "provider returned {status}: {detail}"
            )))
        } else {
            Err(SendFailure::Terminal(format!(
                "provider returned {status}: {detail}"
            )))
        }
    }
}

enum SendFailure {
    Transient(String),
    Terminal(String),
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.send_once(email).await {
                Err(SendFailure::Transient(reason)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "retrying email send after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(SendFailure::Transient(reason)) | Err(SendFailure::Terminal(reason)) => {
                    return Err(SubmitError::dispatch(reason));
                }
                Ok(()) => {
                    tracing::info!(subject = %email.subject, "email dispatched");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;

    use super::*;
    use crate::domain::model::Attachment;

    fn mailer(endpoint: String) -> ResendMailer {
        ResendMailer::new(
            endpoint,
            "re_test_key".to_string(),
            Duration::from_secs(2),
            RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
            },
        )
        .unwrap()
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "Contact Form <onboarding@resend.dev>".into(),
            to: "owner@example.com".into(),
            reply_to: "jo@x.com".into(),
            subject: "Contact Form: Hello".into(),
            text: "Name: Jo Lee".into(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_successful_send() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/emails")
                .header("authorization", "Bearer re_test_key")
                .json_body_partial(
                    r#"{
                        "from": "Contact Form <onboarding@resend.dev>",
                        "to": "owner@example.com",
                        "reply_to": "jo@x.com",
                        "subject": "Contact Form: Hello"
                    }"#,
                );
            then.status(200)
                .json_body(serde_json::json!({"id": "e-123"}));
        });

        let mailer = mailer(server.url("/emails"));
        assert!(mailer.send(&email()).await.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_attachments_are_base64_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/emails").json_body_partial(
                r#"{"attachments": [{"filename": "notes.txt", "content": "aGVsbG8="}]}"#,
            );
            then.status(200)
                .json_body(serde_json::json!({"id": "e-124"}));
        });

        let mut email = email();
        email.attachments.push(Attachment {
            filename: "notes.txt".into(),
            content: b"hello".to_vec(),
        });

        let mailer = mailer(server.url("/emails"));
        assert!(mailer.send(&email).await.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_client_rejection_is_terminal() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/emails");
            then.status(422)
                .json_body(serde_json::json!({"message": "invalid to address"}));
        });

        let mailer = mailer(server.url("/emails"));
        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Dispatch { .. }));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/emails");
            then.status(503);
        });

        let mailer = mailer(server.url("/emails"));
        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Dispatch { .. }));
        mock.assert_hits(3);
    }
}
