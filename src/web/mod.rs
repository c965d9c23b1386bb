// HTTP layer: router assembly, shared state, request logging.

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::adapters::hcaptcha::HcaptchaVerifier;
use crate::adapters::resend::ResendMailer;
use crate::config::AppConfig;
use crate::core::pipeline::SubmissionPipeline;
use crate::core::rate_limit::RateLimiter;
use crate::utils::error::Result;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub pipeline: SubmissionPipeline<HcaptchaVerifier, ResendMailer>,
}

/// Builds the provider clients and the pipeline from validated
/// configuration. Runs at startup, so a bad credential or endpoint is
/// rejected before the listener binds.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let verifier = HcaptchaVerifier::new(
        config.hcaptcha_endpoint.clone(),
        config.hcaptcha_secret.clone(),
        &config.hcaptcha_site_key,
        config.outbound_timeout(),
        config.retry_policy(),
    )?;
    let mailer = ResendMailer::new(
        config.resend_endpoint.clone(),
        config.resend_api_key.clone(),
        config.outbound_timeout(),
        config.retry_policy(),
    )?;
    let pipeline = SubmissionPipeline::new(
        RateLimiter::new(config.rate_limit.clone()),
        verifier,
        mailer,
        config.from_address.clone(),
        config.contact_email.clone(),
    );
    Ok(AppState { pipeline })
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/send", post(handlers::send))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_logging))
                .into_inner(),
        )
        .with_state(state)
}

/// Request summary logging middleware.
async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
