pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

pub use crate::config::{AppConfig, Cli};
pub use crate::core::pipeline::SubmissionPipeline;
pub use crate::core::rate_limit::{RateLimitConfig, RateLimiter};
pub use crate::utils::error::{FieldError, Result, SubmitError};
pub use crate::web::{build_state, create_router, AppState};
